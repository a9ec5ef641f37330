pub mod builder;
pub mod plan;

pub use builder::PlanBuilder;
pub use plan::*;
