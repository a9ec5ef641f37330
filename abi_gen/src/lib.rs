//! ABI codec generator.
//!
//! Turns a parsed contract interface into Rust source implementing the
//! head/tail codec for every argument type it mentions. Generation runs in
//! two steps: `codegen::shared::builder` interns every composite type into
//! a content-addressed arena and lowers the declarations into a
//! serialisable emission plan, then a `codegen::Backend` renders the plan.

pub mod abi;
pub mod cmds;
pub mod codegen;
pub mod errors;
pub mod options;
pub mod stdlib;

pub use codegen::{generate, generate_with, Backend};
pub use errors::{CodegenError, CodegenResult};
pub use options::GeneratorOptions;
