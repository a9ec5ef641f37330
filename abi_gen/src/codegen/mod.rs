pub mod rust;
pub mod rust_gen;
pub mod shared;

use crate::errors::CodegenResult;
use crate::options::GeneratorOptions;
use abi_types::Abi;
use shared::{EmissionPlan, PlanBuilder};

pub use rust::RustBackend;

/// A target language. Backends only render; every layout decision is
/// already made in the plan.
pub trait Backend {
    fn name(&self) -> &'static str;

    /// Extension of the files this backend writes, without the dot.
    fn file_extension(&self) -> &'static str;

    fn render(&self, plan: &EmissionPlan) -> CodegenResult<String>;
}

pub fn build_plan(abi: &Abi, source: &str, options: &GeneratorOptions) -> CodegenResult<EmissionPlan> {
    PlanBuilder::new(options)?.build(abi, source)
}

/// Generates Rust codecs for `abi`.
pub fn generate(abi: &Abi, source: &str, options: &GeneratorOptions) -> CodegenResult<String> {
    generate_with(&RustBackend, abi, source, options)
}

pub fn generate_with(
    backend: &dyn Backend,
    abi: &Abi,
    source: &str,
    options: &GeneratorOptions,
) -> CodegenResult<String> {
    let plan = build_plan(abi, source, options)?;
    backend.render(&plan)
}
