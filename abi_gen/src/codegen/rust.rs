use crate::codegen::rust_gen::{
  emit_constructor, emit_error, emit_event, emit_function, emit_sequence, emit_sequence_view, emit_struct,
  emit_struct_view, Context, Sequence, StructOptions,
};
use crate::codegen::shared::{EmissionPlan, TypeBody, TypePlan};
use crate::codegen::Backend;
use crate::errors::CodegenResult;
use std::fmt::Write;
use tracing::debug;

/// Renders a plan as one self-contained Rust module that depends only on
/// the runtime crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustBackend;

impl Backend for RustBackend {
  fn name(&self) -> &'static str {
    "rust"
  }

  fn file_extension(&self) -> &'static str {
    "rs"
  }

  fn render(&self, plan: &EmissionPlan) -> CodegenResult<String> {
    let cx = Context {
      runtime: &plan.runtime_crate,
      lazy_views: plan.lazy_views,
      packed: plan.packed,
    };
    let mut out = String::new();
    writeln!(out, "// Generated ABI codecs for {}. Do not edit.", plan.source)?;
    writeln!(out)?;
    writeln!(out, "#[allow(unused_imports)]")?;
    writeln!(out, "use {}::prelude::*;", plan.runtime_crate)?;
    writeln!(out)?;

    for ty in &plan.types {
      emit_type(&mut out, ty, &cx)?;
    }
    if let Some(ctor) = &plan.constructor {
      emit_constructor(&mut out, ctor, &cx)?;
    }
    for func in &plan.functions {
      emit_function(&mut out, func, &cx)?;
    }
    for event in &plan.events {
      emit_event(&mut out, event, &cx)?;
    }
    for error in &plan.errors {
      emit_error(&mut out, error, &cx)?;
    }

    /* one trailing newline */
    while out.ends_with("\n\n") {
      out.pop();
    }
    debug!(source = %plan.source, bytes = out.len(), "rendered rust module");
    Ok(out)
  }
}

fn emit_type(out: &mut String, ty: &TypePlan, cx: &Context<'_>) -> CodegenResult<()> {
  match &ty.body {
    TypeBody::Struct(plan) => {
      let doc = format!("ABI tuple `{}`.", ty.canonical);
      emit_struct(out, plan, &StructOptions { doc: &doc, packed: cx.packed })?;
      if cx.lazy_views {
        emit_struct_view(out, plan)?;
      }
    }
    TypeBody::Array { element, len } => {
      let seq = Sequence {
        stem: &ty.name,
        canonical: &ty.canonical,
        element,
        len: Some(*len),
        packed: cx.packed,
      };
      emit_sequence(out, &seq)?;
      if cx.lazy_views {
        emit_sequence_view(out, &seq)?;
      }
    }
    TypeBody::Slice { element } => {
      let seq = Sequence {
        stem: &ty.name,
        canonical: &ty.canonical,
        element,
        len: None,
        packed: cx.packed,
      };
      emit_sequence(out, &seq)?;
      if cx.lazy_views {
        emit_sequence_view(out, &seq)?;
      }
    }
  }
  Ok(())
}
