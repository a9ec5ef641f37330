/* Analyze command - report selectors, topics and interned types */

use super::common::{load_interfaces, resolve_options, OptionOverrides};
use crate::codegen::build_plan;
use crate::codegen::shared::{EmissionPlan, TypeBody};
use anyhow::Context;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ReportFormat {
  #[default]
  Text,
  /* The serialized emission plan */
  Json,
}

/* Execute the analyze command, returning the rendered report */
pub fn run(files: &[PathBuf], overrides: &OptionOverrides, format: ReportFormat) -> anyhow::Result<String> {
  let options = resolve_options(overrides)?;
  let mut report = String::new();
  let mut plans = Vec::new();
  for interface in load_interfaces(files)? {
    let plan = build_plan(&interface.abi, &interface.name, &options)
      .with_context(|| format!("analysis failed for {}", interface.path.display()))?;
    plans.push(plan);
  }

  match format {
    ReportFormat::Json => {
      let json = if plans.len() == 1 {
        serde_json::to_string_pretty(&plans[0])?
      } else {
        serde_json::to_string_pretty(&plans)?
      };
      report.push_str(&json);
      report.push('\n');
    }
    ReportFormat::Text => {
      for plan in &plans {
        render_text(&mut report, plan)?;
      }
    }
  }
  Ok(report)
}

fn render_text(out: &mut String, plan: &EmissionPlan) -> std::fmt::Result {
  writeln!(out, "== {} ==", plan.source)?;
  if let Some(ctor) = &plan.constructor {
    writeln!(out, "constructor ({}): {} argument(s)", ctor.mutability, ctor.inputs.fields.len())?;
  }
  if !plan.functions.is_empty() {
    writeln!(out, "functions:")?;
    for func in &plan.functions {
      writeln!(out, "  0x{}  {}  {}", func.selector, func.signature, func.mutability)?;
    }
  }
  if !plan.events.is_empty() {
    writeln!(out, "events:")?;
    for event in &plan.events {
      if event.anonymous {
        writeln!(out, "  (anonymous)  {}", event.signature)?;
      } else {
        writeln!(out, "  0x{}  {}", event.topic, event.signature)?;
      }
    }
  }
  if !plan.errors.is_empty() {
    writeln!(out, "errors:")?;
    for error in &plan.errors {
      writeln!(out, "  0x{}  {}", error.selector, error.signature)?;
    }
  }
  if !plan.types.is_empty() {
    writeln!(out, "types:")?;
    for ty in &plan.types {
      let kind = match ty.body {
        TypeBody::Struct(_) => "struct",
        TypeBody::Array { .. } => "array",
        TypeBody::Slice { .. } => "slice",
      };
      let layout = if ty.dynamic { "dynamic".to_string() } else { format!("{} bytes", ty.head_size) };
      writeln!(out, "  {}  {} {}  {}  ({})", ty.hash, kind, ty.name, ty.canonical, layout)?;
    }
  }
  writeln!(out)
}
