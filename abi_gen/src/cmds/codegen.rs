/* Codegen command - generate code from ABI definitions */

use super::common::{load_interfaces, resolve_options, OptionOverrides};
use crate::codegen::{generate_with, Backend, RustBackend};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

/* Execute the codegen command; returns the files written */
pub fn run(files: &[PathBuf], output_dir: &Path, overrides: &OptionOverrides) -> anyhow::Result<Vec<PathBuf>> {
  let options = resolve_options(overrides)?;
  let backend = RustBackend;
  let interfaces = load_interfaces(files)?;

  std::fs::create_dir_all(output_dir)
    .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

  let mut written = Vec::with_capacity(interfaces.len());
  for interface in &interfaces {
    let code = generate_with(&backend, &interface.abi, &interface.name, &options)
      .with_context(|| format!("code generation failed for {}", interface.path.display()))?;
    let target = output_dir.join(format!("{}.{}", interface.name, backend.file_extension()));
    std::fs::write(&target, code).with_context(|| format!("failed to write {}", target.display()))?;
    info!(
      input = %interface.path.display(),
      output = %target.display(),
      backend = backend.name(),
      "generated codecs"
    );
    written.push(target);
  }
  Ok(written)
}
