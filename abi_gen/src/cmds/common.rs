/* Common utilities shared between analyze and codegen commands */

use crate::abi::naming::snake_case;
use crate::options::GeneratorOptions;
use abi_types::Abi;
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use tracing::debug;

/* Command-line settings layered over an optional config file */
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
  pub config: Option<PathBuf>,
  pub stdlib: bool,
  pub lazy_views: bool,
  pub packed: bool,
  pub runtime_crate: Option<String>,
  /* `HASH=PATH` pairs */
  pub external: Vec<String>,
}

/* Config file first, then flags. Boolean flags only ever switch a feature on. */
pub fn resolve_options(overrides: &OptionOverrides) -> anyhow::Result<GeneratorOptions> {
  let mut options = match &overrides.config {
    Some(path) => GeneratorOptions::load(path)?,
    None => GeneratorOptions::default(),
  };
  options.stdlib |= overrides.stdlib;
  options.lazy_views |= overrides.lazy_views;
  options.packed |= overrides.packed;
  if let Some(runtime) = &overrides.runtime_crate {
    options.runtime_crate = runtime.clone();
  }
  for pair in &overrides.external {
    let Some((hash, path)) = pair.split_once('=') else {
      bail!("external tuple '{}' is not of the form HASH=PATH", pair);
    };
    options.external_tuples.insert(hash.trim().to_string(), path.trim().to_string());
  }
  debug!(?options, "resolved generator options");
  Ok(options)
}

/* An interface together with the name generated code is filed under */
pub struct LoadedInterface {
  pub path: PathBuf,
  pub name: String,
  pub abi: Abi,
}

pub fn load_interfaces(files: &[PathBuf]) -> anyhow::Result<Vec<LoadedInterface>> {
  files
    .iter()
    .map(|path| {
      let abi = abi_loader::load_file(path).with_context(|| format!("failed to load {}", path.display()))?;
      Ok(LoadedInterface {
        path: path.clone(),
        name: source_name(path),
        abi,
      })
    })
    .collect()
}

/* `contracts/ERC20Token.json` -> `erc20_token` */
pub fn source_name(path: &Path) -> String {
  let stem = path
    .file_stem()
    .and_then(|stem| stem.to_str())
    .unwrap_or("interface");
  let name = snake_case(stem);
  if name.is_empty() {
    "interface".to_string()
  } else {
    name
  }
}
