/* Generator options, loadable from a YAML or JSON config file */

use crate::errors::{CodegenError, CodegenResult};
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorOptions {
    /// Route catalogued types to the runtime's shared codecs.
    pub stdlib: bool,
    /// Structural hash -> existing Rust path. Matching tuples are referenced
    /// by that path instead of being emitted.
    pub external_tuples: BTreeMap<String, String>,
    /// Emit zero-copy `...View` types next to every generated tuple and
    /// non-catalogued array.
    pub lazy_views: bool,
    /// Emit `encode_<fn>_packed` for every function.
    pub packed: bool,
    pub emit_functions: bool,
    pub emit_events: bool,
    pub emit_errors: bool,
    /// Crate path generated code imports its runtime from.
    pub runtime_crate: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            stdlib: false,
            external_tuples: BTreeMap::new(),
            lazy_views: false,
            packed: false,
            emit_functions: true,
            emit_events: true,
            emit_errors: true,
            runtime_crate: "abi_runtime".to_string(),
        }
    }
}

impl GeneratorOptions {
    /// Reads options from `path`; `.json` files are JSON, anything else YAML.
    pub fn load(path: &Path) -> CodegenResult<Self> {
        let config_error = |reason: String| CodegenError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&text).map_err(|e| config_error(e.to_string()))
        } else {
            serde_yml::from_str(&text).map_err(|e| config_error(e.to_string()))
        }
    }
}
