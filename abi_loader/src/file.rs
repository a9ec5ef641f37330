/* Loading interface descriptions from disk */

use crate::dsl::parse_dsl;
use crate::errors::{ParseError, ParseResult};
use crate::json::{parse_json, parse_yaml};
use abi_types::Abi;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
    Dsl,
}

impl SourceFormat {
    /// Picks the front-end from the file extension, falling back to
    /// sniffing the content for unknown extensions.
    pub fn detect(path: &Path, source: &str) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => SourceFormat::Json,
            Some("yaml") | Some("yml") => SourceFormat::Yaml,
            Some("abi") | Some("sol") | Some("txt") => SourceFormat::Dsl,
            _ => Self::sniff(source),
        }
    }

    pub fn sniff(source: &str) -> Self {
        match source.trim_start().chars().next() {
            Some('[') | Some('{') => SourceFormat::Json,
            _ => SourceFormat::Dsl,
        }
    }
}

pub fn parse_source(source: &str, format: SourceFormat) -> ParseResult<Abi> {
    match format {
        SourceFormat::Json => parse_json(source),
        SourceFormat::Yaml => parse_yaml(source),
        SourceFormat::Dsl => parse_dsl(source),
    }
}

pub fn load_file(path: impl AsRef<Path>) -> ParseResult<Abi> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = SourceFormat::detect(path, &source);
    let abi = parse_source(&source, format)?;
    info!(
        path = %path.display(),
        ?format,
        functions = abi.functions.len(),
        events = abi.events.len(),
        errors = abi.errors.len(),
        "loaded interface"
    );
    Ok(abi)
}
