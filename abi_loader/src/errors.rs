use std::path::PathBuf;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Errors produced while turning interface text into an [`abi_types::Abi`].
///
/// DSL errors carry the 1-based line of the declaration that failed. A
/// declaration spanning several lines (a `struct` block) reports its first
/// line.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unrecognized declaration '{text}'")]
    UnrecognizedDeclaration { line: usize, text: String },

    #[error("line {line}: invalid type '{name}'")]
    InvalidType { line: usize, name: String },

    #[error("line {line}: invalid array size '{size}'")]
    InvalidArraySize { line: usize, size: String },

    #[error("line {line}: unbalanced parentheses")]
    UnbalancedParentheses { line: usize },

    #[error("struct '{0}' references itself")]
    CircularStructReference(String),

    #[error("{entry}: invalid type '{name}'")]
    InvalidEntryType { entry: String, name: String },

    #[error("{entry}: array size in '{ty}' is too large")]
    EntryArraySize { entry: String, ty: String },

    #[error("unknown ABI entry type '{0}'")]
    UnknownEntryKind(String),

    #[error("malformed JSON ABI: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed YAML ABI: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
