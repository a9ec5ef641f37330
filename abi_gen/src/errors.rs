use std::path::PathBuf;
use thiserror::Error;

pub type CodegenResult<T> = Result<T, CodegenError>;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// Packed encoding was requested for a declaration whose inputs include
    /// a type without a packed form.
    #[error("'{ty}' has no packed encoding")]
    UnsupportedPackedType { ty: String },

    /// Two structural hashes were mapped onto the same external name.
    #[error("external tuple name '{name}' is used for both {first} and {second}")]
    DuplicateExternalTuple {
        name: String,
        first: String,
        second: String,
    },

    #[error("external tuple key '{0}' is not a 16-digit structural hash")]
    InvalidExternalHash(String),

    /// A composite type reached lowering without having been interned.
    #[error("type '{0}' was never collected")]
    Unresolved(String),

    /// Wraps the failure of a single declaration; generation stops there.
    #[error("{decl}: {source}")]
    Declaration {
        decl: String,
        #[source]
        source: Box<CodegenError>,
    },

    /// A declaration mentions a type whose layout overflows `usize`.
    #[error(transparent)]
    Layout(#[from] abi_types::TypeError),

    #[error("cannot read generator config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Format(#[from] std::fmt::Error),
}

impl CodegenError {
    pub fn in_declaration(self, decl: impl Into<String>) -> Self {
        CodegenError::Declaration {
            decl: decl.into(),
            source: Box::new(self),
        }
    }
}
