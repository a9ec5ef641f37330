//! Interface loading.
//!
//! Turns a contract interface, written either as standard ABI JSON (or the
//! same schema in YAML) or in the human-readable declaration DSL, into an
//! [`abi_types::Abi`]. Struct references are expanded into inline tuples
//! that remember their struct name.

pub mod dsl;
mod elementary;
pub mod errors;
pub mod file;
pub mod json;
mod resolve;

pub use dsl::parse_dsl;
pub use errors::{ParseError, ParseResult};
pub use file::{load_file, parse_source, SourceFormat};
pub use json::{parse_json, parse_yaml};

pub use abi_types;
