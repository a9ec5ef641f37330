//! ABI Type Definitions
//!
//! This crate contains the core type model for the Ethereum ABI: type
//! descriptors with their layout predicates, and the declaration AST
//! (functions, events, errors, constructor, fallback, receive) produced by
//! the front-ends in `abi_loader`. It performs no I/O and no hashing.

pub mod decl;
pub mod types;

// Re-export commonly used types at the crate root
pub use decl::*;
pub use types::*;
