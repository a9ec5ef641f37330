//! Human-readable interface DSL.
//!
//! ```text
//! struct Order { address maker; uint256[] amounts; }
//! function fill(Order order, bytes signature) external payable returns (bool)
//! event Filled(address indexed maker, uint256 total)
//! error Expired(uint64 deadline)
//! constructor(address owner)
//! ```
//!
//! Parsing runs in two passes: every declaration is parsed with struct
//! references left symbolic, then the collected struct table is resolved
//! and substituted into the remaining declarations.

mod lexer;
mod parser;

use crate::errors::ParseResult;
use crate::resolve::{Resolver, StructTable};
use abi_types::{Abi, ConstructorDecl, ErrorDecl, EventDecl, FallbackDecl, FunctionDecl, ReceiveDecl, StateMutability};
use lexer::split_declarations;
use parser::{parse_declaration, Declaration};
use tracing::debug;

pub fn parse_dsl(source: &str) -> ParseResult<Abi> {
    let mut structs = StructTable::default();
    let mut pending = Vec::new();
    for decl in split_declarations(source)? {
        match parse_declaration(&decl)? {
            Declaration::Struct(def) => structs.insert(def),
            other => pending.push((decl.line, other)),
        }
    }

    let mut resolver = Resolver::new(&structs);
    resolver.resolve_all()?;

    let mut abi = Abi::default();
    for (line, decl) in pending {
        match decl {
            Declaration::Function {
                name,
                inputs,
                outputs,
                state_mutability,
            } => {
                let func = FunctionDecl {
                    name,
                    inputs: resolver.arguments(&inputs, line)?,
                    outputs: resolver.arguments(&outputs, line)?,
                    state_mutability,
                };
                debug!(line, signature = %func.signature(), "parsed function");
                abi.functions.push(func);
            }
            Declaration::Event {
                name,
                inputs,
                anonymous,
            } => {
                let event = EventDecl {
                    name,
                    inputs: resolver.arguments(&inputs, line)?,
                    anonymous,
                };
                debug!(line, signature = %event.signature(), "parsed event");
                abi.events.push(event);
            }
            Declaration::Error { name, inputs } => {
                let error = ErrorDecl {
                    name,
                    inputs: resolver.arguments(&inputs, line)?,
                };
                debug!(line, signature = %error.signature(), "parsed error");
                abi.errors.push(error);
            }
            Declaration::Constructor {
                inputs,
                state_mutability,
            } => {
                abi.constructor = Some(ConstructorDecl {
                    inputs: resolver.arguments(&inputs, line)?,
                    state_mutability,
                });
            }
            Declaration::Fallback { state_mutability } => {
                abi.fallback = Some(FallbackDecl { state_mutability });
            }
            Declaration::Receive => {
                abi.receive = Some(ReceiveDecl {
                    state_mutability: StateMutability::Payable,
                });
            }
            Declaration::Struct(_) => {}
        }
    }
    Ok(abi)
}
