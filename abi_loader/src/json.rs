/* Standard contract-ABI JSON (and the same schema written as YAML) */

use crate::elementary::{classify, Elementary};
use crate::errors::{ParseError, ParseResult};
use abi_types::{
    Abi, Argument, ConstructorDecl, ErrorDecl, EventDecl, FallbackDecl, FunctionDecl, ReceiveDecl,
    StateMutability, TupleField, TupleType, TypeDescriptor,
};
use serde_derive::Deserialize;
use tracing::debug;

/// Either a bare entry array or a compiler artifact with an `abi` member.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Document {
    Entries(Vec<Entry>),
    Artifact { abi: Vec<Entry> },
}

impl Document {
    fn into_entries(self) -> Vec<Entry> {
        match self {
            Document::Entries(entries) => entries,
            Document::Artifact { abi } => abi,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Entry {
    #[serde(rename = "type", default = "default_kind")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<Param>,
    #[serde(default)]
    outputs: Vec<Param>,
    #[serde(default)]
    state_mutability: Option<StateMutability>,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Param {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    components: Vec<Param>,
    #[serde(default)]
    internal_type: Option<String>,
}

fn default_kind() -> String {
    "function".to_string()
}

pub fn parse_json(source: &str) -> ParseResult<Abi> {
    let document: Document = serde_json::from_str(source)?;
    build_abi(document.into_entries())
}

pub fn parse_yaml(source: &str) -> ParseResult<Abi> {
    let document: Document = serde_yml::from_str(source)?;
    build_abi(document.into_entries())
}

fn build_abi(entries: Vec<Entry>) -> ParseResult<Abi> {
    let mut abi = Abi::default();
    for entry in entries {
        let state_mutability = entry.state_mutability();
        match entry.kind.as_str() {
            "function" => {
                let func = FunctionDecl {
                    inputs: arguments(&entry.name, &entry.inputs)?,
                    outputs: arguments(&entry.name, &entry.outputs)?,
                    name: entry.name,
                    state_mutability,
                };
                debug!(signature = %func.signature(), "loaded function");
                abi.functions.push(func);
            }
            "event" => {
                let event = EventDecl {
                    inputs: arguments(&entry.name, &entry.inputs)?,
                    name: entry.name,
                    anonymous: entry.anonymous,
                };
                debug!(signature = %event.signature(), "loaded event");
                abi.events.push(event);
            }
            "error" => {
                abi.errors.push(ErrorDecl {
                    inputs: arguments(&entry.name, &entry.inputs)?,
                    name: entry.name,
                });
            }
            "constructor" => {
                abi.constructor = Some(ConstructorDecl {
                    inputs: arguments("constructor", &entry.inputs)?,
                    state_mutability,
                });
            }
            "fallback" => abi.fallback = Some(FallbackDecl { state_mutability }),
            "receive" => {
                abi.receive = Some(ReceiveDecl {
                    state_mutability: StateMutability::Payable,
                })
            }
            other => return Err(ParseError::UnknownEntryKind(other.to_string())),
        }
    }
    Ok(abi)
}

impl Entry {
    /* Pre-0.4.16 compilers emit `constant` / `payable` instead */
    fn state_mutability(&self) -> StateMutability {
        if let Some(mutability) = self.state_mutability {
            return mutability;
        }
        if self.constant == Some(true) {
            StateMutability::View
        } else if self.payable == Some(true) {
            StateMutability::Payable
        } else {
            StateMutability::Nonpayable
        }
    }
}

fn arguments(entry: &str, params: &[Param]) -> ParseResult<Vec<Argument>> {
    params
        .iter()
        .map(|param| {
            let ty = param_type(entry, param)?;
            ty.check_layout().map_err(|_| ParseError::EntryArraySize {
                entry: entry.to_string(),
                ty: param.ty.clone(),
            })?;
            Ok(Argument {
                name: param.name.clone(),
                ty,
                indexed: param.indexed,
            })
        })
        .collect()
}

fn param_type(entry: &str, param: &Param) -> ParseResult<TypeDescriptor> {
    let invalid = || ParseError::InvalidEntryType {
        entry: entry.to_string(),
        name: param.ty.clone(),
    };

    let (base, suffixes) = split_array_suffixes(&param.ty).ok_or_else(invalid)?;
    let mut ty = if base == "tuple" {
        let mut fields = Vec::with_capacity(param.components.len());
        for component in &param.components {
            fields.push(TupleField::new(
                component.name.clone(),
                param_type(entry, component)?,
            ));
        }
        TypeDescriptor::Tuple(TupleType {
            struct_name: param.internal_type.as_deref().and_then(struct_name),
            fields,
        })
    } else {
        match classify(base) {
            Elementary::Known(ty) => ty,
            _ => return Err(invalid()),
        }
    };

    for suffix in suffixes {
        ty = match suffix {
            Some(len) => TypeDescriptor::array(ty, len),
            None => TypeDescriptor::slice(ty),
        };
    }
    Ok(ty)
}

/// `uint256[2][]` -> (`uint256`, [Some(2), None]).
fn split_array_suffixes(ty: &str) -> Option<(&str, Vec<Option<usize>>)> {
    let base_end = ty.find('[').unwrap_or(ty.len());
    let (base, mut rest) = ty.split_at(base_end);
    let mut suffixes = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let size = &inner[..close];
        suffixes.push(if size.is_empty() {
            None
        } else {
            Some(size.parse().ok()?)
        });
        rest = &inner[close + 1..];
    }
    Some((base, suffixes))
}

/// `struct Lib.Order[]` -> `Order`.
fn struct_name(internal_type: &str) -> Option<String> {
    let qualified = internal_type.strip_prefix("struct ")?;
    let without_arrays = qualified.split('[').next()?;
    let name = without_arrays.rsplit('.').next()?;
    (!name.is_empty()).then(|| name.to_string())
}
