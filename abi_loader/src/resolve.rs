/* Struct table and struct-reference expansion
 *
 * The DSL front-end parses declarations into RawType trees that may still
 * name structs. Once every struct block has been collected, the Resolver
 * expands those names depth-first into inline tuples tagged with the struct
 * name. The set of structs on the current expansion path detects cycles;
 * finished structs are cached so shared references expand once.
 */

use crate::errors::{ParseError, ParseResult};
use abi_types::{Argument, TupleField, TupleType, TypeDescriptor};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawType {
    Known(TypeDescriptor),
    Named(String),
    Tuple(Vec<RawField>),
    Array(Box<RawType>, usize),
    Slice(Box<RawType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawField {
    pub name: String,
    pub ty: RawType,
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StructDef {
    pub name: String,
    pub line: usize,
    pub fields: Vec<RawField>,
}

impl StructDef {
    /// Adds a field. A repeated field name replaces the earlier field's
    /// type in place (last write wins).
    pub fn push_field(&mut self, field: RawField) {
        if !field.name.is_empty() {
            if let Some(existing) = self.fields.iter_mut().find(|f| f.name == field.name) {
                warn!(
                    struct_name = %self.name,
                    field = %field.name,
                    line = self.line,
                    "duplicate struct field, keeping the last declaration"
                );
                *existing = field;
                return;
            }
        }
        self.fields.push(field);
    }
}

#[derive(Debug, Default)]
pub(crate) struct StructTable {
    defs: IndexMap<String, StructDef>,
}

impl StructTable {
    pub fn insert(&mut self, def: StructDef) {
        if self.defs.contains_key(&def.name) {
            warn!(struct_name = %def.name, line = def.line, "struct redefined, keeping the last definition");
        }
        self.defs.insert(def.name.clone(), def);
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }
}

pub(crate) struct Resolver<'a> {
    table: &'a StructTable,
    resolved: HashMap<String, TupleType>,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a StructTable) -> Self {
        Self {
            table,
            resolved: HashMap::new(),
        }
    }

    /// Expands every struct in the table, so cycles are reported even for
    /// structs no declaration uses.
    pub fn resolve_all(&mut self) -> ParseResult<()> {
        let table = self.table;
        for def in table.defs.values() {
            let mut ancestors = HashSet::new();
            self.resolve_struct(&def.name, def.line, &mut ancestors)?;
        }
        debug!(structs = table.len(), "resolved struct table");
        Ok(())
    }

    pub fn resolve(&mut self, raw: &RawType, line: usize) -> ParseResult<TypeDescriptor> {
        let mut ancestors = HashSet::new();
        self.resolve_in(raw, line, &mut ancestors)
    }

    pub fn arguments(&mut self, fields: &[RawField], line: usize) -> ParseResult<Vec<Argument>> {
        fields
            .iter()
            .map(|field| {
                let ty = self.resolve(&field.ty, line)?;
                ty.check_layout().map_err(|_| ParseError::InvalidArraySize {
                    line,
                    size: ty.canonical_string(),
                })?;
                Ok(Argument {
                    name: field.name.clone(),
                    ty,
                    indexed: field.indexed,
                })
            })
            .collect()
    }

    fn resolve_in(
        &mut self,
        raw: &RawType,
        line: usize,
        ancestors: &mut HashSet<String>,
    ) -> ParseResult<TypeDescriptor> {
        match raw {
            RawType::Known(ty) => Ok(ty.clone()),
            RawType::Named(name) => Ok(TypeDescriptor::Tuple(
                self.resolve_struct(name, line, ancestors)?,
            )),
            RawType::Tuple(fields) => {
                let mut out = Vec::with_capacity(fields.len());
                for field in fields {
                    out.push(TupleField::new(
                        field.name.clone(),
                        self.resolve_in(&field.ty, line, ancestors)?,
                    ));
                }
                Ok(TypeDescriptor::tuple(out))
            }
            RawType::Array(element, len) => Ok(TypeDescriptor::array(
                self.resolve_in(element, line, ancestors)?,
                *len,
            )),
            RawType::Slice(element) => Ok(TypeDescriptor::slice(
                self.resolve_in(element, line, ancestors)?,
            )),
        }
    }

    fn resolve_struct(
        &mut self,
        name: &str,
        line: usize,
        ancestors: &mut HashSet<String>,
    ) -> ParseResult<TupleType> {
        if ancestors.contains(name) {
            return Err(ParseError::CircularStructReference(name.to_string()));
        }
        if let Some(done) = self.resolved.get(name) {
            return Ok(done.clone());
        }
        let table = self.table;
        let def = table.defs.get(name).ok_or_else(|| ParseError::InvalidType {
            line,
            name: name.to_string(),
        })?;

        ancestors.insert(name.to_string());
        let mut fields = Vec::with_capacity(def.fields.len());
        for field in &def.fields {
            fields.push(TupleField::new(
                field.name.clone(),
                self.resolve_in(&field.ty, def.line, ancestors)?,
            ));
        }
        ancestors.remove(name);

        let tuple = TupleType::named(name, fields);
        self.resolved.insert(name.to_string(), tuple.clone());
        Ok(tuple)
    }
}
