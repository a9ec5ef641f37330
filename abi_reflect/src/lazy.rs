/* Lazy views over encoded tuples and arrays
 *
 * Building a view walks the head once, validating and measuring every
 * member without materialising it, and records where each dynamic member's
 * payload starts. Accessors decode on demand. Nested composites come back
 * as nested views unless their type has a shared stdlib codec, in which
 * case they decode eagerly.
 */

use crate::decoder::{decode, decode_tuple, measure, sequence_head, walk_frame};
use crate::value::Value;
use abi_runtime::prelude::*;
use abi_runtime::stdlib::CATALOGUE;
use abi_types::{TupleType, TypeDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LazyValue<'a> {
    Value(Value),
    Tuple(LazyTuple<'a>),
    Array(LazyArray<'a>),
}

impl<'a> LazyValue<'a> {
    /// View of a value of type `ty` encoded at the start of `data`.
    pub fn new(ty: &'a TypeDescriptor, data: &'a [u8]) -> Result<Self, DecodeError> {
        lazy_value(ty, data)
    }

    /// Fully decodes whatever this accessor returned.
    pub fn materialize(&self) -> Result<Value, DecodeError> {
        match self {
            LazyValue::Value(value) => Ok(value.clone()),
            LazyValue::Tuple(view) => view.materialize(),
            LazyValue::Array(view) => view.materialize(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyTuple<'a> {
    tuple: &'a TupleType,
    data: &'a [u8],
    /* payload position of each dynamic field, in declaration order */
    offsets: Vec<usize>,
    size: usize,
}

impl<'a> LazyTuple<'a> {
    pub fn new(tuple: &'a TupleType, data: &'a [u8]) -> Result<Self, DecodeError> {
        let mut offsets = Vec::new();
        let size = walk_frame(
            data,
            tuple.head_size(),
            tuple.fields.len(),
            |idx| &tuple.fields[idx].ty,
            OffsetKind::DynamicField,
            |_, ty, at| {
                if ty.is_dynamic() {
                    offsets.push(at);
                }
                measure(ty, &data[at..])
            },
        )?;
        Ok(Self {
            tuple,
            data,
            offsets,
            size,
        })
    }

    pub fn len(&self) -> usize {
        self.tuple.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuple.fields.is_empty()
    }

    /// Bytes the tuple's encoding occupies.
    pub fn encoded_size(&self) -> usize {
        self.size
    }

    pub fn dynamic_offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn field(&self, index: usize) -> Result<LazyValue<'a>, DecodeError> {
        let field = self
            .tuple
            .fields
            .get(index)
            .ok_or(DecodeError::IndexOutOfBounds {
                index,
                len: self.len(),
            })?;
        let at = self.position(index);
        lazy_value(&field.ty, &self.data[at..])
    }

    pub fn field_by_name(&self, name: &str) -> Option<Result<LazyValue<'a>, DecodeError>> {
        let index = self.tuple.fields.iter().position(|f| f.name == name)?;
        Some(self.field(index))
    }

    pub fn materialize(&self) -> Result<Value, DecodeError> {
        decode_tuple(self.tuple, self.data).map(|(items, _)| Value::Tuple(items))
    }

    fn position(&self, index: usize) -> usize {
        let before = &self.tuple.fields[..index];
        if self.tuple.fields[index].ty.is_dynamic() {
            let slot = before.iter().filter(|f| f.ty.is_dynamic()).count();
            self.offsets[slot]
        } else {
            before.iter().map(|f| f.ty.static_size()).sum()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyArray<'a> {
    ty: &'a TypeDescriptor,
    element: &'a TypeDescriptor,
    data: &'a [u8],
    /* element region: after the length word for slices */
    frame: &'a [u8],
    len: usize,
    offsets: Vec<usize>,
}

impl<'a> LazyArray<'a> {
    /* Only called with fixed array or slice types */
    pub(crate) fn new(ty: &'a TypeDescriptor, data: &'a [u8]) -> Result<Self, DecodeError> {
        let (element, len, frame, kind) = match ty {
            TypeDescriptor::Array(element, len) => {
                (element.as_ref(), *len, data, OffsetKind::ArrayElement)
            }
            TypeDescriptor::Slice(element) => {
                let len = read_length(data)?;
                (element.as_ref(), len, &data[WORD..], OffsetKind::SliceElement)
            }
            _ => {
                return Err(DecodeError::IndexOutOfBounds { index: 0, len: 0 });
            }
        };
        let head = sequence_head(element, len, frame)?;
        let mut offsets = Vec::new();
        walk_frame(frame, head, len, |_| element, kind, |_, ty, at| {
            if ty.is_dynamic() {
                offsets.push(at);
            }
            measure(ty, &frame[at..])
        })?;
        Ok(Self {
            ty,
            element,
            data,
            frame,
            len,
            offsets,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Result<LazyValue<'a>, DecodeError> {
        if index >= self.len {
            return Err(DecodeError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let at = if self.element.is_dynamic() {
            self.offsets[index]
        } else {
            index * self.element.static_size()
        };
        lazy_value(self.element, &self.frame[at..])
    }

    pub fn materialize(&self) -> Result<Value, DecodeError> {
        decode(self.ty, self.data).map(|(value, _)| value)
    }
}

fn lazy_value<'a>(ty: &'a TypeDescriptor, data: &'a [u8]) -> Result<LazyValue<'a>, DecodeError> {
    match ty {
        TypeDescriptor::Tuple(tuple) => LazyTuple::new(tuple, data).map(LazyValue::Tuple),
        TypeDescriptor::Array(..) | TypeDescriptor::Slice(_) if !is_catalogued(ty) => {
            LazyArray::new(ty, data).map(LazyValue::Array)
        }
        _ => decode(ty, data).map(|(value, _)| LazyValue::Value(value)),
    }
}

fn is_catalogued(ty: &TypeDescriptor) -> bool {
    let id = ty.canonical_string();
    CATALOGUE.contains(&id.as_str())
}
