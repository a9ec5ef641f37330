use serde_derive::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Size of one ABI word in bytes.
pub const WORD_SIZE: usize = 32;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TypeError {
    #[error("invalid integer width {0}: must be a multiple of 8 in [8, 256]")]
    InvalidIntegerWidth(u16),

    #[error("invalid fixed bytes length {0}: must be in [1, 32]")]
    InvalidFixedBytesLength(u16),

    #[error("type '{0}' has no packed encoding")]
    NotPackable(String),

    /// The byte footprint of the type does not fit in `usize`.
    #[error("type '{0}' is too large to lay out")]
    LayoutTooLarge(String),
}

/// A named member of a tuple. The name may be empty for positional members.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Hash)]
#[serde(rename_all = "kebab-case")]
pub struct TupleField {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl TupleField {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Hash)]
#[serde(rename_all = "kebab-case")]
pub struct TupleType {
    /// Declared struct this tuple was expanded from, if any.
    #[serde(default)]
    pub struct_name: Option<String>,
    pub fields: Vec<TupleField>,
}

impl TupleType {
    pub fn new(fields: Vec<TupleField>) -> Self {
        Self {
            struct_name: None,
            fields,
        }
    }

    pub fn named(struct_name: impl Into<String>, fields: Vec<TupleField>) -> Self {
        Self {
            struct_name: Some(struct_name.into()),
            fields,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.fields.iter().any(|field| field.ty.is_dynamic())
    }

    /// Size of the head region of this tuple's frame. Saturates at
    /// `usize::MAX` for layouts that `check_layout` rejects.
    pub fn head_size(&self) -> usize {
        self.checked_head_size().unwrap_or(usize::MAX)
    }

    pub fn checked_head_size(&self) -> Option<usize> {
        self.fields
            .iter()
            .try_fold(0usize, |total, field| total.checked_add(field.ty.checked_static_size()?))
    }
}

/// Canonical in-memory representation of an ABI type.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TypeDescriptor {
    Bool,
    Address,
    Uint(u16),
    Int(u16),
    FixedBytes(u16),
    Bytes,
    String,
    Array(Box<TypeDescriptor>, usize),
    Slice(Box<TypeDescriptor>),
    Tuple(TupleType),
}

impl TypeDescriptor {
    /// Checked constructor for `uintN`.
    pub fn uint(bits: u16) -> Result<Self, TypeError> {
        check_integer_width(bits)?;
        Ok(TypeDescriptor::Uint(bits))
    }

    /// Checked constructor for `intN`.
    pub fn int(bits: u16) -> Result<Self, TypeError> {
        check_integer_width(bits)?;
        Ok(TypeDescriptor::Int(bits))
    }

    /// Checked constructor for `bytesN`.
    pub fn fixed_bytes(len: u16) -> Result<Self, TypeError> {
        if !(1..=32).contains(&len) {
            return Err(TypeError::InvalidFixedBytesLength(len));
        }
        Ok(TypeDescriptor::FixedBytes(len))
    }

    pub fn array(element: TypeDescriptor, len: usize) -> Self {
        TypeDescriptor::Array(Box::new(element), len)
    }

    pub fn slice(element: TypeDescriptor) -> Self {
        TypeDescriptor::Slice(Box::new(element))
    }

    pub fn tuple(fields: Vec<TupleField>) -> Self {
        TypeDescriptor::Tuple(TupleType::new(fields))
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            TypeDescriptor::Bool
            | TypeDescriptor::Address
            | TypeDescriptor::Uint(_)
            | TypeDescriptor::Int(_)
            | TypeDescriptor::FixedBytes(_) => false,
            TypeDescriptor::Bytes | TypeDescriptor::String | TypeDescriptor::Slice(_) => true,
            TypeDescriptor::Array(element, _) => element.is_dynamic(),
            TypeDescriptor::Tuple(tuple) => tuple.is_dynamic(),
        }
    }

    /// Word-sized value types: one head word, no nested structure.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Bool
                | TypeDescriptor::Address
                | TypeDescriptor::Uint(_)
                | TypeDescriptor::Int(_)
                | TypeDescriptor::FixedBytes(_)
        )
    }

    /// Tuples, fixed arrays and slices: the shapes the generator emits
    /// dedicated routines for.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Array(..) | TypeDescriptor::Slice(_) | TypeDescriptor::Tuple(_)
        )
    }

    /// Footprint of this type in the head region of the enclosing frame.
    ///
    /// Dynamic types occupy one offset word. Static arrays and tuples are
    /// laid out inline, so their footprint is the recursive sum of their
    /// members.
    pub fn static_size(&self) -> usize {
        self.checked_static_size().unwrap_or(usize::MAX)
    }

    /// `static_size`, or `None` when the footprint overflows `usize`.
    pub fn checked_static_size(&self) -> Option<usize> {
        if self.is_dynamic() {
            return Some(WORD_SIZE);
        }
        match self {
            TypeDescriptor::Array(element, len) => element.checked_static_size()?.checked_mul(*len),
            TypeDescriptor::Tuple(tuple) => tuple.checked_head_size(),
            _ => Some(WORD_SIZE),
        }
    }

    /// Rejects types anywhere inside which a head region would overflow
    /// `usize`. Front-ends call this before handing types to the codecs.
    pub fn check_layout(&self) -> Result<(), TypeError> {
        let too_large = || TypeError::LayoutTooLarge(self.canonical_string());
        match self {
            TypeDescriptor::Array(element, len) => {
                element.check_layout()?;
                element
                    .checked_static_size()
                    .and_then(|size| size.checked_mul(*len))
                    .ok_or_else(too_large)?;
            }
            TypeDescriptor::Slice(element) => element.check_layout()?,
            TypeDescriptor::Tuple(tuple) => {
                for field in &tuple.fields {
                    field.ty.check_layout()?;
                }
                tuple.checked_head_size().ok_or_else(too_large)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Tight, padding-free width used by packed encoding.
    pub fn packed_size(&self) -> Result<usize, TypeError> {
        match self {
            TypeDescriptor::Bool => Ok(1),
            TypeDescriptor::Address => Ok(20),
            TypeDescriptor::Uint(bits) | TypeDescriptor::Int(bits) => Ok(*bits as usize / 8),
            TypeDescriptor::FixedBytes(len) => Ok(*len as usize),
            TypeDescriptor::Bytes | TypeDescriptor::String | TypeDescriptor::Slice(_) => {
                Err(TypeError::NotPackable(self.canonical_string()))
            }
            TypeDescriptor::Array(element, len) => element
                .packed_size()?
                .checked_mul(*len)
                .ok_or_else(|| TypeError::LayoutTooLarge(self.canonical_string())),
            TypeDescriptor::Tuple(tuple) => {
                let mut total: usize = 0;
                for field in &tuple.fields {
                    total = total
                        .checked_add(field.ty.packed_size()?)
                        .ok_or_else(|| TypeError::LayoutTooLarge(self.canonical_string()))?;
                }
                Ok(total)
            }
        }
    }

    pub fn is_packable(&self) -> bool {
        self.packed_size().is_ok()
    }

    /// ABI canonical type string, as used in signatures. Struct names are
    /// never part of it.
    pub fn canonical_string(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            TypeDescriptor::Bool => out.push_str("bool"),
            TypeDescriptor::Address => out.push_str("address"),
            TypeDescriptor::Uint(bits) => {
                out.push_str("uint");
                out.push_str(&bits.to_string());
            }
            TypeDescriptor::Int(bits) => {
                out.push_str("int");
                out.push_str(&bits.to_string());
            }
            TypeDescriptor::FixedBytes(len) => {
                out.push_str("bytes");
                out.push_str(&len.to_string());
            }
            TypeDescriptor::Bytes => out.push_str("bytes"),
            TypeDescriptor::String => out.push_str("string"),
            TypeDescriptor::Array(element, len) => {
                element.write_canonical(out);
                out.push('[');
                out.push_str(&len.to_string());
                out.push(']');
            }
            TypeDescriptor::Slice(element) => {
                element.write_canonical(out);
                out.push_str("[]");
            }
            TypeDescriptor::Tuple(tuple) => {
                out.push('(');
                for (idx, field) in tuple.fields.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    field.ty.write_canonical(out);
                }
                out.push(')');
            }
        }
    }

    /// Element type of a fixed array or slice.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Array(element, _) | TypeDescriptor::Slice(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

fn check_integer_width(bits: u16) -> Result<(), TypeError> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(TypeError::InvalidIntegerWidth(bits));
    }
    Ok(())
}

/// Rounds a byte length up to the next word boundary.
pub fn pad32(len: usize) -> usize {
    len.div_ceil(WORD_SIZE) * WORD_SIZE
}
