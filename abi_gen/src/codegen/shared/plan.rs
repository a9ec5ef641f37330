//! Emission plan: a language-neutral description of everything a backend
//! has to render for one interface.
//!
//! The plan is fully resolved. Every type reference says how it is encoded
//! (inline scalar, generated struct, generated sequence codec, external
//! tuple, or runtime stdlib codec), every struct field carries its head
//! offset, and every declaration carries its selector or topic. Backends
//! only decide spelling.

use serde_derive::Serialize;

/// Plan format version, bumped when the serialized shape changes.
pub const PLAN_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EmissionPlan {
    pub version: u32,
    /// Name of the interface the plan was built from (usually a file stem).
    pub source: String,
    pub runtime_crate: String,
    pub lazy_views: bool,
    pub packed: bool,
    /// Generated types sorted by name.
    pub types: Vec<TypePlan>,
    pub constructor: Option<ConstructorPlan>,
    pub functions: Vec<FunctionPlan>,
    pub events: Vec<EventPlan>,
    pub errors: Vec<ErrorPlan>,
}

/// A use of a type at one site (a field, an element, an argument).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TypeRef {
    pub canonical: String,
    pub dynamic: bool,
    /// Bytes the value occupies in its parent's head.
    pub head_size: usize,
    /// Size in packed mode, when the type has one.
    pub packed_size: Option<usize>,
    /// Stem of the runtime stdlib codec serving this type.
    pub stdlib: Option<String>,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Shape {
    Bool,
    Address,
    Uint { bits: u16 },
    Int { bits: u16 },
    FixedBytes { len: u16 },
    Bytes,
    String,
    Tuple { name: String, external: bool },
    Array { stem: String, element: Box<TypeRef>, len: usize },
    Slice { stem: String, element: Box<TypeRef> },
}

impl TypeRef {
    /// Scalars, bytes and string: everything without a generated codec.
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self.shape,
            Shape::Tuple { .. } | Shape::Array { .. } | Shape::Slice { .. }
        )
    }

    /// Sequences and tuples whose codec is generated in this plan.
    pub fn is_generated(&self) -> bool {
        match &self.shape {
            Shape::Tuple { external, .. } => !external,
            Shape::Array { .. } | Shape::Slice { .. } => self.stdlib.is_none(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TypePlan {
    /// Struct name for tuples, function stem for sequences.
    pub name: String,
    pub hash: String,
    pub canonical: String,
    pub dynamic: bool,
    pub head_size: usize,
    pub packed_size: Option<usize>,
    pub body: TypeBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TypeBody {
    Struct(StructPlan),
    Array { element: TypeRef, len: usize },
    Slice { element: TypeRef },
}

/// One head/tail frame rendered as a named aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StructPlan {
    pub name: String,
    pub fields: Vec<FieldPlan>,
    pub head_size: usize,
    pub dynamic: bool,
    pub packed_size: Option<usize>,
}

impl StructPlan {
    pub fn dynamic_fields(&self) -> impl Iterator<Item = &FieldPlan> {
        self.fields.iter().filter(|field| field.ty.dynamic)
    }

    pub fn dynamic_count(&self) -> usize {
        self.dynamic_fields().count()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldPlan {
    /// Identifier in the generated aggregate.
    pub ident: String,
    /// Name as declared in the interface (may be empty).
    pub abi_name: String,
    pub ty: TypeRef,
    /// Position of this field in the frame's head.
    pub head_offset: usize,
    /// Index among the frame's dynamic fields.
    pub dynamic_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FunctionPlan {
    pub name: String,
    /// Snake-case identifier, suffixed with the selector when overloaded.
    pub ident: String,
    pub signature: String,
    /// Selector as 8 lowercase hex digits.
    pub selector: String,
    pub mutability: String,
    pub inputs: StructPlan,
    pub outputs: StructPlan,
    pub packed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventPlan {
    pub name: String,
    pub ident: String,
    pub struct_name: String,
    pub signature: String,
    /// topic0 as 64 lowercase hex digits.
    pub topic: String,
    pub anonymous: bool,
    /// Every input in declaration order.
    pub fields: Vec<EventFieldPlan>,
    /// Frame of the non-indexed inputs carried in the data payload.
    pub data: StructPlan,
}

impl EventPlan {
    /// Topics a matching log carries.
    pub fn topic_count(&self) -> usize {
        usize::from(!self.anonymous) + self.fields.iter().filter(|field| field.indexed).count()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventFieldPlan {
    pub ident: String,
    pub abi_name: String,
    /// For hashed topics this is `bytes32`, the type of the stored hash.
    pub ty: TypeRef,
    pub indexed: bool,
    /// Indexed and carried as the keccak hash of its encoding.
    pub hashed: bool,
    /// Canonical type of the declared argument.
    pub declared: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ErrorPlan {
    pub name: String,
    pub ident: String,
    pub signature: String,
    pub selector: String,
    pub inputs: StructPlan,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConstructorPlan {
    pub mutability: String,
    pub inputs: StructPlan,
}
