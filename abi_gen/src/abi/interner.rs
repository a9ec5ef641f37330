/* Content-addressed arena of the composite types an interface uses
 *
 * Every distinct Tuple / Array / Slice shape is interned once, keyed by the
 * structural hash of its canonical type string, so two tuples with the same
 * ordered member types collapse into one generated type. Children are
 * interned before their parents, which keeps entry order a valid
 * definition order and lets sequence names build on element names.
 */

use super::naming::{snake_case, type_name};
use crate::errors::{CodegenError, CodegenResult};
use crate::options::GeneratorOptions;
use crate::stdlib::{is_catalogued, stem};
use abi_runtime::keccak256;
use abi_types::{TupleField, TypeDescriptor};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Length of a structural hash in hex digits.
pub const HASH_LEN: usize = 16;

/* Names the generated module imports from the runtime prelude */
const RESERVED: &[&str] = &[
    "Address",
    "B256",
    "DecodeError",
    "EncodeError",
    "FixedBytes",
    "I256",
    "OffsetKind",
    "U256",
    "WordKind",
];

/// First 8 bytes of keccak256 over the canonical type string, as 16
/// lowercase hex digits.
pub fn structural_hash(canonical: &str) -> String {
    hex::encode(&keccak256(canonical.as_bytes())[..HASH_LEN / 2])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Tuple {
        /// Declared struct name, when any occurrence carried one.
        struct_name: Option<String>,
        fields: Vec<TupleField>,
    },
    Array {
        element: TypeDescriptor,
        len: usize,
    },
    Slice {
        element: TypeDescriptor,
    },
}

#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub hash: String,
    pub canonical: String,
    pub kind: EntryKind,
    /// CamelCase type name for tuples, snake_case function stem for
    /// sequences. Empty until `assign_names` runs.
    pub name: String,
}

impl TypeEntry {
    pub fn is_tuple(&self) -> bool {
        matches!(self.kind, EntryKind::Tuple { .. })
    }
}

/// How a type is referenced from generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding<'a> {
    /// Scalars, `bytes` and `string`.
    Primitive,
    /// A catalogued sequence served by the runtime's shared codecs.
    Stdlib,
    /// A tuple owned by the caller under this path.
    External(&'a str),
    Generated(TypeId),
}

#[derive(Debug)]
pub struct TypeArena {
    entries: IndexMap<String, TypeEntry>,
    external: BTreeMap<String, String>,
    stdlib: bool,
    named: bool,
}

impl TypeArena {
    /// Validates the external tuple map: keys must be structural hashes and
    /// no two hashes may share a name.
    pub fn new(options: &GeneratorOptions) -> CodegenResult<Self> {
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        let mut external = BTreeMap::new();
        for (hash, name) in &options.external_tuples {
            let normalized = hash.trim_start_matches("0x").to_ascii_lowercase();
            if normalized.len() != HASH_LEN || !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(CodegenError::InvalidExternalHash(hash.clone()));
            }
            if let Some(first) = owners.insert(name.as_str(), hash.as_str()) {
                return Err(CodegenError::DuplicateExternalTuple {
                    name: name.clone(),
                    first: first.to_string(),
                    second: hash.clone(),
                });
            }
            external.insert(normalized, name.clone());
        }
        Ok(Self {
            entries: IndexMap::new(),
            external,
            stdlib: options.stdlib,
            named: false,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeEntry> {
        self.entries.get_index(id.0).map(|(_, entry)| entry)
    }

    /// Entries in interning order (children before parents).
    pub fn entries(&self) -> impl Iterator<Item = (TypeId, &TypeEntry)> {
        self.entries
            .values()
            .enumerate()
            .map(|(idx, entry)| (TypeId(idx), entry))
    }

    /// External tuples that matched at least one interned shape.
    pub fn external_name(&self, hash: &str) -> Option<&str> {
        self.external.get(hash).map(String::as_str)
    }

    /// Interns `ty` and every composite it contains. Returns the entry for
    /// `ty` itself when it is generated here.
    pub fn intern(&mut self, ty: &TypeDescriptor) -> Option<TypeId> {
        match ty {
            TypeDescriptor::Bool
            | TypeDescriptor::Address
            | TypeDescriptor::Uint(_)
            | TypeDescriptor::Int(_)
            | TypeDescriptor::FixedBytes(_)
            | TypeDescriptor::Bytes
            | TypeDescriptor::String => None,
            TypeDescriptor::Tuple(tuple) => {
                let canonical = ty.canonical_string();
                let hash = structural_hash(&canonical);
                if let Some(name) = self.external.get(&hash) {
                    debug!(%canonical, %hash, external = %name, "substituting external tuple");
                    return None;
                }
                for field in &tuple.fields {
                    self.intern(&field.ty);
                }
                Some(self.insert_tuple(hash, canonical, tuple.struct_name.as_deref(), &tuple.fields))
            }
            TypeDescriptor::Array(element, len) => {
                let canonical = ty.canonical_string();
                self.intern(element);
                Some(self.insert(
                    canonical,
                    EntryKind::Array {
                        element: element.as_ref().clone(),
                        len: *len,
                    },
                ))
            }
            TypeDescriptor::Slice(element) => {
                let canonical = ty.canonical_string();
                if self.stdlib && is_catalogued(&canonical) {
                    return None;
                }
                self.intern(element);
                Some(self.insert(
                    canonical,
                    EntryKind::Slice {
                        element: element.as_ref().clone(),
                    },
                ))
            }
        }
    }

    fn insert(&mut self, canonical: String, kind: EntryKind) -> TypeId {
        let hash = structural_hash(&canonical);
        let entry = self.entries.entry(hash.clone());
        let idx = entry.index();
        entry.or_insert_with(|| {
            debug!(%canonical, %hash, "interned type");
            TypeEntry {
                hash,
                canonical,
                kind,
                name: String::new(),
            }
        });
        TypeId(idx)
    }

    /* An anonymous tuple is upgraded in place the first time the same shape
     * shows up under a declared struct name. */
    fn insert_tuple(
        &mut self,
        hash: String,
        canonical: String,
        struct_name: Option<&str>,
        fields: &[TupleField],
    ) -> TypeId {
        if let Some((idx, _, existing)) = self.entries.get_full_mut(&hash) {
            if let EntryKind::Tuple {
                struct_name: existing_name @ None,
                fields: existing_fields,
            } = &mut existing.kind
            {
                if let Some(name) = struct_name {
                    debug!(%canonical, struct_name = name, "naming anonymous tuple");
                    *existing_name = Some(name.to_string());
                    *existing_fields = fields.to_vec();
                }
            }
            return TypeId(idx);
        }
        self.insert(
            canonical,
            EntryKind::Tuple {
                struct_name: struct_name.map(str::to_string),
                fields: fields.to_vec(),
            },
        )
    }

    /// Gives every entry its final name. Tuples are named first (declared
    /// struct name, else `Tuple` plus the hash prefix), then sequences as
    /// `<element>_slice` / `<element>_array<N>`. Clashes get the hash
    /// appended.
    pub fn assign_names(&mut self) {
        let mut taken: HashSet<String> = RESERVED.iter().map(|name| name.to_string()).collect();
        for name in self.external.values() {
            taken.insert(name.clone());
        }

        for entry in self.entries.values_mut() {
            if let EntryKind::Tuple { struct_name, .. } = &entry.kind {
                let base = match struct_name {
                    Some(declared) => type_name(declared),
                    None => format!("Tuple{}", &entry.hash[..8]),
                };
                entry.name = unique(&mut taken, base, &entry.hash, "");
            }
        }

        for idx in 0..self.entries.len() {
            let stem = match &self.entries[idx].kind {
                EntryKind::Tuple { .. } => continue,
                EntryKind::Array { element, len } => format!("{}_array{len}", self.element_stem(element)),
                EntryKind::Slice { element } => format!("{}_slice", self.element_stem(element)),
            };
            let hash = self.entries[idx].hash.clone();
            self.entries[idx].name = unique(&mut taken, stem, &hash, "_");
        }
        self.named = true;
    }

    fn element_stem(&self, element: &TypeDescriptor) -> String {
        match element {
            TypeDescriptor::Tuple(_) => {
                let hash = structural_hash(&element.canonical_string());
                if let Some(path) = self.external.get(&hash) {
                    let last = path.rsplit("::").next().unwrap_or(path);
                    return snake_case(last);
                }
                self.entries
                    .get(&hash)
                    .map(|entry| snake_case(&entry.name))
                    .unwrap_or_else(|| format!("tuple{}", &hash[..8]))
            }
            TypeDescriptor::Array(..) | TypeDescriptor::Slice(_) => {
                let canonical = element.canonical_string();
                match self.entries.get(&structural_hash(&canonical)) {
                    Some(entry) if !entry.name.is_empty() => entry.name.clone(),
                    _ => stem(&canonical),
                }
            }
            _ => element.canonical_string(),
        }
    }

    /// How generated code refers to `ty`.
    pub fn binding(&self, ty: &TypeDescriptor) -> CodegenResult<Binding<'_>> {
        match ty {
            TypeDescriptor::Tuple(_) | TypeDescriptor::Array(..) | TypeDescriptor::Slice(_) => {
                let canonical = ty.canonical_string();
                if self.stdlib && matches!(ty, TypeDescriptor::Slice(_)) && is_catalogued(&canonical) {
                    return Ok(Binding::Stdlib);
                }
                let hash = structural_hash(&canonical);
                if matches!(ty, TypeDescriptor::Tuple(_)) {
                    if let Some(name) = self.external.get(&hash) {
                        return Ok(Binding::External(name));
                    }
                }
                self.entries
                    .get_index_of(&hash)
                    .map(|idx| Binding::Generated(TypeId(idx)))
                    .ok_or(CodegenError::Unresolved(canonical))
            }
            _ => Ok(Binding::Primitive),
        }
    }

    /// Generated name of a composite type (struct name or sequence stem).
    pub fn name_of(&self, ty: &TypeDescriptor) -> CodegenResult<String> {
        match self.binding(ty)? {
            Binding::Generated(id) if self.named => Ok(self.entries[id.0].name.clone()),
            Binding::External(name) => Ok(name.to_string()),
            Binding::Stdlib => Ok(stem(&ty.canonical_string())),
            _ => Err(CodegenError::Unresolved(ty.canonical_string())),
        }
    }

    /// Every type name already spoken for: runtime prelude imports,
    /// external tuples and generated tuples. Declaration-level structs
    /// (`TransferCall`, ...) are named around these.
    pub fn claimed_names(&self) -> HashSet<String> {
        let mut taken: HashSet<String> = RESERVED.iter().map(|name| name.to_string()).collect();
        taken.extend(self.external.values().cloned());
        taken.extend(
            self.entries
                .values()
                .filter(|entry| entry.is_tuple())
                .map(|entry| entry.name.clone()),
        );
        taken
    }
}

fn unique(taken: &mut HashSet<String>, base: String, hash: &str, sep: &str) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let suffixed = format!("{base}{sep}{}", &hash[..8]);
    taken.insert(suffixed.clone());
    suffixed
}
