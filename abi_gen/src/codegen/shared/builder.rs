/* Lowers a parsed interface into an EmissionPlan */

use super::plan::*;
use crate::abi::naming::{camel_case, snake_case};
use crate::abi::{Binding, EntryKind, TypeArena};
use crate::errors::{CodegenError, CodegenResult};
use crate::options::GeneratorOptions;
use crate::stdlib::{is_catalogued, stem};
use abi_runtime::{event_topic, selector};
use abi_types::{Abi, Argument, TupleField, TypeDescriptor};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

pub struct PlanBuilder<'o> {
    options: &'o GeneratorOptions,
    arena: TypeArena,
    taken: HashSet<String>,
}

impl<'o> PlanBuilder<'o> {
    pub fn new(options: &'o GeneratorOptions) -> CodegenResult<Self> {
        Ok(Self {
            options,
            arena: TypeArena::new(options)?,
            taken: HashSet::new(),
        })
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn build(mut self, abi: &Abi, source: &str) -> CodegenResult<EmissionPlan> {
        check_layouts(abi)?;
        self.collect(abi);
        self.arena.assign_names();
        self.taken = self.arena.claimed_names();

        let mut types = Vec::with_capacity(self.arena.len());
        for (_, entry) in self.arena.entries() {
            types.push(self.type_plan(&entry.name, &entry.hash, &entry.canonical, &entry.kind)?);
        }
        types.sort_by(|a, b| a.name.cmp(&b.name));

        let constructor = match &abi.constructor {
            Some(ctor) => Some(ConstructorPlan {
                mutability: ctor.state_mutability.as_str().to_string(),
                inputs: self
                    .struct_plan("ConstructorArgs", &ctor.inputs)
                    .map_err(|e| e.in_declaration("constructor"))?,
            }),
            None => None,
        };

        let functions = if self.options.emit_functions {
            self.function_plans(abi)?
        } else {
            Vec::new()
        };
        let events = if self.options.emit_events {
            self.event_plans(abi)?
        } else {
            Vec::new()
        };
        let errors = if self.options.emit_errors {
            self.error_plans(abi)?
        } else {
            Vec::new()
        };

        info!(
            source,
            types = types.len(),
            functions = functions.len(),
            events = events.len(),
            errors = errors.len(),
            "built emission plan"
        );
        Ok(EmissionPlan {
            version: PLAN_VERSION,
            source: source.to_string(),
            runtime_crate: self.options.runtime_crate.clone(),
            lazy_views: self.options.lazy_views,
            packed: self.options.packed,
            types,
            constructor,
            functions,
            events,
            errors,
        })
    }

    /* Every composite reachable from an emitted declaration. Hashed indexed
     * event arguments only surface as their 32-byte hash. */
    fn collect(&mut self, abi: &Abi) {
        if let Some(ctor) = &abi.constructor {
            self.intern_all(&ctor.inputs);
        }
        if self.options.emit_functions {
            for func in &abi.functions {
                self.intern_all(&func.inputs);
                self.intern_all(&func.outputs);
            }
        }
        if self.options.emit_events {
            for event in &abi.events {
                for arg in event.inputs.iter().filter(|arg| !(arg.indexed && is_hashed(&arg.ty))) {
                    self.arena.intern(&arg.ty);
                }
            }
        }
        if self.options.emit_errors {
            for error in &abi.errors {
                self.intern_all(&error.inputs);
            }
        }
    }

    fn intern_all(&mut self, args: &[Argument]) {
        for arg in args {
            self.arena.intern(&arg.ty);
        }
    }

    fn type_plan(&self, name: &str, hash: &str, canonical: &str, kind: &EntryKind) -> CodegenResult<TypePlan> {
        let (body, ty) = match kind {
            EntryKind::Tuple { fields, struct_name } => {
                let ty = TypeDescriptor::Tuple(abi_types::TupleType {
                    struct_name: struct_name.clone(),
                    fields: fields.clone(),
                });
                let plan = self.frame(name, fields.iter().map(|f| (f.name.as_str(), &f.ty)))?;
                (TypeBody::Struct(plan), ty)
            }
            EntryKind::Array { element, len } => (
                TypeBody::Array {
                    element: self.type_ref(element)?,
                    len: *len,
                },
                TypeDescriptor::array(element.clone(), *len),
            ),
            EntryKind::Slice { element } => (
                TypeBody::Slice {
                    element: self.type_ref(element)?,
                },
                TypeDescriptor::slice(element.clone()),
            ),
        };
        Ok(TypePlan {
            name: name.to_string(),
            hash: hash.to_string(),
            canonical: canonical.to_string(),
            dynamic: ty.is_dynamic(),
            head_size: ty.static_size(),
            packed_size: ty.packed_size().ok(),
            body,
        })
    }

    /// Resolves how one use of `ty` is encoded.
    pub fn type_ref(&self, ty: &TypeDescriptor) -> CodegenResult<TypeRef> {
        let canonical = ty.canonical_string();
        let routed = self.options.stdlib && is_catalogued(&canonical);
        let shape = match ty {
            TypeDescriptor::Bool => Shape::Bool,
            TypeDescriptor::Address => Shape::Address,
            TypeDescriptor::Uint(bits) => Shape::Uint { bits: *bits },
            TypeDescriptor::Int(bits) => Shape::Int { bits: *bits },
            TypeDescriptor::FixedBytes(len) => Shape::FixedBytes { len: *len },
            TypeDescriptor::Bytes => Shape::Bytes,
            TypeDescriptor::String => Shape::String,
            TypeDescriptor::Tuple(_) => match self.arena.binding(ty)? {
                Binding::External(name) => Shape::Tuple {
                    name: name.to_string(),
                    external: true,
                },
                _ => Shape::Tuple {
                    name: self.arena.name_of(ty)?,
                    external: false,
                },
            },
            TypeDescriptor::Array(element, len) => Shape::Array {
                stem: self.arena.name_of(ty)?,
                element: Box::new(self.type_ref(element)?),
                len: *len,
            },
            TypeDescriptor::Slice(element) => Shape::Slice {
                stem: self.arena.name_of(ty)?,
                element: Box::new(self.type_ref(element)?),
            },
        };
        Ok(TypeRef {
            dynamic: ty.is_dynamic(),
            head_size: ty.static_size(),
            packed_size: ty.packed_size().ok(),
            stdlib: routed.then(|| stem(&canonical)),
            canonical,
            shape,
        })
    }

    /* Field layout of one frame: snake-case identifiers (positional names
     * for empty ones, deduplicated), head offsets and dynamic indices. */
    fn frame<'t>(
        &self,
        name: &str,
        members: impl Iterator<Item = (&'t str, &'t TypeDescriptor)>,
    ) -> CodegenResult<StructPlan> {
        let mut idents = HashSet::new();
        let mut fields = Vec::new();
        let mut head_offset = 0;
        let mut dynamic_count = 0;
        for (idx, (abi_name, ty)) in members.enumerate() {
            let ty = self.type_ref(ty)?;
            let dynamic_index = ty.dynamic.then(|| {
                dynamic_count += 1;
                dynamic_count - 1
            });
            let size = ty.head_size;
            fields.push(FieldPlan {
                ident: field_ident(&mut idents, abi_name, idx),
                abi_name: abi_name.to_string(),
                ty,
                head_offset,
                dynamic_index,
            });
            head_offset += size;
        }
        let packed_size = fields
            .iter()
            .map(|field| field.ty.packed_size)
            .sum::<Option<usize>>();
        Ok(StructPlan {
            name: name.to_string(),
            dynamic: dynamic_count > 0,
            head_size: head_offset,
            packed_size,
            fields,
        })
    }

    fn struct_plan(&mut self, base: &str, args: &[Argument]) -> CodegenResult<StructPlan> {
        let name = self.claim(base);
        self.frame(&name, args.iter().map(|arg| (arg.name.as_str(), &arg.ty)))
    }

    fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut counter = 2;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{base}{counter}");
            counter += 1;
        }
        candidate
    }

    fn function_plans(&mut self, abi: &Abi) -> CodegenResult<Vec<FunctionPlan>> {
        let idents = overload_idents(abi.functions.iter().map(|f| (f.name.as_str(), f.signature())), 4);
        let mut plans = Vec::with_capacity(abi.functions.len());
        for (func, ident) in abi.functions.iter().zip(idents) {
            let signature = func.signature();
            let lowered = self.function_plan(func, ident, &signature);
            plans.push(lowered.map_err(|e| e.in_declaration(format!("function {signature}")))?);
        }
        Ok(plans)
    }

    fn function_plan(
        &mut self,
        func: &abi_types::FunctionDecl,
        ident: String,
        signature: &str,
    ) -> CodegenResult<FunctionPlan> {
        if self.options.packed {
            for arg in &func.inputs {
                if arg.ty.packed_size().is_err() {
                    return Err(CodegenError::UnsupportedPackedType {
                        ty: arg.ty.canonical_string(),
                    });
                }
            }
        }
        let camel = camel_case(&ident);
        let inputs = self.struct_plan(&format!("{camel}Call"), &func.inputs)?;
        let outputs = self.struct_plan(&format!("{camel}Returns"), &func.outputs)?;
        debug!(%signature, %ident, "lowered function");
        Ok(FunctionPlan {
            name: func.name.clone(),
            ident,
            signature: signature.to_string(),
            selector: hex::encode(selector(signature)),
            mutability: func.state_mutability.as_str().to_string(),
            inputs,
            outputs,
            packed: self.options.packed,
        })
    }

    fn event_plans(&mut self, abi: &Abi) -> CodegenResult<Vec<EventPlan>> {
        let idents = overload_idents(abi.events.iter().map(|e| (e.name.as_str(), e.signature())), 4);
        let mut plans = Vec::with_capacity(abi.events.len());
        for (event, ident) in abi.events.iter().zip(idents) {
            let signature = event.signature();
            let lowered = self.event_plan(event, ident, &signature);
            plans.push(lowered.map_err(|e| e.in_declaration(format!("event {signature}")))?);
        }
        Ok(plans)
    }

    fn event_plan(
        &mut self,
        event: &abi_types::EventDecl,
        ident: String,
        signature: &str,
    ) -> CodegenResult<EventPlan> {
        let struct_name = self.claim(&format!("{}Event", camel_case(&ident)));
        let mut idents = HashSet::new();
        let mut fields = Vec::with_capacity(event.inputs.len());
        for (idx, arg) in event.inputs.iter().enumerate() {
            let hashed = arg.indexed && is_hashed(&arg.ty);
            let ty = if hashed {
                self.type_ref(&TypeDescriptor::FixedBytes(32))?
            } else {
                self.type_ref(&arg.ty)?
            };
            fields.push(EventFieldPlan {
                ident: field_ident(&mut idents, &arg.name, idx),
                abi_name: arg.name.clone(),
                ty,
                indexed: arg.indexed,
                hashed,
                declared: arg.ty.canonical_string(),
            });
        }

        /* the data frame reuses the struct's identifiers */
        let data_tuple = event.data_tuple();
        let mut data = self.frame(
            &struct_name,
            data_tuple.fields.iter().map(|f: &TupleField| (f.name.as_str(), &f.ty)),
        )?;
        for (field, ident) in data
            .fields
            .iter_mut()
            .zip(fields.iter().filter(|f| !f.indexed).map(|f| f.ident.clone()))
        {
            field.ident = ident;
        }

        Ok(EventPlan {
            name: event.name.clone(),
            ident,
            struct_name,
            signature: signature.to_string(),
            topic: hex::encode(event_topic(signature)),
            anonymous: event.anonymous,
            fields,
            data,
        })
    }

    fn error_plans(&mut self, abi: &Abi) -> CodegenResult<Vec<ErrorPlan>> {
        let idents = overload_idents(abi.errors.iter().map(|e| (e.name.as_str(), e.signature())), 4);
        let mut plans = Vec::with_capacity(abi.errors.len());
        for (error, ident) in abi.errors.iter().zip(idents) {
            let signature = error.signature();
            let inputs = self
                .struct_plan(&format!("{}Error", camel_case(&ident)), &error.inputs)
                .map_err(|e| e.in_declaration(format!("error {signature}")))?;
            plans.push(ErrorPlan {
                name: error.name.clone(),
                ident,
                selector: hex::encode(selector(&signature)),
                signature,
                inputs,
            });
        }
        Ok(plans)
    }
}

/// Indexed arguments that do not fit a single word are logged as a hash.
pub fn is_hashed(ty: &TypeDescriptor) -> bool {
    !ty.is_scalar()
}

/* Snake-case identifiers; names shared by several declarations get the
 * first `bytes` of their signature hash appended. */
/* Front-ends reject oversized arrays; an Abi built by hand may still carry them */
fn check_layouts(abi: &Abi) -> CodegenResult<()> {
    let mut declarations: Vec<(String, &[Argument])> = Vec::new();
    if let Some(ctor) = &abi.constructor {
        declarations.push(("constructor".to_string(), &ctor.inputs));
    }
    for func in &abi.functions {
        let decl = format!("function {}", func.signature());
        declarations.push((decl.clone(), &func.inputs));
        declarations.push((decl, &func.outputs));
    }
    for event in &abi.events {
        declarations.push((format!("event {}", event.signature()), &event.inputs));
    }
    for error in &abi.errors {
        declarations.push((format!("error {}", error.signature()), &error.inputs));
    }
    for (decl, args) in declarations {
        for arg in args {
            arg.ty
                .check_layout()
                .map_err(|e| CodegenError::from(e).in_declaration(decl.clone()))?;
        }
    }
    Ok(())
}

fn overload_idents<'a>(decls: impl Iterator<Item = (&'a str, String)>, bytes: usize) -> Vec<String> {
    let decls: Vec<(String, String)> = decls
        .map(|(name, signature)| (snake_case(name), signature))
        .collect();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (ident, _) in &decls {
        *counts.entry(ident.as_str()).or_default() += 1;
    }
    decls
        .iter()
        .map(|(ident, signature)| {
            if counts.get(ident.as_str()).copied().unwrap_or_default() > 1 {
                format!("{ident}_{}", hex::encode(&selector_bytes(signature)[..bytes]))
            } else {
                ident.clone()
            }
        })
        .collect()
}

fn selector_bytes(signature: &str) -> [u8; 32] {
    abi_runtime::keccak256(signature.as_bytes())
}

fn field_ident(taken: &mut HashSet<String>, abi_name: &str, idx: usize) -> String {
    let base = match snake_case(abi_name).trim_end_matches('_') {
        "" => format!("field_{idx}"),
        snake if snake.starts_with(|c: char| c.is_ascii_digit()) => format!("field_{snake}"),
        snake => snake.to_string(),
    };
    if taken.insert(base.clone()) {
        return base;
    }
    let numbered = format!("{base}_{idx}");
    taken.insert(numbered.clone());
    numbered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(source: &str, options: &GeneratorOptions) -> CodegenResult<EmissionPlan> {
        let abi = abi_loader::parse_dsl(source).unwrap();
        PlanBuilder::new(options)?.build(&abi, "test")
    }

    #[test]
    fn head_offsets_and_dynamic_indices() {
        let plan = plan(
            "function post(uint64 id, string memo, uint256[2] pair, bytes blob)",
            &GeneratorOptions::default(),
        )
        .unwrap();
        let call = &plan.functions[0].inputs;
        assert_eq!(call.name, "PostCall");
        assert_eq!(call.head_size, 32 * 5);
        let offsets: Vec<_> = call.fields.iter().map(|f| f.head_offset).collect();
        assert_eq!(offsets, vec![0, 32, 64, 128]);
        let dynamic: Vec<_> = call.fields.iter().map(|f| f.dynamic_index).collect();
        assert_eq!(dynamic, vec![None, Some(0), None, Some(1)]);
        assert_eq!(plan.functions[0].selector.len(), 8);
    }

    #[test]
    fn oversized_layout_is_an_error() {
        let mut abi = Abi::default();
        abi.functions.push(abi_types::FunctionDecl {
            name: "f".into(),
            inputs: vec![Argument::new(
                "x",
                TypeDescriptor::array(TypeDescriptor::Uint(256), 1 << 59),
            )],
            outputs: vec![],
            state_mutability: abi_types::StateMutability::Nonpayable,
        });
        let err = PlanBuilder::new(&GeneratorOptions::default())
            .unwrap()
            .build(&abi, "test")
            .unwrap_err();
        let CodegenError::Declaration { decl, source } = err else {
            panic!("expected a declaration error");
        };
        assert!(decl.starts_with("function f(uint256["));
        assert!(matches!(*source, CodegenError::Layout(_)));
    }

    #[test]
    fn overloads_get_selector_suffixes() {
        let plan = plan(
            "function mint(address to)\nfunction mint(address to, uint256 amount)\nfunction burn(uint256 amount)",
            &GeneratorOptions::default(),
        )
        .unwrap();
        let idents: Vec<_> = plan.functions.iter().map(|f| f.ident.as_str()).collect();
        assert!(idents[0].starts_with("mint_"));
        assert!(idents[1].starts_with("mint_"));
        assert_ne!(idents[0], idents[1]);
        assert_eq!(idents[2], "burn");
        assert_ne!(plan.functions[0].inputs.name, plan.functions[1].inputs.name);
    }

    #[test]
    fn types_are_sorted_by_name() {
        let plan = plan(
            "struct Zeta { uint256 a; }\nstruct Alpha { bool b; string s; }\nfunction f(Zeta z, Alpha[] list, uint24[] small)",
            &GeneratorOptions::default(),
        )
        .unwrap();
        let names: Vec<_> = plan.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta", "alpha_slice", "uint24_slice"]);
    }

    #[test]
    fn packed_rejects_dynamic_inputs() {
        let options = GeneratorOptions {
            packed: true,
            ..GeneratorOptions::default()
        };
        let err = plan("function f(uint8 a, string b)", &options).unwrap_err();
        match err {
            CodegenError::Declaration { decl, source } => {
                assert_eq!(decl, "function f(uint8,string)");
                assert!(matches!(*source, CodegenError::UnsupportedPackedType { ref ty } if ty == "string"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(plan("function f(uint8 a, bytes4 b)", &options).is_ok());
    }

    #[test]
    fn hashed_event_arguments_become_bytes32() {
        let plan = plan(
            "event Noted(string indexed note, address indexed who, uint256[] values)",
            &GeneratorOptions::default(),
        )
        .unwrap();
        let event = &plan.events[0];
        assert_eq!(event.topic_count(), 3);
        assert!(event.fields[0].hashed);
        assert_eq!(event.fields[0].ty.canonical, "bytes32");
        assert!(!event.fields[1].hashed);
        assert_eq!(event.data.fields.len(), 1);
        assert_eq!(event.data.fields[0].ident, "values");
        assert_eq!(plan.types.len(), 1);
    }

    #[test]
    fn stdlib_routes_catalogued_types() {
        let options = GeneratorOptions {
            stdlib: true,
            ..GeneratorOptions::default()
        };
        let plan = plan("function f(uint256[] a, uint24[] b, string c)", &options).unwrap();
        let fields = &plan.functions[0].inputs.fields;
        assert_eq!(fields[0].ty.stdlib.as_deref(), Some("uint256_slice"));
        assert_eq!(fields[1].ty.stdlib, None);
        assert_eq!(fields[2].ty.stdlib.as_deref(), Some("string"));
        assert_eq!(plan.types.len(), 1);
    }

    #[test]
    fn positional_and_duplicate_identifiers() {
        let mut taken = HashSet::new();
        assert_eq!(field_ident(&mut taken, "", 0), "field_0");
        assert_eq!(field_ident(&mut taken, "amountIn", 1), "amount_in");
        assert_eq!(field_ident(&mut taken, "amount_in", 2), "amount_in_2");
        assert_eq!(field_ident(&mut taken, "_owner", 3), "_owner");
    }
}
