use crate::types::{TupleField, TupleType, TypeDescriptor};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Hash)]
#[serde(rename_all = "kebab-case")]
pub struct Argument {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Only meaningful for event inputs.
    #[serde(default)]
    pub indexed: bool,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: false,
        }
    }

    pub fn indexed(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    #[default]
    Nonpayable,
    Payable,
    View,
    Pure,
}

impl StateMutability {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateMutability::Nonpayable => "nonpayable",
            StateMutability::Payable => "payable",
            StateMutability::View => "view",
            StateMutability::Pure => "pure",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FunctionDecl {
    pub name: String,
    pub inputs: Vec<Argument>,
    pub outputs: Vec<Argument>,
    #[serde(default)]
    pub state_mutability: StateMutability,
}

impl FunctionDecl {
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EventDecl {
    pub name: String,
    pub inputs: Vec<Argument>,
    #[serde(default)]
    pub anonymous: bool,
}

impl EventDecl {
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    pub fn indexed_inputs(&self) -> impl Iterator<Item = &Argument> {
        self.inputs.iter().filter(|arg| arg.indexed)
    }

    /// Non-indexed inputs, in declaration order, as the tuple that forms the
    /// log data payload.
    pub fn data_tuple(&self) -> TupleType {
        TupleType::new(
            self.inputs
                .iter()
                .filter(|arg| !arg.indexed)
                .map(|arg| TupleField::new(arg.name.clone(), arg.ty.clone()))
                .collect(),
        )
    }
}

/// Solidity custom error (`error Name(...)`).
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ErrorDecl {
    pub name: String,
    pub inputs: Vec<Argument>,
}

impl ErrorDecl {
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ConstructorDecl {
    pub inputs: Vec<Argument>,
    #[serde(default)]
    pub state_mutability: StateMutability,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct FallbackDecl {
    #[serde(default)]
    pub state_mutability: StateMutability,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ReceiveDecl {
    #[serde(default)]
    pub state_mutability: StateMutability,
}

/// A parsed contract interface. Declarations keep their source order.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Abi {
    #[serde(default)]
    pub constructor: Option<ConstructorDecl>,
    #[serde(default)]
    pub fallback: Option<FallbackDecl>,
    #[serde(default)]
    pub receive: Option<ReceiveDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub events: Vec<EventDecl>,
    #[serde(default)]
    pub errors: Vec<ErrorDecl>,
}

impl Abi {
    /// All overloads sharing `name`, in declaration order.
    pub fn functions_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a FunctionDecl> + 'n
    where
        'a: 'n,
    {
        self.functions.iter().filter(move |func| func.name == name)
    }

    /// Looks a function up either by plain name (must not be overloaded) or
    /// by full canonical signature.
    pub fn function(&self, name_or_signature: &str) -> Option<&FunctionDecl> {
        if name_or_signature.contains('(') {
            return self
                .functions
                .iter()
                .find(|func| func.signature() == name_or_signature);
        }
        let mut matches = self
            .functions
            .iter()
            .filter(|func| func.name == name_or_signature);
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }

    pub fn event(&self, name: &str) -> Option<&EventDecl> {
        self.events.iter().find(|event| event.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.constructor.is_none()
            && self.fallback.is_none()
            && self.receive.is_none()
            && self.functions.is_empty()
            && self.events.is_empty()
            && self.errors.is_empty()
    }
}

/// `name(t1,t2,...)` using canonical type strings.
pub fn canonical_signature(name: &str, inputs: &[Argument]) -> String {
    let params: Vec<String> = inputs.iter().map(|arg| arg.ty.canonical_string()).collect();
    format!("{}({})", name, params.join(","))
}

/// Builds the positional tuple for an argument list, keeping argument names.
pub fn arguments_tuple(args: &[Argument]) -> TupleType {
    TupleType::new(
        args.iter()
            .map(|arg| TupleField::new(arg.name.clone(), arg.ty.clone()))
            .collect(),
    )
}
