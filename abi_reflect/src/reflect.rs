/* Selector-driven reflection over a parsed contract interface */

use crate::decoder::decode_tuple;
use crate::encoder::encode_tuple;
use crate::errors::{ReflectError, ReflectResult};
use crate::event::{decode_log, encode_log, Log};
use crate::value::{tuple_to_json, Value};
use abi_runtime::{event_topic, selector, B256};
use abi_types::{arguments_tuple, Abi, Argument, EventDecl, FunctionDecl, TypeDescriptor};
use serde::Serialize;
use serde_json::Value as Json;
use tracing::debug;

/* Revert reasons every contract can produce without declaring them */
const ERROR_STRING: &str = "Error(string)";
const PANIC_UINT: &str = "Panic(uint256)";

/// A decoded call or revert payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedCall {
    pub name: String,
    pub signature: String,
    pub selector: String,
    pub args: Json,
    #[serde(skip)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedLog {
    pub name: String,
    pub signature: String,
    pub anonymous: bool,
    pub args: Json,
    #[serde(skip)]
    pub values: Vec<Value>,
}

/// Encodes and decodes calls, returns, reverts and logs for one contract.
#[derive(Debug, Clone)]
pub struct Reflector {
    abi: Abi,
    /* (selector, index into abi.functions) */
    function_selectors: Vec<([u8; 4], usize)>,
    error_selectors: Vec<([u8; 4], usize)>,
    event_topics: Vec<([u8; 32], usize)>,
}

impl Reflector {
    pub fn new(abi: Abi) -> Self {
        let function_selectors = abi
            .functions
            .iter()
            .enumerate()
            .map(|(idx, func)| (selector(&func.signature()), idx))
            .collect();
        let error_selectors = abi
            .errors
            .iter()
            .enumerate()
            .map(|(idx, error)| (selector(&error.signature()), idx))
            .collect();
        let event_topics = abi
            .events
            .iter()
            .enumerate()
            .filter(|(_, event)| !event.anonymous)
            .map(|(idx, event)| (event_topic(&event.signature()), idx))
            .collect();
        Self {
            abi,
            function_selectors,
            error_selectors,
            event_topics,
        }
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    pub fn function(&self, name_or_signature: &str) -> ReflectResult<&FunctionDecl> {
        self.abi
            .function(name_or_signature)
            .ok_or_else(|| ReflectError::UnknownFunction(name_or_signature.to_string()))
    }

    /// Selector followed by the encoded argument tuple.
    pub fn encode_call(&self, name_or_signature: &str, args: &[Value]) -> ReflectResult<Vec<u8>> {
        let func = self.function(name_or_signature)?;
        let signature = func.signature();
        let mut out = selector(&signature).to_vec();
        out.extend(encode_tuple(&arguments_tuple(&func.inputs), args)?);
        debug!(%signature, len = out.len(), "encoded call");
        Ok(out)
    }

    /// Like `encode_call`, with arguments given as a JSON array in
    /// declaration order or an object keyed by argument name.
    pub fn encode_call_json(&self, name_or_signature: &str, args: &Json) -> ReflectResult<Vec<u8>> {
        let func = self.function(name_or_signature)?;
        let values = values_from_json(&func.inputs, args)?;
        self.encode_call(&func.signature(), &values)
    }

    /// Encoded constructor arguments, to be appended to the init code.
    pub fn encode_constructor(&self, args: &[Value]) -> ReflectResult<Vec<u8>> {
        let inputs = self
            .abi
            .constructor
            .as_ref()
            .map(|ctor| ctor.inputs.as_slice())
            .unwrap_or_default();
        encode_tuple(&arguments_tuple(inputs), args)
    }

    pub fn decode_call(&self, data: &[u8]) -> ReflectResult<DecodedCall> {
        let (sel, body) = split_selector(data)?;
        let idx = lookup(&self.function_selectors, &sel).ok_or(ReflectError::UnknownSelector(sel))?;
        let func = &self.abi.functions[idx];
        debug!(signature = %func.signature(), "decoding call");
        decoded_call(&func.name, &func.inputs, sel, body)
    }

    pub fn decode_returns(&self, name_or_signature: &str, data: &[u8]) -> ReflectResult<Vec<Value>> {
        let func = self.function(name_or_signature)?;
        let (values, _) = decode_tuple(&arguments_tuple(&func.outputs), data)?;
        Ok(values)
    }

    pub fn returns_to_json(&self, name_or_signature: &str, values: &[Value]) -> ReflectResult<Json> {
        let func = self.function(name_or_signature)?;
        Ok(tuple_to_json(&arguments_tuple(&func.outputs), values))
    }

    /// Decodes revert data against the declared errors, falling back to the
    /// builtin `Error(string)` and `Panic(uint256)` payloads.
    pub fn decode_error(&self, data: &[u8]) -> ReflectResult<DecodedCall> {
        let (sel, body) = split_selector(data)?;
        if let Some(idx) = lookup(&self.error_selectors, &sel) {
            let error = &self.abi.errors[idx];
            return decoded_call(&error.name, &error.inputs, sel, body);
        }
        if sel == selector(ERROR_STRING) {
            return decoded_call("Error", &[Argument::new("message", TypeDescriptor::String)], sel, body);
        }
        if sel == selector(PANIC_UINT) {
            return decoded_call("Panic", &[Argument::new("code", TypeDescriptor::Uint(256))], sel, body);
        }
        Err(ReflectError::UnknownSelector(sel))
    }

    pub fn encode_log(&self, event_name: &str, values: &[Value]) -> ReflectResult<Log> {
        encode_log(self.event(event_name)?, values)
    }

    /// Matches topic0 against the declared events. Logs without a known
    /// topic0 are tried against anonymous events in declaration order.
    pub fn decode_log(&self, topics: &[B256], data: &[u8]) -> ReflectResult<DecodedLog> {
        if let Some(topic0) = topics.first() {
            if let Some(idx) = lookup(&self.event_topics, &topic0.0) {
                return decoded_log(&self.abi.events[idx], topics, data);
            }
        }
        for event in self.abi.events.iter().filter(|event| event.anonymous) {
            if let Ok(log) = decoded_log(event, topics, data) {
                return Ok(log);
            }
        }
        Err(ReflectError::UnknownEvent(
            topics.first().map(|topic| topic.0).unwrap_or_default(),
        ))
    }

    fn event(&self, name: &str) -> ReflectResult<&EventDecl> {
        self.abi
            .event(name)
            .ok_or_else(|| ReflectError::UnknownFunction(name.to_string()))
    }
}

/// Converts JSON arguments for `inputs` into values.
pub fn values_from_json(inputs: &[Argument], args: &Json) -> ReflectResult<Vec<Value>> {
    match Value::tuple_from_json(&arguments_tuple(inputs), args)? {
        Value::Tuple(values) => Ok(values),
        other => Ok(vec![other]),
    }
}

fn split_selector(data: &[u8]) -> ReflectResult<([u8; 4], &[u8])> {
    if data.len() < 4 {
        return Err(ReflectError::MissingSelector(data.len()));
    }
    let (head, body) = data.split_at(4);
    let mut sel = [0u8; 4];
    sel.copy_from_slice(head);
    Ok((sel, body))
}

fn lookup<K: PartialEq>(table: &[(K, usize)], key: &K) -> Option<usize> {
    table.iter().find(|(k, _)| k == key).map(|(_, idx)| *idx)
}

fn decoded_call(name: &str, inputs: &[Argument], sel: [u8; 4], body: &[u8]) -> ReflectResult<DecodedCall> {
    let tuple = arguments_tuple(inputs);
    let (values, _) = decode_tuple(&tuple, body)?;
    Ok(DecodedCall {
        name: name.to_string(),
        signature: abi_types::canonical_signature(name, inputs),
        selector: format!("0x{}", hex::encode(sel)),
        args: tuple_to_json(&tuple, &values),
        values,
    })
}

fn decoded_log(event: &EventDecl, topics: &[B256], data: &[u8]) -> ReflectResult<DecodedLog> {
    let values = decode_log(event, topics, data)?;
    let tuple = arguments_tuple(&event.inputs);
    Ok(DecodedLog {
        name: event.name.clone(),
        signature: event.signature(),
        anonymous: event.anonymous,
        args: tuple_to_json(&tuple, &values),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_runtime::Address;
    use abi_types::StateMutability;
    use serde_json::json;

    fn token() -> Reflector {
        let mut abi = Abi::default();
        abi.functions.push(FunctionDecl {
            name: "transfer".into(),
            inputs: vec![
                Argument::new("to", TypeDescriptor::Address),
                Argument::new("amount", TypeDescriptor::Uint(256)),
            ],
            outputs: vec![Argument::new("", TypeDescriptor::Bool)],
            state_mutability: StateMutability::Nonpayable,
        });
        abi.errors.push(abi_types::ErrorDecl {
            name: "InsufficientBalance".into(),
            inputs: vec![
                Argument::new("available", TypeDescriptor::Uint(256)),
                Argument::new("required", TypeDescriptor::Uint(256)),
            ],
        });
        Reflector::new(abi)
    }

    #[test]
    fn transfer_call_layout() {
        let reflector = token();
        let mut to = [0u8; 20];
        to[19] = 1;
        let data = reflector
            .encode_call(
                "transfer",
                &[Value::Address(Address::from(to)), Value::uint(1000)],
            )
            .unwrap();
        assert_eq!(data.len(), 68);
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data[35], 1);
        assert_eq!(&data[66..], &[0x03, 0xe8]);

        let decoded = reflector.decode_call(&data).unwrap();
        assert_eq!(decoded.signature, "transfer(address,uint256)");
        assert_eq!(decoded.selector, "0xa9059cbb");
        assert_eq!(decoded.args["amount"], json!(1000));
    }

    #[test]
    fn json_arguments_match_values() {
        let reflector = token();
        let from_json = reflector
            .encode_call_json(
                "transfer",
                &json!({"to": "0x0000000000000000000000000000000000000001", "amount": "0x3e8"}),
            )
            .unwrap();
        let mut to = [0u8; 20];
        to[19] = 1;
        let direct = reflector
            .encode_call("transfer", &[Value::Address(Address::from(to)), Value::uint(1000)])
            .unwrap();
        assert_eq!(from_json, direct);
    }

    #[test]
    fn selector_errors() {
        let reflector = token();
        assert_eq!(
            reflector.decode_call(&[0xa9, 0x05]),
            Err(ReflectError::MissingSelector(2))
        );
        assert_eq!(
            reflector.decode_call(&[1, 2, 3, 4]),
            Err(ReflectError::UnknownSelector([1, 2, 3, 4]))
        );
    }

    #[test]
    fn revert_payloads() {
        let reflector = token();
        let mut data = selector("Error(string)").to_vec();
        data.extend(
            encode_tuple(
                &arguments_tuple(&[Argument::new("message", TypeDescriptor::String)]),
                &[Value::String("nope".into())],
            )
            .unwrap(),
        );
        let decoded = reflector.decode_error(&data).unwrap();
        assert_eq!(decoded.name, "Error");
        assert_eq!(decoded.values, vec![Value::String("nope".into())]);

        let mut data = selector("InsufficientBalance(uint256,uint256)").to_vec();
        data.extend([0u8; 64]);
        let decoded = reflector.decode_error(&data).unwrap();
        assert_eq!(decoded.name, "InsufficientBalance");
    }
}
