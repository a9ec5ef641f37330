/* Dynamically-typed ABI values and their JSON form */

use crate::errors::{ReflectError, ReflectResult};
use abi_runtime::{Address, EncodeError, I256, U256};
use abi_types::{TupleType, TypeDescriptor};
use serde_json::{Map, Number, Value as Json};

/* A value tree shaped like the TypeDescriptor it is encoded against */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Address(Address),
    Uint(U256),
    Int(I256),
    /* bytesN payload; its length must equal N */
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /* Fixed arrays and slices */
    Array(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn uint(value: u64) -> Self {
        Value::Uint(U256::from(value))
    }

    pub fn int(value: i64) -> Self {
        Value::Int(I256::try_from(value).unwrap_or(I256::ZERO))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Address(_) => "address",
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::FixedBytes(_) => "fixed bytes",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
        }
    }

    pub(crate) fn mismatch(&self, ty: &TypeDescriptor) -> EncodeError {
        EncodeError::ValueMismatch {
            ty: ty.canonical_string(),
            value: self.kind_name().to_string(),
        }
    }

    /// Reads a value of type `ty` from its JSON form.
    ///
    /// Integers accept JSON numbers or decimal / `0x` hex strings; bytes
    /// and fixed bytes are `0x` hex strings; tuples accept either an array
    /// in field order or an object keyed by field name.
    pub fn from_json(ty: &TypeDescriptor, json: &Json) -> ReflectResult<Value> {
        let invalid = |reason: &str| ReflectError::InvalidJson {
            ty: ty.canonical_string(),
            reason: reason.to_string(),
        };

        match ty {
            TypeDescriptor::Bool => json.as_bool().map(Value::Bool).ok_or_else(|| invalid("expected a boolean")),
            TypeDescriptor::Address => {
                let text = json.as_str().ok_or_else(|| invalid("expected a hex string"))?;
                text.parse::<Address>()
                    .map(Value::Address)
                    .map_err(|err| invalid(&err.to_string()))
            }
            TypeDescriptor::Uint(bits) => {
                if json_is_negative(json) {
                    return Err(EncodeError::NegativeValueForUnsigned { bits: *bits }.into());
                }
                let text = number_text(json).ok_or_else(|| invalid("expected an integer"))?;
                text.parse::<U256>()
                    .map(Value::Uint)
                    .map_err(|err| invalid(&err.to_string()))
            }
            TypeDescriptor::Int(_) => {
                let text = number_text(json).ok_or_else(|| invalid("expected an integer"))?;
                text.parse::<I256>()
                    .map(Value::Int)
                    .map_err(|err| invalid(&err.to_string()))
            }
            TypeDescriptor::FixedBytes(len) => {
                let bytes = hex_bytes(json).ok_or_else(|| invalid("expected a hex string"))?;
                if bytes.len() != *len as usize {
                    return Err(invalid(&format!("expected {len} bytes, got {}", bytes.len())));
                }
                Ok(Value::FixedBytes(bytes))
            }
            TypeDescriptor::Bytes => hex_bytes(json)
                .map(Value::Bytes)
                .ok_or_else(|| invalid("expected a hex string")),
            TypeDescriptor::String => json
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| invalid("expected a string")),
            TypeDescriptor::Array(element, len) => {
                let items = json.as_array().ok_or_else(|| invalid("expected an array"))?;
                if items.len() != *len {
                    return Err(EncodeError::ArrayLengthMismatch {
                        expected: *len,
                        actual: items.len(),
                    }
                    .into());
                }
                items
                    .iter()
                    .map(|item| Value::from_json(element, item))
                    .collect::<ReflectResult<Vec<_>>>()
                    .map(Value::Array)
            }
            TypeDescriptor::Slice(element) => {
                let items = json.as_array().ok_or_else(|| invalid("expected an array"))?;
                items
                    .iter()
                    .map(|item| Value::from_json(element, item))
                    .collect::<ReflectResult<Vec<_>>>()
                    .map(Value::Array)
            }
            TypeDescriptor::Tuple(tuple) => Value::tuple_from_json(tuple, json),
        }
    }

    pub fn tuple_from_json(tuple: &TupleType, json: &Json) -> ReflectResult<Value> {
        let invalid = |reason: String| ReflectError::InvalidJson {
            ty: TypeDescriptor::Tuple(tuple.clone()).canonical_string(),
            reason,
        };
        let fields = match json {
            Json::Array(items) => {
                if items.len() != tuple.fields.len() {
                    return Err(ReflectError::ArgumentCount {
                        expected: tuple.fields.len(),
                        actual: items.len(),
                    });
                }
                tuple
                    .fields
                    .iter()
                    .zip(items)
                    .map(|(field, item)| Value::from_json(&field.ty, item))
                    .collect::<ReflectResult<Vec<_>>>()?
            }
            Json::Object(map) => tuple
                .fields
                .iter()
                .map(|field| {
                    let item = map
                        .get(&field.name)
                        .ok_or_else(|| invalid(format!("missing field '{}'", field.name)))?;
                    Value::from_json(&field.ty, item)
                })
                .collect::<ReflectResult<Vec<_>>>()?,
            _ => return Err(invalid("expected an array or object".to_string())),
        };
        Ok(Value::Tuple(fields))
    }

    /// JSON form of a value. Integers that fit in 64 bits become JSON
    /// numbers, wider ones decimal strings. Tuples whose fields are all
    /// named become objects.
    pub fn to_json(&self, ty: &TypeDescriptor) -> Json {
        match (ty, self) {
            (_, Value::Bool(b)) => Json::Bool(*b),
            (_, Value::Address(address)) => Json::String(address.to_checksum(None)),
            (_, Value::Uint(value)) => match u64::try_from(*value) {
                Ok(small) => Json::Number(Number::from(small)),
                Err(_) => Json::String(value.to_string()),
            },
            (_, Value::Int(value)) => match i64::try_from(*value) {
                Ok(small) => Json::Number(Number::from(small)),
                Err(_) => Json::String(value.to_string()),
            },
            (_, Value::FixedBytes(bytes)) | (_, Value::Bytes(bytes)) => {
                Json::String(format!("0x{}", hex::encode(bytes)))
            }
            (_, Value::String(s)) => Json::String(s.clone()),
            (TypeDescriptor::Array(element, _), Value::Array(items))
            | (TypeDescriptor::Slice(element), Value::Array(items)) => {
                Json::Array(items.iter().map(|item| item.to_json(element)).collect())
            }
            (TypeDescriptor::Tuple(tuple), Value::Tuple(items)) => tuple_to_json(tuple, items),
            /* Shape mismatch: fall back to a positional rendering */
            (_, Value::Array(items)) | (_, Value::Tuple(items)) => Json::Array(
                items
                    .iter()
                    .map(|item| item.to_json(&TypeDescriptor::Bool))
                    .collect(),
            ),
        }
    }
}

pub(crate) fn tuple_to_json(tuple: &TupleType, items: &[Value]) -> Json {
    let all_named = !tuple.fields.is_empty() && tuple.fields.iter().all(|f| !f.name.is_empty());
    if all_named {
        let mut map = Map::new();
        for (field, item) in tuple.fields.iter().zip(items) {
            map.insert(field.name.clone(), item.to_json(&field.ty));
        }
        Json::Object(map)
    } else {
        Json::Array(
            tuple
                .fields
                .iter()
                .zip(items)
                .map(|(field, item)| item.to_json(&field.ty))
                .collect(),
        )
    }
}

fn json_is_negative(json: &Json) -> bool {
    match json {
        Json::Number(n) => n.as_i64().is_some_and(|v| v < 0) || n.as_f64().is_some_and(|v| v < 0.0),
        Json::String(s) => s.trim_start().starts_with('-'),
        _ => false,
    }
}

fn number_text(json: &Json) -> Option<String> {
    match json {
        Json::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        Json::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn hex_bytes(json: &Json) -> Option<Vec<u8>> {
    let text = json.as_str()?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_types::TupleField;
    use serde_json::json;

    #[test]
    fn integers_from_json() {
        let ty = TypeDescriptor::Uint(256);
        assert_eq!(Value::from_json(&ty, &json!(1000)).unwrap(), Value::uint(1000));
        assert_eq!(Value::from_json(&ty, &json!("0x3e8")).unwrap(), Value::uint(1000));
        assert_eq!(
            Value::from_json(&ty, &json!(-1)),
            Err(ReflectError::Encode(EncodeError::NegativeValueForUnsigned { bits: 256 }))
        );
        let ty = TypeDescriptor::Int(64);
        assert_eq!(Value::from_json(&ty, &json!(-7)).unwrap(), Value::int(-7));
        assert_eq!(Value::from_json(&ty, &json!("-7")).unwrap(), Value::int(-7));
    }

    #[test]
    fn tuples_from_arrays_and_objects() {
        let tuple = TupleType::new(vec![
            TupleField::new("to", TypeDescriptor::Address),
            TupleField::new("memo", TypeDescriptor::String),
        ]);
        let from_array = Value::tuple_from_json(
            &tuple,
            &json!(["0x0000000000000000000000000000000000000001", "hi"]),
        )
        .unwrap();
        let from_object = Value::tuple_from_json(
            &tuple,
            &json!({"memo": "hi", "to": "0x0000000000000000000000000000000000000001"}),
        )
        .unwrap();
        assert_eq!(from_array, from_object);

        let rendered = from_array.to_json(&TypeDescriptor::Tuple(tuple));
        assert_eq!(rendered["memo"], json!("hi"));
    }

    #[test]
    fn fixed_bytes_length_is_checked() {
        let ty = TypeDescriptor::FixedBytes(4);
        assert!(Value::from_json(&ty, &json!("0xa9059cbb")).is_ok());
        assert!(Value::from_json(&ty, &json!("0xa9059c")).is_err());
    }

    #[test]
    fn wide_integers_render_as_strings() {
        let value = Value::Uint(U256::MAX);
        assert_eq!(
            value.to_json(&TypeDescriptor::Uint(256)),
            json!(U256::MAX.to_string())
        );
        assert_eq!(Value::int(-3).to_json(&TypeDescriptor::Int(8)), json!(-3));
    }
}
