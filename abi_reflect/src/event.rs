/* Event logs: topics for indexed arguments, tuple-encoded data for the rest */

use crate::decoder::{decode, decode_tuple};
use crate::encoder::{encode_into, encode_tuple};
use crate::errors::{ReflectError, ReflectResult};
use crate::value::Value;
use abi_runtime::prelude::*;
use abi_runtime::event_topic;
use abi_types::{EventDecl, TypeDescriptor};

pub use abi_runtime::Log;

/// Builds the log for `values`, one per event input in declaration order.
pub fn encode_log(event: &EventDecl, values: &[Value]) -> ReflectResult<Log> {
    if values.len() != event.inputs.len() {
        return Err(ReflectError::ArgumentCount {
            expected: event.inputs.len(),
            actual: values.len(),
        });
    }

    let mut log = Log::default();
    if !event.anonymous {
        log.topics.push(B256::from(event_topic(&event.signature())));
    }
    let mut data_values = Vec::new();
    for (arg, value) in event.inputs.iter().zip(values) {
        if arg.indexed {
            log.topics.push(indexed_topic(&arg.ty, value)?);
        } else {
            data_values.push(value.clone());
        }
    }
    log.data = encode_tuple(&event.data_tuple(), &data_values)?;
    Ok(log)
}

/// Recovers input values in declaration order. Indexed arguments whose
/// type is hashed into the topic come back as the 32-byte hash.
pub fn decode_log(event: &EventDecl, topics: &[B256], data: &[u8]) -> ReflectResult<Vec<Value>> {
    let skip = usize::from(!event.anonymous);
    let expected = skip + event.indexed_inputs().count();
    if topics.len() != expected {
        return Err(ReflectError::TopicCount {
            event: event.name.clone(),
            expected,
            actual: topics.len(),
        });
    }
    if !event.anonymous {
        let topic0 = event_topic(&event.signature());
        if topics[0].0 != topic0 {
            return Err(ReflectError::UnknownEvent(topics[0].0));
        }
    }

    let (mut data_values, _) = decode_tuple(&event.data_tuple(), data)?;
    data_values.reverse();
    let mut indexed = topics[skip..].iter();
    let mut out = Vec::with_capacity(event.inputs.len());
    for arg in &event.inputs {
        if arg.indexed {
            let topic = indexed.next().ok_or(ReflectError::TopicCount {
                event: event.name.clone(),
                expected,
                actual: topics.len(),
            })?;
            if is_hashed(&arg.ty) {
                out.push(Value::FixedBytes(topic.to_vec()));
            } else {
                out.push(decode(&arg.ty, topic.as_slice())?.0);
            }
        } else if let Some(value) = data_values.pop() {
            out.push(value);
        }
    }
    Ok(out)
}

/// Indexed arguments of dynamic or composite type are stored as the hash
/// of their in-place encoding instead of the value itself.
pub fn is_hashed(ty: &TypeDescriptor) -> bool {
    !ty.is_scalar()
}

fn indexed_topic(ty: &TypeDescriptor, value: &Value) -> ReflectResult<B256> {
    match (ty, value) {
        (TypeDescriptor::Bytes, Value::Bytes(bytes)) => Ok(B256::from(keccak256(bytes))),
        (TypeDescriptor::Bytes | TypeDescriptor::String, Value::String(text)) => {
            Ok(B256::from(keccak256(text.as_bytes())))
        }
        _ if is_hashed(ty) => {
            let mut preimage = Vec::new();
            in_place_encoding(ty, value, &mut preimage)?;
            Ok(B256::from(keccak256(&preimage)))
        }
        _ => {
            let mut word = [0u8; WORD];
            encode_into(ty, value, &mut word)?;
            Ok(B256::from(word))
        }
    }
}

/* Members concatenated without offsets or length words, each padded to a
 * whole number of words (bytes and strings included). */
fn in_place_encoding(ty: &TypeDescriptor, value: &Value, out: &mut Vec<u8>) -> ReflectResult<()> {
    match (ty, value) {
        (TypeDescriptor::Bytes | TypeDescriptor::String, Value::Bytes(bytes)) => {
            pad_into(out, bytes)
        }
        (TypeDescriptor::Bytes | TypeDescriptor::String, Value::String(text)) => {
            pad_into(out, text.as_bytes())
        }
        (TypeDescriptor::Array(element, _) | TypeDescriptor::Slice(element), Value::Array(items)) => {
            if let TypeDescriptor::Array(_, len) = ty {
                if items.len() != *len {
                    return Err(EncodeError::ArrayLengthMismatch {
                        expected: *len,
                        actual: items.len(),
                    }
                    .into());
                }
            }
            for item in items {
                in_place_encoding(element, item, out)?;
            }
        }
        (TypeDescriptor::Tuple(tuple), Value::Tuple(items)) => {
            if tuple.fields.len() != items.len() {
                return Err(ReflectError::ArgumentCount {
                    expected: tuple.fields.len(),
                    actual: items.len(),
                });
            }
            for (field, item) in tuple.fields.iter().zip(items) {
                in_place_encoding(&field.ty, item, out)?;
            }
        }
        _ => {
            let mut word = [0u8; WORD];
            encode_into(ty, value, &mut word)?;
            out.extend_from_slice(&word);
        }
    }
    Ok(())
}

fn pad_into(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
    out.resize(out.len() + pad32(bytes.len()) - bytes.len(), 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_types::Argument;

    fn transfer() -> EventDecl {
        EventDecl {
            name: "Transfer".into(),
            inputs: vec![
                Argument::indexed("from", TypeDescriptor::Address),
                Argument::indexed("to", TypeDescriptor::Address),
                Argument::new("value", TypeDescriptor::Uint(256)),
            ],
            anonymous: false,
        }
    }

    #[test]
    fn transfer_log_roundtrip() {
        let event = transfer();
        let values = vec![
            Value::Address(Address::repeat_byte(1)),
            Value::Address(Address::repeat_byte(2)),
            Value::uint(1000),
        ];
        let log = encode_log(&event, &values).unwrap();
        assert_eq!(log.topics.len(), 3);
        assert_eq!(
            hex::encode(log.topics[0]),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(&log.topics[1][12..], Address::repeat_byte(1).as_slice());
        assert_eq!(log.data.len(), 32);
        assert_eq!(decode_log(&event, &log.topics, &log.data).unwrap(), values);
    }

    #[test]
    fn dynamic_indexed_arguments_are_hashed() {
        let event = EventDecl {
            name: "Noted".into(),
            inputs: vec![
                Argument::indexed("note", TypeDescriptor::String),
                Argument::indexed("ids", TypeDescriptor::slice(TypeDescriptor::Uint(256))),
                Argument::new("extra", TypeDescriptor::Bytes),
            ],
            anonymous: true,
        };
        let values = vec![
            Value::String("hello".into()),
            Value::Array(vec![Value::uint(1), Value::uint(2)]),
            Value::Bytes(vec![9]),
        ];
        let log = encode_log(&event, &values).unwrap();
        assert_eq!(log.topics.len(), 2);
        assert_eq!(log.topics[0].0, keccak256(b"hello"));

        let mut preimage = [0u8; 64];
        preimage[31] = 1;
        preimage[63] = 2;
        assert_eq!(log.topics[1].0, keccak256(preimage));

        let decoded = decode_log(&event, &log.topics, &log.data).unwrap();
        assert_eq!(decoded[0], Value::FixedBytes(keccak256(b"hello").to_vec()));
        assert_eq!(decoded[2], Value::Bytes(vec![9]));
    }

    #[test]
    fn wrong_topic_count() {
        let event = transfer();
        let err = decode_log(&event, &[B256::ZERO], &[0u8; 32]).unwrap_err();
        assert!(matches!(err, ReflectError::TopicCount { expected: 3, actual: 1, .. }));
    }
}
