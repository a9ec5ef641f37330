/* Head/tail encoder over dynamically-typed values
 *
 * A frame is a sequence of typed values (tuple fields, fixed array
 * elements, slice elements after the length word). Static members are
 * written in place; each dynamic member gets an offset word holding the
 * running dynamic offset, which starts at the frame's head size and grows
 * by the size of each tail payload in declaration order.
 */

use crate::errors::ReflectResult;
use crate::value::Value;
use abi_runtime::prelude::*;
use abi_types::{TupleType, TypeDescriptor};

/// Encoded size of `value` as a standalone encoding: the static footprint
/// for static types, the full tail payload for dynamic ones.
pub fn encoded_size(ty: &TypeDescriptor, value: &Value) -> Result<usize, EncodeError> {
    match (ty, value) {
        (TypeDescriptor::Bool, Value::Bool(_))
        | (TypeDescriptor::Address, Value::Address(_))
        | (TypeDescriptor::Uint(_), Value::Uint(_) | Value::Int(_))
        | (TypeDescriptor::Int(_), Value::Int(_) | Value::Uint(_))
        | (TypeDescriptor::FixedBytes(_), Value::FixedBytes(_)) => Ok(WORD),
        (TypeDescriptor::Bytes, Value::Bytes(bytes)) => Ok(bytes_encoded_size(bytes.len())),
        (TypeDescriptor::Bytes | TypeDescriptor::String, Value::String(s)) => {
            Ok(bytes_encoded_size(s.len()))
        }
        (TypeDescriptor::Array(element, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(EncodeError::ArrayLengthMismatch {
                    expected: *len,
                    actual: items.len(),
                });
            }
            frame_size(items.iter().map(|item| (element.as_ref(), item)))
        }
        (TypeDescriptor::Slice(element), Value::Array(items)) => {
            Ok(WORD + frame_size(items.iter().map(|item| (element.as_ref(), item)))?)
        }
        (TypeDescriptor::Tuple(tuple), Value::Tuple(items)) => {
            check_arity(tuple, items)?;
            frame_size(tuple.fields.iter().map(|f| &f.ty).zip(items))
        }
        _ => Err(value.mismatch(ty)),
    }
}

fn frame_size<'a>(
    members: impl Iterator<Item = (&'a TypeDescriptor, &'a Value)>,
) -> Result<usize, EncodeError> {
    let mut total = 0;
    for (ty, value) in members {
        let size = encoded_size(ty, value)?;
        total += if ty.is_dynamic() { WORD + size } else { size };
    }
    Ok(total)
}

fn check_arity(tuple: &TupleType, items: &[Value]) -> Result<(), EncodeError> {
    if tuple.fields.len() != items.len() {
        return Err(EncodeError::ArrayLengthMismatch {
            expected: tuple.fields.len(),
            actual: items.len(),
        });
    }
    Ok(())
}

pub fn encode(ty: &TypeDescriptor, value: &Value) -> ReflectResult<Vec<u8>> {
    let mut buf = vec![0u8; encoded_size(ty, value)?];
    write_value(ty, value, &mut buf)?;
    Ok(buf)
}

/// Encodes into `buf`, returning the number of bytes written.
pub fn encode_into(ty: &TypeDescriptor, value: &Value, buf: &mut [u8]) -> ReflectResult<usize> {
    ensure_capacity(buf, encoded_size(ty, value)?)?;
    Ok(write_value(ty, value, buf)?)
}

/// Encodes values as one frame, the layout of function arguments and of
/// event data.
pub fn encode_tuple(tuple: &TupleType, values: &[Value]) -> ReflectResult<Vec<u8>> {
    check_arity(tuple, values)?;
    let members = || tuple.fields.iter().map(|f| &f.ty).zip(values);
    let mut buf = vec![0u8; frame_size(members())?];
    write_frame(members(), &mut buf)?;
    Ok(buf)
}

/* Callers have already sized the buffer through encoded_size */
fn write_value(ty: &TypeDescriptor, value: &Value, buf: &mut [u8]) -> Result<usize, EncodeError> {
    match (ty, value) {
        (TypeDescriptor::Bool, Value::Bool(b)) => write_bool(buf, *b),
        (TypeDescriptor::Address, Value::Address(address)) => write_address(buf, address),
        (TypeDescriptor::Uint(bits), Value::Uint(v)) => write_u256(buf, v, *bits)?,
        (TypeDescriptor::Uint(bits), Value::Int(v)) => {
            if v.is_negative() {
                return Err(EncodeError::NegativeValueForUnsigned { bits: *bits });
            }
            write_u256(buf, &v.into_raw(), *bits)?
        }
        (TypeDescriptor::Int(bits), Value::Int(v)) => write_i256(buf, v, *bits)?,
        (TypeDescriptor::Int(bits), Value::Uint(v)) => {
            let signed = I256::from_raw(*v);
            if signed.is_negative() {
                return Err(EncodeError::IntegerTooLarge {
                    bits: *bits,
                    signed: true,
                });
            }
            write_i256(buf, &signed, *bits)?
        }
        (TypeDescriptor::FixedBytes(len), Value::FixedBytes(bytes)) => {
            if bytes.len() != *len as usize {
                return Err(value.mismatch(ty));
            }
            write_fixed_bytes(buf, bytes)
        }
        (TypeDescriptor::Bytes, Value::Bytes(bytes)) => return Ok(write_bytes(buf, bytes)),
        (TypeDescriptor::Bytes | TypeDescriptor::String, Value::String(s)) => {
            return Ok(write_bytes(buf, s.as_bytes()))
        }
        (TypeDescriptor::Array(element, _), Value::Array(items)) => {
            return write_frame(items.iter().map(|item| (element.as_ref(), item)), buf)
        }
        (TypeDescriptor::Slice(element), Value::Array(items)) => {
            write_usize(buf, items.len());
            let body = write_frame(
                items.iter().map(|item| (element.as_ref(), item)),
                &mut buf[WORD..],
            )?;
            return Ok(WORD + body);
        }
        (TypeDescriptor::Tuple(tuple), Value::Tuple(items)) => {
            return write_frame(tuple.fields.iter().map(|f| &f.ty).zip(items), buf)
        }
        _ => return Err(value.mismatch(ty)),
    }
    Ok(WORD)
}

fn write_frame<'a>(
    members: impl Iterator<Item = (&'a TypeDescriptor, &'a Value)> + Clone,
    buf: &mut [u8],
) -> Result<usize, EncodeError> {
    let head = members
        .clone()
        .fold(0usize, |total, (ty, _)| total.saturating_add(ty.static_size()));
    let mut at = 0;
    let mut dynamic = head;

    /* head pass */
    for (ty, value) in members.clone() {
        if ty.is_dynamic() {
            write_usize(&mut buf[at..], dynamic);
            dynamic += encoded_size(ty, value)?;
            at += WORD;
        } else {
            at += write_value(ty, value, &mut buf[at..])?;
        }
    }

    /* tail pass */
    let mut tail_at = head;
    for (ty, value) in members {
        if ty.is_dynamic() {
            tail_at += write_value(ty, value, &mut buf[tail_at..])?;
        }
    }
    debug_assert_eq!(tail_at, dynamic);
    Ok(tail_at)
}

/* ---------------------------------------------------------------------- */
/* Packed                                                                 */
/* ---------------------------------------------------------------------- */

/// Tight encoding without padding or offsets. Every value occupies exactly
/// its type's packed size; types without one are rejected up front.
pub fn encode_packed(ty: &TypeDescriptor, value: &Value) -> ReflectResult<Vec<u8>> {
    let size = ty.packed_size()?;
    let mut out = Vec::with_capacity(size);
    write_packed(ty, value, &mut out)?;
    Ok(out)
}

fn write_packed(ty: &TypeDescriptor, value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match (ty, value) {
        (TypeDescriptor::Bool, Value::Bool(b)) => out.push(*b as u8),
        (TypeDescriptor::Address, Value::Address(address)) => out.extend_from_slice(address.as_slice()),
        (TypeDescriptor::Uint(_) | TypeDescriptor::Int(_), Value::Uint(_) | Value::Int(_)) => {
            let bits = match ty {
                TypeDescriptor::Uint(bits) | TypeDescriptor::Int(bits) => *bits,
                _ => 256,
            };
            let mut word = [0u8; WORD];
            write_value(ty, value, &mut word)?;
            out.extend_from_slice(&word[WORD - bits as usize / 8..]);
        }
        (TypeDescriptor::FixedBytes(len), Value::FixedBytes(bytes)) if bytes.len() == *len as usize => {
            out.extend_from_slice(bytes)
        }
        (TypeDescriptor::Array(element, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(EncodeError::ArrayLengthMismatch {
                    expected: *len,
                    actual: items.len(),
                });
            }
            for item in items {
                write_packed(element, item, out)?;
            }
        }
        (TypeDescriptor::Tuple(tuple), Value::Tuple(items)) => {
            check_arity(tuple, items)?;
            for (field, item) in tuple.fields.iter().zip(items) {
                write_packed(&field.ty, item, out)?;
            }
        }
        _ => return Err(value.mismatch(ty)),
    }
    Ok(())
}
