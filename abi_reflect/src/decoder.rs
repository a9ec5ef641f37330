/* Strict head/tail decoder
 *
 * Every read is bounds-checked, every padding byte validated, and every
 * offset word must equal the position the decoder expects next: the
 * frame's head size for the first dynamic member, then the end of the
 * previous member's tail. Overlapping or out-of-order payloads are
 * rejected.
 */

use crate::value::Value;
use abi_runtime::prelude::*;
use abi_types::{TupleType, TypeDescriptor};

/// Decodes one value from the start of `data`, returning it with the
/// number of bytes its standalone encoding occupies.
pub fn decode(ty: &TypeDescriptor, data: &[u8]) -> Result<(Value, usize), DecodeError> {
    let value = match ty {
        TypeDescriptor::Bool => Value::Bool(read_bool(data)?),
        TypeDescriptor::Address => Value::Address(read_address(data)?),
        TypeDescriptor::Uint(bits) => Value::Uint(read_u256(data, *bits)?),
        TypeDescriptor::Int(bits) => Value::Int(read_i256(data, *bits)?),
        TypeDescriptor::FixedBytes(len) => {
            Value::FixedBytes(read_fixed_bytes_slice(data, *len as usize)?.to_vec())
        }
        TypeDescriptor::Bytes => {
            let (bytes, used) = read_bytes(data)?;
            return Ok((Value::Bytes(bytes), used));
        }
        TypeDescriptor::String => {
            let (text, used) = read_string(data)?;
            return Ok((Value::String(text), used));
        }
        TypeDescriptor::Array(element, len) => {
            let (items, used) = decode_sequence(element, *len, data, OffsetKind::ArrayElement)?;
            return Ok((Value::Array(items), used));
        }
        TypeDescriptor::Slice(element) => {
            let len = read_length(data)?;
            let (items, used) =
                decode_sequence(element, len, &data[WORD..], OffsetKind::SliceElement)?;
            return Ok((Value::Array(items), WORD + used));
        }
        TypeDescriptor::Tuple(tuple) => {
            let (items, used) = decode_tuple(tuple, data)?;
            return Ok((Value::Tuple(items), used));
        }
    };
    Ok((value, WORD))
}

/// Decodes a tuple frame into its member values.
pub fn decode_tuple(tuple: &TupleType, data: &[u8]) -> Result<(Vec<Value>, usize), DecodeError> {
    let mut items = Vec::with_capacity(tuple.fields.len());
    let used = walk_frame(
        data,
        tuple.head_size(),
        tuple.fields.len(),
        |idx| &tuple.fields[idx].ty,
        OffsetKind::DynamicField,
        |_, ty, at| {
            let (value, used) = decode(ty, &data[at..])?;
            items.push(value);
            Ok(used)
        },
    )?;
    Ok((items, used))
}

fn decode_sequence(
    element: &TypeDescriptor,
    len: usize,
    data: &[u8],
    kind: OffsetKind,
) -> Result<(Vec<Value>, usize), DecodeError> {
    let head = sequence_head(element, len, data)?;
    let mut items = Vec::with_capacity(len.min(data.len() / WORD + 1));
    let used = walk_frame(data, head, len, |_| element, kind, |_, ty, at| {
        let (value, used) = decode(ty, &data[at..])?;
        items.push(value);
        Ok(used)
    })?;
    Ok((items, used))
}

/// Validates the encoding at the start of `data` without materialising it,
/// returning the number of bytes it occupies.
pub fn measure(ty: &TypeDescriptor, data: &[u8]) -> Result<usize, DecodeError> {
    match ty {
        TypeDescriptor::Bool => read_bool(data).map(|_| WORD),
        TypeDescriptor::Address => read_address(data).map(|_| WORD),
        TypeDescriptor::Uint(bits) => read_u256(data, *bits).map(|_| WORD),
        TypeDescriptor::Int(bits) => read_i256(data, *bits).map(|_| WORD),
        TypeDescriptor::FixedBytes(len) => read_fixed_bytes_slice(data, *len as usize).map(|_| WORD),
        TypeDescriptor::Bytes => read_bytes_slice(data).map(|(_, used)| used),
        TypeDescriptor::String => read_str(data).map(|(_, used)| used),
        TypeDescriptor::Array(element, len) => {
            measure_sequence(element, *len, data, OffsetKind::ArrayElement)
        }
        TypeDescriptor::Slice(element) => {
            let len = read_length(data)?;
            Ok(WORD + measure_sequence(element, len, &data[WORD..], OffsetKind::SliceElement)?)
        }
        TypeDescriptor::Tuple(tuple) => walk_frame(
            data,
            tuple.head_size(),
            tuple.fields.len(),
            |idx| &tuple.fields[idx].ty,
            OffsetKind::DynamicField,
            |_, ty, at| measure(ty, &data[at..]),
        ),
    }
}

fn measure_sequence(
    element: &TypeDescriptor,
    len: usize,
    data: &[u8],
    kind: OffsetKind,
) -> Result<usize, DecodeError> {
    let head = sequence_head(element, len, data)?;
    walk_frame(data, head, len, |_| element, kind, |_, ty, at| {
        measure(ty, &data[at..])
    })
}

/* Head size of `len` uniform elements. Zero-sized elements (`T[0]`, `()`)
 * would let a length word demand unbounded work from a short input, so
 * their count is capped by the input size. */
pub(crate) fn sequence_head(element: &TypeDescriptor, len: usize, data: &[u8]) -> Result<usize, DecodeError> {
    let element_size = element.static_size();
    if element_size == 0 && len > data.len() {
        return Err(DecodeError::LengthOverflow);
    }
    region_size(len, element_size)
}

/// Walks one frame: checks the head fits, then visits members in order.
/// `visit(index, type, position)` decodes or measures the member starting
/// at `position` and returns its size. Dynamic members are located through
/// their offset word, which must equal the running expected offset.
/// Returns the frame's total size (head plus tails).
pub(crate) fn walk_frame<'t>(
    data: &[u8],
    head: usize,
    count: usize,
    type_at: impl Fn(usize) -> &'t TypeDescriptor,
    kind: OffsetKind,
    mut visit: impl FnMut(usize, &'t TypeDescriptor, usize) -> Result<usize, DecodeError>,
) -> Result<usize, DecodeError> {
    ensure_len(data, head)?;
    let mut at = 0;
    let mut expected = head;
    for idx in 0..count {
        let ty = type_at(idx);
        if ty.is_dynamic() {
            check_offset(data, at, expected, kind, idx)?;
            ensure_len(data, expected)?;
            expected += visit(idx, ty, expected)?;
            at += WORD;
        } else {
            at += visit(idx, ty, at)?;
        }
    }
    Ok(expected)
}
