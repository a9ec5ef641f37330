/* Shared codecs for the catalogue of common primitive shapes.
 *
 * Generated code built with the stdlib option routes every type listed in
 * CATALOGUE to the functions below instead of emitting its own copy. Each
 * catalogue identifier `T` maps to `encode_<stem>` / `decode_<stem>` where
 * the stem is the identifier with `[]` spelled `_slice`. Slices additionally
 * get `encoded_size_<stem>` and `measure_<stem>` (validate and size without
 * materialising), which lazy views use to locate fields.
 *
 * Scalar encoders write one head word. Bytes, string and slice encoders
 * write the tail payload (length word onwards) and return its size.
 */

use crate::errors::{DecodeError, EncodeError, OffsetKind};
use crate::word::*;
use alloy_primitives::{Address, FixedBytes, I256, U256};

/// Canonical type strings with a shared implementation in this module.
pub const CATALOGUE: &[&str] = &[
    "bool", "address", "string", "bytes", "bytes4", "bytes32", "uint8", "uint16", "uint32",
    "uint64", "uint128", "uint256", "int8", "int16", "int32", "int64", "int128", "int256",
    "bool[]", "address[]", "string[]", "bytes[]", "bytes4[]", "bytes32[]", "uint8[]",
    "uint16[]", "uint32[]", "uint64[]", "uint128[]", "uint256[]", "int8[]", "int16[]",
    "int32[]", "int64[]", "int128[]", "int256[]",
];

/// Function-name stem for a catalogue identifier (`uint256[]` -> `uint256_slice`).
pub fn stem(identifier: &str) -> String {
    match identifier.strip_suffix("[]") {
        Some(element) => format!("{element}_slice"),
        None => identifier.to_string(),
    }
}

type ElementEncoder<T> = fn(&T, &mut [u8]) -> Result<usize, EncodeError>;
type ElementDecoder<T> = fn(&[u8]) -> Result<(T, usize), DecodeError>;

/* ---------------------------------------------------------------------- */
/* Scalars                                                                */
/* ---------------------------------------------------------------------- */

macro_rules! native_uint {
    ($encode:ident, $decode:ident, $ty:ty, $bits:expr) => {
        pub fn $encode(value: &$ty, buf: &mut [u8]) -> Result<usize, EncodeError> {
            ensure_capacity(buf, WORD)?;
            write_u64(buf, *value as u64);
            Ok(WORD)
        }

        pub fn $decode(data: &[u8]) -> Result<($ty, usize), DecodeError> {
            Ok((read_u64(data, $bits)? as $ty, WORD))
        }
    };
}

macro_rules! native_int {
    ($encode:ident, $decode:ident, $ty:ty, $bits:expr) => {
        pub fn $encode(value: &$ty, buf: &mut [u8]) -> Result<usize, EncodeError> {
            ensure_capacity(buf, WORD)?;
            write_i64(buf, *value as i64);
            Ok(WORD)
        }

        pub fn $decode(data: &[u8]) -> Result<($ty, usize), DecodeError> {
            Ok((read_i64(data, $bits)? as $ty, WORD))
        }
    };
}

macro_rules! wide_uint {
    ($encode:ident, $decode:ident, $bits:expr) => {
        pub fn $encode(value: &U256, buf: &mut [u8]) -> Result<usize, EncodeError> {
            ensure_capacity(buf, WORD)?;
            write_u256(buf, value, $bits)?;
            Ok(WORD)
        }

        pub fn $decode(data: &[u8]) -> Result<(U256, usize), DecodeError> {
            Ok((read_u256(data, $bits)?, WORD))
        }
    };
}

macro_rules! wide_int {
    ($encode:ident, $decode:ident, $bits:expr) => {
        pub fn $encode(value: &I256, buf: &mut [u8]) -> Result<usize, EncodeError> {
            ensure_capacity(buf, WORD)?;
            write_i256(buf, value, $bits)?;
            Ok(WORD)
        }

        pub fn $decode(data: &[u8]) -> Result<(I256, usize), DecodeError> {
            Ok((read_i256(data, $bits)?, WORD))
        }
    };
}

macro_rules! fixed_bytes {
    ($encode:ident, $decode:ident, $len:expr) => {
        pub fn $encode(value: &FixedBytes<$len>, buf: &mut [u8]) -> Result<usize, EncodeError> {
            ensure_capacity(buf, WORD)?;
            write_fixed_bytes(buf, value.as_slice());
            Ok(WORD)
        }

        pub fn $decode(data: &[u8]) -> Result<(FixedBytes<$len>, usize), DecodeError> {
            Ok((read_fixed_bytes::<$len>(data)?, WORD))
        }
    };
}

native_uint!(encode_uint8, decode_uint8, u8, 8);
native_uint!(encode_uint16, decode_uint16, u16, 16);
native_uint!(encode_uint32, decode_uint32, u32, 32);
native_uint!(encode_uint64, decode_uint64, u64, 64);
wide_uint!(encode_uint128, decode_uint128, 128);
wide_uint!(encode_uint256, decode_uint256, 256);
native_int!(encode_int8, decode_int8, i8, 8);
native_int!(encode_int16, decode_int16, i16, 16);
native_int!(encode_int32, decode_int32, i32, 32);
native_int!(encode_int64, decode_int64, i64, 64);
wide_int!(encode_int128, decode_int128, 128);
wide_int!(encode_int256, decode_int256, 256);
fixed_bytes!(encode_bytes4, decode_bytes4, 4);
fixed_bytes!(encode_bytes32, decode_bytes32, 32);

pub fn encode_bool(value: &bool, buf: &mut [u8]) -> Result<usize, EncodeError> {
    ensure_capacity(buf, WORD)?;
    write_bool(buf, *value);
    Ok(WORD)
}

pub fn decode_bool(data: &[u8]) -> Result<(bool, usize), DecodeError> {
    Ok((read_bool(data)?, WORD))
}

pub fn encode_address(value: &Address, buf: &mut [u8]) -> Result<usize, EncodeError> {
    ensure_capacity(buf, WORD)?;
    write_address(buf, value);
    Ok(WORD)
}

pub fn decode_address(data: &[u8]) -> Result<(Address, usize), DecodeError> {
    Ok((read_address(data)?, WORD))
}

/* ---------------------------------------------------------------------- */
/* bytes / string payloads                                                */
/* ---------------------------------------------------------------------- */

pub fn encoded_size_bytes(value: &[u8]) -> usize {
    bytes_encoded_size(value.len())
}

pub fn encode_bytes(value: &[u8], buf: &mut [u8]) -> Result<usize, EncodeError> {
    ensure_capacity(buf, bytes_encoded_size(value.len()))?;
    Ok(write_bytes(buf, value))
}

pub fn decode_bytes(data: &[u8]) -> Result<(Vec<u8>, usize), DecodeError> {
    read_bytes(data)
}

pub fn measure_bytes(data: &[u8]) -> Result<usize, DecodeError> {
    Ok(read_bytes_slice(data)?.1)
}

pub fn encoded_size_string(value: &str) -> usize {
    bytes_encoded_size(value.len())
}

pub fn encode_string(value: &str, buf: &mut [u8]) -> Result<usize, EncodeError> {
    encode_bytes(value.as_bytes(), buf)
}

pub fn decode_string(data: &[u8]) -> Result<(String, usize), DecodeError> {
    read_string(data)
}

pub fn measure_string(data: &[u8]) -> Result<usize, DecodeError> {
    Ok(read_str(data)?.1)
}

/* ---------------------------------------------------------------------- */
/* Slices                                                                 */
/* ---------------------------------------------------------------------- */

fn encode_static_slice<T>(
    values: &[T],
    buf: &mut [u8],
    encode: ElementEncoder<T>,
) -> Result<usize, EncodeError> {
    ensure_capacity(buf, WORD + values.len() * WORD)?;
    write_usize(buf, values.len());
    let mut at = WORD;
    for value in values {
        at += encode(value, &mut buf[at..])?;
    }
    Ok(at)
}

fn decode_static_slice<T>(
    data: &[u8],
    decode: ElementDecoder<T>,
) -> Result<(Vec<T>, usize), DecodeError> {
    let len = read_length(data)?;
    let total = region_size(len, WORD)?
        .checked_add(WORD)
        .ok_or(DecodeError::LengthOverflow)?;
    ensure_len(data, total)?;
    let mut out = Vec::with_capacity(len);
    let mut at = WORD;
    for _ in 0..len {
        let (value, used) = decode(&data[at..])?;
        out.push(value);
        at += used;
    }
    Ok((out, at))
}

fn measure_static_slice<T>(data: &[u8], decode: ElementDecoder<T>) -> Result<usize, DecodeError> {
    let len = read_length(data)?;
    let total = region_size(len, WORD)?
        .checked_add(WORD)
        .ok_or(DecodeError::LengthOverflow)?;
    ensure_len(data, total)?;
    let mut at = WORD;
    for _ in 0..len {
        at += decode(&data[at..])?.1;
    }
    Ok(at)
}

/* Elements are a nested head/tail frame that starts after the length word;
 * offsets are relative to that frame. */
fn encode_dynamic_slice<T>(
    values: &[T],
    buf: &mut [u8],
    size: fn(&T) -> usize,
    encode: ElementEncoder<T>,
) -> Result<usize, EncodeError> {
    let total = WORD + values.len() * WORD + values.iter().map(size).sum::<usize>();
    ensure_capacity(buf, total)?;
    write_usize(buf, values.len());
    let frame = &mut buf[WORD..];
    let mut dynamic = values.len() * WORD;
    for (idx, value) in values.iter().enumerate() {
        write_usize(&mut frame[idx * WORD..], dynamic);
        dynamic += encode(value, &mut frame[dynamic..])?;
    }
    Ok(WORD + dynamic)
}

fn decode_dynamic_slice<T>(
    data: &[u8],
    decode: ElementDecoder<T>,
) -> Result<(Vec<T>, usize), DecodeError> {
    let len = read_length(data)?;
    let frame = &data[WORD..];
    let head = region_size(len, WORD)?;
    ensure_len(frame, head)?;
    let mut out = Vec::with_capacity(len);
    let mut expected = head;
    for idx in 0..len {
        check_offset(frame, idx * WORD, expected, OffsetKind::SliceElement, idx)?;
        let (value, used) = decode(tail(frame, expected)?)?;
        out.push(value);
        expected += used;
    }
    Ok((out, WORD + expected))
}

fn measure_dynamic_slice(
    data: &[u8],
    measure: fn(&[u8]) -> Result<usize, DecodeError>,
) -> Result<usize, DecodeError> {
    let len = read_length(data)?;
    let frame = &data[WORD..];
    let head = region_size(len, WORD)?;
    ensure_len(frame, head)?;
    let mut expected = head;
    for idx in 0..len {
        check_offset(frame, idx * WORD, expected, OffsetKind::SliceElement, idx)?;
        expected += measure(tail(frame, expected)?)?;
    }
    Ok(WORD + expected)
}

macro_rules! static_slice {
    ($encode:ident, $decode:ident, $size:ident, $measure:ident, $ty:ty, $elem_encode:ident, $elem_decode:ident) => {
        pub fn $encode(values: &[$ty], buf: &mut [u8]) -> Result<usize, EncodeError> {
            encode_static_slice(values, buf, $elem_encode)
        }

        pub fn $decode(data: &[u8]) -> Result<(Vec<$ty>, usize), DecodeError> {
            decode_static_slice(data, $elem_decode)
        }

        pub fn $size(values: &[$ty]) -> usize {
            WORD + values.len() * WORD
        }

        pub fn $measure(data: &[u8]) -> Result<usize, DecodeError> {
            measure_static_slice(data, $elem_decode)
        }
    };
}

static_slice!(encode_bool_slice, decode_bool_slice, encoded_size_bool_slice, measure_bool_slice, bool, encode_bool, decode_bool);
static_slice!(encode_address_slice, decode_address_slice, encoded_size_address_slice, measure_address_slice, Address, encode_address, decode_address);
static_slice!(encode_bytes4_slice, decode_bytes4_slice, encoded_size_bytes4_slice, measure_bytes4_slice, FixedBytes<4>, encode_bytes4, decode_bytes4);
static_slice!(encode_bytes32_slice, decode_bytes32_slice, encoded_size_bytes32_slice, measure_bytes32_slice, FixedBytes<32>, encode_bytes32, decode_bytes32);
static_slice!(encode_uint8_slice, decode_uint8_slice, encoded_size_uint8_slice, measure_uint8_slice, u8, encode_uint8, decode_uint8);
static_slice!(encode_uint16_slice, decode_uint16_slice, encoded_size_uint16_slice, measure_uint16_slice, u16, encode_uint16, decode_uint16);
static_slice!(encode_uint32_slice, decode_uint32_slice, encoded_size_uint32_slice, measure_uint32_slice, u32, encode_uint32, decode_uint32);
static_slice!(encode_uint64_slice, decode_uint64_slice, encoded_size_uint64_slice, measure_uint64_slice, u64, encode_uint64, decode_uint64);
static_slice!(encode_uint128_slice, decode_uint128_slice, encoded_size_uint128_slice, measure_uint128_slice, U256, encode_uint128, decode_uint128);
static_slice!(encode_uint256_slice, decode_uint256_slice, encoded_size_uint256_slice, measure_uint256_slice, U256, encode_uint256, decode_uint256);
static_slice!(encode_int8_slice, decode_int8_slice, encoded_size_int8_slice, measure_int8_slice, i8, encode_int8, decode_int8);
static_slice!(encode_int16_slice, decode_int16_slice, encoded_size_int16_slice, measure_int16_slice, i16, encode_int16, decode_int16);
static_slice!(encode_int32_slice, decode_int32_slice, encoded_size_int32_slice, measure_int32_slice, i32, encode_int32, decode_int32);
static_slice!(encode_int64_slice, decode_int64_slice, encoded_size_int64_slice, measure_int64_slice, i64, encode_int64, decode_int64);
static_slice!(encode_int128_slice, decode_int128_slice, encoded_size_int128_slice, measure_int128_slice, I256, encode_int128, decode_int128);
static_slice!(encode_int256_slice, decode_int256_slice, encoded_size_int256_slice, measure_int256_slice, I256, encode_int256, decode_int256);

pub fn encoded_size_bytes_slice(values: &[Vec<u8>]) -> usize {
    WORD + values.len() * WORD + values.iter().map(|v| encoded_size_bytes(v)).sum::<usize>()
}

pub fn encode_bytes_slice(values: &[Vec<u8>], buf: &mut [u8]) -> Result<usize, EncodeError> {
    encode_dynamic_slice(
        values,
        buf,
        |v: &Vec<u8>| encoded_size_bytes(v),
        |v: &Vec<u8>, buf: &mut [u8]| encode_bytes(v, buf),
    )
}

pub fn decode_bytes_slice(data: &[u8]) -> Result<(Vec<Vec<u8>>, usize), DecodeError> {
    decode_dynamic_slice(data, decode_bytes)
}

pub fn measure_bytes_slice(data: &[u8]) -> Result<usize, DecodeError> {
    measure_dynamic_slice(data, measure_bytes)
}

pub fn encoded_size_string_slice(values: &[String]) -> usize {
    WORD + values.len() * WORD + values.iter().map(|v| encoded_size_string(v)).sum::<usize>()
}

pub fn encode_string_slice(values: &[String], buf: &mut [u8]) -> Result<usize, EncodeError> {
    encode_dynamic_slice(
        values,
        buf,
        |v: &String| encoded_size_string(v),
        |v: &String, buf: &mut [u8]| encode_string(v, buf),
    )
}

pub fn decode_string_slice(data: &[u8]) -> Result<(Vec<String>, usize), DecodeError> {
    decode_dynamic_slice(data, decode_string)
}

pub fn measure_string_slice(data: &[u8]) -> Result<usize, DecodeError> {
    measure_dynamic_slice(data, measure_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems() {
        assert_eq!(stem("uint256"), "uint256");
        assert_eq!(stem("address[]"), "address_slice");
    }

    #[test]
    fn uint256_slice_layout() {
        let values = vec![U256::from(1u64), U256::from(2u64)];
        let mut buf = vec![0u8; encoded_size_uint256_slice(&values)];
        assert_eq!(encode_uint256_slice(&values, &mut buf), Ok(96));
        assert_eq!(buf[31], 2);
        assert_eq!(buf[63], 1);
        assert_eq!(buf[95], 2);
        assert_eq!(decode_uint256_slice(&buf), Ok((values, 96)));
        assert_eq!(measure_uint256_slice(&buf), Ok(96));
    }

    #[test]
    fn string_slice_offsets_are_frame_relative() {
        let values = vec!["a".to_string(), String::new(), "hello".to_string()];
        let size = encoded_size_string_slice(&values);
        /* len + 3 offsets + (len+word) + len + (len+word) */
        assert_eq!(size, 32 + 96 + 64 + 32 + 64);
        let mut buf = vec![0u8; size];
        assert_eq!(encode_string_slice(&values, &mut buf), Ok(size));
        assert_eq!(buf[32 + 31], 96);
        assert_eq!(buf[64 + 31], 160);
        assert_eq!(buf[96 + 31], 192);
        assert_eq!(decode_string_slice(&buf), Ok((values, size)));
        assert_eq!(measure_string_slice(&buf), Ok(size));
    }

    #[test]
    fn misplaced_slice_offset_is_rejected() {
        let values = vec![b"x".to_vec(), b"y".to_vec()];
        let mut buf = vec![0u8; encoded_size_bytes_slice(&values)];
        encode_bytes_slice(&values, &mut buf).expect("encode");
        buf[64 + 31] = 0x60;
        assert_eq!(
            decode_bytes_slice(&buf),
            Err(DecodeError::InvalidOffset {
                kind: OffsetKind::SliceElement,
                index: 1,
                expected: 0x80,
                actual: 0x60,
            })
        );
    }

    #[test]
    fn short_buffer_is_reported() {
        let mut buf = [0u8; 16];
        assert_eq!(
            encode_uint64(&7, &mut buf),
            Err(EncodeError::BufferTooShort {
                needed: 32,
                available: 16
            })
        );
    }

    #[test]
    fn native_decoders_check_width() {
        let mut buf = [0u8; 32];
        encode_uint16(&300, &mut buf).expect("encode");
        assert!(decode_uint8(&buf).is_err());
        assert_eq!(decode_uint16(&buf), Ok((300, 32)));

        encode_int8(&-5, &mut buf).expect("encode");
        assert_eq!(decode_int8(&buf), Ok((-5, 32)));
        assert_eq!(decode_int64(&buf), Ok((-5, 32)));
    }

    #[test]
    fn absurd_slice_length_does_not_allocate() {
        let mut buf = [0u8; 32];
        write_u64(&mut buf, u64::MAX / 64);
        assert!(matches!(
            decode_uint256_slice(&buf),
            Err(DecodeError::UnexpectedEof { .. }) | Err(DecodeError::LengthOverflow)
        ));
    }
}
