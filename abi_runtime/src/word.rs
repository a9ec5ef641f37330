//! Word-level encoding primitives.
//!
//! Writers assume the caller already checked capacity for the whole frame
//! (generated `encode_into` checks `encoded_size` once up front) and write
//! into the first bytes of `buf`. Readers take the input positioned at the
//! word to read and never trust padding: every byte outside the value's
//! declared width must hold exactly the expected fill.

use crate::errors::{DecodeError, EncodeError, OffsetKind, WordKind};
use alloy_primitives::{Address, FixedBytes, I256, U256};

pub const WORD: usize = 32;

#[inline]
pub fn pad32(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Encoded size of a `bytes`/`string` payload: length word plus padded data.
#[inline]
pub fn bytes_encoded_size(len: usize) -> usize {
    WORD + pad32(len)
}

#[inline]
pub fn ensure_len(data: &[u8], needed: usize) -> Result<(), DecodeError> {
    if data.len() < needed {
        return Err(DecodeError::UnexpectedEof {
            needed,
            available: data.len(),
        });
    }
    Ok(())
}

#[inline]
pub fn ensure_capacity(buf: &[u8], needed: usize) -> Result<(), EncodeError> {
    if buf.len() < needed {
        return Err(EncodeError::BufferTooShort {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

/// Slice of `data` starting at `at`, failing with `UnexpectedEof` when `at`
/// lies past the end.
#[inline]
pub fn tail(data: &[u8], at: usize) -> Result<&[u8], DecodeError> {
    ensure_len(data, at)?;
    Ok(&data[at..])
}

/* ---------------------------------------------------------------------- */
/* Writers                                                                */
/* ---------------------------------------------------------------------- */

#[inline]
pub fn write_u64(buf: &mut [u8], value: u64) {
    buf[..24].fill(0);
    buf[24..WORD].copy_from_slice(&value.to_be_bytes());
}

#[inline]
pub fn write_i64(buf: &mut [u8], value: i64) {
    let fill = if value < 0 { 0xff } else { 0x00 };
    buf[..24].fill(fill);
    buf[24..WORD].copy_from_slice(&value.to_be_bytes());
}

#[inline]
pub fn write_usize(buf: &mut [u8], value: usize) {
    write_u64(buf, value as u64);
}

#[inline]
pub fn write_bool(buf: &mut [u8], value: bool) {
    write_u64(buf, value as u64);
}

#[inline]
pub fn write_address(buf: &mut [u8], value: &Address) {
    buf[..12].fill(0);
    buf[12..WORD].copy_from_slice(value.as_slice());
}

/// Left-aligned `bytesN`, zero-filled on the right.
#[inline]
pub fn write_fixed_bytes(buf: &mut [u8], value: &[u8]) {
    buf[..value.len()].copy_from_slice(value);
    buf[value.len()..WORD].fill(0);
}

pub fn write_u256(buf: &mut [u8], value: &U256, bits: u16) -> Result<(), EncodeError> {
    check_uint_width(value, bits)?;
    buf[..WORD].copy_from_slice(&value.to_be_bytes::<32>());
    Ok(())
}

pub fn write_i256(buf: &mut [u8], value: &I256, bits: u16) -> Result<(), EncodeError> {
    let raw = value.into_raw().to_be_bytes::<32>();
    if !is_sign_extended(&raw, bits) {
        return Err(EncodeError::IntegerTooLarge { bits, signed: true });
    }
    buf[..WORD].copy_from_slice(&raw);
    Ok(())
}

/// Length word followed by the payload, zero-padded to a word boundary.
/// Returns the number of bytes written.
pub fn write_bytes(buf: &mut [u8], value: &[u8]) -> usize {
    write_usize(buf, value.len());
    let end = WORD + value.len();
    buf[WORD..end].copy_from_slice(value);
    let padded = bytes_encoded_size(value.len());
    buf[end..padded].fill(0);
    padded
}

/* ---------------------------------------------------------------------- */
/* Width checks                                                           */
/* ---------------------------------------------------------------------- */

#[inline]
pub fn check_uint_width_u64(value: u64, bits: u16) -> Result<(), EncodeError> {
    if bits < 64 && value >> bits != 0 {
        return Err(EncodeError::IntegerTooLarge { bits, signed: false });
    }
    Ok(())
}

#[inline]
pub fn check_int_width_i64(value: i64, bits: u16) -> Result<(), EncodeError> {
    if bits < 64 {
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        if value < min || value > max {
            return Err(EncodeError::IntegerTooLarge { bits, signed: true });
        }
    }
    Ok(())
}

#[inline]
pub fn check_uint_width(value: &U256, bits: u16) -> Result<(), EncodeError> {
    if value.bit_len() > bits as usize {
        return Err(EncodeError::IntegerTooLarge { bits, signed: false });
    }
    Ok(())
}

#[inline]
pub fn check_int_width(value: &I256, bits: u16) -> Result<(), EncodeError> {
    if !is_sign_extended(&value.into_raw().to_be_bytes::<32>(), bits) {
        return Err(EncodeError::IntegerTooLarge { bits, signed: true });
    }
    Ok(())
}

/// True when every byte above the low `bits / 8` bytes is zero.
#[inline]
fn is_zero_extended(word: &[u8], bits: u16) -> bool {
    let pad = WORD - bits as usize / 8;
    word[..pad].iter().all(|byte| *byte == 0)
}

/// True when every byte above the low `bits / 8` bytes repeats the sign of
/// the value's top bit.
#[inline]
fn is_sign_extended(word: &[u8], bits: u16) -> bool {
    let pad = WORD - bits as usize / 8;
    if pad == 0 {
        return true;
    }
    let fill = if word[pad] & 0x80 != 0 { 0xff } else { 0x00 };
    word[..pad].iter().all(|byte| *byte == fill)
}

/* ---------------------------------------------------------------------- */
/* Readers                                                                */
/* ---------------------------------------------------------------------- */

#[inline]
pub fn read_word(data: &[u8]) -> Result<&[u8; WORD], DecodeError> {
    ensure_len(data, WORD)?;
    let word: &[u8; WORD] = data[..WORD]
        .try_into()
        .map_err(|_| DecodeError::UnexpectedEof {
            needed: WORD,
            available: data.len(),
        })?;
    Ok(word)
}

#[inline]
pub fn read_u64(data: &[u8], bits: u16) -> Result<u64, DecodeError> {
    let word = read_word(data)?;
    if !is_zero_extended(word, bits) {
        return Err(DecodeError::DirtyPadding {
            kind: WordKind::Uint(bits),
        });
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(low))
}

#[inline]
pub fn read_i64(data: &[u8], bits: u16) -> Result<i64, DecodeError> {
    let word = read_word(data)?;
    if !is_sign_extended(word, bits) {
        return Err(DecodeError::DirtyPadding {
            kind: WordKind::Int(bits),
        });
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    Ok(i64::from_be_bytes(low))
}

pub fn read_u256(data: &[u8], bits: u16) -> Result<U256, DecodeError> {
    let word = read_word(data)?;
    if !is_zero_extended(word, bits) {
        return Err(DecodeError::DirtyPadding {
            kind: WordKind::Uint(bits),
        });
    }
    Ok(U256::from_be_bytes(*word))
}

pub fn read_i256(data: &[u8], bits: u16) -> Result<I256, DecodeError> {
    let word = read_word(data)?;
    if !is_sign_extended(word, bits) {
        return Err(DecodeError::DirtyPadding {
            kind: WordKind::Int(bits),
        });
    }
    Ok(I256::from_raw(U256::from_be_bytes(*word)))
}

#[inline]
pub fn read_bool(data: &[u8]) -> Result<bool, DecodeError> {
    let word = read_word(data)?;
    if word[..WORD - 1].iter().any(|byte| *byte != 0) || word[WORD - 1] > 1 {
        return Err(DecodeError::DirtyPadding {
            kind: WordKind::Bool,
        });
    }
    Ok(word[WORD - 1] == 1)
}

#[inline]
pub fn read_address(data: &[u8]) -> Result<Address, DecodeError> {
    let word = read_word(data)?;
    if word[..12].iter().any(|byte| *byte != 0) {
        return Err(DecodeError::DirtyPadding {
            kind: WordKind::Address,
        });
    }
    Ok(Address::from_slice(&word[12..]))
}

/// Left-aligned `bytesN` with a zero tail.
pub fn read_fixed_bytes<const N: usize>(data: &[u8]) -> Result<FixedBytes<N>, DecodeError> {
    let bytes = read_fixed_bytes_slice(data, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(FixedBytes(out))
}

/// Runtime-width variant of [`read_fixed_bytes`].
pub fn read_fixed_bytes_slice(data: &[u8], len: usize) -> Result<&[u8], DecodeError> {
    let word = read_word(data)?;
    if word[len..].iter().any(|byte| *byte != 0) {
        return Err(DecodeError::DirtyPadding {
            kind: WordKind::FixedBytes(len as u16),
        });
    }
    Ok(&data[..len])
}

/// Reads a length word. Lengths that cannot be addressed are rejected
/// before any payload bounds are computed.
pub fn read_length(data: &[u8]) -> Result<usize, DecodeError> {
    let word = read_word(data)?;
    if word[..24].iter().any(|byte| *byte != 0) {
        return Err(DecodeError::LengthOverflow);
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| DecodeError::LengthOverflow)
}

/// Reads the offset word at `at` and checks it equals `expected`.
pub fn check_offset(
    data: &[u8],
    at: usize,
    expected: usize,
    kind: OffsetKind,
    index: usize,
) -> Result<(), DecodeError> {
    let word = read_word(tail(data, at)?)?;
    let actual = if word[..24].iter().any(|byte| *byte != 0) {
        usize::MAX
    } else {
        let mut low = [0u8; 8];
        low.copy_from_slice(&word[24..]);
        usize::try_from(u64::from_be_bytes(low)).unwrap_or(usize::MAX)
    };
    if actual != expected {
        return Err(DecodeError::InvalidOffset {
            kind,
            index,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Number of bytes a head of `count` elements of `element_size` spans,
/// rejecting lengths whose product overflows.
#[inline]
pub fn region_size(count: usize, element_size: usize) -> Result<usize, DecodeError> {
    count
        .checked_mul(element_size)
        .ok_or(DecodeError::LengthOverflow)
}

/// Converts decoded fixed-array elements into an array. Decoders always
/// produce exactly `N` items, so a mismatch means the head was inconsistent.
pub fn array_from_vec<T, const N: usize>(items: Vec<T>) -> Result<[T; N], DecodeError> {
    let len = items.len();
    items
        .try_into()
        .map_err(|_| DecodeError::IndexOutOfBounds { index: N, len })
}

/// Zero-copy view of a `bytes` payload: `(payload, bytes_consumed)`.
pub fn read_bytes_slice(data: &[u8]) -> Result<(&[u8], usize), DecodeError> {
    let len = read_length(data)?;
    let padded = len
        .checked_add(WORD - 1)
        .map(|n| n / WORD * WORD)
        .ok_or(DecodeError::LengthOverflow)?;
    let consumed = WORD
        .checked_add(padded)
        .ok_or(DecodeError::LengthOverflow)?;
    ensure_len(data, consumed)?;
    let payload_end = WORD + len;
    if data[payload_end..consumed].iter().any(|byte| *byte != 0) {
        return Err(DecodeError::DirtyPadding {
            kind: WordKind::Payload,
        });
    }
    Ok((&data[WORD..payload_end], consumed))
}

pub fn read_bytes(data: &[u8]) -> Result<(Vec<u8>, usize), DecodeError> {
    let (payload, consumed) = read_bytes_slice(data)?;
    Ok((payload.to_vec(), consumed))
}

pub fn read_str(data: &[u8]) -> Result<(&str, usize), DecodeError> {
    let (payload, consumed) = read_bytes_slice(data)?;
    let text = std::str::from_utf8(payload).map_err(|_| DecodeError::InvalidUtf8)?;
    Ok((text, consumed))
}

pub fn read_string(data: &[u8]) -> Result<(String, usize), DecodeError> {
    let (text, consumed) = read_str(data)?;
    Ok((text.to_owned(), consumed))
}
