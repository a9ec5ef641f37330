/* Elementary type names shared by the DSL and JSON front-ends */

use abi_types::TypeDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Elementary {
    Known(TypeDescriptor),
    /* Candidate struct reference; qualified names keep only the last segment */
    Identifier(String),
    Invalid,
}

pub(crate) fn classify(word: &str) -> Elementary {
    let known = match word {
        "bool" => Some(TypeDescriptor::Bool),
        "address" => Some(TypeDescriptor::Address),
        "string" => Some(TypeDescriptor::String),
        "bytes" => Some(TypeDescriptor::Bytes),
        "byte" => Some(TypeDescriptor::FixedBytes(1)),
        /* Solidity default width */
        "uint" => Some(TypeDescriptor::Uint(256)),
        "int" => Some(TypeDescriptor::Int(256)),
        _ => None,
    };
    if let Some(ty) = known {
        return Elementary::Known(ty);
    }

    if let Some(width) = sized_suffix(word, "uint") {
        return checked(width.and_then(|bits| TypeDescriptor::uint(bits).ok()));
    }
    if let Some(width) = sized_suffix(word, "int") {
        return checked(width.and_then(|bits| TypeDescriptor::int(bits).ok()));
    }
    if let Some(width) = sized_suffix(word, "bytes") {
        return checked(width.and_then(|len| TypeDescriptor::fixed_bytes(len).ok()));
    }

    if is_identifier(word) {
        let last = word.rsplit('.').next().unwrap_or(word);
        return Elementary::Identifier(last.to_string());
    }
    Elementary::Invalid
}

/* `Some(width)` when `word` is `prefix` followed only by digits; the inner
 * option is `None` when the digits do not fit a u16. */
fn sized_suffix(word: &str, prefix: &str) -> Option<Option<u16>> {
    let digits = word.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().ok())
}

fn checked(ty: Option<TypeDescriptor>) -> Elementary {
    match ty {
        Some(ty) => Elementary::Known(ty),
        None => Elementary::Invalid,
    }
}

pub(crate) fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.')
        && !word.ends_with('.')
}
