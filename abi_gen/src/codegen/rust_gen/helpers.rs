/* Helper utilities for Rust code generation */

use crate::abi::naming::camel_case;
use crate::codegen::shared::{Shape, TypeRef};

/* Escape Rust keywords to valid identifiers */
pub fn escape_rust_keyword(name: &str) -> String {
  const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "extern", "false", "fn", "for", "if",
    "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while", "async",
    "await", "dyn", "abstract", "become", "box", "do", "final", "macro", "override", "priv",
    "typeof", "unsized", "virtual", "yield", "try", "gen",
  ];
  /* these cannot be raw identifiers */
  const PATH_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

  if PATH_KEYWORDS.contains(&name) {
    format!("{}_", name)
  } else if RUST_KEYWORDS.contains(&name) {
    format!("r#{}", name)
  } else {
    name.to_string()
  }
}

/* Local binding holding a decoded member before the aggregate is built */
pub fn local_name(ident: &str) -> String {
  format!("{}_", ident)
}

pub fn native_uint(bits: u16) -> Option<&'static str> {
  match bits {
    1..=8 => Some("u8"),
    9..=16 => Some("u16"),
    17..=32 => Some("u32"),
    33..=64 => Some("u64"),
    _ => None,
  }
}

pub fn native_int(bits: u16) -> Option<&'static str> {
  match bits {
    1..=8 => Some("i8"),
    9..=16 => Some("i16"),
    17..=32 => Some("i32"),
    33..=64 => Some("i64"),
    _ => None,
  }
}

/* Widths whose Rust type already bounds the value */
pub fn is_exact_width(bits: u16) -> bool {
  matches!(bits, 8 | 16 | 32 | 64)
}

/* Owned Rust type of a value */
pub fn rust_type(ty: &TypeRef) -> String {
  match &ty.shape {
    Shape::Bool => "bool".to_string(),
    Shape::Address => "Address".to_string(),
    Shape::Uint { bits } => native_uint(*bits).unwrap_or("U256").to_string(),
    Shape::Int { bits } => native_int(*bits).unwrap_or("I256").to_string(),
    Shape::FixedBytes { len } => format!("FixedBytes<{}>", len),
    Shape::Bytes => "Vec<u8>".to_string(),
    Shape::String => "String".to_string(),
    Shape::Tuple { name, .. } => name.clone(),
    Shape::Array { element, len, .. } => format!("[{}; {}]", rust_type(element), len),
    Shape::Slice { element, .. } => format!("Vec<{}>", rust_type(element)),
  }
}

/* Parameter type generated sequence codecs take */
pub fn sequence_param(ty: &TypeRef) -> String {
  match &ty.shape {
    Shape::Array { element, len, .. } => format!("&[{}; {}]", rust_type(element), len),
    Shape::Slice { element, .. } => format!("&[{}]", rust_type(element)),
    _ => format!("&{}", rust_type(ty)),
  }
}

/* Name of the lazy view over a generated sequence */
pub fn sequence_view_name(stem: &str) -> String {
  format!("{}View", camel_case(stem))
}

/* `[0xa9, 0x05, 0x9c, 0xbb]`, wrapped eight bytes per line when long */
pub fn byte_array_literal(hex_digits: &str, indent: &str) -> String {
  let bytes: Vec<String> = hex_digits
    .as_bytes()
    .chunks(2)
    .map(|pair| format!("0x{}", String::from_utf8_lossy(pair)))
    .collect();
  if bytes.len() <= 8 {
    return format!("[{}]", bytes.join(", "));
  }
  let mut out = String::from("[\n");
  for line in bytes.chunks(8) {
    out.push_str(indent);
    out.push_str("    ");
    out.push_str(&line.join(", "));
    out.push_str(",\n");
  }
  out.push_str(indent);
  out.push(']');
  out
}

/* Bytes of a scalar's 32-byte word that make up its packed form */
pub fn packed_range(ty: &TypeRef) -> Option<String> {
  match &ty.shape {
    Shape::Bool => Some("31..".to_string()),
    Shape::Address => Some("12..".to_string()),
    Shape::Uint { bits } | Shape::Int { bits } => Some(format!("{}..", 32 - *bits as usize / 8)),
    Shape::FixedBytes { len } => Some(format!("..{}", len)),
    _ => None,
  }
}
