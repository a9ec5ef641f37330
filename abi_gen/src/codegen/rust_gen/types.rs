/* Aggregate definitions and their head/tail codec methods */

use super::decode::{emit_frame_decode, emit_frame_measure};
use super::encode::{emit_frame_encode, frame_size_expr, packed_write, self_place};
use super::helpers::{escape_rust_keyword, local_name, rust_type};
use crate::codegen::shared::StructPlan;
use std::fmt::{self, Write};

pub struct StructOptions<'a> {
  pub doc: &'a str,
  pub packed: bool,
}

/* Struct definition plus `impl` with sizes, encode, decode and measure */
pub fn emit_struct(out: &mut String, plan: &StructPlan, options: &StructOptions<'_>) -> fmt::Result {
  if !options.doc.is_empty() {
    writeln!(out, "/// {}", options.doc)?;
  }
  writeln!(out, "#[derive(Debug, Clone, PartialEq, Eq)]")?;
  if plan.fields.is_empty() {
    writeln!(out, "pub struct {} {{}}", plan.name)?;
  } else {
    writeln!(out, "pub struct {} {{", plan.name)?;
    for field in &plan.fields {
      writeln!(out, "    pub {}: {},", escape_rust_keyword(&field.ident), rust_type(&field.ty))?;
    }
    writeln!(out, "}}")?;
  }
  writeln!(out)?;

  writeln!(out, "impl {} {{", plan.name)?;
  writeln!(out, "    pub const HEAD_SIZE: usize = {};", plan.head_size)?;
  writeln!(out, "    pub const IS_DYNAMIC: bool = {};", plan.dynamic)?;
  let packed = options.packed && plan.packed_size.is_some();
  if let (true, Some(size)) = (packed, plan.packed_size) {
    writeln!(out, "    pub const PACKED_SIZE: usize = {};", size)?;
  }
  writeln!(out)?;

  emit_encoded_size(out, plan)?;
  emit_encode(out)?;
  emit_encode_into(out, plan)?;
  emit_decode(out, plan)?;
  emit_measure(out, plan)?;
  if packed {
    emit_encode_packed(out, plan)?;
  }
  writeln!(out, "}}")?;
  writeln!(out)
}

fn emit_encoded_size(out: &mut String, plan: &StructPlan) -> fmt::Result {
  writeln!(out, "    pub fn encoded_size(&self) -> usize {{")?;
  writeln!(out, "        {}", frame_size_expr(plan, "Self::HEAD_SIZE", &self_place, "        "))?;
  writeln!(out, "    }}")?;
  writeln!(out)
}

fn emit_encode(out: &mut String) -> fmt::Result {
  writeln!(out, "    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {{")?;
  writeln!(out, "        let mut buf = vec![0u8; self.encoded_size()];")?;
  writeln!(out, "        self.encode_into(&mut buf)?;")?;
  writeln!(out, "        Ok(buf)")?;
  writeln!(out, "    }}")?;
  writeln!(out)
}

fn emit_encode_into(out: &mut String, plan: &StructPlan) -> fmt::Result {
  writeln!(out, "    /// Encodes into the front of `buf`, returning the bytes written.")?;
  writeln!(out, "    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {{")?;
  if plan.dynamic {
    writeln!(out, "        ensure_capacity(buf, self.encoded_size())?;")?;
  } else {
    writeln!(out, "        ensure_capacity(buf, Self::HEAD_SIZE)?;")?;
  }
  emit_frame_encode(out, plan, "Self::HEAD_SIZE", &self_place, "        ")?;
  if plan.dynamic {
    writeln!(out, "        Ok(dynamic)")?;
  } else {
    writeln!(out, "        Ok(Self::HEAD_SIZE)")?;
  }
  writeln!(out, "    }}")?;
  writeln!(out)
}

fn emit_decode(out: &mut String, plan: &StructPlan) -> fmt::Result {
  writeln!(out, "    /// Decodes from the front of `data`, returning the value and the bytes consumed.")?;
  writeln!(out, "    pub fn decode(data: &[u8]) -> Result<(Self, usize), DecodeError> {{")?;
  emit_frame_decode(out, plan, "Self::HEAD_SIZE", "        ", true)?;
  let consumed = if plan.dynamic { "expected" } else { "Self::HEAD_SIZE" };
  if plan.fields.is_empty() {
    writeln!(out, "        Ok((Self {{}}, {}))", consumed)?;
  } else {
    writeln!(out, "        let value = Self {{")?;
    for field in &plan.fields {
      writeln!(out, "            {}: {},", escape_rust_keyword(&field.ident), local_name(&field.ident))?;
    }
    writeln!(out, "        }};")?;
    writeln!(out, "        Ok((value, {}))", consumed)?;
  }
  writeln!(out, "    }}")?;
  writeln!(out)
}

fn emit_measure(out: &mut String, plan: &StructPlan) -> fmt::Result {
  writeln!(out, "    /// Validates an encoding without materialising it, returning its size.")?;
  writeln!(out, "    pub fn measure(data: &[u8]) -> Result<usize, DecodeError> {{")?;
  emit_frame_measure(out, plan, "Self::HEAD_SIZE", "        ")?;
  let consumed = if plan.dynamic { "expected" } else { "Self::HEAD_SIZE" };
  writeln!(out, "        Ok({})", consumed)?;
  writeln!(out, "    }}")
}

fn emit_encode_packed(out: &mut String, plan: &StructPlan) -> fmt::Result {
  writeln!(out)?;
  let param = if plan.fields.is_empty() { "_out" } else { "out" };
  writeln!(out, "    pub fn encode_packed_into(&self, {}: &mut Vec<u8>) -> Result<(), EncodeError> {{", param)?;
  for field in &plan.fields {
    for line in packed_write(&field.ty, &self_place(field)) {
      writeln!(out, "        {}", line)?;
    }
  }
  writeln!(out, "        Ok(())")?;
  writeln!(out, "    }}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_struct() {
    let plan = StructPlan {
      name: "PingCall".to_string(),
      fields: Vec::new(),
      head_size: 0,
      dynamic: false,
      packed_size: Some(0),
    };
    let mut out = String::new();
    emit_struct(&mut out, &plan, &StructOptions { doc: "", packed: true }).unwrap();
    assert!(out.starts_with("#[derive(Debug, Clone, PartialEq, Eq)]\npub struct PingCall {}\n"));
    assert!(out.contains("        Ok((Self {}, Self::HEAD_SIZE))"));
    assert!(out.contains("    pub const PACKED_SIZE: usize = 0;"));
    assert!(out.contains("pub fn encode_packed_into(&self, _out: &mut Vec<u8>)"));
  }
}
