/* Free-standing codecs for generated arrays and slices
 *
 * A slice is a length word followed by a frame of `len` elements; a fixed
 * array is the frame alone. Elements are laid out exactly like tuple
 * fields: static ones inline, dynamic ones behind an offset word relative
 * to the start of the frame.
 */

use super::decode::{static_measure, static_read, tail_measure, tail_read};
use super::encode::{packed_write, static_write, tail_write};
use super::helpers::{rust_type, sequence_param};
use super::size::sequence_size;
use crate::codegen::shared::{Shape, TypeRef};
use std::fmt::{self, Write};

const ITEM: &str = "(*item)";

pub struct Sequence<'a> {
  pub stem: &'a str,
  pub canonical: &'a str,
  pub element: &'a TypeRef,
  /* None for slices */
  pub len: Option<usize>,
  pub packed: bool,
}

impl<'a> Sequence<'a> {
  fn param(&self) -> String {
    let shape = match self.len {
      Some(len) => Shape::Array { stem: self.stem.to_string(), element: Box::new(self.element.clone()), len },
      None => Shape::Slice { stem: self.stem.to_string(), element: Box::new(self.element.clone()) },
    };
    sequence_param(&TypeRef {
      canonical: self.canonical.to_string(),
      dynamic: false,
      head_size: 0,
      packed_size: None,
      stdlib: None,
      shape,
    })
  }

  pub fn owned_type(&self) -> String {
    match self.len {
      Some(len) => format!("[{}; {}]", rust_type(self.element), len),
      None => format!("Vec<{}>", rust_type(self.element)),
    }
  }

  fn element_size(&self) -> usize {
    if self.element.dynamic {
      32
    } else {
      self.element.head_size
    }
  }

  fn kind(&self) -> &'static str {
    if self.len.is_some() {
      "OffsetKind::ArrayElement"
    } else {
      "OffsetKind::SliceElement"
    }
  }
}

pub fn emit_sequence(out: &mut String, seq: &Sequence<'_>) -> fmt::Result {
  writeln!(out, "/* `{}` */", seq.canonical)?;
  emit_encoded_size(out, seq)?;
  emit_encode(out, seq)?;
  emit_decode(out, seq)?;
  emit_measure(out, seq)?;
  if seq.packed && seq.len.is_some() && seq.element.packed_size.is_some() {
    emit_encode_packed(out, seq)?;
  }
  Ok(())
}

fn emit_encoded_size(out: &mut String, seq: &Sequence<'_>) -> fmt::Result {
  let body = sequence_size(seq.element, seq.len);
  let values = if body.contains("values") { "values" } else { "_values" };
  writeln!(out, "pub fn encoded_size_{}({}: {}) -> usize {{", seq.stem, values, seq.param())?;
  writeln!(out, "    {}", body)?;
  writeln!(out, "}}")?;
  writeln!(out)
}

fn emit_encode(out: &mut String, seq: &Sequence<'_>) -> fmt::Result {
  writeln!(
    out,
    "pub fn encode_{}(values: {}, buf: &mut [u8]) -> Result<usize, EncodeError> {{",
    seq.stem,
    seq.param()
  )?;
  writeln!(out, "    let size = encoded_size_{}(values);", seq.stem)?;
  writeln!(out, "    ensure_capacity(buf, size)?;")?;
  let frame = if seq.len.is_none() {
    writeln!(out, "    write_usize(buf, values.len());")?;
    writeln!(out, "    let frame = &mut buf[WORD..];")?;
    "frame"
  } else {
    "buf"
  };
  if seq.element.dynamic {
    writeln!(out, "    let mut dynamic = values.len() * WORD;")?;
    writeln!(out, "    for (idx, item) in values.iter().enumerate() {{")?;
    writeln!(out, "        write_usize(&mut {}[idx * WORD..], dynamic);", frame)?;
    writeln!(
      out,
      "        dynamic += {};",
      tail_write(seq.element, ITEM, &format!("&mut {}[dynamic..]", frame))
    )?;
    writeln!(out, "    }}")?;
    writeln!(out, "    debug_assert_eq!(size, {}dynamic);", if seq.len.is_none() { "WORD + " } else { "" })?;
  } else {
    writeln!(out, "    for (idx, item) in values.iter().enumerate() {{")?;
    let at = format!("&mut {}[idx * {}..]", frame, seq.element_size());
    for line in static_write(seq.element, ITEM, &at) {
      writeln!(out, "        {}", line)?;
    }
    writeln!(out, "    }}")?;
  }
  writeln!(out, "    Ok(size)")?;
  writeln!(out, "}}")?;
  writeln!(out)
}

/* Opens a decode or measure body: binds `len`, `frame` and `head` */
fn emit_frame_prologue(out: &mut String, seq: &Sequence<'_>) -> fmt::Result {
  match seq.len {
    Some(len) => {
      writeln!(out, "    let len = {};", len)?;
      writeln!(out, "    let frame = data;")?;
      writeln!(out, "    let head = {};", len * seq.element_size())?;
    }
    None => {
      writeln!(out, "    let len = read_length(data)?;")?;
      writeln!(out, "    let frame = &data[WORD..];")?;
      if seq.element_size() == 0 {
        writeln!(out, "    if len > frame.len() {{")?;
        writeln!(out, "        return Err(DecodeError::LengthOverflow);")?;
        writeln!(out, "    }}")?;
      }
      writeln!(out, "    let head = region_size(len, {})?;", seq.element_size())?;
    }
  }
  writeln!(out, "    ensure_len(frame, head)?;")
}

fn consumed(seq: &Sequence<'_>, frame_size: &str) -> String {
  if seq.len.is_none() {
    format!("WORD + {}", frame_size)
  } else {
    frame_size.to_string()
  }
}

fn emit_decode(out: &mut String, seq: &Sequence<'_>) -> fmt::Result {
  writeln!(
    out,
    "pub fn decode_{}(data: &[u8]) -> Result<({}, usize), DecodeError> {{",
    seq.stem,
    seq.owned_type()
  )?;
  emit_frame_prologue(out, seq)?;
  writeln!(out, "    let mut items = Vec::with_capacity(len);")?;
  let frame_size = if seq.element.dynamic {
    writeln!(out, "    let mut expected = head;")?;
    writeln!(out, "    for idx in 0..len {{")?;
    writeln!(out, "        check_offset(frame, idx * WORD, expected, {}, idx)?;", seq.kind())?;
    writeln!(out, "        let (item, used) = {};", tail_read(seq.element, "tail(frame, expected)?"))?;
    writeln!(out, "        items.push(item);")?;
    writeln!(out, "        expected += used;")?;
    writeln!(out, "    }}")?;
    "expected"
  } else {
    writeln!(out, "    for idx in 0..len {{")?;
    writeln!(
      out,
      "        items.push({});",
      static_read(seq.element, &format!("&frame[idx * {}..]", seq.element_size()))
    )?;
    writeln!(out, "    }}")?;
    "head"
  };
  let value = if seq.len.is_some() { "array_from_vec(items)?" } else { "items" };
  writeln!(out, "    Ok(({}, {}))", value, consumed(seq, frame_size))?;
  writeln!(out, "}}")?;
  writeln!(out)
}

fn emit_measure(out: &mut String, seq: &Sequence<'_>) -> fmt::Result {
  writeln!(out, "pub fn measure_{}(data: &[u8]) -> Result<usize, DecodeError> {{", seq.stem)?;
  emit_frame_prologue(out, seq)?;
  let frame_size = if seq.element.dynamic {
    writeln!(out, "    let mut expected = head;")?;
    writeln!(out, "    for idx in 0..len {{")?;
    writeln!(out, "        check_offset(frame, idx * WORD, expected, {}, idx)?;", seq.kind())?;
    writeln!(out, "        expected += {};", tail_measure(seq.element, "tail(frame, expected)?"))?;
    writeln!(out, "    }}")?;
    "expected"
  } else {
    writeln!(out, "    for idx in 0..len {{")?;
    writeln!(
      out,
      "        {}",
      static_measure(seq.element, &format!("&frame[idx * {}..]", seq.element_size()))
    )?;
    writeln!(out, "    }}")?;
    "head"
  };
  writeln!(out, "    Ok({})", consumed(seq, frame_size))?;
  writeln!(out, "}}")?;
  writeln!(out)
}

fn emit_encode_packed(out: &mut String, seq: &Sequence<'_>) -> fmt::Result {
  writeln!(
    out,
    "pub fn encode_packed_{}(values: {}, out: &mut Vec<u8>) -> Result<(), EncodeError> {{",
    seq.stem,
    seq.param()
  )?;
  writeln!(out, "    for item in values.iter() {{")?;
  for line in packed_write(seq.element, ITEM) {
    writeln!(out, "        {}", line)?;
  }
  writeln!(out, "    }}")?;
  writeln!(out, "    Ok(())")?;
  writeln!(out, "}}")?;
  writeln!(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn uint(bits: u16) -> TypeRef {
    TypeRef {
      canonical: format!("uint{}", bits),
      dynamic: false,
      head_size: 32,
      packed_size: Some(bits as usize / 8),
      stdlib: None,
      shape: Shape::Uint { bits },
    }
  }

  fn string() -> TypeRef {
    TypeRef {
      canonical: "string".to_string(),
      dynamic: true,
      head_size: 32,
      packed_size: None,
      stdlib: None,
      shape: Shape::String,
    }
  }

  fn render(seq: &Sequence<'_>) -> String {
    let mut out = String::new();
    emit_sequence(&mut out, seq).unwrap();
    out
  }

  #[test]
  fn static_slice() {
    let element = uint(24);
    let out = render(&Sequence {
      stem: "uint24_slice",
      canonical: "uint24[]",
      element: &element,
      len: None,
      packed: false,
    });
    assert!(out.contains("pub fn encoded_size_uint24_slice(values: &[u32]) -> usize {\n    WORD + values.len() * 32\n}"));
    assert!(out.contains("check_uint_width_u64((*item) as u64, 24)?;"));
    assert!(out.contains("write_u64(&mut frame[idx * 32..], (*item) as u64);"));
    assert!(out.contains("items.push(read_u64(&frame[idx * 32..], 24)? as u32);"));
    assert!(out.contains("let head = region_size(len, 32)?;"));
    assert!(out.contains("Ok((items, WORD + head))"));
    assert!(!out.contains("LengthOverflow"));
  }

  #[test]
  fn dynamic_array() {
    let element = string();
    let out = render(&Sequence {
      stem: "string_array2",
      canonical: "string[2]",
      element: &element,
      len: Some(2),
      packed: true,
    });
    assert!(out.contains("pub fn decode_string_array2(data: &[u8]) -> Result<([String; 2], usize), DecodeError> {"));
    assert!(out.contains("let head = 64;"));
    assert!(out.contains("check_offset(frame, idx * WORD, expected, OffsetKind::ArrayElement, idx)?;"));
    assert!(out.contains("let (item, used) = read_string(tail(frame, expected)?)?;"));
    assert!(out.contains("Ok((array_from_vec(items)?, expected))"));
    assert!(out.contains("dynamic += write_bytes(&mut buf[dynamic..], (*item).as_bytes());"));
    /* strings have no packed form */
    assert!(!out.contains("encode_packed_string_array2"));
  }

  #[test]
  fn packed_array() {
    let element = uint(16);
    let out = render(&Sequence {
      stem: "uint16_array3",
      canonical: "uint16[3]",
      element: &element,
      len: Some(3),
      packed: true,
    });
    assert!(out.contains("pub fn encoded_size_uint16_array3(_values: &[u16; 3]) -> usize {\n    96\n}"));
    assert!(out.contains("pub fn encode_packed_uint16_array3(values: &[u16; 3], out: &mut Vec<u8>)"));
    assert!(out.contains("out.extend_from_slice(&word[30..]);"));
  }

  #[test]
  fn zero_sized_elements_are_capped() {
    let element = TypeRef {
      canonical: "bool[0]".to_string(),
      dynamic: false,
      head_size: 0,
      packed_size: Some(0),
      stdlib: None,
      shape: Shape::Array {
        stem: "bool_array0".to_string(),
        element: Box::new(TypeRef {
          canonical: "bool".to_string(),
          dynamic: false,
          head_size: 32,
          packed_size: Some(1),
          stdlib: None,
          shape: Shape::Bool,
        }),
        len: 0,
      },
    };
    let out = render(&Sequence {
      stem: "bool_array0_slice",
      canonical: "bool[0][]",
      element: &element,
      len: None,
      packed: false,
    });
    assert!(out.contains("if len > frame.len() {\n        return Err(DecodeError::LengthOverflow);"));
  }
}
