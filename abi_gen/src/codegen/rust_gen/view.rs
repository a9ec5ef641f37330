/* Zero-copy views
 *
 * A view validates an encoding once (exactly as `measure` does) and then
 * hands out members on demand. Bytes and strings borrow from the input,
 * generated aggregates come back as nested views unless their elements
 * are in the stdlib catalogue, everything else is decoded when accessed.
 */

use super::decode::{static_measure, static_read, tail_measure, tail_read};
use super::helpers::{escape_rust_keyword, rust_type, sequence_view_name};
use super::sequence::Sequence;
use crate::codegen::shared::{Shape, StructPlan, TypeRef};
use std::fmt::{self, Write};

const VIEW_METHODS: &[&str] = &["new", "as_bytes", "encoded_len", "materialize"];

pub fn struct_view_name(name: &str) -> String {
  format!("{}View", name)
}

/* Return type and expression reading a member that starts at `at` */
fn access(ty: &TypeRef, at: &str) -> (String, String) {
  match &ty.shape {
    Shape::Bytes => ("&'a [u8]".to_string(), format!("Ok(read_bytes_slice({})?.0)", at)),
    Shape::String => ("&'a str".to_string(), format!("Ok(read_str({})?.0)", at)),
    Shape::Tuple { name, external: false } => {
      let view = struct_view_name(name);
      (format!("{}<'a>", view), format!("{}::new({})", view, at))
    }
    /* sequences of catalogued elements gain nothing from a view */
    Shape::Array { stem, element, .. } | Shape::Slice { stem, element }
      if ty.stdlib.is_none() && element.stdlib.is_none() =>
    {
      let view = sequence_view_name(stem);
      (format!("{}<'a>", view), format!("{}::new({})", view, at))
    }
    _ if ty.dynamic => (rust_type(ty), format!("Ok({}.0)", tail_read(ty, at))),
    _ => (rust_type(ty), format!("Ok({})", static_read(ty, at))),
  }
}

fn accessor_name(ident: &str) -> String {
  if VIEW_METHODS.contains(&ident) {
    format!("{}_", ident)
  } else {
    escape_rust_keyword(ident)
  }
}

pub fn emit_struct_view(out: &mut String, plan: &StructPlan) -> fmt::Result {
  let view = struct_view_name(&plan.name);
  let dynamic = plan.dynamic_count();

  writeln!(out, "/// Borrowed, validated encoding of [`{}`].", plan.name)?;
  writeln!(out, "#[derive(Debug, Clone, Copy)]")?;
  writeln!(out, "pub struct {}<'a> {{", view)?;
  writeln!(out, "    data: &'a [u8],")?;
  if dynamic > 0 {
    writeln!(out, "    offsets: [usize; {}],", dynamic)?;
  }
  writeln!(out, "}}")?;
  writeln!(out)?;

  writeln!(out, "impl<'a> {}<'a> {{", view)?;
  writeln!(out, "    pub fn new(data: &'a [u8]) -> Result<Self, DecodeError> {{")?;
  writeln!(out, "        ensure_len(data, {})?;", plan.head_size)?;
  if dynamic > 0 {
    writeln!(out, "        let mut offsets = [0usize; {}];", dynamic)?;
    writeln!(out, "        let mut expected = {};", plan.head_size)?;
  }
  for (idx, field) in plan.fields.iter().enumerate() {
    let at = format!("&data[{}..]", field.head_offset);
    match field.dynamic_index {
      Some(slot) if field.ty.dynamic => {
        writeln!(
          out,
          "        check_offset(data, {}, expected, OffsetKind::DynamicField, {})?;",
          field.head_offset, idx
        )?;
        writeln!(out, "        offsets[{}] = expected;", slot)?;
        writeln!(out, "        expected += {};", tail_measure(&field.ty, "tail(data, expected)?"))?;
      }
      _ => writeln!(out, "        {}", static_measure(&field.ty, &at))?,
    }
  }
  if dynamic > 0 {
    writeln!(out, "        Ok(Self {{ data: &data[..expected], offsets }})")?;
  } else {
    writeln!(out, "        Ok(Self {{ data: &data[..{}] }})", plan.head_size)?;
  }
  writeln!(out, "    }}")?;
  writeln!(out)?;
  emit_common(out, &plan.name)?;

  for field in &plan.fields {
    let at = match field.dynamic_index {
      Some(slot) if field.ty.dynamic => format!("&data[self.offsets[{}]..]", slot),
      _ => format!("&data[{}..]", field.head_offset),
    };
    let (ret, expr) = access(&field.ty, &at);
    writeln!(out)?;
    writeln!(out, "    pub fn {}(&self) -> Result<{}, DecodeError> {{", accessor_name(&field.ident), ret)?;
    writeln!(out, "        let data = self.data;")?;
    writeln!(out, "        {}", expr)?;
    writeln!(out, "    }}")?;
  }
  writeln!(out, "}}")?;
  writeln!(out)
}

/* `as_bytes`, `encoded_len`, `materialize` */
fn emit_common(out: &mut String, owned: &str) -> fmt::Result {
  writeln!(out, "    pub fn as_bytes(&self) -> &'a [u8] {{")?;
  writeln!(out, "        self.data")?;
  writeln!(out, "    }}")?;
  writeln!(out)?;
  writeln!(out, "    pub fn encoded_len(&self) -> usize {{")?;
  writeln!(out, "        self.data.len()")?;
  writeln!(out, "    }}")?;
  writeln!(out)?;
  writeln!(out, "    pub fn materialize(&self) -> Result<{}, DecodeError> {{", owned)?;
  writeln!(out, "        Ok({}::decode(self.data)?.0)", owned)?;
  writeln!(out, "    }}")
}

pub fn emit_sequence_view(out: &mut String, seq: &Sequence<'_>) -> fmt::Result {
  let view = sequence_view_name(seq.stem);
  writeln!(out, "/// Borrowed, validated encoding of `{}`.", seq.canonical)?;
  writeln!(out, "#[derive(Debug, Clone, Copy)]")?;
  writeln!(out, "pub struct {}<'a> {{", view)?;
  writeln!(out, "    data: &'a [u8],")?;
  writeln!(out, "    len: usize,")?;
  writeln!(out, "}}")?;
  writeln!(out)?;

  writeln!(out, "impl<'a> {}<'a> {{", view)?;
  writeln!(out, "    pub fn new(data: &'a [u8]) -> Result<Self, DecodeError> {{")?;
  writeln!(out, "        let size = measure_{}(data)?;", seq.stem)?;
  match seq.len {
    Some(len) => writeln!(out, "        Ok(Self {{ data: &data[..size], len: {} }})", len)?,
    None => {
      writeln!(out, "        let len = read_length(data)?;")?;
      writeln!(out, "        Ok(Self {{ data: &data[..size], len }})")?;
    }
  }
  writeln!(out, "    }}")?;
  writeln!(out)?;
  writeln!(out, "    pub fn len(&self) -> usize {{")?;
  writeln!(out, "        self.len")?;
  writeln!(out, "    }}")?;
  writeln!(out)?;
  writeln!(out, "    pub fn is_empty(&self) -> bool {{")?;
  writeln!(out, "        self.len == 0")?;
  writeln!(out, "    }}")?;
  writeln!(out)?;

  let element = seq.element;
  let (ret, expr) = if element.dynamic {
    access(element, "&frame[at..]")
  } else {
    let size = element.head_size;
    access(element, &format!("&frame[index * {}..]", size))
  };
  writeln!(out, "    pub fn get(&self, index: usize) -> Result<{}, DecodeError> {{", ret)?;
  writeln!(out, "        if index >= self.len {{")?;
  writeln!(out, "            return Err(DecodeError::IndexOutOfBounds {{ index, len: self.len }});")?;
  writeln!(out, "        }}")?;
  if seq.len.is_some() {
    writeln!(out, "        let frame = self.data;")?;
  } else {
    writeln!(out, "        let frame = &self.data[WORD..];")?;
  }
  if element.dynamic {
    writeln!(out, "        let at = read_length(&frame[index * WORD..])?;")?;
  }
  writeln!(out, "        {}", expr)?;
  writeln!(out, "    }}")?;
  writeln!(out)?;

  writeln!(out, "    pub fn as_bytes(&self) -> &'a [u8] {{")?;
  writeln!(out, "        self.data")?;
  writeln!(out, "    }}")?;
  writeln!(out)?;
  writeln!(out, "    pub fn materialize(&self) -> Result<{}, DecodeError> {{", seq.owned_type())?;
  writeln!(out, "        Ok(decode_{}(self.data)?.0)", seq.stem)?;
  writeln!(out, "    }}")?;
  writeln!(out, "}}")?;
  writeln!(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::codegen::shared::FieldPlan;

  fn field(ident: &str, ty: TypeRef, head_offset: usize, dynamic_index: Option<usize>) -> FieldPlan {
    FieldPlan {
      ident: ident.to_string(),
      abi_name: ident.to_string(),
      ty,
      head_offset,
      dynamic_index,
    }
  }

  fn scalar(canonical: &str, shape: Shape) -> TypeRef {
    TypeRef {
      canonical: canonical.to_string(),
      dynamic: false,
      head_size: 32,
      packed_size: None,
      stdlib: None,
      shape,
    }
  }

  fn dynamic(canonical: &str, shape: Shape) -> TypeRef {
    TypeRef { dynamic: true, ..scalar(canonical, shape) }
  }

  #[test]
  fn struct_view_borrows_dynamic_members() {
    let plan = StructPlan {
      name: "Memo".to_string(),
      fields: vec![
        field("id", scalar("uint64", Shape::Uint { bits: 64 }), 0, None),
        field("note", dynamic("string", Shape::String), 32, Some(0)),
        field(
          "new",
          dynamic("(bytes)", Shape::Tuple { name: "Blob".to_string(), external: false }),
          64,
          Some(1),
        ),
      ],
      head_size: 96,
      dynamic: true,
      packed_size: None,
    };
    let mut out = String::new();
    emit_struct_view(&mut out, &plan).unwrap();
    assert!(out.contains("pub struct MemoView<'a> {\n    data: &'a [u8],\n    offsets: [usize; 2],\n}"));
    assert!(out.contains("        offsets[1] = expected;\n        expected += Blob::measure(tail(data, expected)?)?;"));
    assert!(out.contains("pub fn id(&self) -> Result<u64, DecodeError> {"));
    assert!(out.contains("Ok(read_u64(&data[0..], 64)?)"));
    assert!(out.contains("pub fn note(&self) -> Result<&'a str, DecodeError> {"));
    assert!(out.contains("Ok(read_str(&data[self.offsets[0]..])?.0)"));
    assert!(out.contains("pub fn new_(&self) -> Result<BlobView<'a>, DecodeError> {"));
    assert!(out.contains("Ok(Memo::decode(self.data)?.0)"));
  }

  #[test]
  fn sequence_view_reads_element_offsets() {
    let element = dynamic("bytes", Shape::Bytes);
    let seq = Sequence {
      stem: "bytes_slice",
      canonical: "bytes[]",
      element: &element,
      len: None,
      packed: false,
    };
    let mut out = String::new();
    emit_sequence_view(&mut out, &seq).unwrap();
    assert!(out.contains("pub struct BytesSliceView<'a>"));
    assert!(out.contains("let size = measure_bytes_slice(data)?;"));
    assert!(out.contains("let at = read_length(&frame[index * WORD..])?;\n        Ok(read_bytes_slice(&frame[at..])?.0)"));
    assert!(out.contains("pub fn materialize(&self) -> Result<Vec<Vec<u8>>, DecodeError> {"));
  }
}
