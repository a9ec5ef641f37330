/* Encoder snippets: head words, tail payloads and whole frames */

use super::helpers::{escape_rust_keyword, is_exact_width, native_uint, packed_range};
use super::size::frame_size;
use crate::codegen::shared::{FieldPlan, Shape, StructPlan, TypeRef};
use std::fmt::{self, Write};

/* Statements writing a static value's head bytes into `buf` */
pub fn static_write(ty: &TypeRef, place: &str, buf: &str) -> Vec<String> {
  if let Some(stem) = &ty.stdlib {
    return vec![format!("stdlib::encode_{}(&{}, {})?;", stem, place, buf)];
  }
  match &ty.shape {
    Shape::Bool => vec![format!("write_bool({}, {});", buf, place)],
    Shape::Address => vec![format!("write_address({}, &{});", buf, place)],
    Shape::Uint { bits } if native_uint(*bits).is_some() => {
      let value = if *bits > 32 { place.to_string() } else { format!("{} as u64", place) };
      let mut lines = Vec::new();
      if !is_exact_width(*bits) {
        lines.push(format!("check_uint_width_u64({}, {})?;", value, bits));
      }
      lines.push(format!("write_u64({}, {});", buf, value));
      lines
    }
    Shape::Int { bits } if native_uint(*bits).is_some() => {
      let value = if *bits > 32 { place.to_string() } else { format!("{} as i64", place) };
      let mut lines = Vec::new();
      if !is_exact_width(*bits) {
        lines.push(format!("check_int_width_i64({}, {})?;", value, bits));
      }
      lines.push(format!("write_i64({}, {});", buf, value));
      lines
    }
    Shape::Uint { bits } => vec![format!("write_u256({}, &{}, {})?;", buf, place, bits)],
    Shape::Int { bits } => vec![format!("write_i256({}, &{}, {})?;", buf, place, bits)],
    Shape::FixedBytes { .. } => vec![format!("write_fixed_bytes({}, {}.as_slice());", buf, place)],
    Shape::Tuple { .. } => vec![format!("{}.encode_into({})?;", place, buf)],
    Shape::Array { stem, .. } | Shape::Slice { stem, .. } => {
      vec![format!("encode_{}(&{}, {})?;", stem, place, buf)]
    }
    Shape::Bytes | Shape::String => vec![tail_write(ty, place, buf) + ";"],
  }
}

/* Expression writing a dynamic value's tail payload, yielding its size */
pub fn tail_write(ty: &TypeRef, place: &str, buf: &str) -> String {
  if let Some(stem) = &ty.stdlib {
    return format!("stdlib::encode_{}(&{}, {})?", stem, place, buf);
  }
  match &ty.shape {
    Shape::Bytes => format!("write_bytes({}, &{})", buf, place),
    Shape::String => format!("write_bytes({}, {}.as_bytes())", buf, place),
    Shape::Tuple { .. } => format!("{}.encode_into({})?", place, buf),
    Shape::Array { stem, .. } | Shape::Slice { stem, .. } => {
      format!("encode_{}(&{}, {})?", stem, place, buf)
    }
    _ => format!("{{ {} {} }}", static_write(ty, place, buf).join(" "), ty.head_size),
  }
}

/* Statements appending a value's packed form to `out` */
pub fn packed_write(ty: &TypeRef, place: &str) -> Vec<String> {
  if let Some(range) = packed_range(ty) {
    let mut lines = vec!["{".to_string(), "    let mut word = [0u8; WORD];".to_string()];
    for line in static_write(ty, place, "&mut word") {
      lines.push(format!("    {}", line));
    }
    lines.push(format!("    out.extend_from_slice(&word[{}]);", range));
    lines.push("}".to_string());
    return lines;
  }
  match &ty.shape {
    Shape::Tuple { .. } => vec![format!("{}.encode_packed_into(out)?;", place)],
    Shape::Array { stem, .. } => vec![format!("encode_packed_{}(&{}, out)?;", stem, place)],
    _ => Vec::new(),
  }
}

/* Writes a frame into `buf`, which the caller has already sized. Leaves
 * the frame's total size in `dynamic` when the frame has tails. */
pub fn emit_frame_encode(
  out: &mut String,
  plan: &StructPlan,
  head: &str,
  place_of: &dyn Fn(&FieldPlan) -> String,
  indent: &str,
) -> fmt::Result {
  if plan.dynamic {
    writeln!(out, "{}let mut dynamic = {};", indent, head)?;
  }
  for field in &plan.fields {
    let place = place_of(field);
    let at = format!("&mut buf[{}..]", field.head_offset);
    if field.ty.dynamic {
      writeln!(out, "{}write_usize({}, dynamic);", indent, at)?;
      writeln!(out, "{}dynamic += {};", indent, tail_write(&field.ty, &place, "&mut buf[dynamic..]"))?;
    } else {
      for line in static_write(&field.ty, &place, &at) {
        writeln!(out, "{}{}", indent, line)?;
      }
    }
  }
  Ok(())
}

/* Total encoded size of a frame whose members live at `place_of` */
pub fn frame_size_expr(plan: &StructPlan, head: &str, place_of: &dyn Fn(&FieldPlan) -> String, indent: &str) -> String {
  frame_size(
    head,
    plan.dynamic_fields().map(|field| (&field.ty, place_of(field))),
    indent,
  )
}

pub fn self_place(field: &FieldPlan) -> String {
  format!("self.{}", escape_rust_keyword(&field.ident))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scalar(shape: Shape) -> TypeRef {
    TypeRef {
      canonical: String::new(),
      dynamic: false,
      head_size: 32,
      packed_size: None,
      stdlib: None,
      shape,
    }
  }

  #[test]
  fn narrow_integers_are_width_checked() {
    assert_eq!(
      static_write(&scalar(Shape::Uint { bits: 24 }), "self.x", "buf"),
      vec!["check_uint_width_u64(self.x as u64, 24)?;", "write_u64(buf, self.x as u64);"]
    );
    assert_eq!(
      static_write(&scalar(Shape::Uint { bits: 64 }), "self.x", "buf"),
      vec!["write_u64(buf, self.x);"]
    );
    assert_eq!(
      static_write(&scalar(Shape::Int { bits: 128 }), "self.x", "buf"),
      vec!["write_i256(buf, &self.x, 128)?;"]
    );
  }

  #[test]
  fn packed_scalars_slice_the_word() {
    let lines = packed_write(&scalar(Shape::Address), "self.to");
    assert_eq!(lines[2], "    write_address(&mut word, &self.to);");
    assert_eq!(lines[3], "    out.extend_from_slice(&word[12..]);");
  }
}
