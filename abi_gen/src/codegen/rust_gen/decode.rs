/* Decoder snippets: strict head reads, tail reads, frame walks */

use super::helpers::{local_name, native_int, native_uint};
use crate::codegen::shared::{Shape, StructPlan, TypeRef};
use std::fmt::{self, Write};

/* Expression decoding a static value from the head bytes at `data` */
pub fn static_read(ty: &TypeRef, data: &str) -> String {
  if let Some(stem) = &ty.stdlib {
    return format!("stdlib::decode_{}({})?.0", stem, data);
  }
  match &ty.shape {
    Shape::Bool => format!("read_bool({})?", data),
    Shape::Address => format!("read_address({})?", data),
    Shape::FixedBytes { len } => format!("read_fixed_bytes::<{}>({})?", len, data),
    Shape::Uint { bits } => match native_uint(*bits) {
      Some("u64") => format!("read_u64({}, {})?", data, bits),
      Some(native) => format!("read_u64({}, {})? as {}", data, bits, native),
      None => format!("read_u256({}, {})?", data, bits),
    },
    Shape::Int { bits } => match native_int(*bits) {
      Some("i64") => format!("read_i64({}, {})?", data, bits),
      Some(native) => format!("read_i64({}, {})? as {}", data, bits, native),
      None => format!("read_i256({}, {})?", data, bits),
    },
    _ => format!("{}.0", tail_read(ty, data)),
  }
}

/* Expression decoding a value at `data`, yielding `(value, consumed)` */
pub fn tail_read(ty: &TypeRef, data: &str) -> String {
  if let Some(stem) = &ty.stdlib {
    return format!("stdlib::decode_{}({})?", stem, data);
  }
  match &ty.shape {
    Shape::Bool
    | Shape::Address
    | Shape::Uint { .. }
    | Shape::Int { .. }
    | Shape::FixedBytes { .. } => format!("({}, WORD)", static_read(ty, data)),
    Shape::Bytes => format!("read_bytes({})?", data),
    Shape::String => format!("read_string({})?", data),
    Shape::Tuple { name, .. } => format!("{}::decode({})?", name, data),
    Shape::Array { stem, .. } | Shape::Slice { stem, .. } => format!("decode_{}({})?", stem, data),
  }
}

/* Statement validating a static value without keeping it */
pub fn static_measure(ty: &TypeRef, data: &str) -> String {
  if let Some(stem) = &ty.stdlib {
    return format!("stdlib::decode_{}({})?;", stem, data);
  }
  match &ty.shape {
    Shape::Bool => format!("read_bool({})?;", data),
    Shape::Address => format!("read_address({})?;", data),
    Shape::Uint { bits } if native_uint(*bits).is_some() => format!("read_u64({}, {})?;", data, bits),
    Shape::Int { bits } if native_int(*bits).is_some() => format!("read_i64({}, {})?;", data, bits),
    Shape::Uint { bits } => format!("read_u256({}, {})?;", data, bits),
    Shape::Int { bits } => format!("read_i256({}, {})?;", data, bits),
    Shape::FixedBytes { len } => format!("read_fixed_bytes_slice({}, {})?;", data, len),
    _ => format!("{};", tail_measure(ty, data)),
  }
}

/* Expression validating the value at `data`, yielding its size */
pub fn tail_measure(ty: &TypeRef, data: &str) -> String {
  if let (Some(stem), true) = (&ty.stdlib, ty.dynamic) {
    return format!("stdlib::measure_{}({})?", stem, data);
  }
  match &ty.shape {
    Shape::Bytes => format!("read_bytes_slice({})?.1", data),
    Shape::String => format!("read_str({})?.1", data),
    Shape::Tuple { name, .. } => format!("{}::measure({})?", name, data),
    Shape::Array { stem, .. } | Shape::Slice { stem, .. } => format!("measure_{}({})?", stem, data),
    _ => format!("{{ {} WORD }}", static_measure(ty, data)),
  }
}

/* Decodes every member of a frame at `data` into `<ident>_` locals.
 * When the frame has tails the running offset ends up in `expected`,
 * which is then the frame's consumed size. */
/// Decodes every member of a frame at `data` into locals. With
/// `keep_total` the running `expected` ends as the frame's encoded size;
/// without it the last tail is not added.
pub fn emit_frame_decode(out: &mut String, plan: &StructPlan, head: &str, indent: &str, keep_total: bool) -> fmt::Result {
  writeln!(out, "{}ensure_len(data, {})?;", indent, head)?;
  let dynamic = plan.dynamic_count();
  let updates = if keep_total { dynamic } else { dynamic.saturating_sub(1) };
  if updates > 0 {
    writeln!(out, "{}let mut expected = {};", indent, head)?;
  } else if dynamic > 0 {
    writeln!(out, "{}let expected = {};", indent, head)?;
  }
  let mut seen = 0;
  for (idx, field) in plan.fields.iter().enumerate() {
    let local = local_name(&field.ident);
    if field.ty.dynamic {
      seen += 1;
      writeln!(
        out,
        "{}check_offset(data, {}, expected, OffsetKind::DynamicField, {})?;",
        indent, field.head_offset, idx
      )?;
      if seen > updates {
        writeln!(out, "{}let ({}, _) = {};", indent, local, tail_read(&field.ty, "tail(data, expected)?"))?;
        continue;
      }
      writeln!(
        out,
        "{}let ({}, used) = {};",
        indent,
        local,
        tail_read(&field.ty, "tail(data, expected)?")
      )?;
      writeln!(out, "{}expected += used;", indent)?;
    } else {
      writeln!(
        out,
        "{}let {} = {};",
        indent,
        local,
        static_read(&field.ty, &format!("&data[{}..]", field.head_offset))
      )?;
    }
  }
  Ok(())
}

/* Validates a frame at `data` without materialising it */
pub fn emit_frame_measure(out: &mut String, plan: &StructPlan, head: &str, indent: &str) -> fmt::Result {
  writeln!(out, "{}ensure_len(data, {})?;", indent, head)?;
  if plan.dynamic {
    writeln!(out, "{}let mut expected = {};", indent, head)?;
  }
  for (idx, field) in plan.fields.iter().enumerate() {
    if field.ty.dynamic {
      writeln!(
        out,
        "{}check_offset(data, {}, expected, OffsetKind::DynamicField, {})?;",
        indent, field.head_offset, idx
      )?;
      writeln!(
        out,
        "{}expected += {};",
        indent,
        tail_measure(&field.ty, "tail(data, expected)?")
      )?;
    } else {
      writeln!(
        out,
        "{}{}",
        indent,
        static_measure(&field.ty, &format!("&data[{}..]", field.head_offset))
      )?;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ty(shape: Shape, dynamic: bool) -> TypeRef {
    TypeRef {
      canonical: String::new(),
      dynamic,
      head_size: 32,
      packed_size: None,
      stdlib: None,
      shape,
    }
  }

  #[test]
  fn static_reads() {
    assert_eq!(static_read(&ty(Shape::Uint { bits: 24 }, false), "d"), "read_u64(d, 24)? as u32");
    assert_eq!(static_read(&ty(Shape::Uint { bits: 64 }, false), "d"), "read_u64(d, 64)?");
    assert_eq!(static_read(&ty(Shape::Int { bits: 256 }, false), "d"), "read_i256(d, 256)?");
    assert_eq!(static_read(&ty(Shape::FixedBytes { len: 4 }, false), "d"), "read_fixed_bytes::<4>(d)?");
    assert_eq!(
      static_read(&ty(Shape::Tuple { name: "Order".into(), external: false }, false), "d"),
      "Order::decode(d)?.0"
    );
  }

  #[test]
  fn tails() {
    assert_eq!(tail_read(&ty(Shape::String, true), "t"), "read_string(t)?");
    assert_eq!(tail_measure(&ty(Shape::String, true), "t"), "read_str(t)?.1");
    let routed = TypeRef {
      stdlib: Some("uint256_slice".into()),
      ..ty(Shape::Bytes, true)
    };
    assert_eq!(tail_measure(&routed, "t"), "stdlib::measure_uint256_slice(t)?");
  }
}
