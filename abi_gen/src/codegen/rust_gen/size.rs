/* Encoded-size expressions for generated Rust code */

use crate::codegen::shared::{Shape, TypeRef};

/* Size of a dynamic value's tail payload; `place` names the value */
pub fn tail_size(ty: &TypeRef, place: &str) -> String {
  if let Some(stem) = &ty.stdlib {
    return format!("stdlib::encoded_size_{}(&{})", stem, place);
  }
  match &ty.shape {
    Shape::Bytes | Shape::String => format!("bytes_encoded_size({}.len())", place),
    Shape::Tuple { .. } => format!("{}.encoded_size()", place),
    Shape::Array { stem, .. } | Shape::Slice { stem, .. } => {
      format!("encoded_size_{}(&{})", stem, place)
    }
    _ => ty.head_size.to_string(),
  }
}

/* `head + tail_1 + tail_2 ...`, one term per line */
pub fn frame_size<'a>(head: &str, tails: impl Iterator<Item = (&'a TypeRef, String)>, indent: &str) -> String {
  let mut expr = head.to_string();
  for (ty, place) in tails {
    expr.push('\n');
    expr.push_str(indent);
    expr.push_str("    + ");
    expr.push_str(&tail_size(ty, &place));
  }
  expr
}

/* Body of `encoded_size_<stem>(values)` */
pub fn sequence_size(element: &TypeRef, len: Option<usize>) -> String {
  let head = match len {
    Some(len) => (len * element.head_size).to_string(),
    None if element.dynamic => "WORD + values.len() * WORD".to_string(),
    None => format!("WORD + values.len() * {}", element.head_size),
  };
  if !element.dynamic {
    return head;
  }
  format!(
    "{} + values.iter().map(|item| {}).sum::<usize>()",
    head,
    tail_size(element, "(*item)")
  )
}
