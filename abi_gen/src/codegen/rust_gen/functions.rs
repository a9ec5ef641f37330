/* Declaration-level emitters: calls, returns, logs, reverts, constructor */

use super::decode::{emit_frame_decode, static_read};
use super::encode::{emit_frame_encode, frame_size_expr, static_write};
use super::helpers::{byte_array_literal, escape_rust_keyword, local_name, rust_type};
use super::types::{emit_struct, StructOptions};
use super::view::{emit_struct_view, struct_view_name};
use crate::codegen::shared::{ConstructorPlan, ErrorPlan, EventPlan, FieldPlan, FunctionPlan, StructPlan};
use std::fmt::{self, Write};

pub struct Context<'a> {
  pub runtime: &'a str,
  pub lazy_views: bool,
  pub packed: bool,
}

fn const_prefix(ident: &str) -> String {
  ident.to_uppercase()
}

fn emit_frame_struct(out: &mut String, plan: &StructPlan, doc: &str, packed: bool, cx: &Context<'_>) -> fmt::Result {
  emit_struct(out, plan, &StructOptions { doc, packed })?;
  if cx.lazy_views {
    emit_struct_view(out, plan)?;
  }
  Ok(())
}

/* `prefix + body` where the body is the frame's standard encoding */
fn emit_prefixed_encode(out: &mut String, prefix: &str, value: &str) -> fmt::Result {
  writeln!(out, "    let mut out = vec![0u8; 4 + {}.encoded_size()];", value)?;
  writeln!(out, "    out[..4].copy_from_slice(&{});", prefix)?;
  writeln!(out, "    {}.encode_into(&mut out[4..])?;", value)?;
  writeln!(out, "    Ok(out)")
}

pub fn emit_function(out: &mut String, func: &FunctionPlan, cx: &Context<'_>) -> fmt::Result {
  let prefix = const_prefix(&func.ident);
  let selector = format!("{}_SELECTOR", prefix);
  writeln!(out, "/* {} ({}) */", func.signature, func.mutability)?;
  writeln!(out, "pub const {}_SIGNATURE: &str = \"{}\";", prefix, func.signature)?;
  writeln!(out, "pub const {}: [u8; 4] = {};", selector, byte_array_literal(&func.selector, ""))?;
  writeln!(out)?;

  emit_frame_struct(out, &func.inputs, &format!("Arguments of `{}`.", func.signature), func.packed, cx)?;
  emit_frame_struct(out, &func.outputs, &format!("Return values of `{}`.", func.signature), false, cx)?;

  let call = &func.inputs.name;
  let returns = &func.outputs.name;
  writeln!(out, "/// Selector followed by the encoded arguments.")?;
  writeln!(
    out,
    "pub fn encode_{}_call(call: &{}) -> Result<Vec<u8>, EncodeError> {{",
    func.ident, call
  )?;
  emit_prefixed_encode(out, &selector, "call")?;
  writeln!(out, "}}")?;
  writeln!(out)?;

  writeln!(out, "pub fn decode_{}_call(data: &[u8]) -> Result<{}, DecodeError> {{", func.ident, call)?;
  writeln!(out, "    let body = check_selector(data, &{})?;", selector)?;
  writeln!(out, "    Ok({}::decode(body)?.0)", call)?;
  writeln!(out, "}}")?;
  writeln!(out)?;

  if cx.lazy_views {
    let view = struct_view_name(call);
    writeln!(
      out,
      "pub fn decode_{}_call_view(data: &[u8]) -> Result<{}<'_>, DecodeError> {{",
      func.ident, view
    )?;
    writeln!(out, "    {}::new(check_selector(data, &{})?)", view, selector)?;
    writeln!(out, "}}")?;
    writeln!(out)?;
  }

  writeln!(
    out,
    "pub fn encode_{}_returns(returns: &{}) -> Result<Vec<u8>, EncodeError> {{",
    func.ident, returns
  )?;
  writeln!(out, "    returns.encode()")?;
  writeln!(out, "}}")?;
  writeln!(out)?;

  writeln!(out, "pub fn decode_{}_returns(data: &[u8]) -> Result<{}, DecodeError> {{", func.ident, returns)?;
  writeln!(out, "    Ok({}::decode(data)?.0)", returns)?;
  writeln!(out, "}}")?;
  writeln!(out)?;

  if func.packed && func.inputs.packed_size.is_some() {
    writeln!(out, "/// Arguments concatenated without padding, offsets or selector.")?;
    writeln!(
      out,
      "pub fn encode_{}_packed(call: &{}) -> Result<Vec<u8>, EncodeError> {{",
      func.ident, call
    )?;
    writeln!(out, "    let mut out = Vec::with_capacity({}::PACKED_SIZE);", call)?;
    writeln!(out, "    call.encode_packed_into(&mut out)?;")?;
    writeln!(out, "    Ok(out)")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
  }
  Ok(())
}

pub fn emit_error(out: &mut String, error: &ErrorPlan, cx: &Context<'_>) -> fmt::Result {
  let prefix = const_prefix(&error.ident);
  let selector = format!("{}_ERROR_SELECTOR", prefix);
  writeln!(out, "pub const {}_ERROR_SIGNATURE: &str = \"{}\";", prefix, error.signature)?;
  writeln!(out, "pub const {}: [u8; 4] = {};", selector, byte_array_literal(&error.selector, ""))?;
  writeln!(out)?;
  emit_frame_struct(out, &error.inputs, &format!("Revert payload `{}`.", error.signature), false, cx)?;

  let name = &error.inputs.name;
  writeln!(
    out,
    "pub fn encode_{}_error(error: &{}) -> Result<Vec<u8>, EncodeError> {{",
    error.ident, name
  )?;
  emit_prefixed_encode(out, &selector, "error")?;
  writeln!(out, "}}")?;
  writeln!(out)?;

  writeln!(out, "pub fn decode_{}_error(data: &[u8]) -> Result<{}, DecodeError> {{", error.ident, name)?;
  writeln!(out, "    let body = check_selector(data, &{})?;", selector)?;
  writeln!(out, "    Ok({}::decode(body)?.0)", name)?;
  writeln!(out, "}}")?;
  writeln!(out)
}

pub fn emit_constructor(out: &mut String, ctor: &ConstructorPlan, cx: &Context<'_>) -> fmt::Result {
  emit_frame_struct(
    out,
    &ctor.inputs,
    &format!("Constructor arguments ({}).", ctor.mutability),
    false,
    cx,
  )?;
  let name = &ctor.inputs.name;
  writeln!(out, "/// Encoded arguments, appended to the contract's init code.")?;
  writeln!(out, "pub fn encode_constructor_args(args: &{}) -> Result<Vec<u8>, EncodeError> {{", name)?;
  writeln!(out, "    args.encode()")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  writeln!(out, "pub fn decode_constructor_args(data: &[u8]) -> Result<{}, DecodeError> {{", name)?;
  writeln!(out, "    Ok({}::decode(data)?.0)", name)?;
  writeln!(out, "}}")?;
  writeln!(out)
}

/* Events */

pub fn emit_event(out: &mut String, event: &EventPlan, cx: &Context<'_>) -> fmt::Result {
  let prefix = const_prefix(&event.ident);
  let topic = format!("{}_EVENT_TOPIC", prefix);
  writeln!(out, "pub const {}_EVENT_SIGNATURE: &str = \"{}\";", prefix, event.signature)?;
  if !event.anonymous {
    writeln!(out, "pub const {}: [u8; 32] = {};", topic, byte_array_literal(&event.topic, ""))?;
  }
  writeln!(out)?;

  let anonymous = if event.anonymous { "anonymous " } else { "" };
  writeln!(out, "/// Inputs of the {}event `{}` in declaration order.", anonymous, event.signature)?;
  writeln!(out, "#[derive(Debug, Clone, PartialEq, Eq)]")?;
  if event.fields.is_empty() {
    writeln!(out, "pub struct {} {{}}", event.struct_name)?;
  } else {
    writeln!(out, "pub struct {} {{", event.struct_name)?;
    for field in &event.fields {
      if field.hashed {
        writeln!(out, "    /// keccak256 of the `{}` value", field.declared)?;
      }
      writeln!(out, "    pub {}: {},", escape_rust_keyword(&field.ident), rust_type(&field.ty))?;
    }
    writeln!(out, "}}")?;
  }
  writeln!(out)?;

  emit_encode_log(out, event, &topic, cx)?;
  emit_decode_log(out, event, &topic)
}

fn event_place(field: &FieldPlan) -> String {
  format!("event.{}", escape_rust_keyword(&field.ident))
}

fn emit_encode_log(out: &mut String, event: &EventPlan, topic: &str, cx: &Context<'_>) -> fmt::Result {
  let param = if event.fields.is_empty() { "_event" } else { "event" };
  writeln!(
    out,
    "pub fn encode_{}_log({}: &{}) -> Result<{}::Log, EncodeError> {{",
    event.ident, param, event.struct_name, cx.runtime
  )?;
  let count = event.topic_count();
  if count == 0 {
    writeln!(out, "    let topics = Vec::new();")?;
  } else {
    writeln!(out, "    let mut topics = Vec::with_capacity({});", count)?;
  }
  if !event.anonymous {
    writeln!(out, "    topics.push(B256::from({}));", topic)?;
  }
  for field in event.fields.iter().filter(|field| field.indexed) {
    let place = format!("event.{}", escape_rust_keyword(&field.ident));
    if field.hashed {
      writeln!(out, "    topics.push({});", place)?;
      continue;
    }
    writeln!(out, "    topics.push({{")?;
    writeln!(out, "        let mut word = [0u8; WORD];")?;
    for line in static_write(&field.ty, &place, "&mut word") {
      writeln!(out, "        {}", line)?;
    }
    writeln!(out, "        B256::from(word)")?;
    writeln!(out, "    }});")?;
  }

  let data = &event.data;
  if data.fields.is_empty() {
    writeln!(out, "    let data = Vec::new();")?;
  } else {
    writeln!(out, "    let data = {{")?;
    writeln!(
      out,
      "        let size = {};",
      frame_size_expr(data, &data.head_size.to_string(), &event_place, "        ")
    )?;
    writeln!(out, "        let mut buf = vec![0u8; size];")?;
    emit_frame_encode(out, data, &data.head_size.to_string(), &event_place, "        ")?;
    if data.dynamic {
      writeln!(out, "        debug_assert_eq!(dynamic, size);")?;
    }
    writeln!(out, "        buf")?;
    writeln!(out, "    }};")?;
  }
  writeln!(out, "    Ok({}::Log {{ topics, data }})", cx.runtime)?;
  writeln!(out, "}}")?;
  writeln!(out)
}

fn emit_decode_log(out: &mut String, event: &EventPlan, topic: &str) -> fmt::Result {
  let param = if event.data.fields.is_empty() { "_data" } else { "data" };
  writeln!(
    out,
    "pub fn decode_{}_log(topics: &[B256], {}: &[u8]) -> Result<{}, DecodeError> {{",
    event.ident, param, event.struct_name
  )?;
  let topic0 = if event.anonymous { "None".to_string() } else { format!("Some(&{})", topic) };
  writeln!(out, "    check_topics(topics, {}, {})?;", event.topic_count(), topic0)?;

  let mut slot = usize::from(!event.anonymous);
  for field in event.fields.iter().filter(|field| field.indexed) {
    let read = if field.hashed {
      format!("topics[{}]", slot)
    } else {
      static_read(&field.ty, &format!("topics[{}].as_slice()", slot))
    };
    writeln!(out, "    let {} = {};", local_name(&field.ident), read)?;
    slot += 1;
  }
  if !event.data.fields.is_empty() {
    emit_frame_decode(out, &event.data, &event.data.head_size.to_string(), "    ", false)?;
  }

  if event.fields.is_empty() {
    writeln!(out, "    Ok({} {{}})", event.struct_name)?;
  } else {
    writeln!(out, "    Ok({} {{", event.struct_name)?;
    for field in &event.fields {
      writeln!(out, "        {}: {},", escape_rust_keyword(&field.ident), local_name(&field.ident))?;
    }
    writeln!(out, "    }})")?;
  }
  writeln!(out, "}}")?;
  writeln!(out)
}
