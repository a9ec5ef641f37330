/* Rust Code Generation Tests
 *
 * These tests render whole interfaces and check the emitted module text:
 * constants, struct layouts, frame walks and the optional surfaces
 * (stdlib routing, external tuples, views, packed encoders).
 */

use abi_gen::abi::structural_hash;
use abi_gen::{generate, CodegenError, GeneratorOptions};
use abi_loader::parse_dsl;

const TOKEN: &str = r#"
// minimal token surface
constructor(string name, uint8 decimals)
function transfer(address to, uint256 amount) returns (bool)
function balanceOf(address owner) view returns (uint256)
event Transfer(address indexed from, address indexed to, uint256 value)
error InsufficientBalance(uint256 available, uint256 required)
"#;

const ORDERS: &str = r#"
struct Order {
    address maker;
    uint256[] amounts;
    string memo;
}
function place(Order order, bytes32 salt) returns (uint64 id)
function cancel(uint64 id)
event Placed(Order indexed order, uint64 id, string note) anonymous
"#;

fn render(source: &str, options: &GeneratorOptions) -> String {
    let abi = parse_dsl(source).unwrap();
    generate(&abi, "fixture", options).unwrap()
}

#[test]
fn module_header_and_runtime_import() {
    let code = render(TOKEN, &GeneratorOptions::default());
    assert!(code.starts_with("// Generated ABI codecs for fixture. Do not edit.\n"));
    assert!(code.contains("use abi_runtime::prelude::*;"));
    assert!(code.ends_with("}\n"));

    let options = GeneratorOptions {
        runtime_crate: "codec_rt".to_string(),
        ..GeneratorOptions::default()
    };
    let code = render(TOKEN, &options);
    assert!(code.contains("use codec_rt::prelude::*;"));
    assert!(code.contains("Result<codec_rt::Log, EncodeError>"));
}

#[test]
fn function_constants_and_static_frames() {
    let code = render(TOKEN, &GeneratorOptions::default());
    assert!(code.contains("pub const TRANSFER_SIGNATURE: &str = \"transfer(address,uint256)\";"));
    assert!(code.contains("pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];"));
    assert!(code.contains("pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];"));
    assert!(code.contains("pub struct TransferCall {\n    pub to: Address,\n    pub amount: U256,\n}"));
    assert!(code.contains("    pub const HEAD_SIZE: usize = 64;\n    pub const IS_DYNAMIC: bool = false;"));
    assert!(code.contains("        write_address(&mut buf[0..], &self.to);\n        write_u256(&mut buf[32..], &self.amount, 256)?;"));
    assert!(code.contains("        let to_ = read_address(&data[0..])?;\n        let amount_ = read_u256(&data[32..], 256)?;"));
    /* unnamed outputs get positional identifiers */
    assert!(code.contains("pub struct TransferReturns {\n    pub field_0: bool,\n}"));
    assert!(code.contains("pub fn encode_transfer_call(call: &TransferCall) -> Result<Vec<u8>, EncodeError> {"));
    assert!(code.contains("    let body = check_selector(data, &TRANSFER_SELECTOR)?;\n    Ok(TransferCall::decode(body)?.0)"));
    assert!(code.contains("pub fn decode_balance_of_returns(data: &[u8]) -> Result<BalanceOfReturns, DecodeError> {"));
}

#[test]
fn constructor_and_errors() {
    let code = render(TOKEN, &GeneratorOptions::default());
    assert!(code.contains("pub struct ConstructorArgs {\n    pub name: String,\n    pub decimals: u8,\n}"));
    assert!(code.contains("pub fn encode_constructor_args(args: &ConstructorArgs) -> Result<Vec<u8>, EncodeError> {"));
    assert!(code.contains(
        "pub const INSUFFICIENT_BALANCE_ERROR_SIGNATURE: &str = \"InsufficientBalance(uint256,uint256)\";"
    ));
    assert!(code.contains("pub struct InsufficientBalanceError {"));
    assert!(code.contains("check_selector(data, &INSUFFICIENT_BALANCE_ERROR_SELECTOR)?"));
}

#[test]
fn event_topics_and_data() {
    let code = render(TOKEN, &GeneratorOptions::default());
    assert!(code.contains("pub const TRANSFER_EVENT_TOPIC: [u8; 32] = [\n    0xdd, 0xf2, 0x52, 0xad, 0x1b, 0xe2, 0xc8, 0x9b,"));
    assert!(code.contains("    let mut topics = Vec::with_capacity(3);\n    topics.push(B256::from(TRANSFER_EVENT_TOPIC));"));
    assert!(code.contains("        write_address(&mut word, &event.from);\n        B256::from(word)"));
    assert!(code.contains("    check_topics(topics, 3, Some(&TRANSFER_EVENT_TOPIC))?;"));
    assert!(code.contains("    let to_ = read_address(topics[2].as_slice())?;"));
    assert!(code.contains("    let value_ = read_u256(&data[0..], 256)?;"));
}

#[test]
fn dynamic_struct_frames() {
    let code = render(ORDERS, &GeneratorOptions::default());
    assert!(code.contains("/// ABI tuple `(address,uint256[],string)`."));
    assert!(code.contains("pub struct Order {\n    pub maker: Address,\n    pub amounts: Vec<U256>,\n    pub memo: String,\n}"));
    assert!(code.contains("    pub const HEAD_SIZE: usize = 96;\n    pub const IS_DYNAMIC: bool = true;"));
    assert!(code.contains(
        "        Self::HEAD_SIZE\n            + encoded_size_uint256_slice(&self.amounts)\n            + bytes_encoded_size(self.memo.len())"
    ));
    assert!(code.contains("        write_usize(&mut buf[32..], dynamic);\n        dynamic += encode_uint256_slice(&self.amounts, &mut buf[dynamic..])?;"));
    assert!(code.contains("        dynamic += write_bytes(&mut buf[dynamic..], self.memo.as_bytes());"));
    assert!(code.contains("        check_offset(data, 64, expected, OffsetKind::DynamicField, 2)?;\n        let (memo_, used) = read_string(tail(data, expected)?)?;\n        expected += used;"));
    assert!(code.contains("        expected += read_str(tail(data, expected)?)?.1;"));

    /* Order is a dynamic member of PlaceCall */
    assert!(code.contains("        dynamic += self.order.encode_into(&mut buf[dynamic..])?;"));
    assert!(code.contains("let (order_, used) = Order::decode(tail(data, expected)?)?;"));
    assert!(code.contains("pub fn encode_uint256_slice(values: &[U256], buf: &mut [u8]) -> Result<usize, EncodeError> {"));
    assert!(code.contains("        items.push(read_u256(&frame[idx * 32..], 256)?);"));
}

#[test]
fn anonymous_event_with_hashed_topic() {
    let code = render(ORDERS, &GeneratorOptions::default());
    assert!(code.contains("pub const PLACED_EVENT_SIGNATURE: &str = \"Placed((address,uint256[],string),uint64,string)\";"));
    assert!(!code.contains("PLACED_EVENT_TOPIC"));
    assert!(code.contains("    /// keccak256 of the `(address,uint256[],string)` value\n    pub order: FixedBytes<32>,"));
    assert!(code.contains("    let mut topics = Vec::with_capacity(1);\n    topics.push(event.order);"));
    assert!(code.contains("    check_topics(topics, 1, None)?;\n    let order_ = topics[0];"));
    assert!(code.contains("check_offset(data, 32, expected, OffsetKind::DynamicField, 1)?;"));
    assert!(code.contains("        debug_assert_eq!(dynamic, size);"));
}

#[test]
fn event_decoders_leave_no_dead_assignments() {
    let code = render(ORDERS, &GeneratorOptions::default());
    assert!(code.contains("    ensure_len(data, 64)?;\n    let expected = 64;\n"));
    assert!(code.contains("    check_offset(data, 32, expected, OffsetKind::DynamicField, 1)?;\n    let (note_, _) = read_string(tail(data, expected)?)?;"));

    let code = render("event Noted(string a, bytes b)", &GeneratorOptions::default());
    assert!(code.contains(concat!(
        "    let mut expected = 64;\n",
        "    check_offset(data, 0, expected, OffsetKind::DynamicField, 0)?;\n",
        "    let (a_, used) = read_string(tail(data, expected)?)?;\n",
        "    expected += used;\n",
        "    check_offset(data, 32, expected, OffsetKind::DynamicField, 1)?;\n",
        "    let (b_, _) = read_bytes(tail(data, expected)?)?;\n",
    )));
}

#[test]
fn stdlib_routing_skips_generated_sequences() {
    let options = GeneratorOptions {
        stdlib: true,
        ..GeneratorOptions::default()
    };
    let code = render(ORDERS, &options);
    assert!(!code.contains("pub fn encode_uint256_slice"));
    assert!(code.contains("stdlib::encoded_size_uint256_slice(&self.amounts)"));
    assert!(code.contains("stdlib::encode_uint256_slice(&self.amounts, &mut buf[dynamic..])?"));
    assert!(code.contains("stdlib::decode_string(tail(data, expected)?)?"));
    assert!(code.contains("stdlib::measure_string(tail(data, expected)?)?"));
}

#[test]
fn external_tuples_are_referenced_not_emitted() {
    let abi = parse_dsl(ORDERS).unwrap();
    let order = &abi.functions[0].inputs[0].ty;
    let hash = structural_hash(&order.canonical_string());

    let mut options = GeneratorOptions::default();
    options.external_tuples.insert(hash, "crate::shared::Order".to_string());
    let code = generate(&abi, "orders", &options).unwrap();
    assert!(!code.contains("pub struct Order {"));
    assert!(!code.contains("encode_uint256_slice"));
    assert!(code.contains("    pub order: crate::shared::Order,"));
    assert!(code.contains("crate::shared::Order::decode(tail(data, expected)?)?"));
}

#[test]
fn lazy_views() {
    let options = GeneratorOptions {
        lazy_views: true,
        ..GeneratorOptions::default()
    };
    let code = render(ORDERS, &options);
    assert!(code.contains("pub struct OrderView<'a> {\n    data: &'a [u8],\n    offsets: [usize; 2],\n}"));
    assert!(code.contains("    pub fn memo(&self) -> Result<&'a str, DecodeError> {"));
    assert!(code.contains("    pub fn amounts(&self) -> Result<Uint256SliceView<'a>, DecodeError> {"));
    assert!(code.contains("    pub fn order(&self) -> Result<OrderView<'a>, DecodeError> {"));
    assert!(code.contains("pub fn decode_place_call_view(data: &[u8]) -> Result<PlaceCallView<'_>, DecodeError> {"));
    assert!(code.contains("    pub fn get(&self, index: usize) -> Result<U256, DecodeError> {"));
    assert!(code.contains("        Ok(read_u256(&frame[index * 32..], 256)?)"));
}

#[test]
fn views_decode_catalogued_sequences_eagerly() {
    let options = GeneratorOptions {
        stdlib: true,
        lazy_views: true,
        ..GeneratorOptions::default()
    };
    let code = render(
        "struct Outer { uint256 id; uint8[3] fixed; string note; uint8[3][] grid; }\nfunction put(Outer outer)",
        &options,
    );
    assert!(code.contains("    pub fn fixed(&self) -> Result<[u8; 3], DecodeError> {\n        let data = self.data;\n        Ok(decode_uint8_array3(&data[32..])?.0)"));
    assert!(code.contains("    pub fn grid(&self) -> Result<Uint8Array3SliceView<'a>, DecodeError> {"));
    assert!(!code.contains("Result<Uint8Array3View<'a>, DecodeError>"));
}

#[test]
fn packed_encoders() {
    let options = GeneratorOptions {
        packed: true,
        ..GeneratorOptions::default()
    };
    let code = render("function pack(uint16 a, bool b, address c, bytes4 d, int8[2] e)", &options);
    assert!(code.contains("    pub const PACKED_SIZE: usize = 29;"));
    assert!(code.contains("pub fn encode_pack_packed(call: &PackCall) -> Result<Vec<u8>, EncodeError> {"));
    assert!(code.contains("            write_u64(&mut word, self.a as u64);\n            out.extend_from_slice(&word[30..]);"));
    assert!(code.contains("out.extend_from_slice(&word[31..]);"));
    assert!(code.contains("out.extend_from_slice(&word[12..]);"));
    assert!(code.contains("out.extend_from_slice(&word[..4]);"));
    assert!(code.contains("        encode_packed_int8_array2(&self.e, out)?;"));
    assert!(code.contains("pub fn encode_packed_int8_array2(values: &[i8; 2], out: &mut Vec<u8>) -> Result<(), EncodeError> {"));

    let abi = parse_dsl("function f(uint8 a, string b)").unwrap();
    assert!(matches!(
        generate(&abi, "f", &options),
        Err(CodegenError::Declaration { .. })
    ));
}

#[test]
fn keywords_and_overloads() {
    let code = render(
        "function mint(uint256 type)\nfunction mint(address to, uint256 self)\nfunction move(bool flag)",
        &GeneratorOptions::default(),
    );
    assert!(code.contains("    pub r#type: U256,"));
    assert!(code.contains("    pub self_: U256,"));
    assert!(code.contains("            r#type: type_,"));
    assert!(code.contains("pub fn encode_move_call(call: &MoveCall)"));
    assert_eq!(code.matches("pub fn encode_mint_").count(), 4);
}

#[test]
fn declaration_toggles() {
    let options = GeneratorOptions {
        emit_events: false,
        emit_errors: false,
        ..GeneratorOptions::default()
    };
    let code = render(TOKEN, &options);
    assert!(code.contains("TRANSFER_SELECTOR"));
    assert!(!code.contains("TRANSFER_EVENT_TOPIC"));
    assert!(!code.contains("InsufficientBalanceError"));
}
