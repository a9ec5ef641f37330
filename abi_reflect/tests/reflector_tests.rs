use abi_loader::{parse_dsl, parse_json};
use abi_reflect::{ReflectError, Reflector, Value};
use abi_runtime::{Address, B256};
use serde_json::json;

const TOKEN: &str = r#"
function transfer(address to, uint256 amount) returns (bool)
function balanceOf(address owner) view returns (uint256)
function mint(address to, uint256 amount)
function mint(address to)
event Transfer(address indexed from, address indexed to, uint256 value)
event Memo(string indexed topic, string body) anonymous
error Unauthorized(address caller)
"#;

fn reflector() -> Reflector {
    Reflector::new(parse_dsl(TOKEN).unwrap())
}

fn one() -> Address {
    let mut raw = [0u8; 20];
    raw[19] = 1;
    Address::from(raw)
}

#[test]
fn transfer_calldata_matches_known_encoding() {
    let data = reflector()
        .encode_call_json(
            "transfer",
            &json!(["0x0000000000000000000000000000000000000001", 1000]),
        )
        .unwrap();
    assert_eq!(
        hex::encode(&data),
        concat!(
            "a9059cbb",
            "0000000000000000000000000000000000000000000000000000000000000001",
            "00000000000000000000000000000000000000000000000000000000000003e8",
        )
    );
}

#[test]
fn overloads_need_full_signatures() {
    let reflector = reflector();
    assert!(matches!(
        reflector.encode_call("mint", &[Value::Address(one())]),
        Err(ReflectError::UnknownFunction(_))
    ));
    let data = reflector
        .encode_call("mint(address)", &[Value::Address(one())])
        .unwrap();
    let decoded = reflector.decode_call(&data).unwrap();
    assert_eq!(decoded.signature, "mint(address)");
    assert_eq!(decoded.values, vec![Value::Address(one())]);
}

#[test]
fn returns_decode() {
    let reflector = reflector();
    let mut word = vec![0u8; 32];
    word[31] = 1;
    assert_eq!(
        reflector.decode_returns("transfer", &word).unwrap(),
        vec![Value::Bool(true)]
    );
    word[31] = 2;
    assert!(reflector.decode_returns("transfer", &word).is_err());
}

#[test]
fn logs_roundtrip_through_reflector() {
    let reflector = reflector();
    let log = reflector
        .encode_log(
            "Transfer",
            &[Value::Address(one()), Value::Address(one()), Value::uint(7)],
        )
        .unwrap();
    let decoded = reflector.decode_log(&log.topics, &log.data).unwrap();
    assert_eq!(decoded.name, "Transfer");
    assert_eq!(decoded.args["value"], json!(7));

    let memo = reflector
        .encode_log(
            "Memo",
            &[Value::String("t".into()), Value::String("hello".into())],
        )
        .unwrap();
    assert_eq!(memo.topics.len(), 1);
    let decoded = reflector.decode_log(&memo.topics, &memo.data).unwrap();
    assert!(decoded.anonymous);
    assert_eq!(decoded.values[1], Value::String("hello".into()));
}

#[test]
fn unknown_topic() {
    let err = reflector()
        .decode_log(&[B256::repeat_byte(9), B256::ZERO], &[])
        .unwrap_err();
    assert!(matches!(err, ReflectError::UnknownEvent(_)));
}

#[test]
fn custom_error_from_json_abi() {
    let abi = parse_json(
        r#"[{"type":"error","name":"Unauthorized","inputs":[{"name":"caller","type":"address"}]}]"#,
    )
    .unwrap();
    let reflector = Reflector::new(abi);
    let mut data = abi_runtime::selector("Unauthorized(address)").to_vec();
    data.extend([0u8; 32]);
    let decoded = reflector.decode_error(&data).unwrap();
    assert_eq!(decoded.name, "Unauthorized");
    assert_eq!(
        serde_json::to_value(&decoded).unwrap()["args"]["caller"],
        json!("0x0000000000000000000000000000000000000000")
    );
}
