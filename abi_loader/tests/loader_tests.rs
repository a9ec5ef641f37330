use abi_loader::abi_types::{StateMutability, TypeDescriptor};
use abi_loader::{load_file, parse_dsl, parse_json, parse_yaml, ParseError};
use std::io::Write;

const ERC20_DSL: &str = r#"
// minimal token
function name() view returns (string)
function transfer(address to, uint256 amount) external returns (bool)
function transferFrom(address from, address to, uint amount) returns (bool);
event Transfer(address indexed from, address indexed to, uint256 value)
error InsufficientBalance(uint256 available, uint256 required)
"#;

#[test]
fn dsl_erc20() {
    let abi = parse_dsl(ERC20_DSL).unwrap();
    assert_eq!(abi.functions.len(), 3);
    assert_eq!(abi.functions[1].signature(), "transfer(address,uint256)");
    /* bare uint is uint256 */
    assert_eq!(
        abi.functions[2].signature(),
        "transferFrom(address,address,uint256)"
    );
    assert_eq!(abi.functions[0].state_mutability, StateMutability::View);
    assert_eq!(abi.events[0].signature(), "Transfer(address,address,uint256)");
    assert_eq!(abi.errors[0].signature(), "InsufficientBalance(uint256,uint256)");
}

#[test]
fn dsl_structs_resolve_forward_and_backward() {
    let abi = parse_dsl(
        r#"
        function fill(Order order, Fee[2] fees)
        struct Order {
            address maker;
            Asset[] assets;
        }
        struct Asset { address token; uint256 amount; }
        struct Fee { Asset asset; address recipient; }
        "#,
    )
    .unwrap();
    let fill = &abi.functions[0];
    assert_eq!(
        fill.signature(),
        "fill((address,(address,uint256)[]),((address,uint256),address)[2])"
    );
    let TypeDescriptor::Tuple(order) = &fill.inputs[0].ty else {
        panic!("expected tuple");
    };
    assert_eq!(order.struct_name.as_deref(), Some("Order"));
}

#[test]
fn dsl_struct_cycle() {
    let err = parse_dsl("struct A { B b; }\nstruct B { A a; }\n").unwrap_err();
    assert!(matches!(err, ParseError::CircularStructReference(_)));
}

#[test]
fn dsl_self_reference_through_slice() {
    let err = parse_dsl("struct Node { uint256 v; Node[] children; }").unwrap_err();
    assert!(matches!(err, ParseError::CircularStructReference(name) if name == "Node"));
}

#[test]
fn dsl_unknown_identifier_reports_line() {
    let err = parse_dsl("\n\nfunction f(Missing m)\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidType { line: 3, name } if name == "Missing"));
}

#[test]
fn dsl_rejects_arrays_too_large_to_lay_out() {
    let err = parse_dsl("function ok()\nfunction f(uint256[576460752303423488] x)\n").unwrap_err();
    assert!(matches!(err, ParseError::InvalidArraySize { line: 2, .. }));

    /* hidden behind a struct and a slice */
    let err = parse_dsl(
        "struct Big { bool[4611686018427387904] flags; }\nevent E(Big[] items)\n",
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::InvalidArraySize { line: 2, .. }));

    assert!(parse_dsl("function f(uint256[1000000] x)").is_ok());
}

#[test]
fn dsl_errors_carry_lines() {
    let err = parse_dsl("function ok()\nfunction bad(uint256\n").unwrap_err();
    assert!(matches!(err, ParseError::UnbalancedParentheses { line: 2 }));
    let err = parse_dsl("function ok()\nwhatever\n").unwrap_err();
    assert!(matches!(err, ParseError::UnrecognizedDeclaration { line: 2, .. }));
}

#[test]
fn overloads_stay_distinct() {
    let abi = parse_dsl("function f(uint256 a)\nfunction f(bytes b)\n").unwrap();
    assert_eq!(abi.functions.len(), 2);
    assert_ne!(abi.functions[0].signature(), abi.functions[1].signature());
}

const TUPLE_JSON: &str = r#"[
  {
    "type": "function",
    "name": "submit",
    "stateMutability": "payable",
    "inputs": [
      {
        "name": "orders",
        "type": "tuple[]",
        "internalType": "struct Exchange.Order[]",
        "components": [
          {"name": "maker", "type": "address", "internalType": "address"},
          {"name": "amounts", "type": "uint256[2]", "internalType": "uint256[2]"}
        ]
      }
    ],
    "outputs": []
  },
  {
    "type": "event",
    "name": "Submitted",
    "anonymous": false,
    "inputs": [
      {"name": "maker", "type": "address", "indexed": true},
      {"name": "memo", "type": "string", "indexed": false}
    ]
  },
  {"type": "receive", "stateMutability": "payable"}
]"#;

#[test]
fn json_tuples_and_internal_types() {
    let abi = parse_json(TUPLE_JSON).unwrap();
    let submit = &abi.functions[0];
    assert_eq!(submit.signature(), "submit((address,uint256[2])[])");
    assert_eq!(submit.state_mutability, StateMutability::Payable);
    let TypeDescriptor::Slice(element) = &submit.inputs[0].ty else {
        panic!("expected slice");
    };
    let TypeDescriptor::Tuple(order) = element.as_ref() else {
        panic!("expected tuple");
    };
    assert_eq!(order.struct_name.as_deref(), Some("Order"));
    assert!(abi.events[0].inputs[0].indexed);
    assert!(abi.receive.is_some());
}

#[test]
fn json_artifact_wrapper() {
    let artifact = format!(r#"{{"contractName":"X","abi":{TUPLE_JSON},"bytecode":"0x"}}"#);
    let abi = parse_json(&artifact).unwrap();
    assert_eq!(abi.functions.len(), 1);
}

#[test]
fn json_rejects_bad_types() {
    let err = parse_json(r#"[{"type":"function","name":"f","inputs":[{"name":"a","type":"uint7"}]}]"#)
        .unwrap_err();
    assert!(matches!(err, ParseError::InvalidEntryType { name, .. } if name == "uint7"));
    assert!(matches!(parse_json("not json"), Err(ParseError::Json(_))));
}

#[test]
fn yaml_uses_the_json_schema() {
    let abi = parse_yaml(
        r#"
- type: function
  name: balanceOf
  stateMutability: view
  inputs:
    - name: owner
      type: address
  outputs:
    - name: ""
      type: uint256
"#,
    )
    .unwrap();
    assert_eq!(abi.functions[0].signature(), "balanceOf(address)");
}

#[test]
fn load_file_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let json_path = dir.path().join("token.json");
    std::fs::write(&json_path, TUPLE_JSON).unwrap();
    assert_eq!(load_file(&json_path).unwrap().functions.len(), 1);

    let dsl_path = dir.path().join("token.abi");
    let mut file = std::fs::File::create(&dsl_path).unwrap();
    file.write_all(ERC20_DSL.as_bytes()).unwrap();
    assert_eq!(load_file(&dsl_path).unwrap().functions.len(), 3);

    let err = load_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
}
