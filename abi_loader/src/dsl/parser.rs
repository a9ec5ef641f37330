/* Recursive-descent parser for one DSL declaration */

use super::lexer::{starts_with_keyword, tokenize, SourceDecl, Token};
use crate::elementary::{classify, is_identifier, Elementary};
use crate::errors::{ParseError, ParseResult};
use crate::resolve::{RawField, RawType, StructDef};
use abi_types::StateMutability;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Declaration {
    Struct(StructDef),
    Function {
        name: String,
        inputs: Vec<RawField>,
        outputs: Vec<RawField>,
        state_mutability: StateMutability,
    },
    Event {
        name: String,
        inputs: Vec<RawField>,
        anonymous: bool,
    },
    Error {
        name: String,
        inputs: Vec<RawField>,
    },
    Constructor {
        inputs: Vec<RawField>,
        state_mutability: StateMutability,
    },
    Fallback {
        state_mutability: StateMutability,
    },
    Receive,
}

pub(crate) fn parse_declaration(decl: &SourceDecl) -> ParseResult<Declaration> {
    let text = decl.text.trim_end_matches(';').trim_end();
    if starts_with_keyword(text, "struct") {
        return parse_struct(decl.line, text);
    }

    let tokens = tokenize(text, decl.line)?;
    let mut cursor = Cursor {
        tokens: &tokens,
        pos: 0,
        line: decl.line,
        text,
    };
    let keyword = cursor.word()?;
    let parsed = match keyword.as_str() {
        "function" => {
            let name = cursor.name()?;
            let inputs = cursor.params()?;
            let mut state_mutability = StateMutability::Nonpayable;
            let mut outputs = Vec::new();
            while let Some(word) = cursor.next_word() {
                match word.as_str() {
                    "external" | "public" => {}
                    "payable" => state_mutability = StateMutability::Payable,
                    "view" | "constant" => state_mutability = StateMutability::View,
                    "pure" => state_mutability = StateMutability::Pure,
                    "nonpayable" => state_mutability = StateMutability::Nonpayable,
                    "returns" => {
                        outputs = cursor.params()?;
                        break;
                    }
                    _ => return Err(cursor.unrecognized()),
                }
            }
            Declaration::Function {
                name,
                inputs,
                outputs,
                state_mutability,
            }
        }
        "event" => {
            let name = cursor.name()?;
            let inputs = cursor.event_params()?;
            let anonymous = match cursor.next_word() {
                Some(word) if word == "anonymous" => true,
                Some(_) => return Err(cursor.unrecognized()),
                None => false,
            };
            Declaration::Event {
                name,
                inputs,
                anonymous,
            }
        }
        "error" => {
            let name = cursor.name()?;
            let inputs = cursor.params()?;
            Declaration::Error { name, inputs }
        }
        "constructor" => {
            let inputs = cursor.params()?;
            let state_mutability = cursor.payable_modifier()?;
            Declaration::Constructor {
                inputs,
                state_mutability,
            }
        }
        "fallback" => {
            cursor.empty_params()?;
            let state_mutability = cursor.payable_modifier()?;
            Declaration::Fallback { state_mutability }
        }
        "receive" => {
            cursor.empty_params()?;
            /* receive is payable by definition; the keyword is optional */
            cursor.payable_modifier()?;
            Declaration::Receive
        }
        _ => return Err(cursor.unrecognized()),
    };

    if !cursor.at_end() {
        return Err(cursor.unrecognized());
    }
    Ok(parsed)
}

fn parse_struct(line: usize, text: &str) -> ParseResult<Declaration> {
    let unrecognized = || ParseError::UnrecognizedDeclaration {
        line,
        text: text.to_string(),
    };
    let rest = text["struct".len()..].trim_start();
    let open = rest.find('{').ok_or_else(unrecognized)?;
    let close = rest.rfind('}').ok_or_else(unrecognized)?;
    if close < open || !rest[close + 1..].trim().is_empty() {
        return Err(unrecognized());
    }
    let name = rest[..open].trim();
    if !is_identifier(name) || name.contains('.') {
        return Err(unrecognized());
    }

    let mut def = StructDef {
        name: name.to_string(),
        line,
        fields: Vec::new(),
    };
    for member in rest[open + 1..close].split(';') {
        let member = member.trim();
        if member.is_empty() {
            continue;
        }
        let tokens = tokenize(member, line)?;
        let mut cursor = Cursor {
            tokens: &tokens,
            pos: 0,
            line,
            text,
        };
        let field = cursor.param(false)?;
        if !cursor.at_end() {
            return Err(unrecognized());
        }
        def.push_field(field);
    }
    Ok(Declaration::Struct(def))
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
    text: &'a str,
}

impl Cursor<'_> {
    fn unrecognized(&self) -> ParseError {
        ParseError::UnrecognizedDeclaration {
            line: self.line,
            text: self.text.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, token: &Token) -> ParseResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unrecognized())
        }
    }

    fn next_word(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token::Word(word)) => {
                let word = word.clone();
                self.pos += 1;
                Some(word)
            }
            _ => None,
        }
    }

    fn word(&mut self) -> ParseResult<String> {
        self.next_word().ok_or_else(|| self.unrecognized())
    }

    fn name(&mut self) -> ParseResult<String> {
        let name = self.word()?;
        if !is_identifier(&name) || name.contains('.') {
            return Err(self.unrecognized());
        }
        Ok(name)
    }

    fn payable_modifier(&mut self) -> ParseResult<StateMutability> {
        match self.next_word() {
            Some(word) if word == "payable" => Ok(StateMutability::Payable),
            Some(word) if word == "external" => self.payable_modifier(),
            Some(_) => Err(self.unrecognized()),
            None => Ok(StateMutability::Nonpayable),
        }
    }

    fn empty_params(&mut self) -> ParseResult<()> {
        self.expect(&Token::Open)?;
        self.expect(&Token::Close)
    }

    /// `( [param (, param)*] )`
    fn params(&mut self) -> ParseResult<Vec<RawField>> {
        self.param_list(false)
    }

    /// Event inputs, the only parameters that may be `indexed`.
    fn event_params(&mut self) -> ParseResult<Vec<RawField>> {
        self.param_list(true)
    }

    fn param_list(&mut self, allow_indexed: bool) -> ParseResult<Vec<RawField>> {
        self.expect(&Token::Open)?;
        let mut out = Vec::new();
        if self.eat(&Token::Close) {
            return Ok(out);
        }
        loop {
            out.push(self.param(allow_indexed)?);
            if self.eat(&Token::Close) {
                return Ok(out);
            }
            self.expect(&Token::Comma)?;
        }
    }

    /// `type [indexed] [memory|calldata|storage] [name]`
    fn param(&mut self, allow_indexed: bool) -> ParseResult<RawField> {
        let ty = self.ty()?;
        let mut indexed = false;
        let mut name = None;
        while let Some(Token::Word(word)) = self.peek() {
            match word.as_str() {
                "indexed" if allow_indexed => indexed = true,
                "indexed" => return Err(self.unrecognized()),
                "memory" | "calldata" | "storage" => {}
                "payable" if name.is_none() && ty == RawType::Known(abi_types::TypeDescriptor::Address) => {}
                _ if name.is_none() && is_identifier(word) && !word.contains('.') => {
                    name = Some(word.clone());
                }
                _ => return Err(self.unrecognized()),
            }
            self.pos += 1;
        }
        Ok(RawField {
            name: name.unwrap_or_default(),
            ty,
            indexed,
        })
    }

    fn ty(&mut self) -> ParseResult<RawType> {
        let base = match self.peek() {
            Some(Token::Open) => RawType::Tuple(self.params()?),
            Some(Token::Word(word)) => {
                let word = word.clone();
                self.pos += 1;
                if word == "tuple" {
                    return Err(ParseError::InvalidType {
                        line: self.line,
                        name: word,
                    });
                }
                match classify(&word) {
                    Elementary::Known(ty) => RawType::Known(ty),
                    Elementary::Identifier(name) => RawType::Named(name),
                    Elementary::Invalid => {
                        return Err(ParseError::InvalidType {
                            line: self.line,
                            name: word,
                        })
                    }
                }
            }
            _ => return Err(self.unrecognized()),
        };
        self.array_suffixes(base)
    }

    /// Applies `[]` / `[N]` suffixes left to right, so `T[2][]` is a
    /// slice of two-element arrays.
    fn array_suffixes(&mut self, mut ty: RawType) -> ParseResult<RawType> {
        while self.eat(&Token::OpenBracket) {
            if self.eat(&Token::CloseBracket) {
                ty = RawType::Slice(Box::new(ty));
                continue;
            }
            let size = match self.next_word() {
                Some(word) => word,
                None => {
                    return Err(ParseError::InvalidArraySize {
                        line: self.line,
                        size: String::new(),
                    })
                }
            };
            let len: usize = size.parse().map_err(|_| ParseError::InvalidArraySize {
                line: self.line,
                size: size.clone(),
            })?;
            if !self.eat(&Token::CloseBracket) {
                return Err(ParseError::InvalidArraySize {
                    line: self.line,
                    size,
                });
            }
            ty = RawType::Array(Box::new(ty), len);
        }
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_types::TypeDescriptor;

    fn parse(text: &str) -> ParseResult<Declaration> {
        parse_declaration(&SourceDecl {
            line: 1,
            text: text.to_string(),
        })
    }

    #[test]
    fn function_with_modifiers_and_returns() {
        let decl = parse("function balanceOf(address owner) external view returns (uint256)").unwrap();
        let Declaration::Function {
            name,
            inputs,
            outputs,
            state_mutability,
        } = decl
        else {
            panic!("expected function");
        };
        assert_eq!(name, "balanceOf");
        assert_eq!(inputs[0].name, "owner");
        assert_eq!(outputs[0].ty, RawType::Known(TypeDescriptor::Uint(256)));
        assert_eq!(state_mutability, StateMutability::View);
    }

    #[test]
    fn stacked_array_suffixes() {
        let Declaration::Function { inputs, .. } = parse("function f(address[][2][] a)").unwrap()
        else {
            panic!("expected function");
        };
        let address = RawType::Known(TypeDescriptor::Address);
        let expected = RawType::Slice(Box::new(RawType::Array(
            Box::new(RawType::Slice(Box::new(address))),
            2,
        )));
        assert_eq!(inputs[0].ty, expected);
    }

    #[test]
    fn nested_tuple_literals() {
        let Declaration::Function { inputs, .. } =
            parse("function f(((uint a, bool) inner, string s)[] list)").unwrap()
        else {
            panic!("expected function");
        };
        let RawType::Slice(element) = &inputs[0].ty else {
            panic!("expected slice");
        };
        let RawType::Tuple(fields) = element.as_ref() else {
            panic!("expected tuple");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "inner");
        assert!(matches!(&fields[0].ty, RawType::Tuple(inner) if inner.len() == 2));
    }

    #[test]
    fn event_flags() {
        let Declaration::Event {
            inputs, anonymous, ..
        } = parse("event Transfer(address indexed from, address indexed to, uint256 value) anonymous")
            .unwrap()
        else {
            panic!("expected event");
        };
        assert!(anonymous);
        assert!(inputs[0].indexed && inputs[1].indexed && !inputs[2].indexed);
    }

    #[test]
    fn indexed_outside_event_inputs() {
        for text in [
            "function f(uint256 indexed x)",
            "function f() returns (bool indexed)",
            "error E(address indexed who)",
            "constructor(uint8 indexed d)",
            "event E((uint256 indexed a, bool b) pair)",
        ] {
            assert!(
                matches!(parse(text), Err(ParseError::UnrecognizedDeclaration { .. })),
                "{text}"
            );
        }
        assert!(parse("event E((uint256 a, bool b) indexed pair)").is_ok());
    }

    #[test]
    fn explicit_tuple_keyword_is_rejected() {
        assert!(matches!(
            parse("function f(tuple(uint256) t)"),
            Err(ParseError::InvalidType { name, .. }) if name == "tuple"
        ));
    }

    #[test]
    fn bad_array_sizes() {
        assert!(matches!(
            parse("function f(uint256[-1] a)"),
            Err(ParseError::InvalidArraySize { size, .. }) if size == "-1"
        ));
        assert!(matches!(
            parse("function f(uint256[x] a)"),
            Err(ParseError::InvalidArraySize { .. })
        ));
    }

    #[test]
    fn invalid_widths() {
        assert!(matches!(
            parse("function f(uint7 a)"),
            Err(ParseError::InvalidType { name, .. }) if name == "uint7"
        ));
    }

    #[test]
    fn unknown_keyword() {
        assert!(matches!(
            parse("modifier onlyOwner()"),
            Err(ParseError::UnrecognizedDeclaration { .. })
        ));
        assert!(matches!(
            parse("function f(uint256 a) sideways"),
            Err(ParseError::UnrecognizedDeclaration { .. })
        ));
    }

    #[test]
    fn struct_block_with_data_locations_and_trailing_semicolon() {
        let Declaration::Struct(def) = parse("struct Order { address maker; uint[] amounts; };").unwrap()
        else {
            panic!("expected struct");
        };
        assert_eq!(def.name, "Order");
        assert_eq!(def.fields.len(), 2);
        let parsed = parse("function f(Order calldata o, bytes memory data);").unwrap();
        let Declaration::Function { inputs, .. } = parsed else {
            panic!("expected function");
        };
        assert_eq!(inputs[0].ty, RawType::Named("Order".into()));
        assert_eq!(inputs[1].name, "data");
    }

    #[test]
    fn special_functions() {
        assert_eq!(
            parse("constructor(uint256 supply) payable").unwrap(),
            Declaration::Constructor {
                inputs: vec![RawField {
                    name: "supply".into(),
                    ty: RawType::Known(TypeDescriptor::Uint(256)),
                    indexed: false,
                }],
                state_mutability: StateMutability::Payable,
            }
        );
        assert_eq!(
            parse("fallback() external").unwrap(),
            Declaration::Fallback {
                state_mutability: StateMutability::Nonpayable
            }
        );
        assert_eq!(parse("receive() external payable").unwrap(), Declaration::Receive);
    }
}
