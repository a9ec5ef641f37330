/* Tokenizer for a single DSL declaration */

use crate::errors::{ParseError, ParseResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Word(String),
    Open,
    Close,
    OpenBracket,
    CloseBracket,
    Comma,
}

/// A logical declaration: one source line, or several joined lines for a
/// `struct` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceDecl {
    pub line: usize,
    pub text: String,
}

/// Splits DSL source into declarations, dropping comments and blank lines.
/// A `struct` header without its closing brace absorbs following lines
/// until the brace shows up.
pub(crate) fn split_declarations(source: &str) -> ParseResult<Vec<SourceDecl>> {
    let mut out = Vec::new();
    let mut open_struct: Option<SourceDecl> = None;

    for (idx, raw) in source.lines().enumerate() {
        let text = match raw.find("//") {
            Some(at) => &raw[..at],
            None => raw,
        }
        .trim();
        if text.is_empty() {
            continue;
        }

        if let Some(mut block) = open_struct.take() {
            block.text.push(' ');
            block.text.push_str(text);
            if text.contains('}') {
                out.push(block);
            } else {
                open_struct = Some(block);
            }
            continue;
        }

        let decl = SourceDecl {
            line: idx + 1,
            text: text.to_string(),
        };
        if starts_with_keyword(text, "struct") && !text.contains('}') {
            open_struct = Some(decl);
        } else {
            out.push(decl);
        }
    }

    if let Some(block) = open_struct {
        return Err(ParseError::UnrecognizedDeclaration {
            line: block.line,
            text: block.text,
        });
    }
    Ok(out)
}

pub(crate) fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    match text.strip_prefix(keyword) {
        Some(rest) => rest
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || c == '(' || c == '{'),
        None => false,
    }
}

pub(crate) fn tokenize(text: &str, line: usize) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut depth: i64 = 0;

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    for c in text.chars() {
        let punct = match c {
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            '[' => Some(Token::OpenBracket),
            ']' => Some(Token::CloseBracket),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = punct {
            flush(&mut word, &mut tokens);
            match token {
                Token::Open => depth += 1,
                Token::Close => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ParseError::UnbalancedParentheses { line });
                    }
                }
                _ => {}
            }
            tokens.push(token);
        } else if c.is_whitespace() {
            flush(&mut word, &mut tokens);
        } else if matches!(c, '{' | '}' | ';') {
            return Err(ParseError::UnrecognizedDeclaration {
                line,
                text: text.to_string(),
            });
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut tokens);

    if depth != 0 {
        return Err(ParseError::UnbalancedParentheses { line });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str) -> Token {
        Token::Word(w.to_string())
    }

    #[test]
    fn tokenizes_parameter_lists() {
        let tokens = tokenize("f(uint256[2] a, (bool,address)[] b)", 1).unwrap();
        assert_eq!(
            tokens,
            vec![
                word("f"),
                Token::Open,
                word("uint256"),
                Token::OpenBracket,
                word("2"),
                Token::CloseBracket,
                word("a"),
                Token::Comma,
                Token::Open,
                word("bool"),
                Token::Comma,
                word("address"),
                Token::Close,
                Token::OpenBracket,
                Token::CloseBracket,
                word("b"),
                Token::Close,
            ]
        );
    }

    #[test]
    fn unbalanced_parentheses() {
        assert!(matches!(
            tokenize("function f(uint256", 4),
            Err(ParseError::UnbalancedParentheses { line: 4 })
        ));
        assert!(matches!(
            tokenize("function f())", 2),
            Err(ParseError::UnbalancedParentheses { line: 2 })
        ));
    }

    #[test]
    fn joins_struct_blocks_and_drops_comments() {
        let source = "// header\nstruct Point {\n  uint256 x; // abscissa\n  uint256 y;\n}\n\nfunction f(Point p)\n";
        let decls = split_declarations(source).unwrap();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].line, 2);
        assert_eq!(decls[0].text, "struct Point { uint256 x; uint256 y; }");
        assert_eq!(decls[1].line, 7);
    }

    #[test]
    fn unterminated_struct_block() {
        let err = split_declarations("struct A {\n uint256 x;\n").unwrap_err();
        assert!(matches!(err, ParseError::UnrecognizedDeclaration { line: 1, .. }));
    }

    #[test]
    fn keyword_boundaries() {
        assert!(starts_with_keyword("struct A {", "struct"));
        assert!(starts_with_keyword("constructor(uint256 a)", "constructor"));
        assert!(!starts_with_keyword("structure", "struct"));
    }
}
