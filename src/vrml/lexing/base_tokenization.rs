//! Base tokenization using logos
//!
//! This is the raw character-level pass. It recognizes the lexical classes of the format and
//! skips whitespace (commas included) and `#` comments. Rules that depend on what surrounds a
//! token, such as a number running straight into a letter, are enforced one level up by the
//! [`Tokenizer`](super::tokenizer::Tokenizer).

use crate::vrml::ast::LexErrorKind;
use logos::Logos;

/// Raw lexical classes produced by logos
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n,]+")]
#[logos(skip r"#[^\r\n]*")]
pub enum RawToken {
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token(".")]
    Separator,

    /// `sign? (digit+ | digit+ '.' digit* | '.' digit+) (('e'|'E') sign? digit+)?`
    #[regex(r"[+\-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+\-]?[0-9]+)?")]
    Number,

    /// Hexadecimal escape used for image pixel data
    #[regex(r"0[xX][0-9a-fA-F]+")]
    Hex,

    #[regex(r##"[^\x00-\x20"#'+,\-.0-9\[\\\]{}\x7f][^\x00-\x20"#',.\[\\\]{}\x7f]*"##)]
    Identifier,

    /// Quoted string, unescaped
    #[token("\"", lex_string)]
    String(String),
}

fn lex_string(lex: &mut logos::Lexer<RawToken>) -> Result<String, LexErrorKind> {
    let (consumed, outcome) = scan_string(lex.remainder());
    lex.bump(consumed);
    outcome
}

/// Scan a string body that follows an opening quote.
///
/// Returns the number of bytes consumed (closing quote included) and the unescaped text.
/// Only `\"` and `\\` are valid escapes.
fn scan_string(body: &str) -> (usize, Result<String, LexErrorKind>) {
    let mut value = String::new();
    let mut chars = body.char_indices();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '"' => return (offset + 1, Ok(value)),
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
                Some((escape_offset, escaped)) => {
                    return (
                        escape_offset + escaped.len_utf8(),
                        Err(LexErrorKind::InvalidEscape),
                    )
                }
                None => return (body.len(), Err(LexErrorKind::UnterminatedString)),
            },
            _ => value.push(ch),
        }
    }

    (body.len(), Err(LexErrorKind::UnterminatedString))
}

/// True for characters that may start an identifier
pub fn is_identifier_start(ch: char) -> bool {
    !(ch <= '\u{20}'
        || ch == '\u{7f}'
        || ch.is_ascii_digit()
        || matches!(
            ch,
            '"' | '#' | '\'' | '+' | ',' | '-' | '.' | '[' | '\\' | ']' | '{' | '}'
        ))
}

/// Characters that may legally follow a numeric literal
pub fn is_number_terminator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ',' | '#' | '{' | '}' | '[' | ']')
}

/// Tokenize source code with byte spans, stopping at the first error
pub fn tokenize(source: &str) -> Vec<(Result<RawToken, LexErrorKind>, logos::Span)> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let failed = result.is_err();
        tokens.push((result, lexer.span()));
        if failed {
            break;
        }
    }

    tokens
}
