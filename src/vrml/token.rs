//! Token definitions for the scene format
//!
//!     The tokenizer collapses identifiers, keywords, numeric literals and quoted strings into
//!     a single `Word` class. The grammar decides what a word means: the same `1` is an SFInt32
//!     in one field and an SFFloat in another, and `Transform` is a node type only because it
//!     appears where a node statement may start.
//!
//!     Punctuation is kept apart because it drives the grammar: braces delimit node bodies and
//!     prototype bodies, brackets delimit multi-value lists and prototype interfaces, and the
//!     multipart separator joins the halves of a route endpoint (`node.field`).

use super::ast::Position;
use serde::Serialize;
use std::fmt;

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Word,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    MultipartIdentifierSeparator,
    EndOfInput,
}

impl TokenKind {
    /// Classify a single punctuation character
    pub fn from_punctuation(ch: char) -> Option<Self> {
        match ch {
            '{' => Some(TokenKind::OpenBrace),
            '}' => Some(TokenKind::CloseBrace),
            '[' => Some(TokenKind::OpenBracket),
            ']' => Some(TokenKind::CloseBracket),
            '.' => Some(TokenKind::MultipartIdentifierSeparator),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Word => "word",
            TokenKind::OpenBrace => "open-brace",
            TokenKind::CloseBrace => "close-brace",
            TokenKind::OpenBracket => "open-bracket",
            TokenKind::CloseBracket => "close-bracket",
            TokenKind::MultipartIdentifierSeparator => "separator",
            TokenKind::EndOfInput => "end-of-input",
        };
        write!(f, "<{}>", name)
    }
}

/// A classified lexical unit with its literal text and source position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn end_of_input(position: Position) -> Self {
        Self::new(TokenKind::EndOfInput, "", position)
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// True if this is a word whose text is exactly `keyword`
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text == keyword
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }

    /// Human readable rendering used in error messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfInput => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Word => write!(f, "{}({})", self.kind, self.text),
            _ => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_classification() {
        assert_eq!(TokenKind::from_punctuation('{'), Some(TokenKind::OpenBrace));
        assert_eq!(TokenKind::from_punctuation('}'), Some(TokenKind::CloseBrace));
        assert_eq!(TokenKind::from_punctuation('['), Some(TokenKind::OpenBracket));
        assert_eq!(TokenKind::from_punctuation(']'), Some(TokenKind::CloseBracket));
        assert_eq!(
            TokenKind::from_punctuation('.'),
            Some(TokenKind::MultipartIdentifierSeparator)
        );
        assert_eq!(TokenKind::from_punctuation('a'), None);
    }

    #[test]
    fn test_token_display_format() {
        let pos = Position::new(1, 1);
        assert_eq!(format!("{}", Token::new(TokenKind::Word, "Shape", pos)), "<word>(Shape)");
        assert_eq!(format!("{}", Token::new(TokenKind::OpenBrace, "{", pos)), "<open-brace>");
        assert_eq!(format!("{}", Token::end_of_input(pos)), "<end-of-input>");
    }

    #[test]
    fn test_keyword_predicate() {
        let pos = Position::new(1, 1);
        assert!(Token::new(TokenKind::Word, "DEF", pos).is_keyword("DEF"));
        assert!(!Token::new(TokenKind::Word, "DEFX", pos).is_keyword("DEF"));
        assert!(!Token::new(TokenKind::OpenBrace, "{", pos).is_keyword("{"));
    }
}
