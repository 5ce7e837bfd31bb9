//! Error types for tokenizing and parsing
//!
//!     Lexical and syntax errors share one structured value, [`ParseError`], carrying the kind,
//!     a message and the 1-based position of the failure. There is no recovery: the first error
//!     aborts the parse and no scene is returned.

use super::range::Position;
use thiserror::Error;

/// Malformed character sequences detected by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
pub enum LexErrorKind {
    #[default]
    #[error("unrecognized character")]
    UnrecognizedCharacter,
    #[error("invalid escape sequence in string")]
    InvalidEscape,
    #[error("unterminated string constant")]
    UnterminatedString,
    #[error("malformed numeric literal")]
    MalformedNumber,
    #[error("misplaced identifier separator")]
    MisplacedSeparator,
}

/// Category of a parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The tokenizer rejected the input
    Lexical(LexErrorKind),
    /// A different token or keyword was required
    UnexpectedToken,
    /// Input ended while a construct was still open
    UnexpectedEof,
    /// Instantiation of a type name neither built in nor declared
    UnknownNodeType,
    /// Assignment to a field the node type does not declare
    UnknownField,
    /// `USE` of a name that has not been defined earlier in the document
    UndefinedName,
    /// A token could not be read as the value type a field requires
    InvalidValue,
    /// An interface member or Script field name declared twice on one node
    DuplicateDeclaration,
}

/// Structured parse failure with source position
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{position}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }

    pub fn lexical(kind: LexErrorKind, detail: Option<String>, position: Position) -> Self {
        let message = match detail {
            Some(detail) => format!("{}: {}", kind, detail),
            None => kind.to_string(),
        };
        Self::new(ParseErrorKind::Lexical(kind), message, position)
    }

    /// A required token or keyword was not found
    pub fn expected(expected: &str, found: &crate::vrml::token::Token) -> Self {
        let kind = if found.is_end() {
            ParseErrorKind::UnexpectedEof
        } else {
            ParseErrorKind::UnexpectedToken
        };
        Self::new(
            kind,
            format!("expected {}, found {}", expected, found.describe()),
            found.position,
        )
    }

    pub fn unknown_node_type(type_name: &str, position: Position) -> Self {
        Self::new(
            ParseErrorKind::UnknownNodeType,
            format!("unknown node type '{}'", type_name),
            position,
        )
    }

    pub fn unknown_field(field: &str, type_name: &str, position: Position) -> Self {
        Self::new(
            ParseErrorKind::UnknownField,
            format!("node type '{}' has no field named '{}'", type_name, field),
            position,
        )
    }

    pub fn undefined_name(name: &str, position: Position) -> Self {
        Self::new(
            ParseErrorKind::UndefinedName,
            format!("reference to undefined node name '{}'", name),
            position,
        )
    }

    pub fn invalid_value(expected: &str, text: &str, position: Position) -> Self {
        Self::new(
            ParseErrorKind::InvalidValue,
            format!("expected {}, found '{}'", expected, text),
            position,
        )
    }

    pub fn duplicate_declaration(name: &str, type_name: &str, position: Position) -> Self {
        Self::new(
            ParseErrorKind::DuplicateDeclaration,
            format!("'{}' is already declared on '{}'", name, type_name),
            position,
        )
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Lexical(_))
    }
}

/// Type alias for results produced while parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Format source code context around an error position
///
/// Shows 2 lines before the error, the error line with >> marker, and 2 lines after.
/// All lines are numbered for easy reference.
pub fn format_source_context(source: &str, position: Position) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = position.line.saturating_sub(1);

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();

    for (line_num, line) in lines.iter().enumerate().take(end_line).skip(start_line) {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, line));
    }

    context
}
