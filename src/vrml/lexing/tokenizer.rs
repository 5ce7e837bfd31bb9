//! Ticking tokenizer
//!
//!     Wraps the logos pass and produces one [`Token`] per tick. On top of the raw classes it
//!     applies the rules that need context:
//!
//!         - A numeric literal must end at whitespace, a comma, a comment or punctuation.
//!           `1.2.3` and `1e` run into further characters and are rejected.
//!         - The multipart separator is only valid directly between two identifiers
//!           (`Clock.fraction_changed`).
//!         - Once the input is exhausted every further tick yields `EndOfInput`.
//!
//!     Every token and every error carries a 1-based line/column position.

use super::base_tokenization::{is_identifier_start, is_number_terminator, RawToken};
use crate::vrml::ast::{LexErrorKind, ParseError, ParseResult, Position, SourceLocation};
use crate::vrml::token::{Token, TokenKind};
use logos::Logos;

pub struct Tokenizer<'src> {
    source: &'src str,
    lexer: logos::Lexer<'src, RawToken>,
    location: SourceLocation<'src>,
    /// Byte offset where the last identifier ended, if the last token was one
    identifier_end: Option<usize>,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            lexer: RawToken::lexer(source),
            location: SourceLocation::new(source),
            identifier_end: None,
        }
    }

    /// Produce the next token
    pub fn tick(&mut self) -> ParseResult<Token> {
        let Some(result) = self.lexer.next() else {
            self.identifier_end = None;
            return Ok(Token::end_of_input(
                self.location.byte_to_position(self.source.len()),
            ));
        };

        let span = self.lexer.span();
        let position = self.location.byte_to_position(span.start);
        let slice = self.lexer.slice();
        let previous_identifier_end = self.identifier_end.take();

        let raw = match result {
            Ok(raw) => raw,
            Err(kind) => return Err(self.lex_error(kind, span.start, position)),
        };

        let token = match raw {
            RawToken::OpenBrace
            | RawToken::CloseBrace
            | RawToken::OpenBracket
            | RawToken::CloseBracket => {
                let kind = slice
                    .chars()
                    .next()
                    .and_then(TokenKind::from_punctuation)
                    .unwrap_or(TokenKind::Word);
                Token::new(kind, slice, position)
            }
            RawToken::Separator => {
                let joins_identifiers = previous_identifier_end == Some(span.start)
                    && self.char_at(span.end).is_some_and(is_identifier_start);
                if !joins_identifiers {
                    return Err(ParseError::lexical(
                        LexErrorKind::MisplacedSeparator,
                        None,
                        position,
                    ));
                }
                Token::new(TokenKind::MultipartIdentifierSeparator, slice, position)
            }
            RawToken::Number | RawToken::Hex => {
                // `Clock.5`: a dot glued to an identifier is a separator, never a decimal point
                if slice.starts_with('.') && previous_identifier_end == Some(span.start) {
                    return Err(ParseError::lexical(
                        LexErrorKind::MisplacedSeparator,
                        None,
                        position,
                    ));
                }
                if let Some(next) = self.char_at(span.end) {
                    if !is_number_terminator(next) {
                        return Err(ParseError::lexical(
                            LexErrorKind::MalformedNumber,
                            Some(format!("'{}' followed by '{}'", slice, next)),
                            position,
                        ));
                    }
                }
                Token::new(TokenKind::Word, slice, position)
            }
            RawToken::Identifier => {
                self.identifier_end = Some(span.end);
                Token::new(TokenKind::Word, slice, position)
            }
            RawToken::String(text) => Token::new(TokenKind::Word, text, position),
        };

        tracing::trace!(token = %token, position = %token.position, "tick");
        Ok(token)
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.source.get(offset..).and_then(|rest| rest.chars().next())
    }

    fn lex_error(&self, kind: LexErrorKind, start: usize, position: Position) -> ParseError {
        match (kind, self.char_at(start)) {
            // A sign or digit that logos could not complete is a broken number, e.g. `1e`
            (LexErrorKind::UnrecognizedCharacter, Some(ch))
                if ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.') =>
            {
                ParseError::lexical(
                    LexErrorKind::MalformedNumber,
                    Some(format!("'{}'", self.lexer.slice())),
                    position,
                )
            }
            (LexErrorKind::UnrecognizedCharacter, Some(ch)) => {
                ParseError::lexical(kind, Some(format!("{:?}", ch)), position)
            }
            _ => ParseError::lexical(kind, None, position),
        }
    }
}

/// Tokenize a whole document. The returned vector always ends with `EndOfInput`.
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.tick()?;
        let done = token.is_end();
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vrml::ast::ParseErrorKind;

    fn texts(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .expect("tokenize failed")
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_node_statement() {
        assert_eq!(
            texts("DEF Box01 Box { size 1 2 3 }"),
            vec![
                (TokenKind::Word, "DEF".to_string()),
                (TokenKind::Word, "Box01".to_string()),
                (TokenKind::Word, "Box".to_string()),
                (TokenKind::OpenBrace, "{".to_string()),
                (TokenKind::Word, "size".to_string()),
                (TokenKind::Word, "1".to_string()),
                (TokenKind::Word, "2".to_string()),
                (TokenKind::Word, "3".to_string()),
                (TokenKind::CloseBrace, "}".to_string()),
                (TokenKind::EndOfInput, String::new()),
            ]
        );
    }

    #[test]
    fn test_strings_collapse_to_words() {
        let tokens = tokenize(r#"url "a b.png""#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].text, "a b.png");
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("Group {\n  children []\n}").unwrap();
        assert_eq!(tokens[0].position, Position::new(1, 1));
        assert_eq!(tokens[1].position, Position::new(1, 7));
        assert_eq!(tokens[2].position, Position::new(2, 3));
        assert_eq!(tokens[5].position, Position::new(3, 1));
        assert_eq!(tokens[6].position, Position::new(3, 2));
    }

    #[test]
    fn test_end_of_input_repeats() {
        let mut tokenizer = Tokenizer::new("Shape");
        assert!(tokenizer.tick().unwrap().is_word());
        assert!(tokenizer.tick().unwrap().is_end());
        assert!(tokenizer.tick().unwrap().is_end());
    }

    #[test]
    fn test_route_path() {
        assert_eq!(
            texts("ROUTE T.fraction_changed TO I.set_fraction")
                .into_iter()
                .map(|(k, _)| k)
                .collect::<Vec<_>>(),
            vec![
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::MultipartIdentifierSeparator,
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::MultipartIdentifierSeparator,
                TokenKind::Word,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_malformed_numbers() {
        for source in ["1.2.3", "1e", "0x", "12abc"] {
            let err = tokenize(source).unwrap_err();
            assert_eq!(
                err.kind,
                ParseErrorKind::Lexical(LexErrorKind::MalformedNumber),
                "source {:?}",
                source
            );
        }
    }

    #[test]
    fn test_misplaced_separator() {
        let err = tokenize("Group . children").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::Lexical(LexErrorKind::MisplacedSeparator)
        );
        assert_eq!(err.position, Position::new(1, 7));
    }

    #[test]
    fn test_separator_before_digit() {
        let err = tokenize("Clock.5").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::Lexical(LexErrorKind::MisplacedSeparator)
        );
        assert_eq!(err.position, Position::new(1, 6));

        let tokens = tokenize("scale .5").unwrap();
        assert_eq!(tokens[1].text, ".5");
    }

    #[test]
    fn test_unrecognized_character_position() {
        let err = tokenize("Group {\n  'oops'\n}").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::Lexical(LexErrorKind::UnrecognizedCharacter)
        );
        assert_eq!(err.position, Position::new(2, 3));
        assert!(err.message.contains("'\\''"));
    }
}
