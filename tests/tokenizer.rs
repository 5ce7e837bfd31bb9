//! Tokenizer behaviour: numeric grammar, word classes, positions and property tests

use proptest::prelude::*;
use rstest::rstest;
use vrml_import::vrml::ast::{LexErrorKind, ParseErrorKind, Position};
use vrml_import::vrml::lexing::{tokenize, Tokenizer};
use vrml_import::vrml::token::{Token, TokenKind};

/// Tokens without the trailing end-of-input marker
fn words(source: &str) -> Vec<Token> {
    let mut tokens = tokenize(source).expect("tokenize failed");
    assert!(tokens.pop().is_some_and(|t| t.is_end()));
    tokens
}

#[rstest]
#[case("0")]
#[case("-3")]
#[case("2.5")]
#[case("1e10")]
#[case("-1.5E-3")]
#[case("+7")]
#[case(".5")]
#[case("3.")]
#[case("0xFF8000")]
fn numeric_literal_is_one_word(#[case] literal: &str) {
    let tokens = words(literal);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Word);
    assert_eq!(tokens[0].text, literal);
}

#[rstest]
#[case("1.2.3")]
#[case("1e")]
#[case("1e+")]
#[case("2.5x")]
#[case("-")]
fn malformed_numeric_literal(#[case] literal: &str) {
    let err = tokenize(literal).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::Lexical(LexErrorKind::MalformedNumber)
    );
    assert_eq!(err.position, Position::new(1, 1));
}

#[rstest]
#[case(r#""plain""#, "plain")]
#[case(r#""with \"quotes\"""#, "with \"quotes\"")]
#[case(r#""back\\slash""#, "back\\slash")]
#[case(r#""multi
line""#, "multi\nline")]
#[case(r##""# not a comment""##, "# not a comment")]
fn string_constants(#[case] source: &str, #[case] text: &str) {
    let tokens = words(source);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, text);
}

#[test]
fn invalid_escape() {
    let err = tokenize(r#"url "bad\n""#).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Lexical(LexErrorKind::InvalidEscape));
}

#[test]
fn unterminated_string() {
    let err = tokenize("title \"never closed").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::Lexical(LexErrorKind::UnterminatedString)
    );
    assert_eq!(err.position, Position::new(1, 7));
}

#[test]
fn comments_and_commas_are_skipped() {
    let texts: Vec<String> = words("# header\npoint [ 0 0 0, 1 1 1 ] # trailing\n")
        .into_iter()
        .map(|t| t.text)
        .collect();
    assert_eq!(texts, vec!["point", "[", "0", "0", "0", "1", "1", "1", "]"]);
}

#[test]
fn punctuation_is_classified() {
    let kinds: Vec<TokenKind> = words("{}[]").into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::OpenBrace,
            TokenKind::CloseBrace,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket
        ]
    );
}

#[test]
fn columns_count_characters() {
    let tokens = words("\"héllo\" Box");
    assert_eq!(tokens[1].position, Position::new(1, 9));
}

#[test]
fn tokenizer_is_lazy() {
    let mut tokenizer = Tokenizer::new("Group { } 'broken");
    assert!(tokenizer.tick().unwrap().is_keyword("Group"));
    assert_eq!(tokenizer.tick().unwrap().kind, TokenKind::OpenBrace);
    assert_eq!(tokenizer.tick().unwrap().kind, TokenKind::CloseBrace);
    assert!(tokenizer.tick().is_err());
}

proptest! {
    #[test]
    fn integers_lex_as_single_words(value in any::<i32>()) {
        let text = value.to_string();
        let tokens = words(&text);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(&tokens[0].text, &text);
    }

    #[test]
    fn floats_lex_as_single_words(value in -1.0e30f64..1.0e30f64, scientific in any::<bool>()) {
        let text = if scientific { format!("{:e}", value) } else { format!("{}", value) };
        let tokens = words(&text);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(&tokens[0].text, &text);
    }

    #[test]
    fn identifiers_lex_as_single_words(name in "[A-Za-z_][A-Za-z0-9_]{0,12}") {
        let tokens = words(&name);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(&tokens[0].text, &name);
    }

    #[test]
    fn arbitrary_input_never_panics(source in "\\PC{0,64}") {
        if let Ok(tokens) = tokenize(&source) {
            prop_assert!(tokens.last().is_some_and(|t| t.is_end()));
        }
    }

    #[test]
    fn route_paths_split_on_separator(
        node in "[A-Za-z][A-Za-z0-9_]{0,8}",
        event in "[A-Za-z][A-Za-z0-9_]{0,8}",
    ) {
        let tokens = words(&format!("{}.{}", node, event));
        prop_assert_eq!(tokens.len(), 3);
        prop_assert_eq!(tokens[1].kind, TokenKind::MultipartIdentifierSeparator);
        prop_assert_eq!(&tokens[2].text, &event);
    }
}
