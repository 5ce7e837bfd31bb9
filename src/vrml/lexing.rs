//! Lexer
//!
//!     Tokenization happens in two layers.
//!
//!         1. Base tokenization with logos. See [base_tokenization](base_tokenization).
//!            Whitespace, commas and `#` comments are skipped here; what remains is braces,
//!            brackets, the multipart separator, numbers, hex literals, identifiers and quoted
//!            strings (already unescaped).
//!
//!         2. The [tokenizer](tokenizer). Pulls one raw token per tick, checks the rules that
//!            depend on neighbouring characters, attaches 1-based positions and collapses all
//!            word-like classes into [`TokenKind::Word`](crate::vrml::token::TokenKind).
//!
//!     The parser drives the tokenizer lazily through its lookahead buffer; a token is lexed at
//!     most once no matter how far ahead the parser peeks.

pub mod base_tokenization;
pub mod tokenizer;

pub use tokenizer::{tokenize, Tokenizer};
