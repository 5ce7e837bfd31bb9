//! Main module for the scene importer
//!
//!     Pipeline, leaves first:
//!
//!         source text
//!             -> lexing       tokens with positions (logos + context checks)
//!             -> parsing      recursive descent over a lookahead buffer
//!             -> ast::Scene   arena of typed nodes under a synthetic root
//!
//!     Node types come from the [registry](registry): the built-in VRML97 catalog plus any
//!     prototypes the document declares. [formats](formats) and [processor](processor) turn
//!     tokens and scenes into text for the command line tool.

pub mod ast;
pub mod config;
pub mod formats;
pub mod lexing;
pub mod parsing;
pub mod processor;
pub mod registry;
pub mod token;

pub use ast::{ParseError, ParseErrorKind, Scene};
pub use parsing::{parse_document, SceneParser};
