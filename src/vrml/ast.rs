//! Scene model for parsed documents
//!
//! - `range` - 1-based source positions and byte offset conversion
//! - `error` - lexical and syntax errors
//! - `field` - the typed field value model
//! - `node` - nodes, node handles and the scene arena

pub mod error;
pub mod field;
pub mod node;
pub mod range;

pub use error::{format_source_context, LexErrorKind, ParseError, ParseErrorKind, ParseResult};
pub use field::{Color, Field, FieldType, FieldValue, Image, Rotation, Vec2f, Vec3f};
pub use node::{
    AccessType, InterfaceDeclaration, IsBinding, Node, NodeId, Scene, ROOT_TYPE_NAME,
};
pub use range::{Position, SourceLocation};
