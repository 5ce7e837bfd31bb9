//! Parser
//!
//!     A recursive-descent parser that pulls tokens lazily from the tokenizer and builds a
//!     [`Scene`] in one pass.
//!
//!     Layout:
//!
//!         - [context](context): the mutable state of one parse (lookahead, scope stacks,
//!           name table, per-parse registry).
//!         - [statements](statements): node, `DEF`/`USE`, `PROTO`, `EXTERNPROTO`, `ROUTE`
//!           and `Script` productions.
//!         - [fields](fields): reading a typed value for a field.
//!
//!     Failure is all or nothing. The context owns a clone of the caller's registry, so
//!     prototypes declared by a document that fails to parse are never visible to the caller.
//!
//!     Usage:
//!
//!         let scene = parse_document("DEF Ball Sphere { radius 2 }")?;
//!         let ball = scene.find_named("Ball");

pub mod context;
pub mod fields;
pub mod statements;

pub use context::{ChildAcceptor, ChildSlot, ParserContext};

use crate::vrml::ast::{ParseResult, Scene};
use crate::vrml::registry::NodeRegistry;

/// Parse a document with the standard built-in node types
pub fn parse_document(source: &str) -> ParseResult<Scene> {
    SceneParser::new().parse(source)
}

/// Parser bound to a base registry
///
/// Each call to [`SceneParser::parse`] works on its own copy of the registry, so one parser can
/// be shared between threads and documents never see each other's prototypes.
#[derive(Debug, Clone, Default)]
pub struct SceneParser {
    registry: NodeRegistry,
}

impl SceneParser {
    pub fn new() -> Self {
        Self {
            registry: NodeRegistry::new(),
        }
    }

    pub fn with_registry(registry: NodeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn parse(&self, source: &str) -> ParseResult<Scene> {
        let mut ctx = ParserContext::new(source, self.registry.clone());
        statements::parse_document(&mut ctx)?;
        let scene = ctx.finish();
        tracing::debug!(
            nodes = scene.node_count(),
            top_level = scene.top_level().len(),
            prototypes = scene.prototypes.len(),
            "parsed document"
        );
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vrml::ast::{FieldValue, Node, ParseErrorKind};
    use crate::vrml::registry::NodeTemplate;

    fn foo_parser() -> SceneParser {
        SceneParser::with_registry(NodeRegistry::with_catalog(vec![NodeTemplate::builtin(
            Node::new("Foo")
                .with_field("x", FieldValue::SFInt32(0))
                .with_field("children", FieldValue::MFNode(vec![])),
        )]))
    }

    #[test]
    fn test_empty_document() {
        let scene = parse_document("# nothing here\n").unwrap();
        assert!(scene.top_level().is_empty());
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_custom_catalog() {
        let scene = foo_parser().parse("Foo { x 4 }").unwrap();
        let foo = scene.node(scene.top_level()[0]);
        assert_eq!(foo.field("x"), Some(&FieldValue::SFInt32(4)));

        let err = foo_parser().parse("Box { }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownNodeType);
    }

    #[test]
    fn test_failed_parse_leaves_registry_untouched() {
        let parser = SceneParser::new();
        assert!(parser.parse("PROTO Gadget [] { Box {} } Gadget { oops 1 }").is_err());
        assert!(parser.registry().lookup("Gadget").is_none());
        assert!(parser.parse("Gadget { }").is_err());
    }

    #[test]
    fn test_prototypes_are_per_document() {
        let parser = SceneParser::new();
        parser.parse("PROTO Gadget [] { Box {} } Gadget { }").unwrap();
        let err = parser.parse("Gadget { }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownNodeType);
    }
}
