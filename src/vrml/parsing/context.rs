//! Parser context
//!
//!     All mutable state of one parse lives here and is passed explicitly to every grammar
//!     production:
//!
//!         - a FIFO lookahead buffer over the lazily ticked tokenizer;
//!         - the fill-target stack: the node whose body is currently being parsed;
//!         - the child-acceptor stack: the node-valued slot that receives the next finished node;
//!         - the name table consulted by `USE`.
//!
//!     The stacks are only pushed through [`ParserContext::with_fill_target`] and
//!     [`ParserContext::with_child_acceptor`], which pop again whether the inner production
//!     succeeds or fails, so push/pop pairs are always nested.
//!
//!     Prototype bodies get their own [`Scope`]: a fresh arena and name table swapped in for the
//!     duration of the declaration. The document scope is restored afterwards, and names defined
//!     inside a body never leak out.

use crate::vrml::ast::{
    FieldValue, Node, NodeId, ParseError, ParseErrorKind, ParseResult, Position, Scene,
};
use crate::vrml::lexing::Tokenizer;
use crate::vrml::registry::{NodeRegistry, NodeTemplate, RegistryError};
use crate::vrml::token::{Token, TokenKind};
use std::collections::VecDeque;

/// The slot a finished node is handed to
#[derive(Debug, Clone, PartialEq)]
pub enum ChildSlot {
    /// A node-valued field (`SFNode` assigns, `MFNode` appends)
    Field(String),
    /// The node's own child sequence (document root, prototype body)
    Children,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChildAcceptor {
    pub node: NodeId,
    pub slot: ChildSlot,
}

impl ChildAcceptor {
    pub fn field(node: NodeId, field: &str) -> Self {
        Self {
            node,
            slot: ChildSlot::Field(field.to_string()),
        }
    }

    pub fn children(node: NodeId) -> Self {
        Self {
            node,
            slot: ChildSlot::Children,
        }
    }
}

/// Arena, names and scope stacks of the document or of one prototype body
#[derive(Debug, Default)]
pub struct Scope {
    scene: Scene,
    fill_targets: Vec<NodeId>,
    acceptors: Vec<ChildAcceptor>,
    /// Prototype node whose declaration this scope belongs to
    prototype: Option<NodeId>,
}

pub struct ParserContext<'src> {
    tokenizer: Tokenizer<'src>,
    lookahead: VecDeque<Token>,
    registry: NodeRegistry,
    scope: Scope,
    /// Enclosing scopes while a prototype declaration is being parsed
    outer_scopes: Vec<Scope>,
}

impl<'src> ParserContext<'src> {
    pub fn new(source: &'src str, registry: NodeRegistry) -> Self {
        Self {
            tokenizer: Tokenizer::new(source),
            lookahead: VecDeque::new(),
            registry,
            scope: Scope::default(),
            outer_scopes: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    /// Look at the token `depth` places ahead without consuming (0 is the next unread token)
    pub fn peek_token(&mut self, depth: usize) -> ParseResult<&Token> {
        while self.lookahead.len() <= depth {
            let token = self.tokenizer.tick()?;
            self.lookahead.push_back(token);
        }
        Ok(&self.lookahead[depth])
    }

    pub fn read_token(&mut self) -> ParseResult<Token> {
        self.peek_token(0)?;
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => Ok(Token::end_of_input(Position::default())),
        }
    }

    /// True if the next token has the given kind
    pub fn next_is(&mut self, kind: TokenKind) -> ParseResult<bool> {
        Ok(self.peek_token(0)?.kind == kind)
    }

    /// True if the token at `depth` is the word `keyword`
    pub fn next_is_keyword_at(&mut self, depth: usize, keyword: &str) -> ParseResult<bool> {
        Ok(self.peek_token(depth)?.is_keyword(keyword))
    }

    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        let token = self.read_token()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::expected(&kind.to_string(), &token))
        }
    }

    pub fn expect_keyword(&mut self, keyword: &str) -> ParseResult<Token> {
        let token = self.read_token()?;
        if token.is_keyword(keyword) {
            Ok(token)
        } else {
            Err(ParseError::expected(&format!("'{}'", keyword), &token))
        }
    }

    /// Consume a word used as a name (node type, field, DEF name)
    pub fn read_identifier(&mut self, what: &str) -> ParseResult<Token> {
        let token = self.read_token()?;
        if token.is_word() {
            Ok(token)
        } else {
            Err(ParseError::expected(what, &token))
        }
    }

    // ------------------------------------------------------------------
    // Scalar readers: each consumes exactly one token
    // ------------------------------------------------------------------

    fn read_word(&mut self, expected: &str) -> ParseResult<Token> {
        let token = self.read_token()?;
        if token.is_word() {
            Ok(token)
        } else {
            Err(ParseError::expected(expected, &token))
        }
    }

    pub fn read_bool(&mut self) -> ParseResult<bool> {
        let token = self.read_word("TRUE or FALSE")?;
        match token.text.as_str() {
            "TRUE" => Ok(true),
            "FALSE" => Ok(false),
            other => Err(ParseError::invalid_value("TRUE or FALSE", other, token.position)),
        }
    }

    pub fn read_int(&mut self) -> ParseResult<i32> {
        let token = self.read_word("an integer")?;
        parse_int(&token.text)
            .ok_or_else(|| ParseError::invalid_value("an integer", &token.text, token.position))
    }

    pub fn read_float(&mut self) -> ParseResult<f32> {
        let token = self.read_word("a number")?;
        if !looks_numeric(&token.text) {
            return Err(ParseError::invalid_value("a number", &token.text, token.position));
        }
        match token.text.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseError::invalid_value("a number", &token.text, token.position)),
        }
    }

    pub fn read_double(&mut self) -> ParseResult<f64> {
        let token = self.read_word("a time value")?;
        if !looks_numeric(&token.text) {
            return Err(ParseError::invalid_value("a time value", &token.text, token.position));
        }
        match token.text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseError::invalid_value("a time value", &token.text, token.position)),
        }
    }

    pub fn read_string(&mut self) -> ParseResult<String> {
        Ok(self.read_word("a string")?.text)
    }

    /// Pixel value: `0x` hexadecimal or plain decimal
    pub fn read_hex(&mut self) -> ParseResult<u32> {
        let token = self.read_word("a pixel value")?;
        let text = token.text.as_str();
        let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(digits) => u32::from_str_radix(digits, 16).ok(),
            None => text.parse::<u32>().ok(),
        };
        parsed.ok_or_else(|| ParseError::invalid_value("a pixel value", text, token.position))
    }

    // ------------------------------------------------------------------
    // Scope stacks
    // ------------------------------------------------------------------

    pub fn current_fill_target(&self) -> Option<NodeId> {
        self.scope.fill_targets.last().copied()
    }

    pub fn current_acceptor(&self) -> Option<&ChildAcceptor> {
        self.scope.acceptors.last()
    }

    /// Run `body` with `node` as the active fill target
    pub fn with_fill_target<T>(
        &mut self,
        node: NodeId,
        body: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.scope.fill_targets.push(node);
        let result = body(self);
        self.scope.fill_targets.pop();
        result
    }

    /// Run `body` with `acceptor` receiving every finished node
    pub fn with_child_acceptor<T>(
        &mut self,
        acceptor: ChildAcceptor,
        body: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.scope.acceptors.push(acceptor);
        let result = body(self);
        self.scope.acceptors.pop();
        result
    }

    /// Hand a finished node to the innermost child acceptor
    pub fn accept_child(&mut self, child: NodeId, position: Position) -> ParseResult<()> {
        let Some(acceptor) = self.scope.acceptors.last().cloned() else {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                "node statement is not allowed here",
                position,
            ));
        };

        let target = self.scope.scene.node_mut(acceptor.node);
        match acceptor.slot {
            ChildSlot::Children => target.children.push(child),
            ChildSlot::Field(field) => match target.field_mut(&field) {
                Some(FieldValue::SFNode(slot)) => *slot = Some(child),
                Some(FieldValue::MFNode(list)) => list.push(child),
                _ => {
                    let type_name = target.type_name.clone();
                    return Err(ParseError::invalid_value(
                        "a node-valued field",
                        &format!("{}.{}", type_name, field),
                        position,
                    ));
                }
            },
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Nodes and names
    // ------------------------------------------------------------------

    pub fn scene(&self) -> &Scene {
        &self.scope.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scope.scene
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Instantiate `type_name`; a supplied name is registered before the body is parsed
    pub fn create_node(
        &mut self,
        type_name: &str,
        name: Option<&str>,
        position: Position,
    ) -> ParseResult<NodeId> {
        let id = self
            .registry
            .create_node(&mut self.scope.scene, type_name, name)
            .map_err(|RegistryError::UnknownNodeType(type_name)| {
                ParseError::unknown_node_type(&type_name, position)
            })?;
        if let Some(name) = name {
            self.scope.scene.define_name(name, id);
        }
        Ok(id)
    }

    /// Look up a `DEF` name; a miss is not an error at this level
    pub fn resolve_name(&self, name: &str) -> Option<NodeId> {
        self.scope.scene.find_named(name)
    }

    // ------------------------------------------------------------------
    // Prototype scopes
    // ------------------------------------------------------------------

    /// True while parsing inside a prototype declaration
    pub fn in_prototype(&self) -> bool {
        self.scope.prototype.is_some()
    }

    pub fn current_prototype(&self) -> Option<NodeId> {
        self.scope.prototype
    }

    /// Swap in a fresh scope owning a new prototype node named `type_name`
    pub fn begin_prototype(&mut self, type_name: &str) -> NodeId {
        let mut scope = Scope::default();
        let prototype = scope.scene.alloc(Node::new(type_name));
        scope.prototype = Some(prototype);
        let outer = std::mem::replace(&mut self.scope, scope);
        self.outer_scopes.push(outer);
        prototype
    }

    /// Restore the enclosing scope and return the prototype's arena
    pub fn end_prototype(&mut self) -> Scene {
        let outer = self.outer_scopes.pop().unwrap_or_default();
        let finished = std::mem::replace(&mut self.scope, outer);
        finished.scene
    }

    pub fn register_prototype(&mut self, template: NodeTemplate) {
        let type_name = template.type_name().to_string();
        self.registry.register_prototype(template);
        if self.outer_scopes.is_empty() {
            self.scope.scene.prototypes.push(type_name);
        }
    }

    /// Consume the context, yielding the document scene
    pub fn finish(mut self) -> Scene {
        while !self.outer_scopes.is_empty() {
            self.end_prototype();
        }
        self.scope.scene
    }
}

/// Integer literal, decimal or `0x` hexadecimal
fn parse_int(text: &str) -> Option<i32> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None if digits.chars().all(|c| c.is_ascii_digit()) && !digits.is_empty() => {
            digits.parse::<i64>().ok()?
        }
        None => return None,
    };
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

/// Rejects words such as `inf` or `NaN` that Rust's float parser would accept
fn looks_numeric(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(source: &str) -> ParserContext<'_> {
        ParserContext::new(source, NodeRegistry::new())
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut ctx = context("a b c");
        assert_eq!(ctx.peek_token(2).unwrap().text, "c");
        assert_eq!(ctx.peek_token(0).unwrap().text, "a");
        assert_eq!(ctx.read_token().unwrap().text, "a");
        assert_eq!(ctx.peek_token(0).unwrap().text, "b");
        assert!(ctx.peek_token(5).unwrap().is_end());
    }

    #[test]
    fn test_expect_mismatch_names_expectation() {
        let mut ctx = context("Group");
        let err = ctx.expect(TokenKind::OpenBrace).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(err.message, "expected <open-brace>, found 'Group'");

        let err = ctx.expect(TokenKind::OpenBrace).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_scalar_readers() {
        let mut ctx = context("TRUE -7 0x1F 2.5 1e3 \"text\" 0xFF8000 255");
        assert!(ctx.read_bool().unwrap());
        assert_eq!(ctx.read_int().unwrap(), -7);
        assert_eq!(ctx.read_int().unwrap(), 31);
        assert_eq!(ctx.read_float().unwrap(), 2.5);
        assert_eq!(ctx.read_double().unwrap(), 1000.0);
        assert_eq!(ctx.read_string().unwrap(), "text");
        assert_eq!(ctx.read_hex().unwrap(), 0xFF8000);
        assert_eq!(ctx.read_hex().unwrap(), 255);
    }

    #[test]
    fn test_scalar_format_mismatch() {
        let mut ctx = context("maybe 1.5 inf");
        assert_eq!(ctx.read_bool().unwrap_err().kind, ParseErrorKind::InvalidValue);
        assert_eq!(ctx.read_int().unwrap_err().kind, ParseErrorKind::InvalidValue);
        assert_eq!(ctx.read_float().unwrap_err().kind, ParseErrorKind::InvalidValue);
    }

    #[test]
    fn test_stacks_pop_on_error() {
        let mut ctx = context("");
        let root = ctx.scene().root();
        let result: ParseResult<()> = ctx.with_fill_target(root, |ctx| {
            ctx.with_child_acceptor(ChildAcceptor::children(root), |ctx| {
                assert!(ctx.current_acceptor().is_some());
                Err(ParseError::undefined_name("X", Position::default()))
            })
        });
        assert!(result.is_err());
        assert!(ctx.current_fill_target().is_none());
        assert!(ctx.current_acceptor().is_none());
    }

    #[test]
    fn test_create_node_registers_name_first() {
        let mut ctx = context("");
        let id = ctx
            .create_node("Group", Some("G"), Position::default())
            .unwrap();
        assert_eq!(ctx.resolve_name("G"), Some(id));
        assert_eq!(ctx.resolve_name("H"), None);

        let err = ctx
            .create_node("Nope", None, Position::new(4, 2))
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownNodeType);
        assert_eq!(err.position, Position::new(4, 2));
    }

    #[test]
    fn test_accept_child_into_fields() {
        let mut ctx = context("");
        let shape = ctx.create_node("Shape", None, Position::default()).unwrap();
        let group = ctx.create_node("Group", None, Position::default()).unwrap();
        let boxed = ctx.create_node("Box", None, Position::default()).unwrap();

        ctx.with_child_acceptor(ChildAcceptor::field(shape, "geometry"), |ctx| {
            ctx.accept_child(boxed, Position::default())
        })
        .unwrap();
        ctx.with_child_acceptor(ChildAcceptor::field(group, "children"), |ctx| {
            ctx.accept_child(boxed, Position::default())?;
            ctx.accept_child(shape, Position::default())
        })
        .unwrap();

        let scene = ctx.scene();
        assert_eq!(
            scene.node(shape).field("geometry"),
            Some(&FieldValue::SFNode(Some(boxed)))
        );
        assert_eq!(
            scene.node(group).field("children"),
            Some(&FieldValue::MFNode(vec![boxed, shape]))
        );
    }

    #[test]
    fn test_parse_int_forms() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("+42"), Some(42));
        assert_eq!(parse_int("-0x10"), Some(-16));
        assert_eq!(parse_int("4.0"), None);
        assert_eq!(parse_int("99999999999"), None);
        assert_eq!(parse_int(""), None);
    }
}
