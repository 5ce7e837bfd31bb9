//! Statement grammar
//!
//!     Recursive descent over the productions of a document:
//!
//!         statement    := node-statement | PROTO ... | EXTERNPROTO ... | ROUTE ...
//!         node-stmt    := [DEF name] Type '{' body-element* '}' | USE name
//!         body-element := field value | field IS member | PROTO ... | EXTERNPROTO ... | ROUTE ...
//!
//!     `Script` bodies additionally accept `eventIn`, `eventOut`, `field` and `exposedField`
//!     declarations that extend the instance's own schema.
//!
//!     Every finished node is handed to the innermost child acceptor. The first error aborts the
//!     parse.

use super::context::{ChildAcceptor, ParserContext};
use super::fields::{read_field, read_multi};
use crate::vrml::ast::{
    AccessType, Field, FieldType, InterfaceDeclaration, IsBinding, NodeId, ParseError,
    ParseErrorKind, ParseResult, Scene,
};
use crate::vrml::registry::builtins::SCRIPT_TYPE_NAME;
use crate::vrml::registry::NodeTemplate;
use crate::vrml::token::{Token, TokenKind};
use std::collections::HashSet;

/// Parse top-level statements into the root until end of input
pub fn parse_document(ctx: &mut ParserContext) -> ParseResult<()> {
    let root = ctx.scene().root();
    ctx.with_child_acceptor(ChildAcceptor::children(root), |ctx| {
        while parse_statement(ctx)? {}
        let token = ctx.read_token()?;
        if token.is_end() {
            Ok(())
        } else {
            Err(ParseError::expected("a statement or end of input", &token))
        }
    })
}

/// Parse one statement. Returns `false`, consuming nothing, if the next token cannot start one.
pub fn parse_statement(ctx: &mut ParserContext) -> ParseResult<bool> {
    let token = ctx.peek_token(0)?;
    if !token.is_word() {
        return Ok(false);
    }
    let keyword = token.text.clone();
    match keyword.as_str() {
        "PROTO" => parse_proto(ctx)?,
        "EXTERNPROTO" => parse_extern_proto(ctx)?,
        "ROUTE" => parse_route(ctx)?,
        _ => parse_node_statement(ctx)?,
    }
    Ok(true)
}

/// `USE name`, `DEF name Type { ... }` or `Type { ... }`
pub fn parse_node_statement(ctx: &mut ParserContext) -> ParseResult<()> {
    let token = ctx.read_identifier("a node type")?;
    match token.text.as_str() {
        "USE" => {
            let name = ctx.read_identifier("a node name")?;
            let node = ctx
                .resolve_name(&name.text)
                .ok_or_else(|| ParseError::undefined_name(&name.text, name.position))?;
            ctx.accept_child(node, token.position)
        }
        "DEF" => {
            let name = ctx.read_identifier("a node name")?;
            let type_token = ctx.read_identifier("a node type")?;
            parse_node(ctx, &type_token, Some(&name.text))
        }
        _ => parse_node(ctx, &token, None),
    }
}

fn parse_node(ctx: &mut ParserContext, type_token: &Token, name: Option<&str>) -> ParseResult<()> {
    let node = ctx.create_node(&type_token.text, name, type_token.position)?;
    let is_script = type_token.text == SCRIPT_TYPE_NAME;

    ctx.expect(TokenKind::OpenBrace)?;
    ctx.with_fill_target(node, |ctx| parse_node_body(ctx, node, is_script))?;
    ctx.expect(TokenKind::CloseBrace)?;

    if !ctx.scene().children(node).is_empty() {
        resolve_bindings(ctx.scene_mut(), node, &mut HashSet::new());
    }
    ctx.accept_child(node, type_token.position)
}

/// Body elements up to, not including, the closing brace
fn parse_node_body(ctx: &mut ParserContext, node: NodeId, is_script: bool) -> ParseResult<()> {
    loop {
        let token = ctx.peek_token(0)?;
        if token.kind == TokenKind::CloseBrace {
            return Ok(());
        }
        if !token.is_word() {
            let token = token.clone();
            return Err(ParseError::expected("a field name or '}'", &token));
        }

        let keyword = token.text.clone();
        match keyword.as_str() {
            "PROTO" => parse_proto(ctx)?,
            "EXTERNPROTO" => parse_extern_proto(ctx)?,
            "ROUTE" => parse_route(ctx)?,
            _ => match AccessType::from_keyword(&keyword) {
                Some(access) if is_script => parse_script_declaration(ctx, node, access)?,
                _ => parse_field_assignment(ctx, node)?,
            },
        }
    }
}

/// `field value` or `field IS member`
fn parse_field_assignment(ctx: &mut ParserContext, node: NodeId) -> ParseResult<()> {
    let name = ctx.read_identifier("a field name")?;
    if ctx.next_is_keyword_at(0, "IS")? {
        ctx.read_token()?;
        return parse_is_binding(ctx, node, &name);
    }

    let target = ctx.scene().node(node);
    let Some(field_type) = target.field_type(&name.text) else {
        return Err(ParseError::unknown_field(
            &name.text,
            &target.type_name,
            name.position,
        ));
    };
    read_field(ctx, node, &name.text, field_type)
}

/// Record `field IS member` on `node`; the member must belong to the enclosing prototype
fn parse_is_binding(ctx: &mut ParserContext, node: NodeId, field: &Token) -> ParseResult<()> {
    let member = ctx.read_identifier("an interface member name")?;
    let Some(prototype) = ctx.current_prototype() else {
        return Err(ParseError::new(
            ParseErrorKind::UnexpectedToken,
            "IS is only allowed inside a prototype body",
            field.position,
        ));
    };

    let scene = ctx.scene();
    let proto = scene.node(prototype);
    let Some(member_decl) = proto.interface.iter().find(|decl| decl.name == member.text) else {
        return Err(ParseError::unknown_field(
            &member.text,
            &proto.type_name,
            member.position,
        ));
    };

    // Event names are not part of the field schema, so only declared fields are type-checked
    let target = scene.node(node);
    if let Some(field_type) = target.field_type(&field.text) {
        if field_type != member_decl.field_type {
            return Err(ParseError::invalid_value(
                &format!("a {} member", field_type),
                &format!("{} {}", member_decl.field_type, member.text),
                member.position,
            ));
        }
    }

    ctx.scene_mut().node_mut(node).bindings.push(IsBinding {
        field: field.text.clone(),
        interface_field: member.text,
    });
    Ok(())
}

/// `access Type name` inside a Script body, followed by a value or an `IS` binding for fields
fn parse_script_declaration(
    ctx: &mut ParserContext,
    node: NodeId,
    access: AccessType,
) -> ParseResult<()> {
    ctx.read_token()?;
    let field_type = read_field_type(ctx)?;
    let name = ctx.read_identifier("a field name")?;
    declare_member(ctx.scene_mut(), node, access, field_type, &name)?;

    if ctx.next_is_keyword_at(0, "IS")? {
        ctx.read_token()?;
        return parse_is_binding(ctx, node, &name);
    }
    if access.has_value() {
        read_field(ctx, node, &name.text, field_type)?;
    }
    Ok(())
}

fn read_field_type(ctx: &mut ParserContext) -> ParseResult<FieldType> {
    let token = ctx.read_identifier("a field type")?;
    FieldType::from_keyword(&token.text)
        .ok_or_else(|| ParseError::invalid_value("a field type", &token.text, token.position))
}

/// Add an interface member to `node`; fields also get a slot holding the type default
fn declare_member(
    scene: &mut Scene,
    node: NodeId,
    access: AccessType,
    field_type: FieldType,
    name: &Token,
) -> ParseResult<()> {
    let target = scene.node_mut(node);
    if target.declares(&name.text) {
        return Err(ParseError::duplicate_declaration(
            &name.text,
            &target.type_name,
            name.position,
        ));
    }
    if access.has_value() {
        target
            .fields
            .push(Field::new(name.text.clone(), field_type.default_value()));
    }
    target.interface.push(InterfaceDeclaration {
        access,
        field_type,
        name: name.text.clone(),
    });
    Ok(())
}

/// `[ (access Type name value?)* ]`
fn parse_interface(ctx: &mut ParserContext, prototype: NodeId, with_values: bool) -> ParseResult<()> {
    ctx.expect(TokenKind::OpenBracket)?;
    loop {
        let token = ctx.read_token()?;
        if token.kind == TokenKind::CloseBracket {
            return Ok(());
        }
        let access = match AccessType::from_keyword(&token.text) {
            Some(access) if token.is_word() => access,
            _ => {
                return Err(ParseError::expected(
                    "eventIn, eventOut, field, exposedField or ']'",
                    &token,
                ))
            }
        };
        let field_type = read_field_type(ctx)?;
        let name = ctx.read_identifier("an interface member name")?;
        declare_member(ctx.scene_mut(), prototype, access, field_type, &name)?;
        if with_values && access.has_value() {
            read_field(ctx, prototype, &name.text, field_type)?;
        }
    }
}

/// `PROTO Name [ interface ] { body }`
fn parse_proto(ctx: &mut ParserContext) -> ParseResult<()> {
    ctx.expect_keyword("PROTO")?;
    let name = ctx.read_identifier("a prototype name")?;

    let prototype = ctx.begin_prototype(&name.text);
    let result = parse_interface(ctx, prototype, true).and_then(|_| parse_proto_body(ctx, prototype));
    let store = ctx.end_prototype();
    result?;

    ctx.register_prototype(NodeTemplate::prototype(store, prototype));
    Ok(())
}

fn parse_proto_body(ctx: &mut ParserContext, prototype: NodeId) -> ParseResult<()> {
    ctx.expect(TokenKind::OpenBrace)?;
    ctx.with_child_acceptor(ChildAcceptor::children(prototype), |ctx| {
        while parse_statement(ctx)? {}
        Ok(())
    })?;
    ctx.expect(TokenKind::CloseBrace)?;
    Ok(())
}

/// `EXTERNPROTO Name [ interface ] urls`
fn parse_extern_proto(ctx: &mut ParserContext) -> ParseResult<()> {
    ctx.expect_keyword("EXTERNPROTO")?;
    let name = ctx.read_identifier("a prototype name")?;

    let prototype = ctx.begin_prototype(&name.text);
    let result = parse_interface(ctx, prototype, false)
        .and_then(|_| read_multi(ctx, |ctx| ctx.read_string()));
    let store = ctx.end_prototype();
    let urls = result?;

    ctx.register_prototype(NodeTemplate::extern_prototype(store, prototype, urls));
    Ok(())
}

/// `ROUTE node.event TO node.event`, checked and discarded
fn parse_route(ctx: &mut ParserContext) -> ParseResult<()> {
    let route = ctx.expect_keyword("ROUTE")?;
    let from = read_route_path(ctx)?;
    ctx.expect_keyword("TO")?;
    let to = read_route_path(ctx)?;
    tracing::debug!(%from, %to, position = %route.position, "discarding route");
    Ok(())
}

fn read_route_path(ctx: &mut ParserContext) -> ParseResult<String> {
    let node = ctx.read_identifier("a node name")?;
    ctx.expect(TokenKind::MultipartIdentifierSeparator)?;
    let event = ctx.read_identifier("an event name")?;
    Ok(format!("{}.{}", node.text, event.text))
}

/// Copy interface values of `instance` into the body fields bound to them with `IS`.
///
/// Nested instances inside the body are re-resolved afterwards so values forwarded through
/// them reach their own bodies.
fn resolve_bindings(scene: &mut Scene, instance: NodeId, resolved: &mut HashSet<NodeId>) {
    if !resolved.insert(instance) {
        return;
    }

    let mut seen = HashSet::new();
    let mut stack: Vec<NodeId> = scene.children(instance).to_vec();
    let mut nested = Vec::new();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }

        let bindings = scene.node(id).bindings.clone();
        for binding in bindings {
            let Some(value) = scene.node(instance).field(&binding.interface_field).cloned() else {
                continue;
            };
            if let Some(slot) = scene.node_mut(id).field_mut(&binding.field) {
                if slot.field_type() == value.field_type() {
                    *slot = value;
                }
            }
        }

        let node = scene.node(id);
        if !node.children.is_empty() {
            nested.push(id);
        }
        stack.extend(node.fields.iter().flat_map(|field| field.value.node_refs()));
    }

    for id in nested {
        resolve_bindings(scene, id, resolved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vrml::ast::{FieldValue, Vec3f};
    use crate::vrml::registry::{NodeRegistry, TemplateKind};

    fn parse(source: &str) -> ParseResult<Scene> {
        let mut ctx = ParserContext::new(source, NodeRegistry::new());
        parse_document(&mut ctx)?;
        Ok(ctx.finish())
    }

    #[test]
    fn test_nested_fields() {
        let scene = parse(
            "Transform {
                translation 1 2 3
                children [
                    Shape { geometry Box { size 4 4 4 } }
                ]
            }",
        )
        .unwrap();

        let transform = scene.node(scene.top_level()[0]);
        assert_eq!(
            transform.field("translation"),
            Some(&FieldValue::SFVec3f(Vec3f::new(1.0, 2.0, 3.0)))
        );
        let Some(FieldValue::MFNode(children)) = transform.field("children") else {
            panic!("children missing");
        };
        let shape = scene.node(children[0]);
        let Some(FieldValue::SFNode(Some(geometry))) = shape.field("geometry") else {
            panic!("geometry missing");
        };
        assert_eq!(scene.node(*geometry).type_name, "Box");
    }

    #[test]
    fn test_self_reference_is_allowed() {
        let scene = parse("DEF Loop Group { children [ USE Loop ] }").unwrap();
        let group = scene.top_level()[0];
        assert_eq!(
            scene.node(group).field("children"),
            Some(&FieldValue::MFNode(vec![group]))
        );
    }

    #[test]
    fn test_trailing_garbage() {
        let err = parse("Group { } }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(err.message, "expected a statement or end of input, found '}'");
    }

    #[test]
    fn test_route_is_discarded() {
        let scene = parse(
            "DEF T TimeSensor { }
             DEF P PositionInterpolator { }
             ROUTE T.fraction_changed TO P.set_fraction",
        )
        .unwrap();
        assert_eq!(scene.top_level().len(), 2);

        let err = parse("ROUTE T.fraction_changed P.set_fraction").unwrap_err();
        assert_eq!(err.message, "expected 'TO', found 'P'");
    }

    #[test]
    fn test_script_declarations() {
        let scene = parse(
            "Script {
                eventIn SFTime touched
                eventOut SFBool active
                field SFInt32 count 3
                field MFString labels [\"a\" \"b\"]
                url \"script.js\"
            }",
        )
        .unwrap();
        let script = scene.node(scene.top_level()[0]);
        assert_eq!(script.field("count"), Some(&FieldValue::SFInt32(3)));
        assert_eq!(
            script.field("labels"),
            Some(&FieldValue::MFString(vec!["a".to_string(), "b".to_string()]))
        );
        assert!(script.declares("touched"));
        assert!(!script.has_field("active"));
        assert_eq!(script.interface.len(), 4);
    }

    #[test]
    fn test_script_duplicate_declaration() {
        let err = parse("Script { field SFBool url TRUE }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DuplicateDeclaration);
    }

    #[test]
    fn test_access_keywords_are_fields_outside_scripts() {
        let err = parse("Group { field SFBool x TRUE }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownField);
    }

    #[test]
    fn test_proto_instance_gets_interface_and_body() {
        let scene = parse(
            "PROTO Pillar [ field SFFloat height 2 exposedField SFColor tint 1 1 1 ] {
                Transform { children Shape { geometry Cylinder { height IS height } } }
             }
             Pillar { height 7 }",
        )
        .unwrap();

        assert_eq!(scene.prototypes, vec!["Pillar".to_string()]);
        let pillar = scene.node(scene.top_level()[0]);
        assert_eq!(pillar.type_name, "Pillar");
        assert_eq!(pillar.field("height"), Some(&FieldValue::SFFloat(7.0)));
        assert_eq!(pillar.children.len(), 1);

        let mut heights = Vec::new();
        scene.walk(|_, node| {
            if node.type_name == "Cylinder" {
                heights.push(node.field("height").cloned());
            }
        });
        assert_eq!(heights, vec![Some(FieldValue::SFFloat(7.0))]);
    }

    #[test]
    fn test_proto_names_do_not_leak() {
        let err = parse(
            "PROTO Thing [] { DEF Inner Box { } }
             Group { children USE Inner }",
        )
        .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UndefinedName);
    }

    #[test]
    fn test_is_outside_prototype() {
        let err = parse("Sphere { radius IS r }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_is_unknown_member() {
        let err = parse("PROTO P [ field SFFloat r 1 ] { Sphere { radius IS q } }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownField);
        assert!(err.message.contains("'q'"));
    }

    #[test]
    fn test_is_type_mismatch() {
        let err = parse("PROTO P [ field SFBool r TRUE ] { Sphere { radius IS r } }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);
    }

    #[test]
    fn test_nested_instance_forwards_values() {
        let scene = parse(
            "PROTO Ball [ field SFFloat r 1 ] { Sphere { radius IS r } }
             PROTO Wrapper [ field SFFloat size 2 ] { Ball { r IS size } }
             Wrapper { size 9 }",
        )
        .unwrap();

        let mut radii = Vec::new();
        scene.walk(|_, node| {
            if node.type_name == "Sphere" {
                radii.push(node.field("radius").cloned());
            }
        });
        assert_eq!(radii, vec![Some(FieldValue::SFFloat(9.0))]);
    }

    #[test]
    fn test_extern_proto() {
        let mut ctx = ParserContext::new(
            "EXTERNPROTO Lamp [ field SFFloat intensity eventIn SFBool set_on ] [\"lamp.wrl#Lamp\" \"urn:lamp\"]
             Lamp { intensity 0.5 }",
            NodeRegistry::new(),
        );
        parse_document(&mut ctx).unwrap();

        let template = ctx.registry().lookup("Lamp").unwrap();
        assert_eq!(
            template.kind(),
            &TemplateKind::ExternPrototype {
                urls: vec!["lamp.wrl#Lamp".to_string(), "urn:lamp".to_string()]
            }
        );
        let scene = ctx.finish();
        let lamp = scene.node(scene.top_level()[0]);
        assert_eq!(lamp.field("intensity"), Some(&FieldValue::SFFloat(0.5)));
        assert!(lamp.children.is_empty());
    }

    #[test]
    fn test_proto_inside_node_body() {
        let scene = parse(
            "Group {
                PROTO Dot [] { Sphere { radius 0.1 } }
                children [ Dot { } Dot { } ]
             }",
        )
        .unwrap();
        let group = scene.node(scene.top_level()[0]);
        let Some(FieldValue::MFNode(dots)) = group.field("children") else {
            panic!("children missing");
        };
        assert_eq!(dots.len(), 2);
        assert_ne!(scene.children(dots[0]), scene.children(dots[1]));
    }
}
