//! Field value reading
//!
//!     One exhaustive match over [`FieldType`] decides how many scalar tokens a value consumes.
//!     Multi-valued types accept either a bracketed list or a single bare item, which is sugar for
//!     a one-element list. Node-valued types push a child acceptor for the target field and hand
//!     over to the node statement parser, so finished children are wired back through
//!     [`ParserContext::accept_child`].

use super::context::{ChildAcceptor, ParserContext};
use super::statements::parse_node_statement;
use crate::vrml::ast::{
    Color, FieldType, FieldValue, Image, NodeId, ParseError, ParseResult, Rotation, Vec2f, Vec3f,
};
use crate::vrml::token::TokenKind;

/// Keyword standing for an empty `SFNode`
pub const NULL_KEYWORD: &str = "NULL";

/// Read a value of `field_type` and store it in `field` of `node`
pub fn read_field(
    ctx: &mut ParserContext,
    node: NodeId,
    field: &str,
    field_type: FieldType,
) -> ParseResult<()> {
    let value = match field_type {
        FieldType::SFNode => return read_sfnode(ctx, node, field),
        FieldType::MFNode => return read_mfnode(ctx, node, field),
        FieldType::SFBool => FieldValue::SFBool(ctx.read_bool()?),
        FieldType::SFInt32 => FieldValue::SFInt32(ctx.read_int()?),
        FieldType::SFFloat => FieldValue::SFFloat(ctx.read_float()?),
        FieldType::SFTime => FieldValue::SFTime(ctx.read_double()?),
        FieldType::SFString => FieldValue::SFString(ctx.read_string()?),
        FieldType::SFVec2f => FieldValue::SFVec2f(read_vec2f(ctx)?),
        FieldType::SFVec3f => FieldValue::SFVec3f(read_vec3f(ctx)?),
        FieldType::SFColor => FieldValue::SFColor(read_color(ctx)?),
        FieldType::SFRotation => FieldValue::SFRotation(read_rotation(ctx)?),
        FieldType::SFImage => FieldValue::SFImage(read_image(ctx)?),
        FieldType::MFBool => FieldValue::MFBool(read_multi(ctx, |ctx| ctx.read_bool())?),
        FieldType::MFInt32 => FieldValue::MFInt32(read_multi(ctx, |ctx| ctx.read_int())?),
        FieldType::MFFloat => FieldValue::MFFloat(read_multi(ctx, |ctx| ctx.read_float())?),
        FieldType::MFTime => FieldValue::MFTime(read_multi(ctx, |ctx| ctx.read_double())?),
        FieldType::MFString => FieldValue::MFString(read_multi(ctx, |ctx| ctx.read_string())?),
        FieldType::MFVec2f => FieldValue::MFVec2f(read_multi(ctx, read_vec2f)?),
        FieldType::MFVec3f => FieldValue::MFVec3f(read_multi(ctx, read_vec3f)?),
        FieldType::MFColor => FieldValue::MFColor(read_multi(ctx, read_color)?),
        FieldType::MFRotation => FieldValue::MFRotation(read_multi(ctx, read_rotation)?),
        FieldType::MFImage => FieldValue::MFImage(read_multi(ctx, read_image)?),
    };

    if let Some(slot) = ctx.scene_mut().node_mut(node).field_mut(field) {
        *slot = value;
    }
    Ok(())
}

/// `[ item* ]` or a single bare `item`
pub fn read_multi<T>(
    ctx: &mut ParserContext,
    mut item: impl FnMut(&mut ParserContext) -> ParseResult<T>,
) -> ParseResult<Vec<T>> {
    if !ctx.next_is(TokenKind::OpenBracket)? {
        return Ok(vec![item(ctx)?]);
    }
    ctx.read_token()?;

    let mut items = Vec::new();
    while !ctx.next_is(TokenKind::CloseBracket)? {
        items.push(item(ctx)?);
    }
    ctx.read_token()?;
    Ok(items)
}

fn read_vec2f(ctx: &mut ParserContext) -> ParseResult<Vec2f> {
    Ok(Vec2f::new(ctx.read_float()?, ctx.read_float()?))
}

fn read_vec3f(ctx: &mut ParserContext) -> ParseResult<Vec3f> {
    Ok(Vec3f::new(
        ctx.read_float()?,
        ctx.read_float()?,
        ctx.read_float()?,
    ))
}

fn read_color(ctx: &mut ParserContext) -> ParseResult<Color> {
    Ok(Color::new(
        ctx.read_float()?,
        ctx.read_float()?,
        ctx.read_float()?,
    ))
}

/// Axis first, then angle
fn read_rotation(ctx: &mut ParserContext) -> ParseResult<Rotation> {
    Ok(Rotation::new(
        ctx.read_float()?,
        ctx.read_float()?,
        ctx.read_float()?,
        ctx.read_float()?,
    ))
}

/// `width height components pixel*`
///
/// Each pixel packs its components most significant byte first. Rows arrive bottom to top, so
/// the first row read becomes the last row of the stored image.
fn read_image(ctx: &mut ParserContext) -> ParseResult<Image> {
    let width = read_dimension(ctx, "an image width")?;
    let height = read_dimension(ctx, "an image height")?;

    let position = ctx.peek_token(0)?.position;
    let components = ctx.read_int()?;
    let components = match u8::try_from(components) {
        Ok(c @ 1..=4) => c,
        _ => {
            return Err(ParseError::invalid_value(
                "a component count between 1 and 4",
                &components.to_string(),
                position,
            ))
        }
    };

    // Pixels are buffered as they arrive so a bogus header cannot force a huge allocation.
    let count = u64::from(width) * u64::from(height);
    let c = components as usize;
    let max_pixel = u32::MAX >> (8 * (4 - c));
    let mut packed = Vec::new();
    for _ in 0..count {
        let position = ctx.peek_token(0)?.position;
        let pixel = ctx.read_hex()?;
        if pixel > max_pixel {
            return Err(ParseError::invalid_value(
                &format!("a pixel of {} components", components),
                &format!("{:#X}", pixel),
                position,
            ));
        }
        packed.push(pixel);
    }

    let mut pixels = Vec::with_capacity(packed.len() * c);
    for row in packed.chunks(width.max(1) as usize).rev() {
        for value in row {
            for index in 0..c {
                let shift = 8 * (c - 1 - index);
                pixels.push(((value >> shift) & 0xFF) as u8);
            }
        }
    }

    Ok(Image {
        width,
        height,
        components,
        pixels,
    })
}

fn read_dimension(ctx: &mut ParserContext, what: &str) -> ParseResult<u32> {
    let position = ctx.peek_token(0)?.position;
    let value = ctx.read_int()?;
    u32::try_from(value).map_err(|_| ParseError::invalid_value(what, &value.to_string(), position))
}

fn read_sfnode(ctx: &mut ParserContext, node: NodeId, field: &str) -> ParseResult<()> {
    if ctx.next_is_keyword_at(0, NULL_KEYWORD)? {
        ctx.read_token()?;
        if let Some(slot) = ctx.scene_mut().node_mut(node).field_mut(field) {
            *slot = FieldValue::SFNode(None);
        }
        return Ok(());
    }
    ctx.with_child_acceptor(ChildAcceptor::field(node, field), parse_node_statement)
}

fn read_mfnode(ctx: &mut ParserContext, node: NodeId, field: &str) -> ParseResult<()> {
    if let Some(slot) = ctx.scene_mut().node_mut(node).field_mut(field) {
        *slot = FieldValue::MFNode(Vec::new());
    }
    ctx.with_child_acceptor(ChildAcceptor::field(node, field), |ctx| {
        read_multi(ctx, parse_node_statement).map(|_| ())
    })
}
