//! Typed field values
//!
//!     Every field of a node holds one [`FieldValue`], a closed sum over the single-value (`SF`)
//!     and multi-value (`MF`) variants of the format. Behaviour that depends on the exact variant
//!     (reading a value from tokens, accepting a parsed child node) is written as an exhaustive
//!     `match` at the call site, so adding a variant is a compile error everywhere it matters.
//!
//!     Node-valued fields store [`NodeId`] handles into the owning [`Scene`](super::Scene) arena.
//!     A handle that appears in two places is a shared (`USE`d) node; cloning a value copies the
//!     handle, not the node.

use super::node::NodeId;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3f {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Axis-angle rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub angle: f32,
}

impl Rotation {
    pub fn new(x: f32, y: f32, z: f32, angle: f32) -> Self {
        Self { x, y, z, angle }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 0.0)
    }
}

/// Pixel image stored row-major, top row first.
///
/// Each pixel has `components` bytes: 1 grayscale, 2 grayscale-alpha, 3 RGB, 4 RGBA.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub components: u8,
    pub pixels: Vec<u8>,
}

impl Image {
    /// Components of the pixel at column `x`, row `y` (row 0 is the top row)
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let components = self.components as usize;
        let start = (y as usize * self.width as usize + x as usize) * components;
        self.pixels.get(start..start + components)
    }
}

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldType {
    SFBool,
    SFInt32,
    SFFloat,
    SFTime,
    SFString,
    SFVec2f,
    SFVec3f,
    SFColor,
    SFRotation,
    SFImage,
    SFNode,
    MFBool,
    MFInt32,
    MFFloat,
    MFTime,
    MFString,
    MFVec2f,
    MFVec3f,
    MFColor,
    MFRotation,
    MFImage,
    MFNode,
}

impl FieldType {
    pub const ALL: [FieldType; 22] = [
        FieldType::SFBool,
        FieldType::SFInt32,
        FieldType::SFFloat,
        FieldType::SFTime,
        FieldType::SFString,
        FieldType::SFVec2f,
        FieldType::SFVec3f,
        FieldType::SFColor,
        FieldType::SFRotation,
        FieldType::SFImage,
        FieldType::SFNode,
        FieldType::MFBool,
        FieldType::MFInt32,
        FieldType::MFFloat,
        FieldType::MFTime,
        FieldType::MFString,
        FieldType::MFVec2f,
        FieldType::MFVec3f,
        FieldType::MFColor,
        FieldType::MFRotation,
        FieldType::MFImage,
        FieldType::MFNode,
    ];

    /// Resolve a type keyword such as `SFVec3f`
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.keyword() == keyword)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            FieldType::SFBool => "SFBool",
            FieldType::SFInt32 => "SFInt32",
            FieldType::SFFloat => "SFFloat",
            FieldType::SFTime => "SFTime",
            FieldType::SFString => "SFString",
            FieldType::SFVec2f => "SFVec2f",
            FieldType::SFVec3f => "SFVec3f",
            FieldType::SFColor => "SFColor",
            FieldType::SFRotation => "SFRotation",
            FieldType::SFImage => "SFImage",
            FieldType::SFNode => "SFNode",
            FieldType::MFBool => "MFBool",
            FieldType::MFInt32 => "MFInt32",
            FieldType::MFFloat => "MFFloat",
            FieldType::MFTime => "MFTime",
            FieldType::MFString => "MFString",
            FieldType::MFVec2f => "MFVec2f",
            FieldType::MFVec3f => "MFVec3f",
            FieldType::MFColor => "MFColor",
            FieldType::MFRotation => "MFRotation",
            FieldType::MFImage => "MFImage",
            FieldType::MFNode => "MFNode",
        }
    }

    pub fn is_multi(self) -> bool {
        self.keyword().starts_with("MF")
    }

    pub fn is_node(self) -> bool {
        matches!(self, FieldType::SFNode | FieldType::MFNode)
    }

    /// The value a field of this type holds before anything is assigned
    pub fn default_value(self) -> FieldValue {
        match self {
            FieldType::SFBool => FieldValue::SFBool(false),
            FieldType::SFInt32 => FieldValue::SFInt32(0),
            FieldType::SFFloat => FieldValue::SFFloat(0.0),
            FieldType::SFTime => FieldValue::SFTime(0.0),
            FieldType::SFString => FieldValue::SFString(String::new()),
            FieldType::SFVec2f => FieldValue::SFVec2f(Vec2f::default()),
            FieldType::SFVec3f => FieldValue::SFVec3f(Vec3f::default()),
            FieldType::SFColor => FieldValue::SFColor(Color::default()),
            FieldType::SFRotation => FieldValue::SFRotation(Rotation::default()),
            FieldType::SFImage => FieldValue::SFImage(Image::default()),
            FieldType::SFNode => FieldValue::SFNode(None),
            FieldType::MFBool => FieldValue::MFBool(Vec::new()),
            FieldType::MFInt32 => FieldValue::MFInt32(Vec::new()),
            FieldType::MFFloat => FieldValue::MFFloat(Vec::new()),
            FieldType::MFTime => FieldValue::MFTime(Vec::new()),
            FieldType::MFString => FieldValue::MFString(Vec::new()),
            FieldType::MFVec2f => FieldValue::MFVec2f(Vec::new()),
            FieldType::MFVec3f => FieldValue::MFVec3f(Vec::new()),
            FieldType::MFColor => FieldValue::MFColor(Vec::new()),
            FieldType::MFRotation => FieldValue::MFRotation(Vec::new()),
            FieldType::MFImage => FieldValue::MFImage(Vec::new()),
            FieldType::MFNode => FieldValue::MFNode(Vec::new()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A typed field value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    SFBool(bool),
    SFInt32(i32),
    SFFloat(f32),
    SFTime(f64),
    SFString(String),
    SFVec2f(Vec2f),
    SFVec3f(Vec3f),
    SFColor(Color),
    SFRotation(Rotation),
    SFImage(Image),
    SFNode(Option<NodeId>),
    MFBool(Vec<bool>),
    MFInt32(Vec<i32>),
    MFFloat(Vec<f32>),
    MFTime(Vec<f64>),
    MFString(Vec<String>),
    MFVec2f(Vec<Vec2f>),
    MFVec3f(Vec<Vec3f>),
    MFColor(Vec<Color>),
    MFRotation(Vec<Rotation>),
    MFImage(Vec<Image>),
    MFNode(Vec<NodeId>),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::SFBool(_) => FieldType::SFBool,
            FieldValue::SFInt32(_) => FieldType::SFInt32,
            FieldValue::SFFloat(_) => FieldType::SFFloat,
            FieldValue::SFTime(_) => FieldType::SFTime,
            FieldValue::SFString(_) => FieldType::SFString,
            FieldValue::SFVec2f(_) => FieldType::SFVec2f,
            FieldValue::SFVec3f(_) => FieldType::SFVec3f,
            FieldValue::SFColor(_) => FieldType::SFColor,
            FieldValue::SFRotation(_) => FieldType::SFRotation,
            FieldValue::SFImage(_) => FieldType::SFImage,
            FieldValue::SFNode(_) => FieldType::SFNode,
            FieldValue::MFBool(_) => FieldType::MFBool,
            FieldValue::MFInt32(_) => FieldType::MFInt32,
            FieldValue::MFFloat(_) => FieldType::MFFloat,
            FieldValue::MFTime(_) => FieldType::MFTime,
            FieldValue::MFString(_) => FieldType::MFString,
            FieldValue::MFVec2f(_) => FieldType::MFVec2f,
            FieldValue::MFVec3f(_) => FieldType::MFVec3f,
            FieldValue::MFColor(_) => FieldType::MFColor,
            FieldValue::MFRotation(_) => FieldType::MFRotation,
            FieldValue::MFImage(_) => FieldType::MFImage,
            FieldValue::MFNode(_) => FieldType::MFNode,
        }
    }

    /// Node handles referenced by this value, in order
    pub fn node_refs(&self) -> Vec<NodeId> {
        match self {
            FieldValue::SFNode(Some(id)) => vec![*id],
            FieldValue::MFNode(ids) => ids.clone(),
            _ => Vec::new(),
        }
    }

    /// Rewrite every node handle held by this value
    pub fn remap_nodes(&mut self, f: &mut impl FnMut(NodeId) -> NodeId) {
        match self {
            FieldValue::SFNode(Some(id)) => *id = f(*id),
            FieldValue::MFNode(ids) => {
                for id in ids.iter_mut() {
                    *id = f(*id);
                }
            }
            _ => {}
        }
    }

    /// Number of items: 1 for single values (0 for a NULL node), the length for multi values
    pub fn len(&self) -> usize {
        match self {
            FieldValue::SFNode(node) => usize::from(node.is_some()),
            FieldValue::MFBool(v) => v.len(),
            FieldValue::MFInt32(v) => v.len(),
            FieldValue::MFFloat(v) => v.len(),
            FieldValue::MFTime(v) => v.len(),
            FieldValue::MFString(v) => v.len(),
            FieldValue::MFVec2f(v) => v.len(),
            FieldValue::MFVec3f(v) => v.len(),
            FieldValue::MFColor(v) => v.len(),
            FieldValue::MFRotation(v) => v.len(),
            FieldValue::MFImage(v) => v.len(),
            FieldValue::MFNode(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named field slot on a node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(FieldType::from_keyword("SFVec3f"), Some(FieldType::SFVec3f));
        assert_eq!(FieldType::from_keyword("MFNode"), Some(FieldType::MFNode));
        assert_eq!(FieldType::from_keyword("SFVector"), None);
        for ty in FieldType::ALL {
            assert_eq!(FieldType::from_keyword(ty.keyword()), Some(ty));
        }
    }

    #[test]
    fn test_default_values_match_their_type() {
        for ty in FieldType::ALL {
            assert_eq!(ty.default_value().field_type(), ty);
            assert_eq!(ty.is_multi(), ty.keyword().starts_with("MF"));
        }
        assert_eq!(
            FieldType::SFRotation.default_value(),
            FieldValue::SFRotation(Rotation::new(0.0, 0.0, 1.0, 0.0))
        );
    }

    #[test]
    fn test_image_pixel_lookup() {
        let image = Image {
            width: 2,
            height: 1,
            components: 2,
            pixels: vec![1, 2, 3, 4],
        };
        assert_eq!(image.pixel(0, 0), Some(&[1u8, 2][..]));
        assert_eq!(image.pixel(1, 0), Some(&[3u8, 4][..]));
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn test_remap_nodes() {
        let mut value = FieldValue::MFNode(vec![NodeId::new(1), NodeId::new(2)]);
        value.remap_nodes(&mut |id| NodeId::new(id.index() + 10));
        assert_eq!(value.node_refs(), vec![NodeId::new(11), NodeId::new(12)]);
        assert_eq!(FieldValue::SFNode(None).len(), 0);
        assert!(FieldValue::MFFloat(vec![]).is_empty());
    }
}
