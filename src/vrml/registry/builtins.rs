//! Built-in node catalog
//!
//! The standard VRML97 node set with every assignable member (`field` and `exposedField`) and
//! its default value. Events are not listed since a node body can never assign them.

use super::NodeTemplate;
use crate::vrml::ast::{
    Color, FieldType, FieldValue, Image, Node, Rotation, Vec2f, Vec3f,
};

/// Type name reserved for scripted behaviour nodes; their body grammar differs.
pub const SCRIPT_TYPE_NAME: &str = "Script";

struct Builder {
    node: Node,
}

fn node(type_name: &str) -> Builder {
    Builder {
        node: Node::new(type_name),
    }
}

impl Builder {
    /// Member holding its type's default value
    fn field(mut self, name: &str, field_type: FieldType) -> Self {
        self.node = self.node.with_field(name, field_type.default_value());
        self
    }

    fn value(mut self, name: &str, value: FieldValue) -> Self {
        self.node = self.node.with_field(name, value);
        self
    }

    /// `children`, `bboxCenter` and `bboxSize` shared by grouping nodes
    fn grouping(self) -> Self {
        self.field("children", FieldType::MFNode)
            .field("bboxCenter", FieldType::SFVec3f)
            .value("bboxSize", vec3(-1.0, -1.0, -1.0))
    }

    fn build(self) -> NodeTemplate {
        NodeTemplate::builtin(self.node)
    }
}

fn yes() -> FieldValue {
    FieldValue::SFBool(true)
}

fn float(value: f32) -> FieldValue {
    FieldValue::SFFloat(value)
}

fn time(value: f64) -> FieldValue {
    FieldValue::SFTime(value)
}

fn string(value: &str) -> FieldValue {
    FieldValue::SFString(value.to_string())
}

fn strings(values: &[&str]) -> FieldValue {
    FieldValue::MFString(values.iter().map(|s| s.to_string()).collect())
}

fn vec2(x: f32, y: f32) -> FieldValue {
    FieldValue::SFVec2f(Vec2f::new(x, y))
}

fn vec3(x: f32, y: f32, z: f32) -> FieldValue {
    FieldValue::SFVec3f(Vec3f::new(x, y, z))
}

fn color(r: f32, g: f32, b: f32) -> FieldValue {
    FieldValue::SFColor(Color::new(r, g, b))
}

fn rotation(x: f32, y: f32, z: f32, angle: f32) -> FieldValue {
    FieldValue::SFRotation(Rotation::new(x, y, z, angle))
}

/// Every built-in template
pub fn catalog() -> Vec<NodeTemplate> {
    use FieldType::*;

    vec![
        node("Anchor")
            .grouping()
            .field("description", SFString)
            .field("parameter", MFString)
            .field("url", MFString)
            .build(),
        node("Appearance")
            .field("material", SFNode)
            .field("texture", SFNode)
            .field("textureTransform", SFNode)
            .build(),
        node("AudioClip")
            .field("description", SFString)
            .field("loop", SFBool)
            .value("pitch", float(1.0))
            .field("startTime", SFTime)
            .field("stopTime", SFTime)
            .field("url", MFString)
            .build(),
        node("Background")
            .field("groundAngle", MFFloat)
            .field("groundColor", MFColor)
            .field("backUrl", MFString)
            .field("bottomUrl", MFString)
            .field("frontUrl", MFString)
            .field("leftUrl", MFString)
            .field("rightUrl", MFString)
            .field("topUrl", MFString)
            .field("skyAngle", MFFloat)
            .value("skyColor", FieldValue::MFColor(vec![Color::default()]))
            .build(),
        node("Billboard")
            .value("axisOfRotation", vec3(0.0, 1.0, 0.0))
            .grouping()
            .build(),
        node("Box").value("size", vec3(2.0, 2.0, 2.0)).build(),
        node("Collision")
            .grouping()
            .value("collide", yes())
            .field("proxy", SFNode)
            .build(),
        node("Color").field("color", MFColor).build(),
        node("ColorInterpolator")
            .field("key", MFFloat)
            .field("keyValue", MFColor)
            .build(),
        node("Cone")
            .value("bottomRadius", float(1.0))
            .value("height", float(2.0))
            .value("side", yes())
            .value("bottom", yes())
            .build(),
        node("Coordinate").field("point", MFVec3f).build(),
        node("CoordinateInterpolator")
            .field("key", MFFloat)
            .field("keyValue", MFVec3f)
            .build(),
        node("Cylinder")
            .value("bottom", yes())
            .value("height", float(2.0))
            .value("radius", float(1.0))
            .value("side", yes())
            .value("top", yes())
            .build(),
        node("CylinderSensor")
            .value("autoOffset", yes())
            .value("diskAngle", float(0.262))
            .value("enabled", yes())
            .value("maxAngle", float(-1.0))
            .field("minAngle", SFFloat)
            .field("offset", SFFloat)
            .build(),
        node("DirectionalLight")
            .field("ambientIntensity", SFFloat)
            .value("color", color(1.0, 1.0, 1.0))
            .value("direction", vec3(0.0, 0.0, -1.0))
            .value("intensity", float(1.0))
            .value("on", yes())
            .build(),
        node("ElevationGrid")
            .field("color", SFNode)
            .field("normal", SFNode)
            .field("texCoord", SFNode)
            .field("height", MFFloat)
            .value("ccw", yes())
            .value("colorPerVertex", yes())
            .field("creaseAngle", SFFloat)
            .value("normalPerVertex", yes())
            .value("solid", yes())
            .field("xDimension", SFInt32)
            .value("xSpacing", float(1.0))
            .field("zDimension", SFInt32)
            .value("zSpacing", float(1.0))
            .build(),
        node("Extrusion")
            .value("beginCap", yes())
            .value("ccw", yes())
            .value("convex", yes())
            .field("creaseAngle", SFFloat)
            .value(
                "crossSection",
                FieldValue::MFVec2f(vec![
                    Vec2f::new(1.0, 1.0),
                    Vec2f::new(1.0, -1.0),
                    Vec2f::new(-1.0, -1.0),
                    Vec2f::new(-1.0, 1.0),
                    Vec2f::new(1.0, 1.0),
                ]),
            )
            .value("endCap", yes())
            .value("orientation", FieldValue::MFRotation(vec![Rotation::default()]))
            .value("scale", FieldValue::MFVec2f(vec![Vec2f::new(1.0, 1.0)]))
            .value("solid", yes())
            .value(
                "spine",
                FieldValue::MFVec3f(vec![Vec3f::new(0.0, 0.0, 0.0), Vec3f::new(0.0, 1.0, 0.0)]),
            )
            .build(),
        node("Fog")
            .value("color", color(1.0, 1.0, 1.0))
            .value("fogType", string("LINEAR"))
            .field("visibilityRange", SFFloat)
            .build(),
        node("FontStyle")
            .value("family", strings(&["SERIF"]))
            .value("horizontal", yes())
            .value("justify", strings(&["BEGIN"]))
            .field("language", SFString)
            .value("leftToRight", yes())
            .value("size", float(1.0))
            .value("spacing", float(1.0))
            .value("style", string("PLAIN"))
            .value("topToBottom", yes())
            .build(),
        node("Group").grouping().build(),
        node("ImageTexture")
            .field("url", MFString)
            .value("repeatS", yes())
            .value("repeatT", yes())
            .build(),
        node("IndexedFaceSet")
            .field("color", SFNode)
            .field("coord", SFNode)
            .field("normal", SFNode)
            .field("texCoord", SFNode)
            .value("ccw", yes())
            .field("colorIndex", MFInt32)
            .value("colorPerVertex", yes())
            .value("convex", yes())
            .field("coordIndex", MFInt32)
            .field("creaseAngle", SFFloat)
            .field("normalIndex", MFInt32)
            .value("normalPerVertex", yes())
            .value("solid", yes())
            .field("texCoordIndex", MFInt32)
            .build(),
        node("IndexedLineSet")
            .field("color", SFNode)
            .field("coord", SFNode)
            .field("colorIndex", MFInt32)
            .value("colorPerVertex", yes())
            .field("coordIndex", MFInt32)
            .build(),
        node("Inline")
            .field("url", MFString)
            .field("bboxCenter", SFVec3f)
            .value("bboxSize", vec3(-1.0, -1.0, -1.0))
            .build(),
        node("LOD")
            .field("level", MFNode)
            .field("center", SFVec3f)
            .field("range", MFFloat)
            .build(),
        node("Material")
            .value("ambientIntensity", float(0.2))
            .value("diffuseColor", color(0.8, 0.8, 0.8))
            .field("emissiveColor", SFColor)
            .value("shininess", float(0.2))
            .field("specularColor", SFColor)
            .field("transparency", SFFloat)
            .build(),
        node("MovieTexture")
            .field("loop", SFBool)
            .value("speed", float(1.0))
            .field("startTime", SFTime)
            .field("stopTime", SFTime)
            .field("url", MFString)
            .value("repeatS", yes())
            .value("repeatT", yes())
            .build(),
        node("NavigationInfo")
            .value("avatarSize", FieldValue::MFFloat(vec![0.25, 1.6, 0.75]))
            .value("headlight", yes())
            .value("speed", float(1.0))
            .value("type", strings(&["WALK", "ANY"]))
            .field("visibilityLimit", SFFloat)
            .build(),
        node("Normal").field("vector", MFVec3f).build(),
        node("NormalInterpolator")
            .field("key", MFFloat)
            .field("keyValue", MFVec3f)
            .build(),
        node("OrientationInterpolator")
            .field("key", MFFloat)
            .field("keyValue", MFRotation)
            .build(),
        node("PixelTexture")
            .value("image", FieldValue::SFImage(Image::default()))
            .value("repeatS", yes())
            .value("repeatT", yes())
            .build(),
        node("PlaneSensor")
            .value("autoOffset", yes())
            .value("enabled", yes())
            .value("maxPosition", vec2(-1.0, -1.0))
            .field("minPosition", SFVec2f)
            .field("offset", SFVec3f)
            .build(),
        node("PointLight")
            .field("ambientIntensity", SFFloat)
            .value("attenuation", vec3(1.0, 0.0, 0.0))
            .value("color", color(1.0, 1.0, 1.0))
            .value("intensity", float(1.0))
            .field("location", SFVec3f)
            .value("on", yes())
            .value("radius", float(100.0))
            .build(),
        node("PointSet")
            .field("color", SFNode)
            .field("coord", SFNode)
            .build(),
        node("PositionInterpolator")
            .field("key", MFFloat)
            .field("keyValue", MFVec3f)
            .build(),
        node("ProximitySensor")
            .field("center", SFVec3f)
            .field("size", SFVec3f)
            .value("enabled", yes())
            .build(),
        node("ScalarInterpolator")
            .field("key", MFFloat)
            .field("keyValue", MFFloat)
            .build(),
        node(SCRIPT_TYPE_NAME)
            .field("url", MFString)
            .field("directOutput", SFBool)
            .field("mustEvaluate", SFBool)
            .build(),
        node("Shape")
            .field("appearance", SFNode)
            .field("geometry", SFNode)
            .build(),
        node("Sound")
            .value("direction", vec3(0.0, 0.0, 1.0))
            .value("intensity", float(1.0))
            .field("location", SFVec3f)
            .value("maxBack", float(10.0))
            .value("maxFront", float(10.0))
            .value("minBack", float(1.0))
            .value("minFront", float(1.0))
            .field("priority", SFFloat)
            .field("source", SFNode)
            .value("spatialize", yes())
            .build(),
        node("Sphere").value("radius", float(1.0)).build(),
        node("SphereSensor")
            .value("autoOffset", yes())
            .value("enabled", yes())
            .value("offset", rotation(0.0, 1.0, 0.0, 0.0))
            .build(),
        node("SpotLight")
            .field("ambientIntensity", SFFloat)
            .value("attenuation", vec3(1.0, 0.0, 0.0))
            .value("beamWidth", float(1.570796))
            .value("color", color(1.0, 1.0, 1.0))
            .value("cutOffAngle", float(0.785398))
            .value("direction", vec3(0.0, 0.0, -1.0))
            .value("intensity", float(1.0))
            .field("location", SFVec3f)
            .value("on", yes())
            .value("radius", float(100.0))
            .build(),
        node("Switch")
            .field("choice", MFNode)
            .value("whichChoice", FieldValue::SFInt32(-1))
            .build(),
        node("Text")
            .field("string", MFString)
            .field("fontStyle", SFNode)
            .field("length", MFFloat)
            .field("maxExtent", SFFloat)
            .build(),
        node("TextureCoordinate").field("point", MFVec2f).build(),
        node("TextureTransform")
            .field("center", SFVec2f)
            .field("rotation", SFFloat)
            .value("scale", vec2(1.0, 1.0))
            .field("translation", SFVec2f)
            .build(),
        node("TimeSensor")
            .value("cycleInterval", time(1.0))
            .value("enabled", yes())
            .field("loop", SFBool)
            .field("startTime", SFTime)
            .field("stopTime", SFTime)
            .build(),
        node("TouchSensor").value("enabled", yes()).build(),
        node("Transform")
            .field("center", SFVec3f)
            .grouping()
            .field("rotation", SFRotation)
            .value("scale", vec3(1.0, 1.0, 1.0))
            .field("scaleOrientation", SFRotation)
            .field("translation", SFVec3f)
            .build(),
        node("Viewpoint")
            .value("fieldOfView", float(0.785398))
            .value("jump", yes())
            .field("orientation", SFRotation)
            .value("position", vec3(0.0, 0.0, 10.0))
            .field("description", SFString)
            .build(),
        node("VisibilitySensor")
            .field("center", SFVec3f)
            .value("enabled", yes())
            .field("size", SFVec3f)
            .build(),
        node("WorldInfo")
            .field("info", MFString)
            .field("title", SFString)
            .build(),
    ]
}
