//! Treeviz rendering of parsed documents

use vrml_import::vrml::formats::{to_treeviz_str, FormatRegistry};
use vrml_import::vrml::parse_document;

#[test]
fn shared_and_nested_nodes() {
    let scene = parse_document(
        "DEF Arm Transform {
           children [
             DEF Body Shape { geometry Box { } }
             Transform { children USE Body }
           ]
         }
         USE Arm",
    )
    .unwrap();

    insta::assert_snapshot!(to_treeviz_str(&scene), @r"
    ⧉ Scene
    ├─ ◆ DEF Arm Transform
    │ ├─ ◆ children: DEF Body Shape
    │ │ └─ ◆ geometry: Box
    │ └─ ◆ children: Transform
    │   └─ ↺ children: USE Body
    └─ ↺ USE Arm
    ");
}

#[test]
fn prototype_bodies() {
    let scene = parse_document(
        "PROTO Lamp [ field SFColor tint 1 1 0 ] {
           PointLight { color IS tint }
           Shape { geometry Sphere { } }
         }
         DEF Left Lamp { tint 1 0 0 }",
    )
    .unwrap();

    insta::assert_snapshot!(to_treeviz_str(&scene), @r"
    ⧉ Scene
    └─ ◆ DEF Left Lamp
      ├─ ⊂ PointLight
      └─ ⊂ Shape
        └─ ◆ geometry: Sphere
    ");
}

#[test]
fn self_reference() {
    let scene = parse_document("DEF Loop Group { children USE Loop }").unwrap();

    insta::assert_snapshot!(to_treeviz_str(&scene), @r"
    ⧉ Scene
    └─ ◆ DEF Loop Group
      └─ ↺ children: USE Loop
    ");
}

#[test]
fn registry_serializes_by_name() {
    let scene = parse_document("Shape { }").unwrap();
    let registry = FormatRegistry::with_defaults();
    assert_eq!(
        registry.serialize(&scene, "treeviz").unwrap(),
        to_treeviz_str(&scene)
    );
    assert!(registry.serialize(&scene, "json").unwrap().contains("\"Shape\""));
}
