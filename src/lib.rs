//! # vrml-import
//!
//! An importer for VRML97-style declarative scene descriptions.
//!
//! ```rust,ignore
//! use vrml_import::vrml::parse_document;
//!
//! let scene = parse_document("DEF Ball Sphere { radius 2 }")?;
//! let ball = scene.find_named("Ball");
//! ```

pub mod vrml;
