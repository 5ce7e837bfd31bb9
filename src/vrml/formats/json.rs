//! JSON serialization of the scene arena
//!
//! Nodes are emitted in arena order; node-valued fields and prototype bodies refer to other
//! nodes by index, so shared nodes and cycles serialize without duplication.

use super::registry::{FormatError, Formatter};
use crate::vrml::ast::Scene;

pub fn to_json(scene: &Scene, pretty: bool) -> Result<String, FormatError> {
    let result = if pretty {
        serde_json::to_string_pretty(scene)
    } else {
        serde_json::to_string(scene)
    };
    result.map_err(|e| FormatError::SerializationError(e.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, scene: &Scene) -> Result<String, FormatError> {
        to_json(scene, self.pretty)
    }

    fn description(&self) -> &str {
        "Scene arena as JSON, nodes referenced by index"
    }
}
