//! Format registry for scene serialization
//!
//! Each format implements [`Formatter`] and is looked up by name in a [`FormatRegistry`].

use crate::vrml::ast::Scene;
use crate::vrml::config::OutputConfig;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("format '{0}' not found")]
    FormatNotFound(String),
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// A named scene serializer
pub trait Formatter: Send + Sync {
    /// The name of this format (e.g. "treeviz", "json")
    fn name(&self) -> &str;

    fn serialize(&self, scene: &Scene) -> Result<String, FormatError>;

    fn description(&self) -> &str {
        ""
    }
}

pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter, replacing any formatter with the same name
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    pub fn serialize(&self, scene: &Scene, format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        formatter.serialize(scene)
    }

    /// Sorted format names
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::TreevizFormatter::default());
        registry.register(super::JsonFormatter::default());
        registry
    }

    /// The default formats, tuned by the `[output]` configuration section
    pub fn for_output(output: &OutputConfig) -> Self {
        let mut registry = Self::new();
        registry.register(super::TreevizFormatter {
            label_width: output.label_width,
        });
        registry.register(super::JsonFormatter {
            pretty: output.pretty_json,
        });
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
