//! Node type registry
//!
//!     Maps a type name to a template and produces fresh instances on demand. Two catalogs are
//!     consulted, built-ins first:
//!
//!         - the built-in catalog, seeded once per process from [builtins](builtins) and shared
//!           read-only between every registry;
//!         - the user catalog, filled as `PROTO` and `EXTERNPROTO` declarations are parsed.
//!
//!     A template is a tiny [`Scene`] holding the prototype node plus anything its defaults or
//!     body refer to. Instantiation deep-copies that subgraph into the caller's scene, so
//!     templates are never mutated by the documents that use them.

pub mod builtins;

use crate::vrml::ast::{Node, NodeId, Scene};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

static BUILTIN_CATALOG: Lazy<Arc<HashMap<String, NodeTemplate>>> = Lazy::new(|| {
    Arc::new(
        builtins::catalog()
            .into_iter()
            .map(|template| (template.type_name().to_string(), template))
            .collect(),
    )
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),
}

/// Where a template came from
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateKind {
    Builtin,
    Prototype,
    ExternPrototype { urls: Vec<String> },
}

/// A registered node type
#[derive(Debug, Clone)]
pub struct NodeTemplate {
    kind: TemplateKind,
    store: Scene,
    prototype: NodeId,
}

impl NodeTemplate {
    pub fn builtin(node: Node) -> Self {
        let mut store = Scene::new();
        let prototype = store.alloc(node);
        Self {
            kind: TemplateKind::Builtin,
            store,
            prototype,
        }
    }

    /// A `PROTO` whose prototype node (interface defaults and body) lives in `store`
    pub fn prototype(store: Scene, prototype: NodeId) -> Self {
        Self {
            kind: TemplateKind::Prototype,
            store,
            prototype,
        }
    }

    pub fn extern_prototype(store: Scene, prototype: NodeId, urls: Vec<String>) -> Self {
        Self {
            kind: TemplateKind::ExternPrototype { urls },
            store,
            prototype,
        }
    }

    pub fn kind(&self) -> &TemplateKind {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.prototype_node().type_name
    }

    pub fn prototype_node(&self) -> &Node {
        self.store.node(self.prototype)
    }

    /// Copy the template into `scene` and apply the instance name
    pub fn instantiate(&self, scene: &mut Scene, name: Option<&str>) -> NodeId {
        let id = scene.import_subtree(&self.store, self.prototype);
        scene.node_mut(id).name = name.map(str::to_string);
        id
    }
}

/// Registry of node types available to one parse
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    builtins: Arc<HashMap<String, NodeTemplate>>,
    user: HashMap<String, NodeTemplate>,
}

impl NodeRegistry {
    /// A registry seeded with the standard built-in catalog
    pub fn new() -> Self {
        Self {
            builtins: Arc::clone(&BUILTIN_CATALOG),
            user: HashMap::new(),
        }
    }

    /// A registry whose built-in catalog is exactly `templates`
    pub fn with_catalog(templates: impl IntoIterator<Item = NodeTemplate>) -> Self {
        Self {
            builtins: Arc::new(
                templates
                    .into_iter()
                    .map(|template| (template.type_name().to_string(), template))
                    .collect(),
            ),
            user: HashMap::new(),
        }
    }

    pub fn lookup(&self, type_name: &str) -> Option<&NodeTemplate> {
        self.builtins
            .get(type_name)
            .or_else(|| self.user.get(type_name))
    }

    pub fn is_builtin(&self, type_name: &str) -> bool {
        self.builtins.contains_key(type_name)
    }

    /// Instantiate `type_name` into `scene`
    pub fn create_node(
        &self,
        scene: &mut Scene,
        type_name: &str,
        name: Option<&str>,
    ) -> Result<NodeId, RegistryError> {
        let template = self
            .lookup(type_name)
            .ok_or_else(|| RegistryError::UnknownNodeType(type_name.to_string()))?;
        let id = template.instantiate(scene, name);
        tracing::trace!(type_name, ?name, node = %id, "instantiated node");
        Ok(id)
    }

    /// Insert or overwrite a user-defined type, keyed by the template's own name
    pub fn register_prototype(&mut self, template: NodeTemplate) -> Option<NodeTemplate> {
        let type_name = template.type_name().to_string();
        if self.is_builtin(&type_name) {
            tracing::warn!(
                type_name = %type_name,
                "prototype shadows a built-in type name and will never be instantiated"
            );
        }
        tracing::debug!(type_name = %type_name, kind = ?template.kind(), "registered prototype");
        self.user.insert(type_name, template)
    }

    /// Sorted names of the built-in types
    pub fn builtin_type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builtins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Sorted names of the user-defined types
    pub fn prototype_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.user.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vrml::ast::{FieldType, FieldValue, Vec3f};

    #[test]
    fn test_create_builtin_node() {
        let registry = NodeRegistry::new();
        let mut scene = Scene::new();
        let id = registry
            .create_node(&mut scene, "Transform", Some("Arm"))
            .unwrap();

        let node = scene.node(id);
        assert_eq!(node.type_name, "Transform");
        assert_eq!(node.name.as_deref(), Some("Arm"));
        assert_eq!(
            node.field("scale"),
            Some(&FieldValue::SFVec3f(Vec3f::new(1.0, 1.0, 1.0)))
        );
        assert_eq!(node.field_type("children"), Some(FieldType::MFNode));
    }

    #[test]
    fn test_unknown_type() {
        let registry = NodeRegistry::new();
        let mut scene = Scene::new();
        assert_eq!(
            registry.create_node(&mut scene, "Teapot", None),
            Err(RegistryError::UnknownNodeType("Teapot".to_string()))
        );
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_instances_are_independent() {
        let registry = NodeRegistry::new();
        let mut scene = Scene::new();
        let a = registry.create_node(&mut scene, "Sphere", None).unwrap();
        let b = registry.create_node(&mut scene, "Sphere", None).unwrap();
        assert_ne!(a, b);

        *scene.node_mut(a).field_mut("radius").unwrap() = FieldValue::SFFloat(5.0);
        assert_eq!(scene.node(b).field("radius"), Some(&FieldValue::SFFloat(1.0)));
        assert_eq!(
            registry.lookup("Sphere").unwrap().prototype_node().field("radius"),
            Some(&FieldValue::SFFloat(1.0))
        );
    }

    #[test]
    fn test_register_prototype_overwrites() {
        let mut registry = NodeRegistry::with_catalog(Vec::new());
        let first = NodeTemplate::builtin(
            Node::new("Widget").with_field("x", FieldValue::SFInt32(1)),
        );
        let second = NodeTemplate::builtin(
            Node::new("Widget").with_field("y", FieldValue::SFInt32(2)),
        );
        assert!(registry.register_prototype(first).is_none());
        assert!(registry.register_prototype(second).is_some());

        let node = registry.lookup("Widget").unwrap().prototype_node();
        assert!(node.has_field("y"));
        assert!(!node.has_field("x"));
        assert_eq!(registry.prototype_names(), vec!["Widget"]);
    }

    #[test]
    fn test_builtins_take_precedence() {
        let mut registry = NodeRegistry::new();
        registry.register_prototype(NodeTemplate::builtin(Node::new("Box")));
        let template = registry.lookup("Box").unwrap();
        assert!(template.prototype_node().has_field("size"));
    }
}
