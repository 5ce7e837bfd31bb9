//! Nodes and the scene arena
//!
//!     A [`Scene`] owns every node of a parsed document in a flat arena and hands out [`NodeId`]
//!     handles. Fields and child lists refer to nodes by handle, which gives `DEF`/`USE` sharing
//!     identity semantics for free: two references to the same handle are the same node.
//!
//!     Because a name is registered before its node's body is parsed, a node may reference
//!     itself and the node graph may contain cycles. Every traversal here keeps a visited set.

use super::field::{Field, FieldType, FieldValue};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Handle of a node inside its owning [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Access class of an interface member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessType {
    EventIn,
    EventOut,
    Field,
    ExposedField,
}

impl AccessType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "eventIn" => Some(AccessType::EventIn),
            "eventOut" => Some(AccessType::EventOut),
            "field" => Some(AccessType::Field),
            "exposedField" => Some(AccessType::ExposedField),
            _ => None,
        }
    }

    /// Fields carry a value; events do not
    pub fn has_value(self) -> bool {
        matches!(self, AccessType::Field | AccessType::ExposedField)
    }
}

/// An interface member declared by a prototype or a Script node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDeclaration {
    pub access: AccessType,
    pub field_type: FieldType,
    pub name: String,
}

/// `field IS interfaceField` inside a prototype body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsBinding {
    pub field: String,
    pub interface_field: String,
}

/// A typed, optionally named bag of fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub type_name: String,
    pub name: Option<String>,
    pub fields: Vec<Field>,
    /// Instantiated prototype body; empty for built-in nodes
    pub children: Vec<NodeId>,
    pub interface: Vec<InterfaceDeclaration>,
    pub bindings: Vec<IsBinding>,
}

impl Node {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            fields: Vec::new(),
            children: Vec::new(),
            interface: Vec::new(),
            bindings: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push(Field::new(name, value));
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.value)
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.field(name).map(FieldValue::field_type)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// True if `name` is a field or an event this node declares
    pub fn declares(&self, name: &str) -> bool {
        self.has_field(name) || self.interface.iter().any(|decl| decl.name == name)
    }

    /// Add a field to this node's schema. Returns false if the name is already taken.
    pub fn declare_field(&mut self, name: &str, value: FieldValue) -> bool {
        if self.declares(name) {
            return false;
        }
        self.fields.push(Field::new(name, value));
        true
    }

    /// Every node handle this node refers to: field values first, then children
    pub fn node_refs(&self) -> Vec<NodeId> {
        self.fields
            .iter()
            .flat_map(|f| f.value.node_refs())
            .chain(self.children.iter().copied())
            .collect()
    }

    fn remap_nodes(&mut self, f: &mut impl FnMut(NodeId) -> NodeId) {
        for field in &mut self.fields {
            field.value.remap_nodes(f);
        }
        for child in &mut self.children {
            *child = f(*child);
        }
    }

    /// `DEF name Type` or `Type`
    pub fn display_label(&self) -> String {
        match &self.name {
            Some(name) => format!("DEF {} {}", name, self.type_name),
            None => self.type_name.clone(),
        }
    }
}

/// Type name of the synthetic document root
pub const ROOT_TYPE_NAME: &str = "Scene";

/// Parse result: an arena of nodes under a synthetic root
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    nodes: Vec<Node>,
    root: NodeId,
    /// Names of prototypes declared by the document, in declaration order
    pub prototypes: Vec<String>,
    /// `DEF` names visible at this scene's scope, each bound to its latest definition
    names: BTreeMap<String, NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(ROOT_TYPE_NAME)],
            root: NodeId(0),
            prototypes: Vec::new(),
            names: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Top-level nodes in document order
    pub fn top_level(&self) -> &[NodeId] {
        &self.node(self.root).children
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Handles are only ever produced by this arena, so lookups cannot miss.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Nodes allocated in the arena, including the root
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Bind `name` to `id`, shadowing any earlier definition
    pub fn define_name(&mut self, name: &str, id: NodeId) {
        self.names.insert(name.to_string(), id);
    }

    /// Node most recently defined as `name` at this scope.
    ///
    /// Names defined inside prototype bodies belong to the prototype and are not found here,
    /// even though instances copy those nodes into this arena.
    pub fn find_named(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Depth-first walk from the root, visiting each reachable node once
    pub fn walk(&self, mut visit: impl FnMut(NodeId, &Node)) {
        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let node = self.node(id);
            visit(id, node);
            stack.extend(node.node_refs().into_iter().rev());
        }
    }

    /// Deep-copy the subgraph reachable from `id` in `source` into this arena.
    ///
    /// Sharing inside the subgraph is preserved: a node reached twice is copied once.
    pub fn import_subtree(&mut self, source: &Scene, id: NodeId) -> NodeId {
        let mut remap = HashMap::new();
        self.import_node(source, id, &mut remap)
    }

    fn import_node(
        &mut self,
        source: &Scene,
        id: NodeId,
        remap: &mut HashMap<NodeId, NodeId>,
    ) -> NodeId {
        if let Some(&mapped) = remap.get(&id) {
            return mapped;
        }
        let mut node = source.node(id).clone();
        let new_id = self.alloc(Node::new(node.type_name.clone()));
        remap.insert(id, new_id);
        node.remap_nodes(&mut |old| self.import_node(source, old, remap));
        self.nodes[new_id.0] = node;
        new_id
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
