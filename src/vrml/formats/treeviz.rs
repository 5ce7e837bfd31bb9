//! Treeviz formatter for scenes
//!
//! One line per node, nesting encoded as two characters of indentation per level:
//!
//!     <prefix><connector> <icon> <label>
//!
//! Example:
//!
//!     ⧉ Scene
//!     ├─ ◆ DEF Arm Transform
//!     │ └─ ◆ children: Shape
//!     │   └─ ◆ geometry: Box
//!     └─ ↺ USE Arm
//!
//! Icons
//!     Scene root: ⧉
//!     Node (top level or held by a node field): ◆
//!     Prototype body node: ⊂
//!     Node already printed above: ↺
//!
//! Labels are `DEF name Type` or `Type`, prefixed with the holding field's name. A node that is
//! reached again (shared through `USE`, or part of a cycle) is printed once in full and as a
//! `USE` line afterwards.

use super::registry::{FormatError, Formatter};
use crate::vrml::ast::{NodeId, Scene};
use std::collections::HashSet;

pub const DEFAULT_LABEL_WIDTH: usize = 30;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

struct Entry {
    icon: &'static str,
    field: Option<String>,
    node: NodeId,
}

struct Printer<'a> {
    scene: &'a Scene,
    label_width: usize,
    printed: HashSet<NodeId>,
    output: String,
}

impl<'a> Printer<'a> {
    fn entries(&self, id: NodeId) -> Vec<Entry> {
        let node = self.scene.node(id);
        let body_icon = if id == self.scene.root() { "◆" } else { "⊂" };

        let held = node.fields.iter().flat_map(|field| {
            field.value.node_refs().into_iter().map(|child| Entry {
                icon: "◆",
                field: Some(field.name.clone()),
                node: child,
            })
        });
        let body = node.children.iter().map(|&child| Entry {
            icon: body_icon,
            field: None,
            node: child,
        });
        held.chain(body).collect()
    }

    fn format_children(&mut self, id: NodeId, prefix: &str) {
        let entries = self.entries(id);
        let count = entries.len();

        for (index, entry) in entries.into_iter().enumerate() {
            let is_last = index == count - 1;
            let connector = if is_last { "└─" } else { "├─" };
            let field_prefix = entry
                .field
                .map(|name| format!("{}: ", name))
                .unwrap_or_default();
            let node = self.scene.node(entry.node);

            if !self.printed.insert(entry.node) {
                let target = node
                    .name
                    .clone()
                    .unwrap_or_else(|| entry.node.to_string());
                let label = truncate(&format!("{}USE {}", field_prefix, target), self.label_width);
                self.output
                    .push_str(&format!("{}{} ↺ {}\n", prefix, connector, label));
                continue;
            }

            let label = truncate(
                &format!("{}{}", field_prefix, node.display_label()),
                self.label_width,
            );
            self.output
                .push_str(&format!("{}{} {} {}\n", prefix, connector, entry.icon, label));

            let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
            self.format_children(entry.node, &child_prefix);
        }
    }
}

pub fn to_treeviz_str(scene: &Scene) -> String {
    to_treeviz_str_with_width(scene, DEFAULT_LABEL_WIDTH)
}

fn to_treeviz_str_with_width(scene: &Scene, label_width: usize) -> String {
    let root = scene.root();
    let mut printer = Printer {
        scene,
        label_width,
        printed: HashSet::from([root]),
        output: format!("⧉ {}\n", scene.node(root).type_name),
    };
    printer.format_children(root, "");
    printer.output
}

/// Formatter implementation for treeviz format
pub struct TreevizFormatter {
    pub label_width: usize,
}

impl Default for TreevizFormatter {
    fn default() -> Self {
        Self {
            label_width: DEFAULT_LABEL_WIDTH,
        }
    }
}

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, scene: &Scene) -> Result<String, FormatError> {
        Ok(to_treeviz_str_with_width(scene, self.label_width))
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }
}
