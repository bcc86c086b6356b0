//! Immutable mind-map tree model
//!
//! Converts raw generation output (loosely typed JSON) into the tree value
//! the rest of the application works with. Conversion is all-or-nothing: a
//! malformed node anywhere in the input fails the whole tree rather than
//! producing a partial one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ShapeError;

/// A single node of a mind map
///
/// Child order is significant and preserved end-to-end: display order is
/// traversal order. Leaves have an empty (never absent) children vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Short display text
    pub label: String,
    /// Optional longer description shown when the node is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Child nodes in display order
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a leaf node
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            children: Vec::new(),
        }
    }

    /// Number of nodes in the subtree rooted here, including this node
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

/// An immutable mind map
///
/// Never modified after construction; regeneration produces a new `Tree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// Root node
    pub root: Node,
}

impl Tree {
    /// Convert raw generation output into a tree.
    ///
    /// The expected shape of every raw node is
    /// `{content: string, description?: string, children: [raw node]}`.
    /// An absent `children` member is read as an empty sequence; a present
    /// non-sequence one is malformed. Fails with [`ShapeError`] on the
    /// first malformed node, leaving no partial result behind.
    pub fn from_raw(raw: &Value) -> Result<Self, ShapeError> {
        Ok(Self {
            root: node_from_raw(raw, "/root")?,
        })
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.root.count()
    }
}

fn node_from_raw(raw: &Value, at: &str) -> Result<Node, ShapeError> {
    let obj = raw.as_object().ok_or_else(|| ShapeError::NotAnObject {
        at: at.to_string(),
    })?;

    let label = obj
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| ShapeError::MissingContent {
            at: at.to_string(),
        })?
        .to_string();

    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    let children = match obj.get("children") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, child)| node_from_raw(child, &format!("{at}/children/{i}")))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ShapeError::ChildrenNotASequence {
                at: at.to_string(),
            })
        }
    };

    Ok(Node {
        label,
        description,
        children,
    })
}
