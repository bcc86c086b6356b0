//! Session-facing value types
//!
//! The values exchanged between the session controller and whatever is
//! driving it (the TUI, the one-shot CLI, tests).

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::tree::Tree;

/// A node activation forwarded from the renderer.
///
/// Carries the activated node's own label and description - renderer
/// click events have the node at hand, and the description doubles as the
/// fallback prompt when the label cannot be resolved in the current tree.
#[derive(Debug, Clone)]
pub struct NodeActivation {
    /// Label of the activated node
    pub label: String,
    /// Description carried by the activated node, if any
    pub description: Option<String>,
    /// Whether the gesture counts as a drill-down request. The renderer
    /// decides which gesture qualifies; the session only consumes the
    /// bool.
    pub drill_down: bool,
}

impl NodeActivation {
    /// An activation that requests a drill-down
    pub fn drill_down(label: impl Into<String>, description: Option<String>) -> Self {
        Self {
            label: label.into(),
            description,
            drill_down: true,
        }
    }

    /// An activation that merely inspects the node
    pub fn inspect(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            drill_down: false,
        }
    }
}

/// Read-only view of the session, taken in one lock acquisition.
///
/// Everything the presentation layer needs per frame.
#[derive(Debug, Clone)]
pub struct SessionView {
    /// Current tree, `None` before the first successful generation
    pub tree: Option<Arc<Tree>>,
    /// Prompt text the current tree was generated from (or empty)
    pub current_input: String,
    /// Whether a generation request is in flight
    pub pending: bool,
    /// Whether `back()` would move
    pub can_go_back: bool,
    /// Whether `forward()` would move
    pub can_go_forward: bool,
    /// Number of recorded snapshots
    pub history_len: usize,
    /// Position of the current snapshot, `None` when history is empty
    pub history_position: Option<usize>,
    /// When the current snapshot was generated
    pub generated_at: Option<DateTime<Utc>>,
}

/// Notifications published by the session controller.
///
/// Observers subscribe through the channel handed out at construction;
/// there is no ambient global state to poll.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A generation request was sent
    GenerationStarted { prompt: String },
    /// A generation completed and a new snapshot is current
    TreeUpdated {
        source_input: String,
        node_count: usize,
    },
    /// A generation or refinement call failed; session state is unchanged
    GenerationFailed { message: String },
    /// A submission was rejected because another request is in flight
    SubmissionRejected,
    /// The history pointer moved via back/forward
    HistoryMoved { position: usize },
}
