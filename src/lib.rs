//! Mindmapper - a terminal UI for iteratively exploring AI-generated mind maps
//!
//! Submit a prompt, get a tree, drill into any node to regenerate a sub-map
//! grounded in that node's ancestry, and move back/forward through prior
//! versions of the map.
//!
//! # Architecture
//!
//! The session controller is the heart of the application: it owns tree
//! versions and the single-in-flight generation guard, and everything else
//! is either a leaf it orchestrates or a boundary around it.
//!
//! # Modules
//!
//! - [`tree`] - immutable tree model and root-to-node path resolution
//! - [`history`] - linear undo/redo stack of tree snapshots
//! - [`generation`] - generation service boundary (trait + HTTP client)
//! - [`session`] - session controller, views, and events
//! - [`tui`] - event-driven terminal UI with ratatui
//! - [`config`] - layered configuration
//! - [`error`] - error types

pub mod config;
pub mod error;
pub mod generation;
pub mod history;
pub mod session;
pub mod tree;
pub mod tui;

pub use config::Config;
pub use error::{Error, Result};
pub use history::{HistoryStore, Snapshot};
pub use session::{NodeActivation, SessionController, SessionEvent, SessionView};
pub use tree::{Node, Tree};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
