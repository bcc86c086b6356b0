//! TUI widgets
//!
//! - [`map_tree`] - indented mind-map tree with selection
//! - [`detail`] - scrollable node description pane

pub mod detail;
pub mod map_tree;

pub use detail::{DetailState, DetailView};
pub use map_tree::{flatten_tree, MapRow, MapTree, MapTreeState};
