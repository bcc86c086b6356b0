//! Mind-map tree model and path resolution
//!
//! - [`model`] - the immutable tree value and conversion from raw
//!   generation output
//! - [`path`] - root-to-node path lookup and context strings

pub mod model;
pub mod path;

pub use model::{Node, Tree};
pub use path::{context_string, path_to, CONTEXT_SEPARATOR};
