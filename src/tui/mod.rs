//! Terminal UI
//!
//! Event-driven presentation layer on top of the session controller:
//! - [`app`] - main application loop and rendering
//! - [`event`] - async event stream (input, session updates, ticks)
//! - [`theme`] - centralized styling
//! - [`widgets`] - map tree and node detail widgets

pub mod app;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::App;
