//! Session state machine
//!
//! - [`types`] - activation, view, and event values exchanged with the
//!   presentation layer
//! - [`controller`] - the controller owning tree versions, history, and
//!   the pending-request guard

pub mod controller;
pub mod types;

pub use controller::SessionController;
pub use types::{NodeActivation, SessionEvent, SessionView};
