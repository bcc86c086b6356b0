//! Generation service boundary
//!
//! - [`client`] - the [`GenerationClient`](client::GenerationClient) trait
//!   and the HTTP implementation

pub mod client;

pub use client::{GenerationClient, GenerationResult, HttpGenerationClient};
