//! Error types for mindmapper
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `Display` and `Error` impls.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for mindmapper
#[derive(Error, Debug)]
pub enum Error {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Malformed tree: {0}")]
    Shape(#[from] ShapeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),
}

/// Session state machine errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// A submission arrived while another generation was still in flight.
    /// This is a control signal telling the caller to wait, not a fault.
    #[error("A generation request is already in flight")]
    RequestInFlight,

    #[error("Prompt is empty")]
    EmptyPrompt,
}

/// Generation service errors
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Transport-level failure: the request never produced a response
    /// (connection refused, DNS, timeout).
    #[error("Transport failure: {0}")]
    Network(String),

    /// The service responded, but with a non-success status or a payload
    /// that could not be interpreted.
    #[error("Generation service failure: {0}")]
    Service(String),
}

/// Raw tree shape errors
///
/// Produced when the generation service returns JSON that does not match
/// the expected node shape. `at` is a JSON-pointer-style location of the
/// offending node.
#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("node at {at} is not an object")]
    NotAnObject { at: String },

    #[error("node at {at} has a missing or non-string `content` field")]
    MissingContent { at: String },

    #[error("node at {at} has a non-sequence `children` field")]
    ChildrenNotASequence { at: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to create config directory: {0}")]
    DirectoryCreationFailed(PathBuf),
}

/// TUI-related errors
#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Failed to initialize terminal: {0}")]
    InitFailed(String),

    #[error("Failed to restore terminal: {0}")]
    RestoreFailed(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::RequestInFlight;
        assert!(err.to_string().contains("already in flight"));

        let err = GenerationError::Service("status 500".to_string());
        assert!(err.to_string().contains("500"));

        let err = ShapeError::MissingContent {
            at: "/root/children/2".to_string(),
        };
        assert!(err.to_string().contains("/root/children/2"));
    }

    #[test]
    fn test_error_conversion() {
        let session_err = SessionError::RequestInFlight;
        let _top_err: Error = session_err.into();

        let gen_err = GenerationError::Network("connection refused".to_string());
        let _top_err: Error = gen_err.into();
    }
}
