//! Error types for protocol decoding.

/// Errors that can occur while decoding boundary messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Failed to parse message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {kind} id {value:?}")]
    InvalidId { kind: &'static str, value: String },
}
