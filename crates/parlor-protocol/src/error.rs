//! Error types for the protocol layer.
//!
//! Each crate in Parlor defines its own error enum. When you see a
//! `ProtocolError`, the problem is in turning bytes into frames (or
//! frames into commands), not in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or wrong
    /// data types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but its arguments don't fit the command it names.
    #[error("invalid arguments for {event}: {reason}")]
    InvalidArguments { event: String, reason: String },
}
