//! Error types for the protocol layer.

/// What a client is told when its payload can't be understood.
pub const INVALID_MESSAGE_FORMAT: &str = "Invalid message format";

/// Errors that can occur while encoding or decoding messages.
///
/// Decode failures are the client's fault and are answered with
/// [`INVALID_MESSAGE_FORMAT`]; the detailed `Display` text here is for
/// logs only.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `type` tag,
    /// missing fields or wrong field types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
