//! Error types for the protocol layer.
//!
//! Each crate in Yggforge defines its own error enum. A `ProtocolError`
//! always means the problem is in the shape of data (bytes, JSON, or an
//! identifier string), never in who is allowed to do what.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    ///
    /// The inner `serde_json::Error` is kept so callers can still see
    /// exactly which field was the problem.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields such as
    /// `username`, or a number where a string was expected.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but breaks a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A string that should hold an identifier doesn't.
    ///
    /// Raised by [`to_dashed`](crate::identity::to_dashed) and friends when
    /// the input is not 32 hex characters, or when the dashed 8-4-4-4-12
    /// reconstruction fails to parse.
    #[error("malformed identifier: {0:?}")]
    MalformedIdentifier(String),
}
