//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The HTTP adapter and the client never call `serde_json` directly: they
//! go through a [`Codec`], so a decode failure always surfaces as a
//! [`ProtocolError::Decode`] that maps onto the protocol's
//! `IllegalArgumentException` response.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → safe to share between request handlers, which Tokio
///   may run on any worker thread.
/// - `'static` → the codec owns everything it needs, so it can live inside
///   long-lived shared server state.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a complete body back into a value.
    ///
    /// `data` must be the whole message. Callers are expected to read a
    /// body to EOF before decoding; a prefix of a JSON document is just a
    /// decode error.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// The `Content-Type` header value for bodies produced by this codec.
    fn content_type(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Yggdrasil is a JSON protocol, so this is the only codec the server
/// and client ship with. It is behind the `json` feature flag (enabled by
/// default).
///
/// ## Example
///
/// ```rust
/// use yggforge_protocol::{Codec, JsonCodec, ValidateRequest};
///
/// let codec = JsonCodec;
///
/// let request = ValidateRequest {
///     access_token: "abc".into(),
///     client_token: None,
/// };
///
/// let bytes = codec.encode(&request).unwrap();
/// assert_eq!(bytes, br#"{"accessToken":"abc"}"#);
///
/// let decoded: ValidateRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn content_type(&self) -> &'static str {
        "application/json; charset=utf-8"
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{AuthRequest, SignoutRequest};

    #[test]
    fn test_decode_truncated_body_returns_decode_error() {
        // Half a document must never decode as something valid.
        let full = br#"{"username":"steve","password":"hunter2"}"#;
        let truncated = &full[..full.len() / 2];

        let result: Result<SignoutRequest, _> = JsonCodec.decode(truncated);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_missing_required_field_returns_decode_error() {
        let result: Result<AuthRequest, _> =
            JsonCodec.decode(br#"{"username":"steve"}"#);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_content_type_is_json_utf8() {
        assert_eq!(JsonCodec.content_type(), "application/json; charset=utf-8");
    }
}
