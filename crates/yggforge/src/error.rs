//! Error types for the Yggforge server.
//!
//! Two error types live here, for two different audiences:
//!
//! - [`YggforgeError`] is for the *operator*: things that stop the server
//!   from starting or running (bad config, port in use, ...).
//! - [`ApiError`] is for the *launcher*: a refused request, rendered as
//!   the protocol's error body with the matching HTTP status.

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use yggforge_client::ClientError;
use yggforge_protocol::{Codec, ErrorResponse, JsonCodec, ProtocolError};
use yggforge_session::AuthError;

const MALFORMED_BODY: &str = "Malformed request body.";

/// Everything that can stop a Yggforge process, in one type.
///
/// Each sub-crate error converts in through `#[from]`, so a `main` or a
/// setup function can mix seeding, client calls, and server startup
/// behind a single `?`.
#[derive(Debug, thiserror::Error)]
pub enum YggforgeError {
    /// A protocol-level error (encode, decode, malformed identifier).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The token authority refused an operation.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A client call failed (network, or the server said no).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Binding or serving the socket failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An environment variable held a value we can't use.
    #[error("invalid configuration: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// A refused request, as the launcher sees it.
///
/// | Variant      | Status | `error`                         |
/// |--------------|--------|---------------------------------|
/// | `BadRequest` | 400    | `IllegalArgumentException`      |
/// | `MalformedBody` | 400 | `IllegalArgumentException`      |
/// | `Forbidden`  | 403    | `ForbiddenOperationException`   |
/// | `Internal`   | 500    | `InternalServerError`           |
///
/// Handlers return `Result<Response, ApiError>` and use `?` freely:
/// body decode failures convert from [`ProtocolError`], authority
/// refusals from [`AuthError`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body decoded but breaks a protocol rule.
    #[error("{0}")]
    BadRequest(String),

    /// The body couldn't be decoded. The decoder's detail goes out as
    /// the error body's `cause`.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// The authority refused the operation.
    #[error(transparent)]
    Forbidden(#[from] AuthError),

    /// Something on our side broke while answering.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error is sent with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The protocol error body for this error.
    pub fn body(&self) -> ErrorResponse {
        match self {
            Self::BadRequest(message) => {
                ErrorResponse::illegal_argument(message.clone())
            }
            Self::MalformedBody(detail) => {
                ErrorResponse::illegal_argument(MALFORMED_BODY)
                    .with_cause(detail.clone())
            }
            Self::Forbidden(err) => ErrorResponse::forbidden(err.to_string()),
            Self::Internal(message) => ErrorResponse {
                error: "InternalServerError".to_string(),
                error_message: message.clone(),
                cause: None,
            },
        }
    }
}

impl From<ProtocolError> for ApiError {
    fn from(err: ProtocolError) -> Self {
        match err {
            // The protocol rule's own text goes out verbatim.
            ProtocolError::InvalidMessage(message) => Self::BadRequest(message),
            ProtocolError::Decode(e) => Self::MalformedBody(e.to_string()),
            ProtocolError::Encode(e) => Self::Internal(e.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request refused");
        }

        // Error bodies are always JSON, whatever codec the routes use.
        let codec = JsonCodec;
        match codec.encode(&self.body()) {
            Ok(bytes) => {
                (status, [(CONTENT_TYPE, codec.content_type())], bytes)
                    .into_response()
            }
            Err(_) => status.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> ProtocolError {
        ProtocolError::Decode(serde_json_error())
    }

    fn serde_json_error() -> serde_json::Error {
        serde_json::from_str::<u32>("nope").expect_err("not a number")
    }

    #[test]
    fn test_from_protocol_error() {
        let err: YggforgeError = decode_error().into();
        assert!(matches!(err, YggforgeError::Protocol(_)));
    }

    #[test]
    fn test_from_auth_error() {
        let err: YggforgeError = AuthError::InvalidToken.into();
        assert!(matches!(err, YggforgeError::Auth(_)));
        assert_eq!(err.to_string(), "Invalid token.");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken");
        let err: YggforgeError = io.into();
        assert!(matches!(err, YggforgeError::Io(_)));
        assert!(err.to_string().contains("taken"));
    }

    #[test]
    fn test_api_error_decode_failure_is_bad_request() {
        let err: ApiError = decode_error().into();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.body();
        assert_eq!(body.error, "IllegalArgumentException");
        assert_eq!(body.error_message, MALFORMED_BODY);
        assert!(body.cause.is_some_and(|c| c.contains("line 1")));
    }

    #[test]
    fn test_api_error_rule_violation_has_no_cause() {
        let err: ApiError =
            ProtocolError::MalformedIdentifier("xyz".into()).into();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body().cause, None);
    }

    #[test]
    fn test_api_error_invalid_message_keeps_text() {
        let err: ApiError =
            ProtocolError::InvalidMessage("Access token already has a profile assigned.".into())
                .into();

        assert_eq!(
            err.body().error_message,
            "Access token already has a profile assigned."
        );
    }

    #[test]
    fn test_api_error_auth_refusal_is_forbidden() {
        let err: ApiError = AuthError::InvalidCredentials.into();

        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.body(),
            ErrorResponse::forbidden(
                "Invalid credentials. Invalid username or password."
            )
        );
    }

    #[test]
    fn test_api_error_encode_failure_is_internal() {
        let err: ApiError = ProtocolError::Encode(serde_json_error()).into();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_api_error_into_response_writes_json_body() {
        let response = ApiError::Forbidden(AuthError::InvalidToken).into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: ErrorResponse =
            serde_json::from_slice(&bytes).expect("error body");
        assert_eq!(body, ErrorResponse::forbidden("Invalid token."));
    }
}
