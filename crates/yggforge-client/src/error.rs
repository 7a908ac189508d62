use reqwest::StatusCode;
use yggforge_protocol::ProtocolError;
use yggforge_session::AuthError;

/// Errors returned by [`YggdrasilClient`](crate::YggdrasilClient).
///
/// Which variants show up depends on the backend: an HTTP client reports
/// server-side refusals as [`ClientError::Api`], while a local client
/// hands back the authority's [`AuthError`] untouched.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never got a response (connect, TLS, timeout...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The base URL can't be joined with an endpoint path.
    #[error("invalid base url: {0:?}")]
    InvalidBaseUrl(String),

    /// Encoding the request or decoding the response body failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server answered with a non-success status.
    ///
    /// `error` and `message` come from the protocol's error body. If the
    /// body wasn't one, `error` is empty and `message` holds the raw text.
    #[error("HTTP {status}: {error}: {message}")]
    Api {
        status: StatusCode,
        error: String,
        message: String,
    },

    /// The in-process authority refused the operation.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ClientError {
    /// The protocol error kind (`ForbiddenOperationException`, ...), if
    /// the server sent one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Api { error, .. } if !error.is_empty() => Some(error),
            _ => None,
        }
    }
}
