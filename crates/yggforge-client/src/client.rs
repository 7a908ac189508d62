//! [`YggdrasilClient`] and its two backends.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use yggforge_protocol::{
    AuthRequest, AuthResponse, Codec, ErrorResponse, InvalidateRequest,
    JsonCodec, RefreshRequest, SignoutRequest, ValidateRequest,
};
use yggforge_session::TokenAuthority;

use crate::ClientError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("yggforge/", env!("CARGO_PKG_VERSION"));

/// Where requests go.
enum Backend {
    Http { base_url: String, http: reqwest::Client },
    Local(Arc<dyn TokenAuthority>),
}

/// A Yggdrasil client.
///
/// Both constructors produce the same API, so code written against a
/// local authority in tests runs unchanged against a real server.
///
/// # Example
///
/// ```no_run
/// # async fn demo() -> Result<(), yggforge_client::ClientError> {
/// use yggforge_client::YggdrasilClient;
/// use yggforge_protocol::{AuthRequest, ValidateRequest};
///
/// let client = YggdrasilClient::http("http://127.0.0.1:8080")?;
/// let login = client
///     .authenticate(&AuthRequest {
///         agent: None,
///         username: "steve@example.com".into(),
///         password: "hunter2".into(),
///         client_token: None,
///         request_user: false,
///     })
///     .await?;
///
/// let ok = client
///     .validate(&ValidateRequest {
///         access_token: login.access_token,
///         client_token: None,
///     })
///     .await?;
/// assert!(ok);
/// # Ok(())
/// # }
/// ```
pub struct YggdrasilClient {
    backend: Backend,
    codec: JsonCodec,
}

impl YggdrasilClient {
    /// A client that talks to the server at `base_url`
    /// (e.g. `http://127.0.0.1:8080`).
    ///
    /// # Errors
    /// [`ClientError::InvalidBaseUrl`] if `base_url` isn't an http(s)
    /// URL, or [`ClientError::Network`] if the HTTP client can't be built.
    pub fn http(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Self::with_http_client(base_url, http)
    }

    /// Like [`http`](Self::http), with a caller-configured `reqwest` client.
    ///
    /// # Errors
    /// [`ClientError::InvalidBaseUrl`] if `base_url` isn't an http(s) URL.
    pub fn with_http_client(
        base_url: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://"))
        {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            backend: Backend::Http { base_url, http },
            codec: JsonCodec,
        })
    }

    /// A client that calls `authority` directly, in process.
    pub fn local(authority: Arc<dyn TokenAuthority>) -> Self {
        Self {
            backend: Backend::Local(authority),
            codec: JsonCodec,
        }
    }

    /// Whether this client goes over the network.
    pub fn is_http(&self) -> bool {
        matches!(self.backend, Backend::Http { .. })
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Logs in with username and password.
    #[instrument(skip_all, fields(http = self.is_http()))]
    pub async fn authenticate(
        &self,
        req: &AuthRequest,
    ) -> Result<AuthResponse, ClientError> {
        match &self.backend {
            Backend::Http { base_url, http } => {
                let body = self
                    .post(http, base_url, "/authserver/authenticate", req)
                    .await?
                    .into_success()?;
                Ok(self.codec.decode(&body)?)
            }
            Backend::Local(authority) => {
                let grant = authority.authenticate(
                    &req.username,
                    &req.password,
                    req.client_token.as_deref(),
                    req.request_user,
                )?;
                Ok(grant.into())
            }
        }
    }

    /// Swaps an access token for a fresh one in the same chain.
    #[instrument(skip_all, fields(http = self.is_http()))]
    pub async fn refresh(
        &self,
        req: &RefreshRequest,
    ) -> Result<AuthResponse, ClientError> {
        match &self.backend {
            Backend::Http { base_url, http } => {
                let body = self
                    .post(http, base_url, "/authserver/refresh", req)
                    .await?
                    .into_success()?;
                Ok(self.codec.decode(&body)?)
            }
            Backend::Local(authority) => {
                req.ensure_no_profile_selection()?;
                let grant = authority.refresh(
                    &req.access_token,
                    req.client_token.as_deref(),
                    req.request_user,
                )?;
                Ok(grant.into())
            }
        }
    }

    /// Asks whether a token is live.
    ///
    /// A rejected token is `Ok(false)`, not an error. Errors mean the
    /// question couldn't be answered at all.
    #[instrument(skip_all, fields(http = self.is_http()))]
    pub async fn validate(
        &self,
        req: &ValidateRequest,
    ) -> Result<bool, ClientError> {
        match &self.backend {
            Backend::Http { base_url, http } => {
                let reply = self
                    .post(http, base_url, "/authserver/validate", req)
                    .await?;
                if reply.status == StatusCode::FORBIDDEN {
                    return Ok(false);
                }
                reply.into_success()?;
                Ok(true)
            }
            Backend::Local(authority) => Ok(authority
                .validate(&req.access_token, req.client_token.as_deref())),
        }
    }

    /// Ends one session.
    #[instrument(skip_all, fields(http = self.is_http()))]
    pub async fn invalidate(
        &self,
        req: &InvalidateRequest,
    ) -> Result<(), ClientError> {
        match &self.backend {
            Backend::Http { base_url, http } => {
                self.post(http, base_url, "/authserver/invalidate", req)
                    .await?
                    .into_success()?;
                Ok(())
            }
            Backend::Local(authority) => {
                Ok(authority.invalidate(&req.access_token, &req.client_token)?)
            }
        }
    }

    /// Ends every session of the account.
    #[instrument(skip_all, fields(http = self.is_http()))]
    pub async fn sign_out(
        &self,
        req: &SignoutRequest,
    ) -> Result<(), ClientError> {
        match &self.backend {
            Backend::Http { base_url, http } => {
                self.post(http, base_url, "/authserver/signout", req)
                    .await?
                    .into_success()?;
                Ok(())
            }
            Backend::Local(authority) => {
                Ok(authority.sign_out(&req.username, &req.password)?)
            }
        }
    }

    // -----------------------------------------------------------------------
    // HTTP plumbing
    // -----------------------------------------------------------------------

    /// POSTs `body` and reads the whole response body.
    async fn post<T: Serialize>(
        &self,
        http: &reqwest::Client,
        base_url: &str,
        path: &str,
        body: &T,
    ) -> Result<Reply, ClientError> {
        let url = format!("{base_url}{path}");
        let payload = self.codec.encode(body)?;

        let response = http
            .post(&url)
            .header(CONTENT_TYPE, self.codec.content_type())
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        // `bytes()` drains the body to EOF, however many reads it takes.
        let body = response.bytes().await?.to_vec();
        debug!(%url, %status, len = body.len(), "response received");

        Ok(Reply {
            status,
            body,
            codec: self.codec,
        })
    }
}

impl std::fmt::Debug for YggdrasilClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.backend {
            Backend::Http { base_url, .. } => f
                .debug_struct("YggdrasilClient")
                .field("base_url", base_url)
                .finish(),
            Backend::Local(_) => f
                .debug_struct("YggdrasilClient")
                .field("backend", &"local")
                .finish(),
        }
    }
}

/// A fully read HTTP response.
struct Reply {
    status: StatusCode,
    body: Vec<u8>,
    codec: JsonCodec,
}

impl Reply {
    /// The body of a 2xx reply, or the server's error as [`ClientError::Api`].
    fn into_success(self) -> Result<Vec<u8>, ClientError> {
        if self.status.is_success() {
            return Ok(self.body);
        }

        let (error, message) =
            match self.decode_as::<ErrorResponse>() {
                Some(body) => (body.error, body.error_message),
                None => (
                    String::new(),
                    String::from_utf8_lossy(&self.body).into_owned(),
                ),
            };

        Err(ClientError::Api {
            status: self.status,
            error,
            message,
        })
    }

    fn decode_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.codec.decode(&self.body).ok()
    }
}

// =========================================================================
// Tests
// =========================================================================
