//! `YggforgeServer` builder and server loop.
//!
//! This is the entry point for running a Yggforge auth server. It ties
//! together the layers: HTTP (axum) → protocol → token authority.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use yggforge_protocol::{Codec, JsonCodec};
use yggforge_session::TokenAuthority;

use crate::handler;
use crate::{ServerConfig, YggforgeError};

/// Shared server state passed to every request handler.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. No lock
/// here: the authority synchronizes itself.
pub(crate) struct ServerState<A: TokenAuthority, C: Codec> {
    pub(crate) authority: A,
    pub(crate) codec: C,
}

/// Builds the `authserver` routes around `authority`.
///
/// Use this to mount Yggdrasil into an existing axum app; use
/// [`YggforgeServerBuilder`] to run it standalone.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use yggforge::prelude::*;
///
/// let authority = Arc::new(MemoryAuthority::default());
/// let app = axum::Router::new().nest("/yggdrasil", router(authority));
/// ```
pub fn router<A: TokenAuthority>(authority: A) -> Router {
    routes(Arc::new(ServerState {
        authority,
        codec: JsonCodec,
    }))
}

fn routes<A: TokenAuthority, C: Codec>(
    state: Arc<ServerState<A, C>>,
) -> Router {
    Router::new()
        .route("/", get(handler::status::<A, C>))
        .route(
            "/authserver/authenticate",
            post(handler::authenticate::<A, C>),
        )
        .route("/authserver/refresh", post(handler::refresh::<A, C>))
        .route("/authserver/validate", post(handler::validate::<A, C>))
        .route("/authserver/invalidate", post(handler::invalidate::<A, C>))
        .route("/authserver/signout", post(handler::sign_out::<A, C>))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting a Yggforge server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), yggforge::YggforgeError> {
/// use std::sync::Arc;
/// use yggforge::prelude::*;
///
/// let config = ServerConfig::from_env()?;
/// let authority = Arc::new(config.memory_authority());
///
/// let server = YggforgeServer::builder()
///     .config(&config)
///     .build(authority)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct YggforgeServerBuilder {
    bind_addr: String,
}

impl YggforgeServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: ServerConfig::default().bind_addr.to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Takes the listen address from `config`.
    pub fn config(mut self, config: &ServerConfig) -> Self {
        self.bind_addr = config.bind_addr.to_string();
        self
    }

    /// Binds the listener and wraps `authority` in the HTTP routes.
    ///
    /// # Errors
    /// [`YggforgeError::Io`] if the address can't be bound.
    pub async fn build<A: TokenAuthority>(
        self,
        authority: A,
    ) -> Result<YggforgeServer, YggforgeError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listener bound");

        Ok(YggforgeServer {
            listener,
            router: router(authority),
        })
    }
}

impl Default for YggforgeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A bound Yggforge server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// answering requests.
pub struct YggforgeServer {
    listener: TcpListener,
    router: Router,
}

impl YggforgeServer {
    /// Creates a new builder.
    pub fn builder() -> YggforgeServerBuilder {
        YggforgeServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    ///
    /// Useful after binding port 0 to learn which port the OS picked.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until the process is terminated.
    pub async fn run(self) -> Result<(), YggforgeError> {
        self.run_until(std::future::pending()).await
    }

    /// Serves requests until `shutdown` completes, then stops accepting
    /// and lets in-flight requests finish.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), YggforgeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.listener.local_addr()?;
        tracing::info!(%addr, "Yggforge server running");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!(%addr, "Yggforge server stopped");
        Ok(())
    }
}
