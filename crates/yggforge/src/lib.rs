//! # Yggforge
//!
//! In-memory Yggdrasil authentication server for offline-mode Minecraft.
//!
//! Yggforge answers the five `authserver` calls a launcher makes
//! (authenticate, refresh, validate, invalidate, signout) from a
//! [`TokenAuthority`](yggforge_session::TokenAuthority) held in memory.
//! Profile ids are the offline-mode identifiers a vanilla server would
//! derive from the player name, so worlds and whitelists keep working.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yggforge::prelude::*;
//!
//! # async fn demo() -> Result<(), YggforgeError> {
//! yggforge::init_tracing();
//!
//! let config = ServerConfig::from_env()?;
//! let authority = Arc::new(config.memory_authority());
//! let user = authority.register_user("steve@example.com", "hunter2")?;
//! authority.register_profile(user, "Steve")?;
//!
//! let server = YggforgeServer::builder()
//!     .config(&config)
//!     .build(authority)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{BIND_VAR, LANGUAGE_VAR, ServerConfig};
pub use error::{ApiError, YggforgeError};
pub use server::{YggforgeServer, YggforgeServerBuilder, router};

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "yggforge=info";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, or by
/// [`DEFAULT_LOG_FILTER`] when that's unset.
///
/// Meant for binaries. Calling it twice, or after another subscriber was
/// installed, does nothing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Everything needed to run or talk to a Yggforge server.
pub mod prelude {
    pub use crate::{
        ApiError, ServerConfig, YggforgeError, YggforgeServer,
        YggforgeServerBuilder, router,
    };
    pub use yggforge_client::{ClientError, YggdrasilClient};
    pub use yggforge_protocol::{
        AuthRequest, AuthResponse, Codec, ErrorResponse, Identifier,
        InvalidateRequest, JsonCodec, Profile, ProtocolError, RefreshRequest,
        SignoutRequest, User, ValidateRequest, derive_from_name, is_valid,
        random_identifier, to_dashed, to_undashed,
    };
    pub use yggforge_session::{
        AuthError, AuthorityConfig, Grant, MemoryAuthority, ProfileRecord,
        Session, TokenAuthority,
    };
}
