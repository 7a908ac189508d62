//! Client side of the Yggdrasil protocol for Yggforge.
//!
//! [`YggdrasilClient`] speaks the five `authserver` operations. It has
//! two backends behind one API:
//!
//! - **HTTP** ([`YggdrasilClient::http`]): JSON over `reqwest` to a
//!   running server, such as the one in the `yggforge` crate.
//! - **Local** ([`YggdrasilClient::local`]): calls straight into a
//!   [`TokenAuthority`](yggforge_session::TokenAuthority) in the same
//!   process, with no sockets involved. Handy for tests and embedding.
//!
//! ```text
//! launcher code → YggdrasilClient ─┬─ HTTP → yggforge server → authority
//!                                  └─ local ──────────────────→ authority
//! ```

mod client;
mod error;

pub use client::YggdrasilClient;
pub use error::ClientError;
