//! Token authority for Yggforge.
//!
//! This crate owns every piece of mutable state in the system:
//!
//! 1. **Accounts**: registered users and their single profile
//!    ([`MemoryAuthority::register_user`], [`MemoryAuthority::register_profile`])
//! 2. **Sessions**: live access tokens, each bound to a client token,
//!    a user, and a profile ([`Session`])
//! 3. **Operations**: authenticate, refresh, validate, invalidate and
//!    sign out ([`TokenAuthority`] trait)
//!
//! # How it fits in the stack
//!
//! ```text
//! HTTP adapter / clients (above)  ← call the five operations
//!     ↕
//! Session Layer (this crate)      ← owns users, profiles, token indexes
//!     ↕
//! Protocol Layer (below)          ← provides Identifier, wire models
//! ```

mod authority;
mod error;
mod memory;
mod session;

pub use authority::TokenAuthority;
pub use error::AuthError;
pub use memory::MemoryAuthority;
pub use session::{
    AuthorityConfig, Grant, ProfileRecord, Session, UserInfo, UserRecord,
};
