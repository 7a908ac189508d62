//! Wire protocol for Yggforge.
//!
//! This crate defines the "language" that launchers and the auth server
//! speak, plus the identifiers that appear in it:
//!
//! - **Types** ([`AuthRequest`], [`AuthResponse`], [`ErrorResponse`], ...):
//!   the JSON bodies of the Yggdrasil `authserver` endpoints.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those bodies are
//!   converted to/from bytes.
//! - **Identity** ([`Identifier`], [`derive_from_name`], [`to_dashed`], ...):
//!   minting random ids and deriving offline-mode ids from player names.
//! - **Errors** ([`ProtocolError`]): what can go wrong along the way.
//!
//! # Architecture
//!
//! The protocol layer sits below everything else. It doesn't know about
//! users, sessions, or HTTP; it only knows data shapes.
//!
//! ```text
//! HTTP (bytes) → Protocol (requests) → Session (token authority)
//! ```

mod codec;
mod error;
pub mod identity;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use identity::{
    Identifier, derive_from_name, is_valid, random_identifier, to_dashed,
    to_undashed,
};
pub use types::{
    Agent, AuthRequest, AuthResponse, ErrorResponse, FORBIDDEN_OPERATION,
    ILLEGAL_ARGUMENT, InvalidateRequest, PREFERRED_LANGUAGE,
    PROFILE_ALREADY_ASSIGNED, Profile, Property, RefreshRequest, ServerStatus,
    SignoutRequest, User, ValidateRequest,
};
