//! Error types for the session layer.

use yggforge_protocol::Identifier;

/// Errors returned by a [`TokenAuthority`](crate::TokenAuthority) and by
/// the administrative seeding API.
///
/// The `Display` text of the first three variants is the human message
/// the protocol puts in `errorMessage`, so the transport can forward it
/// verbatim.
///
/// Every variant is terminal: the authority never retries, and nothing
/// here is logged-and-swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown username, or the password didn't match exactly. The two
    /// cases are indistinguishable to the caller.
    #[error("Invalid credentials. Invalid username or password.")]
    InvalidCredentials,

    /// The access token isn't live, or the client token doesn't match the
    /// one bound to it.
    #[error("Invalid token.")]
    InvalidToken,

    /// The account has no profile, so there is nothing to log in as.
    #[error("No profile found for user.")]
    NoProfile,

    /// Seeding: a profile was registered for a user id that doesn't exist.
    #[error("unknown user {0}")]
    UnknownUser(Identifier),

    /// Seeding: the username is already taken.
    #[error("username {0:?} is already registered")]
    UserExists(String),

    /// Seeding: the user already owns a profile, and profiles are
    /// immutable once created.
    #[error("user {0} already has a profile")]
    ProfileExists(Identifier),
}
