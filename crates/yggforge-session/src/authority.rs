//! The capability set every token store provides.
//!
//! The HTTP adapter and the clients only ever talk to a
//! [`TokenAuthority`]. [`MemoryAuthority`](crate::MemoryAuthority) is the
//! implementation shipped here; a persistent store would implement the
//! same trait and slot in without the transport noticing.

use std::sync::Arc;

use crate::{AuthError, Grant};

/// The five Yggdrasil operations.
///
/// # Trait bounds
///
/// - `Send + Sync` → one authority is shared by every request handler,
///   and Tokio may run those on any worker thread at the same time.
/// - `'static` → the authority lives as long as the server.
///
/// Methods are synchronous: every operation is a short in-memory
/// critical section that never waits on I/O.
///
/// # Empty client tokens
///
/// `Some("")` is treated exactly like `None` wherever a client token is
/// optional (`authenticate`, `refresh`, `validate`).
///
/// # Example
///
/// ```rust
/// use yggforge_session::{MemoryAuthority, TokenAuthority};
///
/// let authority = MemoryAuthority::default();
/// let user_id = authority.register_user("steve@example.com", "hunter2").unwrap();
/// authority.register_profile(user_id, "Steve").unwrap();
///
/// let grant = authority
///     .authenticate("steve@example.com", "hunter2", None, false)
///     .unwrap();
/// assert!(authority.validate(&grant.session.access_token, None));
/// ```
pub trait TokenAuthority: Send + Sync + 'static {
    /// Checks a username/password pair and opens a new session.
    ///
    /// # Errors
    /// - [`AuthError::InvalidCredentials`]: unknown user or wrong password
    /// - [`AuthError::NoProfile`]: the account has no profile
    /// - [`AuthError::InvalidToken`]: `client_token` heads a live chain
    ///   of a different user
    fn authenticate(
        &self,
        username: &str,
        password: &str,
        client_token: Option<&str>,
        request_user: bool,
    ) -> Result<Grant, AuthError>;

    /// Swaps a live access token for a new one on the same client-token
    /// chain. The old token stops working in the same step.
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`] if the token isn't live, or if a
    /// non-empty `client_token` differs from the one bound to it.
    fn refresh(
        &self,
        access_token: &str,
        client_token: Option<&str>,
        request_user: bool,
    ) -> Result<Grant, AuthError>;

    /// Returns `true` if the token is live and (when given) the client
    /// token matches. A dead token is a normal `false`, never an error.
    fn validate(&self, access_token: &str, client_token: Option<&str>) -> bool;

    /// Kills one access token.
    ///
    /// Unlike `refresh`, the client token is mandatory here: an empty
    /// string does not match anything.
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`] if the token isn't live or the client
    /// token doesn't match exactly.
    fn invalidate(
        &self,
        access_token: &str,
        client_token: &str,
    ) -> Result<(), AuthError>;

    /// Checks credentials, then kills every live session of that user.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`]: unknown user or wrong password.
    fn sign_out(&self, username: &str, password: &str) -> Result<(), AuthError>;
}

/// Lets a shared handle stand in wherever an authority is expected, so
/// the server and an embedding application can hold the same store.
impl<T: TokenAuthority + ?Sized> TokenAuthority for Arc<T> {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
        client_token: Option<&str>,
        request_user: bool,
    ) -> Result<Grant, AuthError> {
        (**self).authenticate(username, password, client_token, request_user)
    }

    fn refresh(
        &self,
        access_token: &str,
        client_token: Option<&str>,
        request_user: bool,
    ) -> Result<Grant, AuthError> {
        (**self).refresh(access_token, client_token, request_user)
    }

    fn validate(&self, access_token: &str, client_token: Option<&str>) -> bool {
        (**self).validate(access_token, client_token)
    }

    fn invalidate(
        &self,
        access_token: &str,
        client_token: &str,
    ) -> Result<(), AuthError> {
        (**self).invalidate(access_token, client_token)
    }

    fn sign_out(&self, username: &str, password: &str) -> Result<(), AuthError> {
        (**self).sign_out(username, password)
    }
}
