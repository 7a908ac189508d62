//! Session types: the records the authority owns and the grants it hands out.
//!
//! The authority stores three kinds of record:
//! - WHO can log in ([`UserRecord`])
//! - WHAT they play as ([`ProfileRecord`])
//! - WHICH tokens are live right now ([`Session`])
//!
//! A successful `authenticate` or `refresh` returns a [`Grant`]: a copy of
//! the new session plus everything the response body needs.

use std::time::SystemTime;

use yggforge_protocol::{
    AuthResponse, Identifier, PREFERRED_LANGUAGE, Profile, Property, User,
};

// ---------------------------------------------------------------------------
// AuthorityConfig
// ---------------------------------------------------------------------------

/// Configuration for the in-memory authority.
///
/// Sensible defaults are provided; override only what you need:
///
/// ```rust
/// use yggforge_session::AuthorityConfig;
///
/// let config = AuthorityConfig {
///     preferred_language: "de".into(),
/// };
/// assert_ne!(config.preferred_language, AuthorityConfig::default().preferred_language);
/// ```
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Value of the `preferredLanguage` user property returned when a
    /// client asks for user info.
    ///
    /// Default: `"en"`.
    pub preferred_language: String,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            preferred_language: "en".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A registered account. Keyed by `username`, which is unique.
///
/// Passwords are compared exactly and stored as given; hardening the
/// credential store is out of scope for this authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: Identifier,
    pub username: String,
    pub password: String,
}

/// The single playable profile of a user.
///
/// `profile_id` is always the offline-mode identifier of `name`, so it can
/// be recomputed from the name alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub profile_id: Identifier,
    pub name: String,
}

/// One live access token and everything bound to it.
///
/// ## Lifecycle
///
/// ```text
///   absent ──(authenticate)──→ live ──(refresh)──→ [replaced by a new live
///                               │                   session, same client token]
///                               ├──(invalidate)──→ gone
///                               └──(sign_out)────→ gone
/// ```
///
/// A `Session` is never mutated in place: refresh removes it and inserts
/// a successor under a new access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    /// Identifies the client across the whole chain of refreshes.
    pub client_token: String,
    pub user_id: Identifier,
    pub profile_id: Identifier,
    pub created_at: SystemTime,
}

/// User metadata surfaced when a client sets `requestUser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub user_id: Identifier,
    pub properties: Vec<Property>,
}

impl UserInfo {
    /// The fixed metadata this authority attaches to every user.
    pub(crate) fn with_language(user_id: Identifier, language: &str) -> Self {
        Self {
            user_id,
            properties: vec![Property {
                name: PREFERRED_LANGUAGE.to_string(),
                value: language.to_string(),
                signature: None,
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Grant
// ---------------------------------------------------------------------------

/// The outcome of a successful `authenticate` or `refresh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// The new live session.
    pub session: Session,
    /// The profile bound to the session.
    pub selected_profile: ProfileRecord,
    /// Every profile the account owns. With one profile per account this
    /// is always `[selected_profile]`.
    pub available_profiles: Vec<ProfileRecord>,
    /// Present only when user info was requested.
    pub user: Option<UserInfo>,
}

impl From<&ProfileRecord> for Profile {
    fn from(record: &ProfileRecord) -> Self {
        Profile {
            id: record.profile_id.to_string(),
            name: record.name.clone(),
            properties: Vec::new(),
        }
    }
}

impl From<UserInfo> for User {
    fn from(info: UserInfo) -> Self {
        User {
            id: info.user_id.to_string(),
            properties: info.properties,
        }
    }
}

/// Renders a grant as the protocol's session body. All ids come out in
/// the undashed form.
impl From<Grant> for AuthResponse {
    fn from(grant: Grant) -> Self {
        AuthResponse {
            access_token: grant.session.access_token,
            client_token: grant.session.client_token,
            available_profiles: grant
                .available_profiles
                .iter()
                .map(Profile::from)
                .collect(),
            selected_profile: Some(Profile::from(&grant.selected_profile)),
            user: grant.user.map(User::from),
        }
    }
}
