//! The in-memory token authority.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Registering users and their (single) profile
//! - Opening sessions when credentials check out
//! - Rotating access tokens on refresh
//! - Answering "is this token still good?"
//! - Killing one session (invalidate) or all of a user's (sign out)
//!
//! # Concurrency note
//!
//! All state lives in one [`Store`] behind one `parking_lot::RwLock`.
//! `validate` takes the read lock, so validations run side by side. Every
//! other operation holds the write lock for its WHOLE check-then-mutate
//! window: the credential or token check and the index updates happen in
//! one critical section. That is what makes, for example, exactly one of
//! N racing refreshes of the same token win, and what stops a session
//! opened before a sign-out from surviving it.
//!
//! Nothing here does I/O or awaits, so the lock is never held for long.

use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use parking_lot::RwLock;
use yggforge_protocol::{Identifier, derive_from_name, random_identifier};

use crate::{
    AuthError, AuthorityConfig, Grant, ProfileRecord, Session, TokenAuthority,
    UserInfo, UserRecord,
};

/// Everything the authority knows, guarded as one unit.
///
/// `sessions` is the source of truth for live tokens. `client_tokens` is a
/// projection of it: for every live session there is exactly one entry
/// `client_token → access_token`, and nothing else.
#[derive(Debug, Default)]
struct Store {
    /// Registered accounts, keyed by username.
    users: HashMap<String, UserRecord>,

    /// Ids of every registered account.
    user_ids: HashSet<Identifier>,

    /// One profile per user, keyed by user id.
    profiles: HashMap<Identifier, ProfileRecord>,

    /// Live sessions, keyed by access token.
    sessions: HashMap<String, Session>,

    /// The head of each client-token chain: client token → access token.
    client_tokens: HashMap<String, String>,
}

impl Store {
    /// Looks up a user and checks the password (exact, case-sensitive).
    fn check_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<&UserRecord, AuthError> {
        match self.users.get(username) {
            Some(user) if user.password == password => Ok(user),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// Checks that `client_token`, if it already heads a live chain,
    /// belongs to `user_id`. A client token never crosses accounts.
    fn check_client_token_owner(
        &self,
        client_token: &str,
        user_id: Identifier,
    ) -> Result<(), AuthError> {
        let owner = self
            .client_tokens
            .get(client_token)
            .and_then(|access| self.sessions.get(access))
            .map(|s| s.user_id);

        match owner {
            Some(owner) if owner != user_id => Err(AuthError::InvalidToken),
            _ => Ok(()),
        }
    }

    /// Inserts a session into both indexes.
    ///
    /// If the client token already heads a chain, that chain's current
    /// session is removed first: one client token never maps to two live
    /// access tokens.
    fn insert_session(&mut self, session: Session) {
        if let Some(previous) = self.client_tokens.get(&session.client_token) {
            let previous = previous.clone();
            self.remove_session(&previous);
        }

        self.client_tokens
            .insert(session.client_token.clone(), session.access_token.clone());
        self.sessions.insert(session.access_token.clone(), session);
    }

    /// Removes a session from both indexes and returns it.
    fn remove_session(&mut self, access_token: &str) -> Option<Session> {
        let session = self.sessions.remove(access_token)?;

        // Only drop the chain entry if it still points at this token.
        if self
            .client_tokens
            .get(&session.client_token)
            .is_some_and(|head| head == access_token)
        {
            self.client_tokens.remove(&session.client_token);
        }

        Some(session)
    }

    /// Builds the grant for a freshly inserted session.
    fn grant(
        &self,
        session: Session,
        request_user: bool,
        config: &AuthorityConfig,
    ) -> Result<Grant, AuthError> {
        let profile = self
            .profiles
            .get(&session.user_id)
            .cloned()
            .ok_or(AuthError::NoProfile)?;

        let user = request_user.then(|| {
            UserInfo::with_language(session.user_id, &config.preferred_language)
        });

        Ok(Grant {
            available_profiles: vec![profile.clone()],
            selected_profile: profile,
            session,
            user,
        })
    }
}

/// Treats an empty client token the same as an absent one.
fn non_empty(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.is_empty())
}

/// Mints a token in the undashed wire form.
fn mint_token() -> String {
    random_identifier().to_string()
}

/// A [`TokenAuthority`] that keeps everything in process memory.
///
/// Construct one, share it by `Arc`, and hand it to the server:
///
/// ```rust
/// use std::sync::Arc;
/// use yggforge_session::{AuthorityConfig, MemoryAuthority};
///
/// let authority = Arc::new(MemoryAuthority::new(AuthorityConfig::default()));
/// let user_id = authority.register_user("alex@example.com", "pw").unwrap();
/// let profile = authority.register_profile(user_id, "Alex").unwrap();
/// assert_eq!(profile.name, "Alex");
/// ```
///
/// All state is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryAuthority {
    store: RwLock<Store>,
    config: AuthorityConfig,
}

impl MemoryAuthority {
    /// Creates an empty authority with the given config.
    pub fn new(config: AuthorityConfig) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            config,
        }
    }

    /// The config this authority was built with.
    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    // -- Administrative seeding ------------------------------------------

    /// Registers an account and returns its freshly minted user id.
    ///
    /// # Errors
    /// [`AuthError::UserExists`] if the username is taken.
    pub fn register_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identifier, AuthError> {
        let mut store = self.store.write();

        if store.users.contains_key(username) {
            return Err(AuthError::UserExists(username.to_string()));
        }

        let user_id = random_identifier();
        store.user_ids.insert(user_id);
        store.users.insert(
            username.to_string(),
            UserRecord {
                user_id,
                username: username.to_string(),
                password: password.to_string(),
            },
        );

        tracing::info!(%user_id, "user registered");
        Ok(user_id)
    }

    /// Gives a user their profile. The profile id is the offline-mode
    /// identifier of `name`.
    ///
    /// # Errors
    /// - [`AuthError::UnknownUser`]: no account has this id
    /// - [`AuthError::ProfileExists`]: the user already has a profile
    pub fn register_profile(
        &self,
        user_id: Identifier,
        name: &str,
    ) -> Result<ProfileRecord, AuthError> {
        let mut store = self.store.write();

        if !store.user_ids.contains(&user_id) {
            return Err(AuthError::UnknownUser(user_id));
        }
        if store.profiles.contains_key(&user_id) {
            return Err(AuthError::ProfileExists(user_id));
        }

        let profile = ProfileRecord {
            profile_id: derive_from_name(name),
            name: name.to_string(),
        };
        store.profiles.insert(user_id, profile.clone());

        tracing::info!(
            %user_id,
            profile_id = %profile.profile_id,
            name,
            "profile registered"
        );
        Ok(profile)
    }

    // -- Inspection -------------------------------------------------------

    /// Number of live sessions across all users.
    pub fn session_count(&self) -> usize {
        self.store.read().sessions.len()
    }

    /// Copies of every live session owned by `user_id`.
    pub fn sessions_for(&self, user_id: Identifier) -> Vec<Session> {
        self.store
            .read()
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Checks that the two token indexes mirror each other exactly.
    ///
    /// Always `true` unless there is a bug in this module. Exposed for
    /// tests and debug assertions in embedding applications.
    pub fn is_consistent(&self) -> bool {
        let store = self.store.read();

        store.sessions.len() == store.client_tokens.len()
            && store.client_tokens.iter().all(|(client, access)| {
                store
                    .sessions
                    .get(access)
                    .is_some_and(|s| &s.client_token == client)
            })
    }
}

impl TokenAuthority for MemoryAuthority {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
        client_token: Option<&str>,
        request_user: bool,
    ) -> Result<Grant, AuthError> {
        let mut store = self.store.write();

        let user_id = match store.check_credentials(username, password) {
            Ok(user) => user.user_id,
            Err(e) => {
                tracing::debug!("authenticate rejected: bad credentials");
                return Err(e);
            }
        };

        let profile_id = match store.profiles.get(&user_id) {
            Some(profile) => profile.profile_id,
            None => {
                tracing::debug!(%user_id, "authenticate rejected: no profile");
                return Err(AuthError::NoProfile);
            }
        };

        if let Some(supplied) = non_empty(client_token) {
            if let Err(e) = store.check_client_token_owner(supplied, user_id) {
                tracing::debug!(
                    %user_id,
                    "authenticate rejected: client token held by another user"
                );
                return Err(e);
            }
        }

        let session = Session {
            access_token: mint_token(),
            client_token: non_empty(client_token)
                .map_or_else(mint_token, str::to_string),
            user_id,
            profile_id,
            created_at: SystemTime::now(),
        };
        store.insert_session(session.clone());

        tracing::info!(%user_id, "session created");
        store.grant(session, request_user, &self.config)
    }

    fn refresh(
        &self,
        access_token: &str,
        client_token: Option<&str>,
        request_user: bool,
    ) -> Result<Grant, AuthError> {
        let mut store = self.store.write();

        let current = store
            .sessions
            .get(access_token)
            .ok_or(AuthError::InvalidToken)?;

        if let Some(supplied) = non_empty(client_token) {
            if supplied != current.client_token {
                tracing::debug!(
                    user_id = %current.user_id,
                    "refresh rejected: client token mismatch"
                );
                return Err(AuthError::InvalidToken);
            }
        }

        let old = store
            .remove_session(access_token)
            .ok_or(AuthError::InvalidToken)?;

        let session = Session {
            access_token: mint_token(),
            created_at: SystemTime::now(),
            ..old
        };
        store.insert_session(session.clone());

        tracing::info!(user_id = %session.user_id, "session refreshed");
        store.grant(session, request_user, &self.config)
    }

    fn validate(&self, access_token: &str, client_token: Option<&str>) -> bool {
        let store = self.store.read();

        match store.sessions.get(access_token) {
            Some(session) => non_empty(client_token)
                .is_none_or(|supplied| supplied == session.client_token),
            None => false,
        }
    }

    fn invalidate(
        &self,
        access_token: &str,
        client_token: &str,
    ) -> Result<(), AuthError> {
        let mut store = self.store.write();

        let matches = store
            .sessions
            .get(access_token)
            .is_some_and(|s| s.client_token == client_token);
        if !matches {
            tracing::debug!("invalidate rejected: unknown token or client mismatch");
            return Err(AuthError::InvalidToken);
        }

        let session = store
            .remove_session(access_token)
            .ok_or(AuthError::InvalidToken)?;

        tracing::info!(user_id = %session.user_id, "session invalidated");
        Ok(())
    }

    fn sign_out(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let mut store = self.store.write();

        let user_id = match store.check_credentials(username, password) {
            Ok(user) => user.user_id,
            Err(e) => {
                tracing::debug!("sign out rejected: bad credentials");
                return Err(e);
            }
        };

        let doomed: Vec<String> = store
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.access_token.clone())
            .collect();
        for access_token in &doomed {
            store.remove_session(access_token);
        }

        tracing::info!(%user_id, removed = doomed.len(), "user signed out");
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
