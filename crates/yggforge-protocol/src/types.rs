//! Wire models for the Yggdrasil authentication protocol.
//!
//! Every type here travels "on the wire" as a JSON body. Field names
//! follow the protocol's camelCase convention (`accessToken`,
//! `selectedProfile`, ...), which `#[serde(rename_all = "camelCase")]`
//! handles for us so the Rust side can stay snake_case.
//!
//! Identifiers are plain `String`s at this layer, always in the undashed
//! 32-hex form. Turning them into typed [`Identifier`](crate::Identifier)s
//! is the job of the layer that owns the data.

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Machine-readable error kind for authorization failures (HTTP 403).
pub const FORBIDDEN_OPERATION: &str = "ForbiddenOperationException";

/// Machine-readable error kind for malformed requests (HTTP 400).
pub const ILLEGAL_ARGUMENT: &str = "IllegalArgumentException";

/// Name of the single user property the authority attaches.
pub const PREFERRED_LANGUAGE: &str = "preferredLanguage";

/// Message for a refresh that tries to pick a profile for a bound token.
pub const PROFILE_ALREADY_ASSIGNED: &str =
    "Access token already has a profile assigned.";

/// `skip_serializing_if` helper: leaves `false` flags out of the body,
/// matching how the official launcher omits them.
fn is_false(value: &bool) -> bool {
    !*value
}

// ---------------------------------------------------------------------------
// Shared building blocks
// ---------------------------------------------------------------------------

/// A name/value attribute attached to a user or a profile.
///
/// `signature` is only present when a property has been signed by the
/// server. This authority never signs, so it is always `None` on output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// The account behind a session, returned when `requestUser` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Undashed user id.
    pub id: String,
    pub properties: Vec<Property>,
}

/// A playable character: the name other players see, and its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Undashed profile id (the offline-mode identifier of `name`).
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

/// Which game the client is logging into. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub version: u32,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            name: "Minecraft".to_string(),
            version: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `POST /authserver/authenticate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<Agent>,
    pub username: String,
    pub password: String,
    /// Optional client-chosen token. When absent the server mints one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub request_user: bool,
}

/// `POST /authserver/refresh`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub request_user: bool,
    /// Profile the client wants bound to the new token. Tokens issued
    /// here are always bound already, so a set value is rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_profile: Option<Profile>,
}

impl RefreshRequest {
    /// Rejects a `selectedProfile` on refresh.
    ///
    /// Every token this server issues is bound to a profile at
    /// authentication time, and a bound token can't switch profiles.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] if `selected_profile` is set.
    pub fn ensure_no_profile_selection(&self) -> Result<(), ProtocolError> {
        match &self.selected_profile {
            Some(_) => Err(ProtocolError::InvalidMessage(
                PROFILE_ALREADY_ASSIGNED.to_string(),
            )),
            None => Ok(()),
        }
    }
}

/// `POST /authserver/validate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
}

/// `POST /authserver/invalidate`
///
/// A missing `clientToken` decodes as the empty string. Invalidation
/// demands an exact match, so that request is then rejected as an invalid
/// token rather than as a malformed body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateRequest {
    pub access_token: String,
    #[serde(default)]
    pub client_token: String,
}

/// `POST /authserver/signout`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignoutRequest {
    pub username: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Body returned by both `authenticate` and `refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub client_token: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_profiles: Vec<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_profile: Option<Profile>,
    /// Only present when the request set `requestUser`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// The protocol's error body.
///
/// ```json
/// { "error": "ForbiddenOperationException", "errorMessage": "Invalid token." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable kind, e.g. [`FORBIDDEN_OPERATION`].
    pub error: String,
    /// Human-readable message.
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ErrorResponse {
    /// A 403-style body with the `ForbiddenOperationException` kind.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            error: FORBIDDEN_OPERATION.to_string(),
            error_message: message.into(),
            cause: None,
        }
    }

    /// A 400-style body with the `IllegalArgumentException` kind.
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self {
            error: ILLEGAL_ARGUMENT.to_string(),
            error_message: message.into(),
            cause: None,
        }
    }

    /// Attaches a `cause` string.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Body of `GET /`: a liveness answer for humans and health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    pub message: String,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(all(test, feature = "json"))]
mod tests {
    //! Wire-shape tests. We check the exact JSON field names the official
    //! launcher expects, since a typo here breaks every client silently.

    use super::*;

    #[test]
    fn test_auth_request_decodes_launcher_body() {
        let json = r#"{
            "agent": { "name": "Minecraft", "version": 1 },
            "username": "steve@example.com",
            "password": "hunter2",
            "clientToken": "abc",
            "requestUser": true
        }"#;

        let req: AuthRequest = serde_json::from_str(json).expect("decode");

        assert_eq!(req.agent, Some(Agent::default()));
        assert_eq!(req.username, "steve@example.com");
        assert_eq!(req.client_token.as_deref(), Some("abc"));
        assert!(req.request_user);
    }

    #[test]
    fn test_auth_request_optional_fields_default() {
        let req: AuthRequest =
            serde_json::from_str(r#"{"username":"a","password":"b"}"#)
                .expect("decode");

        assert_eq!(req.agent, None);
        assert_eq!(req.client_token, None);
        assert!(!req.request_user);
    }

    #[test]
    fn test_auth_response_omits_absent_sections() {
        let resp = AuthResponse {
            access_token: "at".into(),
            client_token: "ct".into(),
            available_profiles: vec![],
            selected_profile: None,
            user: None,
        };

        let json = serde_json::to_value(&resp).expect("encode");

        assert_eq!(
            json,
            serde_json::json!({ "accessToken": "at", "clientToken": "ct" })
        );
    }

    #[test]
    fn test_auth_response_uses_camel_case_sections() {
        let profile = Profile {
            id: "p".into(),
            name: "Steve".into(),
            properties: vec![],
        };
        let resp = AuthResponse {
            access_token: "at".into(),
            client_token: "ct".into(),
            available_profiles: vec![profile.clone()],
            selected_profile: Some(profile),
            user: Some(User {
                id: "u".into(),
                properties: vec![Property {
                    name: PREFERRED_LANGUAGE.into(),
                    value: "en".into(),
                    signature: None,
                }],
            }),
        };

        let json = serde_json::to_value(&resp).expect("encode");

        assert_eq!(json["availableProfiles"][0]["name"], "Steve");
        assert_eq!(json["selectedProfile"]["id"], "p");
        // Unsigned properties carry no signature key at all.
        assert_eq!(
            json["user"]["properties"][0],
            serde_json::json!({ "name": "preferredLanguage", "value": "en" })
        );
        // Profiles without properties leave the key out.
        assert!(json["selectedProfile"].get("properties").is_none());
    }

    #[test]
    fn test_invalidate_request_missing_client_token_is_empty() {
        let req: InvalidateRequest =
            serde_json::from_str(r#"{"accessToken":"at"}"#).expect("decode");

        assert_eq!(req.client_token, "");
    }

    #[test]
    fn test_error_response_field_names() {
        let body = ErrorResponse::forbidden("Invalid token.");

        let json = serde_json::to_value(&body).expect("encode");

        assert_eq!(
            json,
            serde_json::json!({
                "error": "ForbiddenOperationException",
                "errorMessage": "Invalid token."
            })
        );
    }

    #[test]
    fn test_refresh_with_selected_profile_is_rejected() {
        let mut req: RefreshRequest =
            serde_json::from_str(r#"{"accessToken":"at","clientToken":"ct"}"#)
                .expect("decode");
        assert!(req.ensure_no_profile_selection().is_ok());

        req.selected_profile = Some(Profile {
            id: "p".into(),
            name: "Steve".into(),
            properties: vec![],
        });

        assert!(matches!(
            req.ensure_no_profile_selection(),
            Err(ProtocolError::InvalidMessage(m)) if m == PROFILE_ALREADY_ASSIGNED
        ));
    }

    #[test]
    fn test_error_response_with_cause() {
        let body = ErrorResponse::illegal_argument("bad body")
            .with_cause("missing field `password`");

        assert_eq!(body.error, ILLEGAL_ARGUMENT);
        assert_eq!(body.cause.as_deref(), Some("missing field `password`"));
    }
}
