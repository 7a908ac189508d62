//! Per-route request handlers.
//!
//! Every handler follows the same three steps:
//!   1. Decode the raw body with the server's codec. Taking `Bytes`
//!      instead of axum's `Json` extractor means a bad body gets the
//!      protocol's 400 error, not axum's own rejection text.
//!   2. Call the matching [`TokenAuthority`] operation.
//!   3. Encode the answer, or turn the refusal into an [`ApiError`].

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use yggforge_protocol::{
    AuthRequest, AuthResponse, Codec, InvalidateRequest, RefreshRequest,
    ServerStatus, SignoutRequest, ValidateRequest,
};
use yggforge_session::{AuthError, TokenAuthority};

use crate::server::ServerState;
use crate::ApiError;

type Shared<A, C> = State<Arc<ServerState<A, C>>>;

const STATUS_MESSAGE: &str = "Yggdrasil authentication server is running";

impl<A: TokenAuthority, C: Codec> ServerState<A, C> {
    /// Encodes `value` as the response body.
    fn respond<T: Serialize>(
        &self,
        status: StatusCode,
        value: &T,
    ) -> Result<Response, ApiError> {
        let body = self.codec.encode(value)?;
        Ok((status, [(CONTENT_TYPE, self.codec.content_type())], body)
            .into_response())
    }
}

/// `GET /`
pub(crate) async fn status<A: TokenAuthority, C: Codec>(
    State(state): Shared<A, C>,
) -> Result<Response, ApiError> {
    state.respond(
        StatusCode::OK,
        &ServerStatus {
            status: "ok".to_string(),
            message: STATUS_MESSAGE.to_string(),
        },
    )
}

/// `POST /authserver/authenticate`
pub(crate) async fn authenticate<A: TokenAuthority, C: Codec>(
    State(state): Shared<A, C>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: AuthRequest = state.codec.decode(&body)?;

    let grant = state.authority.authenticate(
        &req.username,
        &req.password,
        req.client_token.as_deref(),
        req.request_user,
    )?;

    state.respond(StatusCode::OK, &AuthResponse::from(grant))
}

/// `POST /authserver/refresh`
pub(crate) async fn refresh<A: TokenAuthority, C: Codec>(
    State(state): Shared<A, C>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: RefreshRequest = state.codec.decode(&body)?;
    // Checked before the authority runs, so a refused refresh leaves the
    // token live.
    req.ensure_no_profile_selection()?;

    let grant = state.authority.refresh(
        &req.access_token,
        req.client_token.as_deref(),
        req.request_user,
    )?;

    state.respond(StatusCode::OK, &AuthResponse::from(grant))
}

/// `POST /authserver/validate`
pub(crate) async fn validate<A: TokenAuthority, C: Codec>(
    State(state): Shared<A, C>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: ValidateRequest = state.codec.decode(&body)?;

    if state
        .authority
        .validate(&req.access_token, req.client_token.as_deref())
    {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(AuthError::InvalidToken.into())
    }
}

/// `POST /authserver/invalidate`
pub(crate) async fn invalidate<A: TokenAuthority, C: Codec>(
    State(state): Shared<A, C>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: InvalidateRequest = state.codec.decode(&body)?;

    state
        .authority
        .invalidate(&req.access_token, &req.client_token)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `POST /authserver/signout`
pub(crate) async fn sign_out<A: TokenAuthority, C: Codec>(
    State(state): Shared<A, C>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: SignoutRequest = state.codec.decode(&body)?;

    state.authority.sign_out(&req.username, &req.password)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
