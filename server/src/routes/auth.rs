//! Auth routes: bearer extractor, email access-code login, session lifecycle.

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use super::{ApiError, api_error};
use crate::rate_limit::RateLimitError;
use crate::services::authorizer::{self, AuthRejection};
use crate::services::login_codes::{self, LoginCodeError, LoginGrant};
use crate::services::session::SessionUser;
use crate::state::AppState;

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the `Authorization: Bearer` header.
/// Use as the first handler parameter to require authentication; the check
/// then runs before any other extractor touches the request.
#[derive(Debug)]
pub struct AuthUser {
    pub user: SessionUser,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let authorized = authorizer::authorize(app_state.sessions.as_ref(), &parts.headers).await?;
        Ok(Self { user: authorized.user, token: authorized.token })
    }
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn login_code_error_to_api(err: &LoginCodeError) -> ApiError {
    match err {
        LoginCodeError::InvalidEmail => api_error(StatusCode::BAD_REQUEST, "invalid email"),
        LoginCodeError::MalformedCode => api_error(StatusCode::BAD_REQUEST, "invalid code"),
        LoginCodeError::Rejected => api_error(StatusCode::UNAUTHORIZED, "expired or incorrect code"),
        LoginCodeError::Database(e) => {
            tracing::error!(error = %e, "login code database error");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
        LoginCodeError::Session(e) => {
            tracing::error!(error = %e, "session creation failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
        LoginCodeError::Delivery(e) => {
            tracing::error!(error = %e, "login code delivery failed");
            api_error(StatusCode::BAD_GATEWAY, "could not deliver login code")
        }
    }
}

pub(crate) fn rate_limit_to_api(err: &RateLimitError) -> ApiError {
    api_error(StatusCode::TOO_MANY_REQUESTS, err.to_string())
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RequestCodeBody {
    email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeBody {
    email: String,
    code: String,
}

/// `POST /api/auth/email/request-code`: issue a login code for `email`.
pub async fn request_email_code(
    State(state): State<AppState>,
    Json(body): Json<RequestCodeBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = login_codes::normalize_email(&body.email)
        .ok_or_else(|| login_code_error_to_api(&LoginCodeError::InvalidEmail))?;
    state
        .rate_limiter
        .check_code_request(&email)
        .map_err(|e| rate_limit_to_api(&e))?;

    let issued = state
        .login_codes
        .issue(&email)
        .await
        .map_err(|e| login_code_error_to_api(&e))?;

    match &state.mailer {
        Some(mailer) => mailer
            .deliver(&issued)
            .await
            .map_err(|e| login_code_error_to_api(&e))?,
        None if !state.config.echo_login_codes => {
            tracing::warn!(%email, "login code issued but no mail transport is configured");
        }
        None => {}
    }
    tracing::info!(%email, expires_in_secs = issued.expires_in.as_secs(), "login code issued");

    if state.config.echo_login_codes {
        return Ok(Json(serde_json::json!({ "ok": true, "code": issued.code.as_str() })));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/auth/email/verify-code`: exchange a login code for a bearer token.
pub async fn verify_email_code(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeBody>,
) -> Result<Json<LoginGrant>, ApiError> {
    let email = login_codes::normalize_email(&body.email)
        .ok_or_else(|| login_code_error_to_api(&LoginCodeError::InvalidEmail))?;
    state
        .rate_limiter
        .check_verify(&email)
        .map_err(|e| rate_limit_to_api(&e))?;

    let grant = state
        .login_codes
        .redeem(&email, &body.code, state.sessions.as_ref())
        .await
        .map_err(|e| login_code_error_to_api(&e))?;
    tracing::info!(user_id = %grant.user.id, "session created");

    Ok(Json(grant))
}

/// `GET /api/auth/me`: return current user.
pub async fn me(auth: AuthUser) -> Json<SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout`: revoke the presented session token.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = state.sessions.revoke(&auth.token).await {
        tracing::error!(error = %e, "session revoke failed");
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
    }
    tracing::info!(user_id = %auth.user.id, "session revoked");
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
