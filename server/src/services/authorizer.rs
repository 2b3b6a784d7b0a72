//! Per-request bearer-token authorization.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected route runs this check through the `AuthUser` extractor
//! before its handler body executes. The browser's own view of whether it is
//! logged in plays no part: only the `Authorization` header and the session
//! store decide.

use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use tracing::{debug, error};

use super::session::{SessionStore, SessionUser};

const BEARER_SCHEME: &str = "bearer";

#[derive(Debug, thiserror::Error)]
pub enum AuthRejection {
    #[error("missing bearer credentials")]
    MissingCredentials,
    #[error("malformed authorization header")]
    MalformedCredentials,
    #[error("invalid or expired session")]
    InvalidToken,
    #[error("session backend failure: {0}")]
    Backend(String),
}

impl AuthRejection {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredentials | Self::MalformedCredentials | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Backend details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "authentication required",
            Self::MalformedCredentials => "malformed authorization header",
            Self::InvalidToken => "invalid or expired session",
            Self::Backend(_) => "internal error",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// A request that passed authorization.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub user: SessionUser,
    pub token: String,
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively; the token must be a single
/// non-empty word.
///
/// # Errors
///
/// `MissingCredentials` when the header is absent, `MalformedCredentials`
/// when it is present but not a usable bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthRejection::MissingCredentials)?;
    let raw = value.to_str().map_err(|_| AuthRejection::MalformedCredentials)?;

    let (scheme, token) = raw
        .trim()
        .split_once(' ')
        .ok_or(AuthRejection::MalformedCredentials)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthRejection::MalformedCredentials);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthRejection::MalformedCredentials);
    }
    Ok(token)
}

/// Authorize a request from its headers against the session store.
///
/// # Errors
///
/// Returns an `AuthRejection` describing why the request may not proceed.
pub async fn authorize(store: &dyn SessionStore, headers: &HeaderMap) -> Result<Authorized, AuthRejection> {
    let token = match bearer_token(headers) {
        Ok(token) => token,
        Err(rejection) => {
            debug!(reason = %rejection, "request rejected before session lookup");
            return Err(rejection);
        }
    };

    let user = store
        .validate(token)
        .await
        .map_err(|e| {
            error!(error = %e, "session validation failed");
            AuthRejection::Backend(e.to_string())
        })?
        .ok_or_else(|| {
            debug!("request rejected: unknown or expired session token");
            AuthRejection::InvalidToken
        })?;

    Ok(Authorized { user, token: token.to_owned() })
}

#[cfg(test)]
#[path = "authorizer_test.rs"]
mod tests;
