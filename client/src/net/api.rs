//! REST API helpers for communicating with the server.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, each carrying the
//! stored session token as `Authorization: Bearer <token>`.
//! Server-side (SSR): stubs returning an error since these endpoints are only
//! meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `Result<_, String>` instead of panics. A `401` from the server
//! clears the stored token and yields `SESSION_EXPIRED`, so the next guard
//! evaluation sends the user back to login.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::types::{Analysis, LoginResponse, NewRosterEntry, RosterEntry, RosterKind, User};
#[cfg(feature = "hydrate")]
use crate::state::session::SessionTokenStore;

/// Error returned when the server rejected the stored token.
pub const SESSION_EXPIRED: &str = "session expired; please sign in again";
/// Error returned when a protected call is attempted without a token.
pub const NOT_SIGNED_IN: &str = "not signed in";

#[cfg(not(feature = "hydrate"))]
const UNAVAILABLE: &str = "not available on server";

#[cfg(any(test, feature = "hydrate"))]
fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(any(test, feature = "hydrate"))]
fn failed_message(action: &str, status: u16) -> String {
    format!("{action} failed: {status}")
}

#[cfg(any(test, feature = "hydrate"))]
fn roster_item_endpoint(kind: RosterKind, id: &str) -> String {
    format!("{}/{id}", kind.collection_path())
}

#[cfg(any(test, feature = "hydrate"))]
fn analysis_endpoint(id: &str) -> String {
    format!("/api/analyses/{id}")
}

/// Whether an error string means the user must sign in again.
#[must_use]
pub fn needs_login(err: &str) -> bool {
    err == SESSION_EXPIRED || err == NOT_SIGNED_IN
}

/// Attach the bearer token, send, and clear the token on `401`.
#[cfg(feature = "hydrate")]
async fn send_authed(
    builder: gloo_net::http::RequestBuilder,
    body: Option<&serde_json::Value>,
) -> Result<gloo_net::http::Response, String> {
    let store = SessionTokenStore::browser();
    let token = store.get().ok_or_else(|| NOT_SIGNED_IN.to_owned())?;
    let builder = builder.header("Authorization", &bearer_header(&token));

    let resp = match body {
        Some(body) => builder.json(body).map_err(|e| e.to_string())?.send().await,
        None => builder.send().await,
    }
    .map_err(|e| e.to_string())?;

    if resp.status() == 401 {
        log::warn!("server rejected the stored session token; clearing it");
        store.clear();
        return Err(SESSION_EXPIRED.to_owned());
    }
    Ok(resp)
}

// =============================================================================
// AUTH
// =============================================================================

#[cfg(feature = "hydrate")]
#[derive(Debug, serde::Deserialize)]
struct RequestEmailCodeResponse {
    code: Option<String>,
}

/// Request a 6-character email login code via `POST /api/auth/email/request-code`.
///
/// Returns the code itself when the server is configured to echo codes.
///
/// # Errors
///
/// Returns an error string if the HTTP request fails or the server responds with a non-OK status.
pub async fn request_email_login_code(email: &str) -> Result<Option<String>, String> {
    #[cfg(feature = "hydrate")]
    {
        let payload = serde_json::json!({ "email": email });
        let resp = gloo_net::http::Request::post("/api/auth/email/request-code")
            .json(&payload)
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(failed_message("request code", resp.status()));
        }
        let body: RequestEmailCodeResponse = resp.json().await.map_err(|e| e.to_string())?;
        Ok(body.code)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = email;
        Err(UNAVAILABLE.to_owned())
    }
}

/// Exchange an email login code for a session via `POST /api/auth/email/verify-code`.
///
/// The caller persists the returned token through `SessionTokenStore`.
///
/// # Errors
///
/// Returns an error string if the code is rejected or the request fails.
pub async fn verify_email_login_code(email: &str, code: &str) -> Result<LoginResponse, String> {
    #[cfg(feature = "hydrate")]
    {
        let payload = serde_json::json!({ "email": email, "code": code });
        let resp = gloo_net::http::Request::post("/api/auth/email/verify-code")
            .json(&payload)
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(failed_message("verify code", resp.status()));
        }
        resp.json::<LoginResponse>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (email, code);
        Err(UNAVAILABLE.to_owned())
    }
}

/// Fetch the currently authenticated user from `/api/auth/me`.
///
/// # Errors
///
/// Returns `SESSION_EXPIRED`/`NOT_SIGNED_IN` or a transport error.
pub async fn fetch_current_user() -> Result<User, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = send_authed(gloo_net::http::Request::get("/api/auth/me"), None).await?;
        if !resp.ok() {
            return Err(failed_message("load profile", resp.status()));
        }
        resp.json::<User>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(UNAVAILABLE.to_owned())
    }
}

/// Revoke the session server-side, then clear the local token regardless.
pub async fn logout() {
    #[cfg(feature = "hydrate")]
    {
        let _ = send_authed(gloo_net::http::Request::post("/api/auth/logout"), None).await;
        SessionTokenStore::browser().clear();
    }
}

// =============================================================================
// ROSTER
// =============================================================================

/// List the caller's athletes or opponents.
///
/// # Errors
///
/// Returns an error string on rejection or transport failure.
pub async fn list_roster(kind: RosterKind) -> Result<Vec<RosterEntry>, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = send_authed(gloo_net::http::Request::get(kind.collection_path()), None).await?;
        if !resp.ok() {
            return Err(failed_message(&format!("list {}s", kind.label()), resp.status()));
        }
        resp.json::<Vec<RosterEntry>>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = kind;
        Err(UNAVAILABLE.to_owned())
    }
}

/// Create a roster entry.
///
/// # Errors
///
/// Returns an error string on validation failure, rejection, or transport failure.
pub async fn create_roster_entry(kind: RosterKind, entry: &NewRosterEntry) -> Result<RosterEntry, String> {
    #[cfg(feature = "hydrate")]
    {
        let payload = serde_json::to_value(entry).map_err(|e| e.to_string())?;
        let resp = send_authed(gloo_net::http::Request::post(kind.collection_path()), Some(&payload)).await?;
        if !resp.ok() {
            return Err(failed_message(&format!("create {}", kind.label()), resp.status()));
        }
        resp.json::<RosterEntry>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (kind, entry);
        Err(UNAVAILABLE.to_owned())
    }
}

/// Delete a roster entry.
///
/// # Errors
///
/// Returns an error string on rejection or transport failure.
pub async fn delete_roster_entry(kind: RosterKind, id: &str) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        let url = roster_item_endpoint(kind, id);
        let resp = send_authed(gloo_net::http::Request::delete(&url), None).await?;
        if !resp.ok() {
            return Err(failed_message(&format!("delete {}", kind.label()), resp.status()));
        }
        Ok(())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (kind, id);
        Err(UNAVAILABLE.to_owned())
    }
}

// =============================================================================
// ANALYSES
// =============================================================================

/// List stored analyses, newest first.
///
/// # Errors
///
/// Returns an error string on rejection or transport failure.
pub async fn list_analyses() -> Result<Vec<Analysis>, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = send_authed(gloo_net::http::Request::get("/api/analyses"), None).await?;
        if !resp.ok() {
            return Err(failed_message("list analyses", resp.status()));
        }
        resp.json::<Vec<Analysis>>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(UNAVAILABLE.to_owned())
    }
}

/// Delete an analysis.
///
/// # Errors
///
/// Returns an error string on rejection or transport failure.
pub async fn delete_analysis(id: &str) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        let url = analysis_endpoint(id);
        let resp = send_authed(gloo_net::http::Request::delete(&url), None).await?;
        if !resp.ok() {
            return Err(failed_message("delete analysis", resp.status()));
        }
        Ok(())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = id;
        Err(UNAVAILABLE.to_owned())
    }
}
