//! Route-guard decisions and return-to handling.
//!
//! DESIGN
//! ======
//! The decision is a pure function of the navigation target and the token
//! value, so it is tested without a browser. `ProtectedRoute` feeds it a fresh
//! token read on every evaluation. The guard only looks for presence; the
//! server decides whether the token is any good.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::state::session::SessionTokenStore;

pub const LOGIN_PATH: &str = "/login";
/// Query parameter carrying the originally requested location.
pub const RETURN_TO_PARAM: &str = "redirect";
const DEFAULT_RETURN: &str = "/";

/// Where the user is trying to go: a path plus optional query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationTarget {
    pub path: String,
    pub query: Option<String>,
}

impl NavigationTarget {
    /// Build from router location parts. A leading `?` on `search` is dropped.
    pub fn new(path: impl Into<String>, search: &str) -> Self {
        let query = search.strip_prefix('?').unwrap_or(search);
        Self { path: path.into(), query: (!query.is_empty()).then(|| query.to_owned()) }
    }

    #[must_use]
    pub fn as_href(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the protected content unchanged.
    Render,
    /// Navigate to this login href instead.
    Redirect(String),
}

/// Decide from an already-read token value.
#[must_use]
pub fn check_access(target: &NavigationTarget, token: Option<&str>) -> GuardDecision {
    match token {
        Some(token) if !token.trim().is_empty() => GuardDecision::Render,
        _ => GuardDecision::Redirect(login_redirect(target)),
    }
}

/// Read the token slot now and decide. Never writes to the store.
#[must_use]
pub fn evaluate(store: &SessionTokenStore, target: &NavigationTarget) -> GuardDecision {
    check_access(target, store.get().as_deref())
}

/// What `ProtectedRoute` shows for its current inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Not mounted yet (SSR or the hydration pass): neutral placeholder.
    Pending,
    /// Show the protected children.
    Content,
    /// Replace the current history entry with this login href.
    Redirect(String),
}

impl RouteOutcome {
    /// Href the redirect effect should navigate to, if any.
    #[must_use]
    pub fn redirect_href(&self) -> Option<&str> {
        match self {
            Self::Redirect(href) => Some(href),
            Self::Pending | Self::Content => None,
        }
    }
}

/// Outcome for a route component. Storage is not consulted until mounted.
#[must_use]
pub fn route_outcome(mounted: bool, store: &SessionTokenStore, target: &NavigationTarget) -> RouteOutcome {
    if !mounted {
        return RouteOutcome::Pending;
    }
    match evaluate(store, target) {
        GuardDecision::Render => RouteOutcome::Content,
        GuardDecision::Redirect(href) => RouteOutcome::Redirect(href),
    }
}

/// `/login?redirect=<percent-encoded target>`.
#[must_use]
pub fn login_redirect(target: &NavigationTarget) -> String {
    format!("{LOGIN_PATH}?{RETURN_TO_PARAM}={}", urlencoding::encode(&target.as_href()))
}

/// Where to go after login, given the (already decoded) return-to parameter.
///
/// Only same-origin absolute paths are honored; anything else, including a
/// loop back to the login view, lands on `/`.
#[must_use]
pub fn return_target(param: Option<&str>) -> String {
    let Some(raw) = param else {
        return DEFAULT_RETURN.to_owned();
    };
    let is_local = raw.starts_with('/') && !raw.starts_with("//") && !raw.contains('\\');
    let is_control_free = !raw.chars().any(char::is_control);
    if is_local && is_control_free && !targets_login(raw) {
        raw.to_owned()
    } else {
        DEFAULT_RETURN.to_owned()
    }
}

fn targets_login(href: &str) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.trim_end_matches('/') == LOGIN_PATH
}
