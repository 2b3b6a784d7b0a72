//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the session store every protected route
//! authorizes against, the login-code service with its optional mailer, and
//! the login rate limiter.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::rate_limit::LoginRateLimiter;
use crate::services::login_codes::{CodeMailer, LoginCodes};
use crate::services::session::SessionStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: Arc<dyn SessionStore>,
    pub login_codes: LoginCodes,
    /// `None` when Resend is not configured.
    pub mailer: Option<Arc<CodeMailer>>,
    pub rate_limiter: LoginRateLimiter,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, sessions: Arc<dyn SessionStore>, rate_limiter: LoginRateLimiter, config: ServerConfig) -> Self {
        let login_codes = LoginCodes::new(pool.clone(), config.login_codes);
        let mailer = config.mail.as_ref().map(|mail| Arc::new(CodeMailer::new(mail)));
        Self { pool, sessions, login_codes, mailer, rate_limiter, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
