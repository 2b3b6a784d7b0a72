//! Session token issuance, validation, and revocation.
//!
//! ARCHITECTURE
//! ============
//! Tokens are opaque random strings handed to the browser after login and
//! presented back as `Authorization: Bearer <token>`. The `SessionStore`
//! trait hides where sessions live: PostgreSQL in production, an in-process
//! map for tests and single-node dev runs.
//!
//! TRADE-OFFS
//! ==========
//! Validation always goes back to the store; there is no per-process cache of
//! "known good" tokens, so a logout on one node takes effect everywhere on the
//! next request.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// User attached to a validated session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionUser {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login email, if the account has one.
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session store unavailable")]
    Unavailable,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for `user`, returning the new token.
    async fn create(&self, user: &SessionUser) -> Result<String, SessionError>;

    /// Resolve a token to its user. `Ok(None)` means unknown or expired.
    async fn validate(&self, token: &str) -> Result<Option<SessionUser>, SessionError>;

    /// Revoke a token. Revoking an unknown token is not an error.
    async fn revoke(&self, token: &str) -> Result<(), SessionError>;

    /// Drop every expired session, returning how many were removed.
    async fn prune_expired(&self) -> Result<u64, SessionError>;
}

/// Periodically drop expired sessions so abandoned tokens do not pile up.
pub fn spawn_prune_task(store: Arc<dyn SessionStore>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match store.prune_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "pruned expired sessions"),
                Err(e) => tracing::warn!(error = %e, "session prune failed"),
            }
        }
    })
}

// =============================================================================
// POSTGRES
// =============================================================================

pub struct PgSessionStore {
    pool: PgPool,
    ttl: Duration,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, user: &SessionUser) -> Result<String, SessionError> {
        let token = generate_token();
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at)
             VALUES ($1, $2, now() + make_interval(secs => $3))",
        )
        .bind(&token)
        .bind(user.id)
        .bind(self.ttl.as_secs_f64())
        .execute(&self.pool)
        .await?;
        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Option<SessionUser>, SessionError> {
        let row = sqlx::query(
            r"SELECT u.id, u.name, u.email
              FROM sessions s
              JOIN users u ON u.id = s.user_id
              WHERE s.token = $1 AND s.expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| SessionUser { id: r.get("id"), name: r.get("name"), email: r.get("email") }))
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn prune_expired(&self) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

struct MemorySession {
    user: SessionUser,
    expires_at: Instant,
}

/// Process-local session store. Sessions vanish on restart.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, MemorySession>>>,
    ttl: Duration,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: Arc::new(Mutex::new(HashMap::new())), ttl }
    }

    /// Insert a session under a caller-chosen token with an explicit expiry.
    pub fn insert_at(&self, token: &str, user: SessionUser, expires_at: Instant) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::Unavailable)?;
        sessions.insert(token.to_owned(), MemorySession { user, expires_at });
        Ok(())
    }

    fn validate_at(&self, token: &str, now: Instant) -> Result<Option<SessionUser>, SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::Unavailable)?;
        let expired = match sessions.get(token) {
            Some(session) if session.expires_at > now => return Ok(Some(session.user.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(token);
        }
        Ok(None)
    }

    fn prune_expired_at(&self, now: Instant) -> Result<u64, SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::Unavailable)?;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }

    /// Number of stored sessions, expired ones included until pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user: &SessionUser) -> Result<String, SessionError> {
        let token = generate_token();
        self.insert_at(&token, user.clone(), Instant::now() + self.ttl)?;
        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Option<SessionUser>, SessionError> {
        self.validate_at(token, Instant::now())
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().map_err(|_| SessionError::Unavailable)?;
        sessions.remove(token);
        Ok(())
    }

    async fn prune_expired(&self) -> Result<u64, SessionError> {
        self.prune_expired_at(Instant::now())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
