//! Login codes: short one-time codes an athlete or coach trades for a session.
//!
//! LIFECYCLE
//! =========
//! `issue` supersedes whatever code is pending for the address and stores
//! the SHA-256 of a fresh one. `redeem` locks the newest pending row, compares
//! digests, and on a match consumes the row and opens a session through the
//! `SessionStore`. A miss bumps the attempt counter and burns the row once the
//! policy cap is reached. Consumed and expired rows are swept periodically.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use super::session::{SessionError, SessionStore, SessionUser, bytes_to_hex};
use crate::config::MailConfig;

const CODE_LEN: usize = 6;
/// Uppercase letters and digits, minus the lookalikes 0/O and 1/I.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MESSAGE_TEMPLATE: &str = include_str!("../../templates/login_code.html");
const MESSAGE_SUBJECT: &str = "Your JiuMetrics sign-in code";
const FALLBACK_NAME: &str = "athlete";

#[derive(Debug, thiserror::Error)]
pub enum LoginCodeError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid code")]
    MalformedCode,
    #[error("expired or incorrect code")]
    Rejected,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// How long a code lives and how many wrong guesses it survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginCodePolicy {
    pub ttl: Duration,
    pub max_attempts: u32,
}

impl Default for LoginCodePolicy {
    fn default() -> Self {
        Self { ttl: Duration::from_secs(10 * 60), max_attempts: 5 }
    }
}

/// Result of checking one submitted code against the pending row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Accepted,
    Missed { burned: bool },
}

impl LoginCodePolicy {
    /// Compare `submitted` with the stored digest. `prior_misses` counts the
    /// wrong guesses already recorded on the row.
    #[must_use]
    pub fn judge(&self, stored_digest: &str, prior_misses: u32, submitted: &LoginCode) -> Attempt {
        if submitted.digest() == stored_digest {
            return Attempt::Accepted;
        }
        Attempt::Missed { burned: prior_misses.saturating_add(1) >= self.max_attempts }
    }
}

// =============================================================================
// CODE VALUES
// =============================================================================

/// A well-formed six-character login code.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCode(String);

impl LoginCode {
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..CODE_LEN)
            .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// Accept user input: surrounding whitespace and case are forgiven.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_uppercase();
        let well_formed = code.len() == CODE_LEN && code.bytes().all(|b| CODE_ALPHABET.contains(&b));
        well_formed.then_some(Self(code))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex SHA-256, the only form that reaches the database.
    #[must_use]
    pub fn digest(&self) -> String {
        bytes_to_hex(&Sha256::digest(self.0.as_bytes()))
    }
}

// Codes are credentials; keep them out of `{:?}` logging.
impl fmt::Debug for LoginCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoginCode(..)")
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || normalized.contains(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

/// Name given to an account created by its first code request: the local
/// part of the address without any `+tag`.
fn default_display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let base = local.split('+').next().unwrap_or_default().trim();
    if base.is_empty() { FALLBACK_NAME.to_owned() } else { base.to_owned() }
}

/// A freshly issued code, ready to deliver.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub email: String,
    pub code: LoginCode,
    pub expires_in: Duration,
}

/// What a successful redemption hands back to the client.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoginGrant {
    pub token: String,
    pub user: SessionUser,
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct LoginCodes {
    pool: PgPool,
    policy: LoginCodePolicy,
}

impl LoginCodes {
    #[must_use]
    pub fn new(pool: PgPool, policy: LoginCodePolicy) -> Self {
        Self { pool, policy }
    }

    /// Create the account on first contact, supersede any pending code, and
    /// store a new one.
    ///
    /// # Errors
    ///
    /// `InvalidEmail` for unusable addresses, or a database error.
    pub async fn issue(&self, email: &str) -> Result<IssuedCode, LoginCodeError> {
        let email = normalize_email(email).ok_or(LoginCodeError::InvalidEmail)?;
        let code = LoginCode::generate();

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO users (email, name) VALUES ($1, $2) ON CONFLICT (email) DO NOTHING")
            .bind(&email)
            .bind(default_display_name(&email))
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE email_login_codes SET consumed_at = now() WHERE email = $1 AND consumed_at IS NULL")
            .bind(&email)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO email_login_codes (email, code_hash, expires_at)
             VALUES ($1, $2, now() + make_interval(secs => $3))",
        )
        .bind(&email)
        .bind(code.digest())
        .bind(self.policy.ttl.as_secs_f64())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(IssuedCode { email, code, expires_in: self.policy.ttl })
    }

    /// Trade a code for a session.
    ///
    /// # Errors
    ///
    /// `Rejected` when no pending code exists or the guess is wrong;
    /// `InvalidEmail`/`MalformedCode` for unusable input.
    pub async fn redeem(
        &self,
        email: &str,
        code: &str,
        sessions: &dyn SessionStore,
    ) -> Result<LoginGrant, LoginCodeError> {
        let email = normalize_email(email).ok_or(LoginCodeError::InvalidEmail)?;
        let code = LoginCode::parse(code).ok_or(LoginCodeError::MalformedCode)?;

        let mut tx = self.pool.begin().await?;
        let pending: Option<(Uuid, String, i32)> = sqlx::query_as(
            r"SELECT id, code_hash, attempts
              FROM email_login_codes
              WHERE email = $1 AND consumed_at IS NULL AND expires_at > now()
              ORDER BY created_at DESC
              LIMIT 1
              FOR UPDATE",
        )
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((code_id, stored_digest, misses)) = pending else {
            return Err(LoginCodeError::Rejected);
        };

        let prior_misses = u32::try_from(misses).unwrap_or(0);
        if let Attempt::Missed { burned } = self.policy.judge(&stored_digest, prior_misses, &code) {
            sqlx::query(
                "UPDATE email_login_codes
                 SET attempts = attempts + 1,
                     consumed_at = CASE WHEN $2 THEN now() ELSE NULL END
                 WHERE id = $1",
            )
            .bind(code_id)
            .bind(burned)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            if burned {
                tracing::info!(%email, "login code burned after repeated misses");
            }
            return Err(LoginCodeError::Rejected);
        }

        sqlx::query("UPDATE email_login_codes SET consumed_at = now() WHERE id = $1")
            .bind(code_id)
            .execute(&mut *tx)
            .await?;
        let (id, name, address): (Uuid, String, Option<String>) =
            sqlx::query_as("SELECT id, name, email FROM users WHERE email = $1")
                .bind(&email)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(LoginCodeError::Rejected)?;
        tx.commit().await?;

        let user = SessionUser { id, name, email: address };
        let token = sessions.create(&user).await?;
        Ok(LoginGrant { token, user })
    }

    /// Delete consumed, superseded, and expired codes.
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails.
    pub async fn prune_stale(&self) -> Result<u64, LoginCodeError> {
        let result = sqlx::query("DELETE FROM email_login_codes WHERE consumed_at IS NOT NULL OR expires_at <= now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub fn spawn_prune_task(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let codes = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                match codes.prune_stale().await {
                    Ok(0) => {}
                    Ok(removed) => tracing::debug!(removed, "pruned stale login codes"),
                    Err(e) => tracing::warn!(error = %e, "login code prune failed"),
                }
            }
        })
    }
}

// =============================================================================
// DELIVERY
// =============================================================================

/// Sends issued codes through Resend.
pub struct CodeMailer {
    client: Resend,
    from: String,
}

impl CodeMailer {
    #[must_use]
    pub fn new(mail: &MailConfig) -> Self {
        Self { client: Resend::new(&mail.api_key), from: mail.from.clone() }
    }

    /// # Errors
    ///
    /// Returns `Delivery` if the Resend API call fails.
    pub async fn deliver(&self, issued: &IssuedCode) -> Result<(), LoginCodeError> {
        let html = render_message(issued);
        let message = CreateEmailBaseOptions::new(&self.from, [issued.email.as_str()], MESSAGE_SUBJECT).with_html(&html);
        self.client
            .emails
            .send(message)
            .await
            .map_err(|e| LoginCodeError::Delivery(e.to_string()))?;
        Ok(())
    }
}

#[must_use]
pub fn render_message(issued: &IssuedCode) -> String {
    let minutes = issued.expires_in.as_secs().div_ceil(60).max(1);
    MESSAGE_TEMPLATE
        .replace("{{EMAIL}}", &issued.email)
        .replace("{{CODE}}", issued.code.as_str())
        .replace("{{MINUTES}}", &minutes.to_string())
}

#[cfg(test)]
#[path = "login_codes_test.rs"]
mod tests;
