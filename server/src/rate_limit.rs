//! In-memory rate limiting for the email login endpoints.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<String, VecDeque<Instant>>`,
//! keyed by normalized email. Three limits are enforced:
//! - Code requests per email: 5 per 10 minutes
//! - Verification attempts per email: 10 per 10 minutes
//! - Code requests across all emails: 100 per minute
//!
//! TRADE-OFFS
//! ==========
//! Counters live in process memory, so a multi-node deployment gets one
//! budget per node. Empty per-email windows are dropped during pruning to
//! keep the maps from growing with every address ever seen.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::env_parse;

const DEFAULT_REQUEST_LIMIT: usize = 5;
const DEFAULT_VERIFY_LIMIT: usize = 10;
const DEFAULT_PER_EMAIL_WINDOW_SECS: u64 = 600;

const DEFAULT_GLOBAL_LIMIT: usize = 100;
const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub request_limit: usize,
    pub verify_limit: usize,
    pub per_email_window: Duration,
    pub global_limit: usize,
    pub global_window: Duration,
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            request_limit: env_parse("LOGIN_RATE_LIMIT_REQUESTS", DEFAULT_REQUEST_LIMIT),
            verify_limit: env_parse("LOGIN_RATE_LIMIT_VERIFIES", DEFAULT_VERIFY_LIMIT),
            per_email_window: Duration::from_secs(env_parse(
                "LOGIN_RATE_LIMIT_WINDOW_SECS",
                DEFAULT_PER_EMAIL_WINDOW_SECS,
            )),
            global_limit: env_parse("LOGIN_RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            global_window: Duration::from_secs(env_parse(
                "LOGIN_RATE_LIMIT_GLOBAL_WINDOW_SECS",
                DEFAULT_GLOBAL_WINDOW_SECS,
            )),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            request_limit: DEFAULT_REQUEST_LIMIT,
            verify_limit: DEFAULT_VERIFY_LIMIT,
            per_email_window: Duration::from_secs(DEFAULT_PER_EMAIL_WINDOW_SECS),
            global_limit: DEFAULT_GLOBAL_LIMIT,
            global_window: Duration::from_secs(DEFAULT_GLOBAL_WINDOW_SECS),
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("too many code requests for this email (max {limit}/{window_secs}s)")]
    RequestsExceeded { limit: usize, window_secs: u64 },
    #[error("too many verification attempts for this email (max {limit}/{window_secs}s)")]
    VerifiesExceeded { limit: usize, window_secs: u64 },
    #[error("login service is busy (max {limit} code requests/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct LoginRateLimiter {
    inner: Arc<Mutex<LimiterInner>>,
    config: RateLimitConfig,
}

#[derive(Default)]
struct LimiterInner {
    /// Code-request timestamps per email.
    requests: HashMap<String, VecDeque<Instant>>,
    /// Verification-attempt timestamps per email.
    verifies: HashMap<String, VecDeque<Instant>>,
    /// Code-request timestamps across all emails.
    global_requests: VecDeque<Instant>,
}

impl LoginRateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(LimiterInner::default())), config }
    }

    /// Check both the global and per-email code-request limits, then record.
    ///
    /// # Errors
    ///
    /// Returns which limit was exceeded; nothing is recorded in that case.
    pub fn check_code_request(&self, email: &str) -> Result<(), RateLimitError> {
        self.check_code_request_at(email, Instant::now())
    }

    fn check_code_request_at(&self, email: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let inner = &mut *guard;
        let cfg = self.config;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        let deque = inner.requests.entry(email.to_owned()).or_default();
        prune_window(deque, now, cfg.per_email_window);
        if deque.len() >= cfg.request_limit {
            return Err(RateLimitError::RequestsExceeded {
                limit: cfg.request_limit,
                window_secs: cfg.per_email_window.as_secs(),
            });
        }

        deque.push_back(now);
        inner.global_requests.push_back(now);
        Ok(())
    }

    /// Check and record a verification attempt for `email`.
    ///
    /// # Errors
    ///
    /// Returns `VerifiesExceeded` once the per-email budget is spent.
    pub fn check_verify(&self, email: &str) -> Result<(), RateLimitError> {
        self.check_verify_at(email, Instant::now())
    }

    fn check_verify_at(&self, email: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let inner = &mut *guard;
        let cfg = self.config;

        let deque = inner.verifies.entry(email.to_owned()).or_default();
        prune_window(deque, now, cfg.per_email_window);
        if deque.len() >= cfg.verify_limit {
            return Err(RateLimitError::VerifiesExceeded {
                limit: cfg.verify_limit,
                window_secs: cfg.per_email_window.as_secs(),
            });
        }
        deque.push_back(now);
        Ok(())
    }

    /// Drop per-email windows that have fully expired.
    pub fn prune_idle(&self) {
        self.prune_idle_at(Instant::now());
    }

    /// Periodically prune idle windows until the runtime shuts down.
    #[must_use]
    pub fn spawn_prune_task(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                limiter.prune_idle();
            }
        })
    }

    fn prune_idle_at(&self, now: Instant) {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let inner = &mut *guard;
        let window = self.config.per_email_window;
        for map in [&mut inner.requests, &mut inner.verifies] {
            map.retain(|_, deque| {
                prune_window(deque, now, window);
                !deque.is_empty()
            });
        }
    }

    #[cfg(test)]
    fn tracked_emails(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.requests.len() + inner.verifies.len()
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
