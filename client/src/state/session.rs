//! The single accessor for the persisted session token.
//!
//! SYSTEM CONTEXT
//! ==============
//! The login page writes the token, the route guard and API layer read it,
//! and logout or a server-side `401` clears it. All of them go through
//! `SessionTokenStore`, so `SESSION_TOKEN_KEY` is the only place the storage
//! key is spelled out.
//!
//! TRADE-OFFS
//! ==========
//! `window.localStorage` only exists in the browser. `BrowserStorage` reads as
//! empty under SSR and in native tests; tests that need a populated slot use
//! `MemoryStorage`.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Storage key shared by every reader and writer of the session token.
pub const SESSION_TOKEN_KEY: &str = "jiumetrics_token";

/// Key/value slot the token is persisted in.
pub trait TokenStorage: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// `window.localStorage` in the browser; permanently empty elsewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

impl TokenStorage for BrowserStorage {
    fn read(&self, key: &str) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.get_item(key).ok().flatten()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            None
        }
    }

    fn write(&self, key: &str, value: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                let _ = storage.set_item(key, value);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
        }
    }

    fn remove(&self, key: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                let _ = storage.remove_item(key);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
        }
    }
}

/// In-process map standing in for `localStorage`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
    }
}

/// Get/set/clear contract over the canonical token slot.
///
/// Nothing is cached: every `get` goes back to the storage, so a token
/// written or cleared elsewhere is seen on the next read.
#[derive(Clone)]
pub struct SessionTokenStore {
    storage: Arc<dyn TokenStorage>,
}

impl SessionTokenStore {
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by `window.localStorage`.
    #[must_use]
    pub fn browser() -> Self {
        Self::new(Arc::new(BrowserStorage))
    }

    /// Current token. Empty and whitespace-only values count as absent.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.storage
            .read(SESSION_TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    pub fn set(&self, token: &str) {
        self.storage.write(SESSION_TOKEN_KEY, token);
    }

    pub fn clear(&self) {
        self.storage.remove(SESSION_TOKEN_KEY);
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

impl Default for SessionTokenStore {
    fn default() -> Self {
        Self::browser()
    }
}
