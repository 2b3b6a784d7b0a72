//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Provided as `RwSignal<AuthState>` context. Login, logout, and `401`
//! handling bump `revision` after touching the token slot so the route guard
//! re-runs even when the URL did not change.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::User;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    /// Incremented whenever the stored token is written or cleared.
    pub revision: u64,
}

impl AuthState {
    /// Record a successful login.
    pub fn signed_in(&mut self, user: User) {
        self.user = Some(user);
        self.revision += 1;
    }

    /// Forget the user after the token slot was cleared.
    pub fn signed_out(&mut self) {
        self.user = None;
        self.revision += 1;
    }
}
