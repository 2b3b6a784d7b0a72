//! Client state containers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` owns the persisted token slot; `auth` is the reactive view of
//! who is signed in.

pub mod auth;
pub mod session;
