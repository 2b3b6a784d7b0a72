//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read shared auth state from Leptos context providers set up in
//! `app.rs`.

pub mod nav_bar;
pub mod protected_route;
