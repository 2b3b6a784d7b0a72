//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration. Everything except `login` is
//! mounted behind `ProtectedRoute`.

pub mod analyses;
pub mod dashboard;
pub mod login;
pub mod roster;
