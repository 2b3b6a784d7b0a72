//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod analysis;
pub mod authorizer;
pub mod login_codes;
pub mod roster;
pub mod session;
