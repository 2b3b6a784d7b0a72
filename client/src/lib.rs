//! # client
//!
//! Leptos frontend for JiuMetrics. Server-rendered through `leptos_axum` in
//! the `server` crate and hydrated in the browser.
//!
//! Protected pages sit behind `ProtectedRoute`, which checks the session
//! token kept by `state::session`. That check is advisory; the server
//! authorizes every API call independently.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
