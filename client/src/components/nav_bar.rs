//! Top navigation for authenticated pages: section links, user, sign-out.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::state::auth::AuthState;

#[component]
pub fn NavBar() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();

    // Populate the user once per page load; a 401 here clears the token and
    // the guard takes over.
    Effect::new(move || {
        if auth.with_untracked(|a| a.user.is_some()) {
            return;
        }
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::fetch_current_user().await {
                Ok(user) => auth.update(|a| a.user = Some(user)),
                Err(e) if crate::net::api::needs_login(&e) => auth.update(AuthState::signed_out),
                Err(e) => log::warn!("profile load failed: {e}"),
            }
        });
    });

    let on_sign_out = move |_| {
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            crate::net::api::logout().await;
            auth.update(AuthState::signed_out);
        });
    };

    view! {
        <nav class="nav-bar">
            <A href="/">"JiuMetrics"</A>
            <A href="/athletes">"Athletes"</A>
            <A href="/opponents">"Opponents"</A>
            <A href="/analyses">"Analyses"</A>
            <span class="nav-bar__user">
                {move || auth.with(|a| a.user.as_ref().map(|u| u.name.clone()).unwrap_or_default())}
            </span>
            <button class="nav-bar__sign-out" on:click=on_sign_out>"Sign out"</button>
        </nav>
    }
}
