//! Authenticated landing page.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::nav_bar::NavBar;
use crate::state::auth::AuthState;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let greeting = move || {
        auth.with(|a| match &a.user {
            Some(user) => format!("Welcome back, {}.", user.name),
            None => "Welcome back.".to_owned(),
        })
    };

    view! {
        <NavBar/>
        <main class="dashboard">
            <h1>{greeting}</h1>
            <ul class="dashboard__links">
                <li><A href="/athletes">"Manage your athletes"</A></li>
                <li><A href="/opponents">"Scout opponents"</A></li>
                <li><A href="/analyses">"Review game plans"</A></li>
            </ul>
        </main>
    }
}
