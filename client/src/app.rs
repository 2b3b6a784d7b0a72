//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::protected_route::ProtectedRoute;
use crate::pages::{
    analyses::AnalysesPage,
    dashboard::DashboardPage,
    login::LoginPage,
    roster::{AthletesPage, OpponentsPage},
};
use crate::state::auth::AuthState;
use crate::state::session::SessionTokenStore;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the token store and auth state, and wraps every page except
/// login in `ProtectedRoute`.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    provide_context(SessionTokenStore::browser());
    provide_context(RwSignal::new(AuthState::default()));

    view! {
        <Stylesheet id="leptos" href="/pkg/jiumetrics.css"/>
        <Title text="JiuMetrics"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route
                    path=StaticSegment("")
                    view=|| view! { <ProtectedRoute><DashboardPage/></ProtectedRoute> }
                />
                <Route
                    path=StaticSegment("athletes")
                    view=|| view! { <ProtectedRoute><AthletesPage/></ProtectedRoute> }
                />
                <Route
                    path=StaticSegment("opponents")
                    view=|| view! { <ProtectedRoute><OpponentsPage/></ProtectedRoute> }
                />
                <Route
                    path=StaticSegment("analyses")
                    view=|| view! { <ProtectedRoute><AnalysesPage/></ProtectedRoute> }
                />
            </Routes>
        </Router>
    }
}
