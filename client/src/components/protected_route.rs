//! Route wrapper that gates protected views behind a stored session token.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every authenticated page in `app.rs` is nested in `ProtectedRoute`. The
//! decision itself lives in `util::guard`; this component only feeds it the
//! current location and performs the redirect. It is UX, not security: the
//! server authorizes every API call on its own.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::state::auth::AuthState;
use crate::state::session::SessionTokenStore;
use crate::util::guard::{self, NavigationTarget, RouteOutcome};

#[component]
pub fn ProtectedRoute(children: ChildrenFn) -> impl IntoView {
    let store = expect_context::<SessionTokenStore>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let location = use_location();
    let navigate = use_navigate();

    // Storage is browser-only: SSR and the hydration pass render the neutral
    // placeholder, and the first effect flips this on.
    let mounted = RwSignal::new(false);
    Effect::new(move || mounted.set(true));

    let outcome = Memo::new(move |_| {
        auth.track();
        let target = NavigationTarget::new(location.pathname.get(), &location.search.get());
        guard::route_outcome(mounted.get(), &store, &target)
    });

    Effect::new(move || {
        let current = outcome.get();
        if let Some(href) = current.redirect_href() {
            navigate(href, NavigateOptions { replace: true, ..Default::default() });
        }
    });

    move || match outcome.get() {
        RouteOutcome::Content => children().into_any(),
        RouteOutcome::Pending | RouteOutcome::Redirect(_) => {
            view! { <p class="guard-pending">"Checking session..."</p> }.into_any()
        }
    }
}
