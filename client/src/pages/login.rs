//! Sign-in page for coaches and athletes.
//!
//! Two steps: enter an email to receive a one-time code, then enter the code.
//! A successful exchange stores the session token and sends the user back to
//! the view that redirected them here.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::state::auth::AuthState;
use crate::state::session::SessionTokenStore;
use crate::util::guard::{self, RETURN_TO_PARAM};

const CODE_LEN: usize = 6;

/// Which form the page is showing.
#[derive(Clone, Debug, PartialEq, Eq)]
enum LoginStep {
    AskEmail,
    /// A code was sent to this address.
    AskCode(String),
}

/// Code input as the server will read it: uppercase, no spaces.
fn tidy_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .take(CODE_LEN)
        .collect()
}

fn code_is_complete(code: &str) -> bool {
    code.chars().count() == CODE_LEN && code.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(any(test, feature = "hydrate"))]
fn sent_message(email: &str) -> String {
    format!("We sent a sign-in code to {email}. It expires in a few minutes.")
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let store = expect_context::<SessionTokenStore>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let query = use_query_map();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let code = RwSignal::new(String::new());
    let step = RwSignal::new(LoginStep::AskEmail);
    let notice = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let dev_code = RwSignal::new(None::<String>);

    let return_to = move || guard::return_target(query.read().get(RETURN_TO_PARAM).as_deref());

    // Already signed in on this device.
    let store_check = store.clone();
    let navigate_back = navigate.clone();
    Effect::new(move || {
        if store_check.is_present() {
            navigate_back(&return_to(), NavigateOptions { replace: true, ..Default::default() });
        }
    });

    let on_send_code = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let address = email.get().trim().to_owned();
        if address.is_empty() {
            notice.set("Enter the email you train under.".to_owned());
            return;
        }
        busy.set(true);
        notice.set(String::new());
        dev_code.set(None);

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::request_email_login_code(&address).await {
                Ok(echoed) => {
                    dev_code.set(echoed);
                    notice.set(sent_message(&address));
                    step.set(LoginStep::AskCode(address));
                }
                Err(e) => notice.set(format!("Could not send a code: {e}")),
            }
            busy.set(false);
        });
    };

    let on_redeem = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let LoginStep::AskCode(address) = step.get() else {
            return;
        };
        if busy.get() {
            return;
        }
        let entered = code.get();
        if !code_is_complete(&entered) {
            notice.set(format!("Codes are {CODE_LEN} letters and digits."));
            return;
        }
        busy.set(true);

        #[cfg(feature = "hydrate")]
        {
            let store = store.clone();
            let navigate = navigate.clone();
            let target = return_to();
            leptos::task::spawn_local(async move {
                match crate::net::api::verify_email_login_code(&address, &entered).await {
                    Ok(login) => {
                        store.set(&login.token);
                        auth.update(|a| a.signed_in(login.user));
                        navigate(&target, NavigateOptions::default());
                    }
                    Err(e) => {
                        notice.set(format!("That code did not work: {e}"));
                        busy.set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&store, &navigate, auth, address, entered);
        }
    };

    let start_over = move |_: leptos::ev::MouseEvent| {
        step.set(LoginStep::AskEmail);
        code.set(String::new());
        dev_code.set(None);
        notice.set(String::new());
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"JiuMetrics"</h1>
                <p class="login-card__subtitle">"Scouting and game plans for your team"</p>
                {move || match step.get() {
                    LoginStep::AskEmail => view! {
                        <form class="login-form" on:submit=on_send_code>
                            <label class="login-label" for="login-email">"Email"</label>
                            <input
                                id="login-email"
                                class="login-input"
                                type="email"
                                autocomplete="email"
                                placeholder="coach@yourgym.com"
                                prop:value=move || email.get()
                                on:input=move |ev| email.set(event_target_value(&ev))
                            />
                            <button class="login-button" type="submit" disabled=move || busy.get()>
                                "Email me a code"
                            </button>
                        </form>
                    }
                    .into_any(),
                    LoginStep::AskCode(_) => view! {
                        <form class="login-form" on:submit=on_redeem.clone()>
                            <label class="login-label" for="login-code">"Sign-in code"</label>
                            <input
                                id="login-code"
                                class="login-input login-input--code"
                                type="text"
                                autocomplete="one-time-code"
                                maxlength="6"
                                prop:value=move || code.get()
                                on:input=move |ev| code.set(tidy_code(&event_target_value(&ev)))
                            />
                            <button class="login-button" type="submit" disabled=move || busy.get()>
                                "Open my dashboard"
                            </button>
                            <button class="login-link" type="button" on:click=start_over>
                                "Use a different email"
                            </button>
                        </form>
                    }
                    .into_any(),
                }}
                <Show when=move || !notice.get().is_empty()>
                    <p class="login-message">{move || notice.get()}</p>
                </Show>
                <Show when=move || dev_code.get().is_some()>
                    <p class="login-message login-message--code">
                        "Dev code: "
                        <span>{move || dev_code.get().unwrap_or_default()}</span>
                    </p>
                </Show>
            </div>
        </div>
    }
}
