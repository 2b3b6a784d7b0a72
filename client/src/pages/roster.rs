//! Athlete and opponent list pages with create and delete.

use leptos::prelude::*;

use crate::components::nav_bar::NavBar;
use crate::net::types::{NewRosterEntry, RosterEntry, RosterKind};
use crate::state::auth::AuthState;

const BELTS: [&str; 5] = ["white", "blue", "purple", "brown", "black"];

/// Blank form fields are left out of the create payload.
fn optional_field(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn entry_subtitle(entry: &RosterEntry) -> String {
    let mut parts = vec![format!("{} belt", entry.belt)];
    parts.extend(entry.weight_class.clone());
    parts.extend(entry.gym.clone());
    parts.extend(entry.style.clone());
    parts.join(" · ")
}

#[component]
pub fn AthletesPage() -> impl IntoView {
    view! { <RosterPage kind=RosterKind::Athlete/> }
}

#[component]
pub fn OpponentsPage() -> impl IntoView {
    view! { <RosterPage kind=RosterKind::Opponent/> }
}

#[component]
fn RosterPage(kind: RosterKind) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let entries = RwSignal::new(Vec::<RosterEntry>::new());
    let status = RwSignal::new(String::new());
    let reload = RwSignal::new(0_u32);

    let name = RwSignal::new(String::new());
    let belt = RwSignal::new("white".to_owned());
    let gym = RwSignal::new(String::new());
    let style = RwSignal::new(String::new());

    let report = move |err: String| {
        if crate::net::api::needs_login(&err) {
            auth.update(AuthState::signed_out);
        }
        status.set(err);
    };

    Effect::new(move || {
        reload.track();
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::list_roster(kind).await {
                Ok(list) => entries.set(list),
                Err(e) => report(e),
            }
        });
    });

    let on_create = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let entry = NewRosterEntry {
            name: name.get().trim().to_owned(),
            belt: optional_field(&belt.get()),
            gym: optional_field(&gym.get()),
            style: optional_field(&style.get()),
            ..Default::default()
        };
        if entry.name.is_empty() {
            status.set("Name is required.".to_owned());
            return;
        }

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::create_roster_entry(kind, &entry).await {
                Ok(_) => {
                    name.set(String::new());
                    gym.set(String::new());
                    style.set(String::new());
                    status.set(String::new());
                    reload.update(|n| *n += 1);
                }
                Err(e) => report(e),
            }
        });
    };

    let on_delete = move |id: String| {
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::delete_roster_entry(kind, &id).await {
                Ok(()) => reload.update(|n| *n += 1),
                Err(e) => report(e),
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (id, report);
    };

    view! {
        <NavBar/>
        <main class="roster">
            <h1>{kind.title()}</h1>
            <form class="roster__form" on:submit=on_create>
                <input
                    placeholder="Name"
                    prop:value=move || name.get()
                    on:input=move |ev| name.set(event_target_value(&ev))
                />
                <select on:change=move |ev| belt.set(event_target_value(&ev))>
                    {BELTS
                        .into_iter()
                        .map(|b| view! { <option value=b selected=move || belt.get() == b>{b}</option> })
                        .collect_view()}
                </select>
                <input
                    placeholder="Gym"
                    prop:value=move || gym.get()
                    on:input=move |ev| gym.set(event_target_value(&ev))
                />
                <input
                    placeholder="Style"
                    prop:value=move || style.get()
                    on:input=move |ev| style.set(event_target_value(&ev))
                />
                <button type="submit">{format!("Add {}", kind.label())}</button>
            </form>
            <Show when=move || !status.get().is_empty()>
                <p class="roster__status">{move || status.get()}</p>
            </Show>
            <ul class="roster__list">
                <For each=move || entries.get() key=|entry| entry.id.clone() let:entry>
                    {
                        let id = entry.id.clone();
                        view! {
                            <li class="roster__item">
                                <strong>{entry.name.clone()}</strong>
                                <span class="roster__meta">{entry_subtitle(&entry)}</span>
                                <button on:click=move |_| on_delete(id.clone())>"Delete"</button>
                            </li>
                        }
                    }
                </For>
            </ul>
        </main>
    }
}

#[cfg(test)]
#[path = "roster_test.rs"]
mod roster_test;
