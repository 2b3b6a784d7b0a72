//! Stored game-plan analyses.
//!
//! Analyses are produced by an external AI provider and stored through the
//! API; this page lists and deletes them.

use std::collections::HashMap;

use leptos::prelude::*;

use crate::components::nav_bar::NavBar;
use crate::net::types::{Analysis, RosterEntry};
use crate::state::auth::AuthState;

/// `id -> name` lookup for labelling analyses.
fn name_index(entries: &[RosterEntry]) -> HashMap<String, String> {
    entries.iter().map(|e| (e.id.clone(), e.name.clone())).collect()
}

fn matchup_label(analysis: &Analysis, athletes: &HashMap<String, String>, opponents: &HashMap<String, String>) -> String {
    let athlete = athletes.get(&analysis.athlete_id).map_or("unknown athlete", String::as_str);
    let opponent = opponents.get(&analysis.opponent_id).map_or("unknown opponent", String::as_str);
    format!("{athlete} vs {opponent}")
}

#[component]
pub fn AnalysesPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let analyses = RwSignal::new(Vec::<Analysis>::new());
    let athletes = RwSignal::new(HashMap::<String, String>::new());
    let opponents = RwSignal::new(HashMap::<String, String>::new());
    let status = RwSignal::new(String::new());
    let reload = RwSignal::new(0_u32);

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
            use crate::net::api;
            use crate::net::types::RosterKind;

            match api::list_analyses().await {
                Ok(list) => analyses.set(list),
                Err(e) => return report(e),
            }
            if let Ok(list) = api::list_roster(RosterKind::Athlete).await {
                athletes.set(name_index(&list));
            }
            if let Ok(list) = api::list_roster(RosterKind::Opponent).await {
                opponents.set(name_index(&list));
            }
        });
    });

    let on_delete = move |id: String| {
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::delete_analysis(&id).await {
                Ok(()) => reload.update(|n| *n += 1),
                Err(e) => report(e),
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (id, report);
    };

    view! {
        <NavBar/>
        <main class="analyses">
            <h1>"Analyses"</h1>
            <Show when=move || !status.get().is_empty()>
                <p class="analyses__status">{move || status.get()}</p>
            </Show>
            <Show when=move || analyses.with(Vec::is_empty)>
                <p class="analyses__empty">"No analyses yet."</p>
            </Show>
            <For each=move || analyses.get() key=|a| a.id.clone() let:analysis>
                {
                    let id = analysis.id.clone();
                    let summary = analysis.summary.clone();
                    let meta = match &analysis.model {
                        Some(model) => format!("{} · {model}", analysis.created_at),
                        None => analysis.created_at.clone(),
                    };
                    let label = move || {
                        athletes.with(|ath| opponents.with(|opp| matchup_label(&analysis, ath, opp)))
                    };
                    view! {
                        <article class="analysis-card">
                            <h2>{label}</h2>
                            <p class="analysis-card__summary">{summary}</p>
                            <p class="analysis-card__meta">{meta}</p>
                            <button on:click=move |_| on_delete(id.clone())>"Delete"</button>
                        </article>
                    }
                }
            </For>
        </main>
    }
}

#[cfg(test)]
#[path = "analyses_test.rs"]
mod analyses_test;
