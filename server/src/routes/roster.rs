//! Athlete and opponent REST handlers.
//!
//! Both rosters share handlers; the route table binds each one to a
//! `RosterKind` through a thin wrapper so the kind never comes from the client.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use super::auth::AuthUser;
use super::{ApiError, api_error};
use crate::services::roster::{self, NewRosterEntry, RosterEntry, RosterError, RosterKind, RosterPatch};
use crate::state::AppState;

pub(crate) fn roster_error_to_api(kind: RosterKind, err: &RosterError) -> ApiError {
    match err {
        RosterError::NotFound(_) => api_error(StatusCode::NOT_FOUND, format!("{} not found", kind.label())),
        RosterError::Invalid(msg) => api_error(StatusCode::BAD_REQUEST, msg.clone()),
        RosterError::Database(e) => {
            tracing::error!(error = %e, kind = kind.label(), "roster query failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

async fn list(state: &AppState, kind: RosterKind, auth: &AuthUser) -> Result<Json<Vec<RosterEntry>>, ApiError> {
    roster::list_entries(&state.pool, kind, auth.user.id)
        .await
        .map(Json)
        .map_err(|e| roster_error_to_api(kind, &e))
}

async fn read(state: &AppState, kind: RosterKind, auth: &AuthUser, id: Uuid) -> Result<Json<RosterEntry>, ApiError> {
    roster::get_entry(&state.pool, kind, auth.user.id, id)
        .await
        .map(Json)
        .map_err(|e| roster_error_to_api(kind, &e))
}

async fn create(
    state: &AppState,
    kind: RosterKind,
    auth: &AuthUser,
    input: NewRosterEntry,
) -> Result<(StatusCode, Json<RosterEntry>), ApiError> {
    let valid = input.validate().map_err(|e| roster_error_to_api(kind, &e))?;
    let entry = roster::create_entry(&state.pool, kind, auth.user.id, valid)
        .await
        .map_err(|e| roster_error_to_api(kind, &e))?;
    tracing::info!(kind = kind.label(), id = %entry.id, owner = %auth.user.id, "roster entry created");
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update(
    state: &AppState,
    kind: RosterKind,
    auth: &AuthUser,
    id: Uuid,
    patch: RosterPatch,
) -> Result<Json<RosterEntry>, ApiError> {
    roster::update_entry(&state.pool, kind, auth.user.id, id, patch)
        .await
        .map(Json)
        .map_err(|e| roster_error_to_api(kind, &e))
}

async fn delete(state: &AppState, kind: RosterKind, auth: &AuthUser, id: Uuid) -> Result<StatusCode, ApiError> {
    roster::delete_entry(&state.pool, kind, auth.user.id, id)
        .await
        .map_err(|e| roster_error_to_api(kind, &e))?;
    tracing::info!(kind = kind.label(), %id, owner = %auth.user.id, "roster entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ATHLETES
// =============================================================================

/// `GET /api/athletes`
pub async fn list_athletes(auth: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<RosterEntry>>, ApiError> {
    list(&state, RosterKind::Athlete, &auth).await
}

/// `POST /api/athletes`
pub async fn create_athlete(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewRosterEntry>,
) -> Result<(StatusCode, Json<RosterEntry>), ApiError> {
    create(&state, RosterKind::Athlete, &auth, input).await
}

/// `GET /api/athletes/{id}`
pub async fn get_athlete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RosterEntry>, ApiError> {
    read(&state, RosterKind::Athlete, &auth, id).await
}

/// `PATCH /api/athletes/{id}`
pub async fn update_athlete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<RosterPatch>,
) -> Result<Json<RosterEntry>, ApiError> {
    update(&state, RosterKind::Athlete, &auth, id, patch).await
}

/// `DELETE /api/athletes/{id}`
pub async fn delete_athlete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete(&state, RosterKind::Athlete, &auth, id).await
}

// =============================================================================
// OPPONENTS
// =============================================================================

/// `GET /api/opponents`
pub async fn list_opponents(auth: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<RosterEntry>>, ApiError> {
    list(&state, RosterKind::Opponent, &auth).await
}

/// `POST /api/opponents`
pub async fn create_opponent(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewRosterEntry>,
) -> Result<(StatusCode, Json<RosterEntry>), ApiError> {
    create(&state, RosterKind::Opponent, &auth, input).await
}

/// `GET /api/opponents/{id}`
pub async fn get_opponent(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RosterEntry>, ApiError> {
    read(&state, RosterKind::Opponent, &auth, id).await
}

/// `PATCH /api/opponents/{id}`
pub async fn update_opponent(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<RosterPatch>,
) -> Result<Json<RosterEntry>, ApiError> {
    update(&state, RosterKind::Opponent, &auth, id, patch).await
}

/// `DELETE /api/opponents/{id}`
pub async fn delete_opponent(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete(&state, RosterKind::Opponent, &auth, id).await
}

#[cfg(test)]
#[path = "roster_test.rs"]
mod tests;
