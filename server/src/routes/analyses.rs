//! Analysis REST handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use super::auth::AuthUser;
use super::{ApiError, api_error};
use crate::services::analysis::{self, Analysis, AnalysisError, AnalysisFilter, NewAnalysis};
use crate::state::AppState;

pub(crate) fn analysis_error_to_api(err: &AnalysisError) -> ApiError {
    match err {
        AnalysisError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "analysis not found"),
        AnalysisError::Invalid(msg) => api_error(StatusCode::BAD_REQUEST, msg.clone()),
        AnalysisError::Database(e) => {
            tracing::error!(error = %e, "analysis query failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

/// `GET /api/analyses?athlete_id=&opponent_id=`
pub async fn list_analyses(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<AnalysisFilter>,
) -> Result<Json<Vec<Analysis>>, ApiError> {
    analysis::list_analyses(&state.pool, auth.user.id, filter)
        .await
        .map(Json)
        .map_err(|e| analysis_error_to_api(&e))
}

/// `POST /api/analyses`
pub async fn create_analysis(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewAnalysis>,
) -> Result<(StatusCode, Json<Analysis>), ApiError> {
    let created = analysis::create_analysis(&state.pool, auth.user.id, input)
        .await
        .map_err(|e| analysis_error_to_api(&e))?;
    tracing::info!(id = %created.id, owner = %auth.user.id, "analysis stored");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/analyses/{id}`
pub async fn get_analysis(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Analysis>, ApiError> {
    analysis::get_analysis(&state.pool, auth.user.id, id)
        .await
        .map(Json)
        .map_err(|e| analysis_error_to_api(&e))
}

/// `DELETE /api/analyses/{id}`
pub async fn delete_analysis(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    analysis::delete_analysis(&state.pool, auth.user.id, id)
        .await
        .map_err(|e| analysis_error_to_api(&e))?;
    Ok(StatusCode::NO_CONTENT)
}
