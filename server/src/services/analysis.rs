//! Stored tactical analyses.
//!
//! SYSTEM CONTEXT
//! ==============
//! An analysis pairs one of the owner's athletes with one of their scouted
//! opponents. Its summary and strategy payload come from an external
//! generative-AI provider; this service only validates references and stores
//! what it is given.

use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use super::roster::{self, RosterKind};

const MAX_TITLE_LEN: usize = 200;
const MAX_SUMMARY_LEN: usize = 20_000;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis not found: {0}")]
    NotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<roster::RosterError> for AnalysisError {
    fn from(err: roster::RosterError) -> Self {
        match err {
            roster::RosterError::NotFound(id) => Self::Invalid(format!("unknown reference {id}")),
            roster::RosterError::Invalid(msg) => Self::Invalid(msg),
            roster::RosterError::Database(e) => Self::Database(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Analysis {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub athlete_id: Uuid,
    pub opponent_id: Uuid,
    pub title: String,
    pub summary: String,
    /// Structured game plan as returned by the AI provider.
    pub strategy: serde_json::Value,
    /// Model identifier that produced the analysis, if reported.
    pub model: Option<String>,
    pub created_at: String,
}

type AnalysisRow = (Uuid, Uuid, Uuid, Uuid, String, String, serde_json::Value, Option<String>, String);

fn analysis_from_row(row: AnalysisRow) -> Analysis {
    let (id, owner_id, athlete_id, opponent_id, title, summary, strategy, model, created_at) = row;
    Analysis { id, owner_id, athlete_id, opponent_id, title, summary, strategy, model, created_at }
}

const SELECT_COLUMNS: &str = "id, owner_id, athlete_id, opponent_id, title, summary, strategy, model,
     to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS created_at";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewAnalysis {
    pub athlete_id: Uuid,
    pub opponent_id: Uuid,
    pub title: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub strategy: serde_json::Value,
    pub model: Option<String>,
}

/// Optional list filters.
#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct AnalysisFilter {
    pub athlete_id: Option<Uuid>,
    pub opponent_id: Option<Uuid>,
}

impl NewAnalysis {
    /// Normalize title/summary/strategy.
    ///
    /// A missing title becomes "Game plan"; a null strategy becomes `{}`.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a blank or oversized summary, an oversized title,
    /// or a strategy that is neither an object nor an array.
    pub fn normalized(mut self) -> Result<Self, AnalysisError> {
        let title = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty()).unwrap_or("Game plan");
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(AnalysisError::Invalid(format!("title exceeds {MAX_TITLE_LEN} characters")));
        }
        self.title = Some(title.to_owned());

        let summary = self.summary.trim();
        if summary.is_empty() {
            return Err(AnalysisError::Invalid("summary is required".into()));
        }
        if summary.chars().count() > MAX_SUMMARY_LEN {
            return Err(AnalysisError::Invalid(format!("summary exceeds {MAX_SUMMARY_LEN} characters")));
        }
        self.summary = summary.to_owned();

        if self.strategy.is_null() {
            self.strategy = serde_json::json!({});
        } else if !self.strategy.is_object() && !self.strategy.is_array() {
            return Err(AnalysisError::Invalid("strategy must be an object or array".into()));
        }

        self.model = self.model.map(|m| m.trim().to_owned()).filter(|m| !m.is_empty());
        Ok(self)
    }
}

/// List the owner's analyses, newest first, optionally filtered.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_analyses(pool: &PgPool, owner_id: Uuid, filter: AnalysisFilter) -> Result<Vec<Analysis>, AnalysisError> {
    let mut builder = QueryBuilder::new(format!("SELECT {SELECT_COLUMNS} FROM analyses WHERE owner_id = "));
    builder.push_bind(owner_id);
    if let Some(athlete_id) = filter.athlete_id {
        builder.push(" AND athlete_id = ").push_bind(athlete_id);
    }
    if let Some(opponent_id) = filter.opponent_id {
        builder.push(" AND opponent_id = ").push_bind(opponent_id);
    }
    builder.push(" ORDER BY created_at DESC");

    let rows = builder.build_query_as::<AnalysisRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(analysis_from_row).collect())
}

/// Fetch one analysis.
///
/// # Errors
///
/// Returns `NotFound` when missing or owned by someone else.
pub async fn get_analysis(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<Analysis, AnalysisError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM analyses WHERE id = $1 AND owner_id = $2");
    let row = sqlx::query_as::<_, AnalysisRow>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AnalysisError::NotFound(id))?;
    Ok(analysis_from_row(row))
}

/// Store a new analysis after checking both references belong to the owner.
///
/// # Errors
///
/// Returns `Invalid` for bad input or foreign references.
pub async fn create_analysis(pool: &PgPool, owner_id: Uuid, input: NewAnalysis) -> Result<Analysis, AnalysisError> {
    let input = input.normalized()?;

    if !roster::owns_entry(pool, RosterKind::Athlete, owner_id, input.athlete_id).await? {
        return Err(AnalysisError::Invalid(format!("unknown athlete {}", input.athlete_id)));
    }
    if !roster::owns_entry(pool, RosterKind::Opponent, owner_id, input.opponent_id).await? {
        return Err(AnalysisError::Invalid(format!("unknown opponent {}", input.opponent_id)));
    }

    let sql = format!(
        "INSERT INTO analyses (id, owner_id, athlete_id, opponent_id, title, summary, strategy, model)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, AnalysisRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(input.athlete_id)
        .bind(input.opponent_id)
        .bind(input.title.unwrap_or_default())
        .bind(input.summary)
        .bind(input.strategy)
        .bind(input.model)
        .fetch_one(pool)
        .await?;
    Ok(analysis_from_row(row))
}

/// Delete an analysis.
///
/// # Errors
///
/// Returns `NotFound` when nothing was deleted.
pub async fn delete_analysis(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<(), AnalysisError> {
    let result = sqlx::query("DELETE FROM analyses WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AnalysisError::NotFound(id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
