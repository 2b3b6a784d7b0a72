//! Athlete and opponent roster service.
//!
//! DESIGN
//! ======
//! Athletes (the coach's own people) and opponents (scouted competitors)
//! share one shape and live in two tables with identical columns. Every query
//! is scoped by `owner_id`, so a row owned by someone else is indistinguishable
//! from a missing row.

use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Which roster table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterKind {
    Athlete,
    Opponent,
}

impl RosterKind {
    fn table(self) -> &'static str {
        match self {
            Self::Athlete => "athletes",
            Self::Opponent => "opponents",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Athlete => "athlete",
            Self::Opponent => "opponent",
        }
    }
}

pub const BELTS: [&str; 5] = ["white", "blue", "purple", "brown", "black"];

const MAX_NAME_LEN: usize = 120;
const MAX_NOTES_LEN: usize = 4000;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("{0} not found")]
    NotFound(Uuid),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RosterEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub belt: String,
    pub weight_class: Option<String>,
    pub gym: Option<String>,
    /// Preferred game, e.g. "guard player" or "wrestler".
    pub style: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

type RosterRow = (
    Uuid,
    Uuid,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    String,
);

fn entry_from_row(row: RosterRow) -> RosterEntry {
    let (id, owner_id, name, belt, weight_class, gym, style, notes, created_at, updated_at) = row;
    RosterEntry { id, owner_id, name, belt, weight_class, gym, style, notes, created_at, updated_at }
}

const SELECT_COLUMNS: &str = "id, owner_id, name, belt, weight_class, gym, style, notes,
     to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS created_at,
     to_char(updated_at AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS updated_at";

/// Fields accepted when creating an entry.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct NewRosterEntry {
    pub name: String,
    pub belt: Option<String>,
    pub weight_class: Option<String>,
    pub gym: Option<String>,
    pub style: Option<String>,
    pub notes: Option<String>,
}

/// Fields accepted when patching an entry. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RosterPatch {
    pub name: Option<String>,
    pub belt: Option<String>,
    pub weight_class: Option<String>,
    pub gym: Option<String>,
    pub style: Option<String>,
    pub notes: Option<String>,
}

impl RosterPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.belt.is_none()
            && self.weight_class.is_none()
            && self.gym.is_none()
            && self.style.is_none()
            && self.notes.is_none()
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trim and bound a display name.
///
/// # Errors
///
/// Returns `Invalid` when the name is blank or too long.
pub fn validate_name(raw: &str) -> Result<String, RosterError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RosterError::Invalid("name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RosterError::Invalid(format!("name exceeds {MAX_NAME_LEN} characters")));
    }
    Ok(name.to_owned())
}

/// Normalize a belt rank to one of [`BELTS`].
///
/// # Errors
///
/// Returns `Invalid` for unknown ranks.
pub fn normalize_belt(raw: &str) -> Result<String, RosterError> {
    let belt = raw.trim().to_ascii_lowercase();
    if BELTS.contains(&belt.as_str()) {
        Ok(belt)
    } else {
        Err(RosterError::Invalid(format!("belt must be one of {}", BELTS.join(", "))))
    }
}

/// Blank optional text collapses to `None`.
fn clean_optional(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn validate_notes(notes: Option<String>) -> Result<Option<String>, RosterError> {
    let notes = clean_optional(notes);
    if notes.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTES_LEN) {
        return Err(RosterError::Invalid(format!("notes exceed {MAX_NOTES_LEN} characters")));
    }
    Ok(notes)
}

/// Validated insert payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEntry {
    pub name: String,
    pub belt: String,
    pub weight_class: Option<String>,
    pub gym: Option<String>,
    pub style: Option<String>,
    pub notes: Option<String>,
}

impl NewRosterEntry {
    /// Validate and normalize. A missing belt defaults to white.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` describing the first offending field.
    pub fn validate(self) -> Result<ValidEntry, RosterError> {
        Ok(ValidEntry {
            name: validate_name(&self.name)?,
            belt: normalize_belt(self.belt.as_deref().unwrap_or("white"))?,
            weight_class: clean_optional(self.weight_class),
            gym: clean_optional(self.gym),
            style: clean_optional(self.style),
            notes: validate_notes(self.notes)?,
        })
    }
}

// =============================================================================
// CRUD
// =============================================================================

/// List the owner's entries, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_entries(pool: &PgPool, kind: RosterKind, owner_id: Uuid) -> Result<Vec<RosterEntry>, RosterError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM {} WHERE owner_id = $1 ORDER BY created_at DESC",
        kind.table()
    );
    let rows = sqlx::query_as::<_, RosterRow>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(entry_from_row).collect())
}

/// Fetch one entry.
///
/// # Errors
///
/// Returns `NotFound` when the row is missing or owned by someone else.
pub async fn get_entry(pool: &PgPool, kind: RosterKind, owner_id: Uuid, id: Uuid) -> Result<RosterEntry, RosterError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM {} WHERE id = $1 AND owner_id = $2", kind.table());
    let row = sqlx::query_as::<_, RosterRow>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(RosterError::NotFound(id))?;
    Ok(entry_from_row(row))
}

/// Insert a validated entry.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn create_entry(
    pool: &PgPool,
    kind: RosterKind,
    owner_id: Uuid,
    entry: ValidEntry,
) -> Result<RosterEntry, RosterError> {
    let sql = format!(
        "INSERT INTO {} (id, owner_id, name, belt, weight_class, gym, style, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {SELECT_COLUMNS}",
        kind.table()
    );
    let row = sqlx::query_as::<_, RosterRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(entry.name)
        .bind(entry.belt)
        .bind(entry.weight_class)
        .bind(entry.gym)
        .bind(entry.style)
        .bind(entry.notes)
        .fetch_one(pool)
        .await?;
    Ok(entry_from_row(row))
}

/// Apply a partial update. Empty optional strings clear the column.
///
/// # Errors
///
/// Returns `Invalid` for bad field values and `NotFound` for foreign rows.
pub async fn update_entry(
    pool: &PgPool,
    kind: RosterKind,
    owner_id: Uuid,
    id: Uuid,
    patch: RosterPatch,
) -> Result<RosterEntry, RosterError> {
    if patch.is_empty() {
        return get_entry(pool, kind, owner_id, id).await;
    }

    let name = patch.name.as_deref().map(validate_name).transpose()?;
    let belt = patch.belt.as_deref().map(normalize_belt).transpose()?;
    let notes = match patch.notes {
        Some(raw) => Some(validate_notes(Some(raw))?),
        None => None,
    };

    let mut builder = QueryBuilder::new(format!("UPDATE {} SET updated_at = now()", kind.table()));
    if let Some(name) = name {
        builder.push(", name = ").push_bind(name);
    }
    if let Some(belt) = belt {
        builder.push(", belt = ").push_bind(belt);
    }
    if let Some(raw) = patch.weight_class {
        builder.push(", weight_class = ").push_bind(clean_optional(Some(raw)));
    }
    if let Some(raw) = patch.gym {
        builder.push(", gym = ").push_bind(clean_optional(Some(raw)));
    }
    if let Some(raw) = patch.style {
        builder.push(", style = ").push_bind(clean_optional(Some(raw)));
    }
    if let Some(notes) = notes {
        builder.push(", notes = ").push_bind(notes);
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" AND owner_id = ").push_bind(owner_id);
    builder.push(format!(" RETURNING {SELECT_COLUMNS}"));

    let row = builder
        .build_query_as::<RosterRow>()
        .fetch_optional(pool)
        .await?
        .ok_or(RosterError::NotFound(id))?;
    Ok(entry_from_row(row))
}

/// Delete an entry. Analyses referencing it are removed by cascade.
///
/// # Errors
///
/// Returns `NotFound` when nothing was deleted.
pub async fn delete_entry(pool: &PgPool, kind: RosterKind, owner_id: Uuid, id: Uuid) -> Result<(), RosterError> {
    let sql = format!("DELETE FROM {} WHERE id = $1 AND owner_id = $2", kind.table());
    let result = sqlx::query(&sql).bind(id).bind(owner_id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(RosterError::NotFound(id));
    }
    Ok(())
}

/// Whether `id` exists in the owner's roster of `kind`.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn owns_entry(pool: &PgPool, kind: RosterKind, owner_id: Uuid, id: Uuid) -> Result<bool, RosterError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND owner_id = $2)", kind.table());
    let exists: bool = sqlx::query_scalar(&sql).bind(id).bind(owner_id).fetch_one(pool).await?;
    Ok(exists)
}

#[cfg(test)]
#[path = "roster_test.rs"]
mod tests;
