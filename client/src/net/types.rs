//! Wire DTOs for the JSON API.
//!
//! DESIGN
//! ======
//! Ids and timestamps stay strings on the client; the server owns their
//! formats and the UI only displays or echoes them back.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// The signed-in user as returned by `/api/auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of a successful `/api/auth/email/verify-code` call.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Which roster a page or request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RosterKind {
    Athlete,
    Opponent,
}

impl RosterKind {
    #[must_use]
    pub fn collection_path(self) -> &'static str {
        match self {
            Self::Athlete => "/api/athletes",
            Self::Opponent => "/api/opponents",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Athlete => "Athletes",
            Self::Opponent => "Opponents",
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

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    pub belt: String,
    pub weight_class: Option<String>,
    pub gym: Option<String>,
    pub style: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create payload; unset optionals are omitted from the JSON body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NewRosterEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub belt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gym: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Analysis {
    pub id: String,
    pub athlete_id: String,
    pub opponent_id: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub strategy: serde_json::Value,
    pub model: Option<String>,
    pub created_at: String,
}
