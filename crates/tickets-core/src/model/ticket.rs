use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use crate::model::ticket_id;

/// The three lifecycle states of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in-progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            other => Err(ParseStatusError {
                got: other.to_string(),
            }),
        }
    }
}

/// Error returned when parsing a [`Status`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    pub got: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid status '{}' (expected open, in-progress, or closed)",
            self.got
        )
    }
}

impl std::error::Error for ParseStatusError {}

/// A single work item.
///
/// `blockedBy` holds the ids of tickets that must be `closed` before this
/// one is considered ready. Both timestamps are RFC 3339 on disk; `updatedAt`
/// refreshes on every applied mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub blocked_by: Vec<String>,
    #[serde(default)]
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Case-insensitive membership test against `projects`.
    #[must_use]
    pub fn in_project(&self, name: &str) -> bool {
        self.projects.iter().any(|p| p.eq_ignore_ascii_case(name))
    }
}

/// Collapse case-insensitive duplicates in a project list, first wins.
#[must_use]
pub fn normalize_projects(projects: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for p in projects {
        let folded = p.to_ascii_lowercase();
        if !seen.contains(&folded) {
            seen.push(folded);
            out.push(p);
        }
    }
    out
}

/// The persisted container: one JSON document holding every ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Schema version of this document. Always the current version once the
    /// document has passed migration; historical formats may omit it on disk.
    pub version: String,
    pub tickets: BTreeMap<String, Ticket>,
    /// Monotonic counter minting the next id suffix. Never decreases, even
    /// across deletions.
    pub next_id: u64,
}

impl Document {
    /// An empty document at the current schema version (first-run state).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: crate::migrate::CURRENT_VERSION.to_string(),
            tickets: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// The stored `blockedBy` edges for `id`, or none for unknown ids.
    #[must_use]
    pub fn blocked_by(&self, id: &str) -> &[String] {
        self.tickets
            .get(id)
            .map_or(&[], |ticket| ticket.blocked_by.as_slice())
    }

    /// The highest numeric suffix among currently minted ids, if any id
    /// matches the expected shape.
    #[must_use]
    pub fn max_id_number(&self) -> Option<u64> {
        self.tickets.keys().filter_map(|id| ticket_id::id_number(id)).max()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
