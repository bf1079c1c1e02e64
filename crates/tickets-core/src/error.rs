//! Error taxonomy for the tickets core.
//!
//! Every failure a caller can observe is a [`TicketError`] variant, and every
//! variant maps to a stable machine-readable [`ErrorCode`]. Validation and
//! not-found errors are recoverable at the service boundary; store errors
//! fail the enclosing operation; migration errors are fatal at startup.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// TicketError
// ---------------------------------------------------------------------------

/// All errors surfaced by the core library.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Malformed input to a mutating operation (missing required field, ...).
    #[error("{0}")]
    Validation(String),

    /// A ticket listed itself in its own `blockedBy`.
    #[error("ticket '{id}' cannot be blocked by itself")]
    SelfDependency { id: String },

    /// A `blockedBy` entry does not name an existing ticket.
    #[error("blocked-by target '{id}' does not exist")]
    MissingDependency { id: String },

    /// The referenced ticket id does not exist.
    #[error("ticket '{id}' not found")]
    NotFound { id: String },

    /// The candidate edge set would close a dependency cycle.
    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    /// The ticket file exists but could not be read.
    #[error("failed to read ticket file '{}': {source}", .path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ticket file could not be written.
    #[error("failed to write ticket file '{}': {source}", .path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ticket file is not a valid JSON document.
    #[error("ticket file '{}' is not valid JSON: {source}", .path.display())]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No catalog path connects the detected version to the current one.
    #[error("no migration path from version {from} to {to}")]
    MigrationPathNotFound { from: String, to: String },

    /// A migration transform failed. The document may be mid-migration.
    #[error("migration step {from} -> {to} failed: {source}")]
    MigrationStep {
        from: String,
        to: String,
        #[source]
        source: anyhow::Error,
    },
}

impl TicketError {
    /// The stable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::InvalidInput,
            Self::SelfDependency { .. } => ErrorCode::SelfDependency,
            Self::MissingDependency { .. } => ErrorCode::MissingDependency,
            Self::NotFound { .. } => ErrorCode::TicketNotFound,
            Self::CircularDependency { .. } => ErrorCode::CycleDetected,
            Self::StoreRead { .. } => ErrorCode::StoreReadFailed,
            Self::StoreWrite { .. } => ErrorCode::StoreWriteFailed,
            Self::StoreCorrupt { .. } => ErrorCode::StoreCorrupt,
            Self::MigrationPathNotFound { .. } => ErrorCode::MigrationPathMissing,
            Self::MigrationStep { .. } => ErrorCode::MigrationStepFailed,
        }
    }

    /// Remediation hint for this error, when one exists.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        self.error_code().hint()
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = TicketError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Stable machine-readable codes, one per failure the caller can observe.
///
/// Codes are banded: `E2xxx` for request validation, `E3xxx` for store
/// failures, `E4xxx` for migration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidInput,
    TicketNotFound,
    SelfDependency,
    MissingDependency,
    CycleDetected,
    StoreReadFailed,
    StoreCorrupt,
    StoreWriteFailed,
    MigrationPathMissing,
    MigrationStepFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "E2001",
            Self::TicketNotFound => "E2002",
            Self::SelfDependency => "E2003",
            Self::MissingDependency => "E2004",
            Self::CycleDetected => "E2005",
            Self::StoreReadFailed => "E3001",
            Self::StoreCorrupt => "E3002",
            Self::StoreWriteFailed => "E3003",
            Self::MigrationPathMissing => "E4001",
            Self::MigrationStepFailed => "E4002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::TicketNotFound => "Ticket not found",
            Self::SelfDependency => "Ticket cannot block itself",
            Self::MissingDependency => "Blocked-by target does not exist",
            Self::CycleDetected => "Dependency cycle would be created",
            Self::StoreReadFailed => "Ticket file read failed",
            Self::StoreCorrupt => "Ticket file is not valid JSON",
            Self::StoreWriteFailed => "Ticket file write failed",
            Self::MigrationPathMissing => "No migration path to current version",
            Self::MigrationStepFailed => "Migration step failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidInput => Some("Provide a non-empty title and description."),
            Self::TicketNotFound => Some("Run `tk list` to see known ticket ids."),
            Self::SelfDependency => Some("Remove the ticket's own id from --blocked-by."),
            Self::MissingDependency => {
                Some("Create the dependency first, or fix the id in --blocked-by.")
            }
            Self::CycleDetected => {
                Some("Remove or reverse one of the blocked-by links in the reported cycle.")
            }
            Self::StoreReadFailed => Some("Check the file path and read permissions."),
            Self::StoreCorrupt => {
                Some("Restore the file from a .bak backup or fix the JSON by hand.")
            }
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::MigrationPathMissing => {
                Some("The file was written by an unknown release. Upgrade `tk` or restore a backup.")
            }
            Self::MigrationStepFailed => {
                Some("Restore the version-suffixed .bak file written before the failing step.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
