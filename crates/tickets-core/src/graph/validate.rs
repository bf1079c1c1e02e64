//! Existence and self-reference validation for `blockedBy` edge sets.
//!
//! These checks run against an in-memory document snapshot, strictly before
//! any write: callers never observe a half-applied graph.

use crate::error::{Result, TicketError};
use crate::model::Document;

/// Validate a candidate `blockedBy` edge set against a document snapshot.
///
/// For each id, in order: a self-reference check against `exclude_id` (the
/// ticket being created or updated), then an existence check against the
/// document's ticket map. The first failing id aborts the whole validation.
pub fn validate_exist(ids: &[String], doc: &Document, exclude_id: Option<&str>) -> Result<()> {
    for id in ids {
        if Some(id.as_str()) == exclude_id {
            return Err(TicketError::SelfDependency { id: id.clone() });
        }
        if !doc.tickets.contains_key(id) {
            return Err(TicketError::MissingDependency { id: id.clone() });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
