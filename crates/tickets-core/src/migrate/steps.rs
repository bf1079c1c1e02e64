//! The built-in migration step catalog.
//!
//! Each transform receives the parsed document and moves its *shape* to the
//! next version; the runner stamps `version` and handles file I/O and
//! backups. Transforms are tolerant of sparse historical documents (absent
//! `tickets`, absent `nextId`): the oldest writers predate both guarantees.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use super::MigrationStep;
use crate::model::ticket_id;

/// All known version-to-version transforms.
#[must_use]
pub fn catalog() -> Vec<MigrationStep> {
    vec![
        MigrationStep {
            from: "0.1.0",
            to: "0.2.0",
            transform: rename_dependencies_to_blocked_by,
        },
        MigrationStep {
            from: "0.2.0",
            to: "0.3.0",
            transform: backfill_projects_and_next_id,
        },
    ]
}

/// `0.1.0` -> `0.2.0`: per-ticket `dependencies` becomes `blockedBy`.
fn rename_dependencies_to_blocked_by(doc: &mut Value) -> Result<()> {
    for ticket in tickets_mut(doc)?.values_mut() {
        let Some(fields) = ticket.as_object_mut() else {
            bail!("ticket entry is not an object");
        };
        if let Some(deps) = fields.remove("dependencies") {
            fields.insert("blockedBy".to_string(), deps);
        }
    }
    Ok(())
}

/// `0.2.0` -> `0.3.0`: every ticket carries `projects`, and `nextId` strictly
/// exceeds the highest minted id suffix.
fn backfill_projects_and_next_id(doc: &mut Value) -> Result<()> {
    let mut max_minted: u64 = 0;
    for (id, ticket) in tickets_mut(doc)? {
        let Some(fields) = ticket.as_object_mut() else {
            bail!("ticket entry is not an object");
        };
        fields
            .entry("projects")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Some(n) = ticket_id::id_number(id) {
            max_minted = max_minted.max(n);
        }
    }

    let floor = max_minted + 1;
    let stored = doc.get("nextId").and_then(Value::as_u64).unwrap_or(0);
    if stored < floor {
        doc["nextId"] = Value::from(floor);
    }
    Ok(())
}

/// The `tickets` map, created empty when the document predates it.
fn tickets_mut(doc: &mut Value) -> Result<&mut Map<String, Value>> {
    let root = doc
        .as_object_mut()
        .context("document root is not an object")?;
    root.entry("tickets")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .context("'tickets' is not an object")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
