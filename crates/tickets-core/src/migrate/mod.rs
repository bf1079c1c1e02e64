//! Versioned on-disk format migration.
//!
//! # Overview
//!
//! The ticket document has evolved through three on-disk formats:
//!
//! - `0.1.0`, the oldest: per-ticket `dependencies` array, no `version` stamp,
//!   `nextId` possibly absent.
//! - `0.2.0`: `dependencies` renamed to `blockedBy`.
//! - `0.3.0`, current: explicit `version` stamp, `projects` present on every
//!   ticket, `nextId` guaranteed consistent with the minted ids.
//!
//! # Design
//!
//! The catalog is an explicit list of version-to-version transform steps
//! built at startup (not discovered from files); steps compose into a
//! directed graph over version strings and the runner takes the BFS-shortest
//! path from the detected version to [`CURRENT_VERSION`]. Each executed step
//! first copies the document to a backup suffixed with the step's source
//! version, then rewrites the original in place, re-stamped with the target
//! version. There is no retry and no multi-step rollback: a failing step is
//! fatal and the backup of its input is the recovery point.
//!
//! Migration runs once, synchronously, before the ticket service accepts any
//! operation. A document already at the current version is untouched (no
//! write, no backup); a missing or empty file is not a migration subject.

pub mod steps;

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Result, TicketError};
use crate::graph::has_cycle;
use crate::model::Document;

/// The schema version this build reads and writes.
pub const CURRENT_VERSION: &str = "0.3.0";

/// The oldest format this build knows how to migrate from, and the default
/// when structural sniffing recognizes nothing.
pub const OLDEST_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One declared version-to-version transform.
#[derive(Debug)]
pub struct MigrationStep {
    pub from: &'static str,
    pub to: &'static str,
    /// Transform the parsed document toward `to`. The runner owns file I/O,
    /// backups, and the `version` stamp.
    pub transform: fn(&mut Value) -> anyhow::Result<()>,
}

/// Outcome of a migration check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No document on disk; nothing to migrate.
    NoDocument,
    /// The document was already at [`CURRENT_VERSION`]; no write occurred.
    AlreadyCurrent,
    /// The document was migrated through `steps` transforms.
    Migrated { from: String, steps: usize },
}

/// The migration engine: catalog, detection, path search, execution.
pub struct MigrationManager {
    steps: Vec<MigrationStep>,
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationManager {
    /// Build the manager with the built-in step catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: steps::catalog(),
        }
    }

    /// Detect the schema version of a parsed document.
    ///
    /// Priority order: an explicit `version` field is trusted verbatim; else
    /// the first ticket is sniffed structurally (`dependencies` implies the
    /// oldest format, `blockedBy` the format that introduced it); else the
    /// oldest version. Zero-ticket unversioned documents are inherently
    /// ambiguous and land on the oldest version, where every later step is a
    /// no-op over an empty ticket map.
    #[must_use]
    pub fn detect_version(doc: &Value) -> String {
        if let Some(version) = doc.get("version").and_then(Value::as_str) {
            return version.to_string();
        }

        let first_ticket = doc
            .get("tickets")
            .and_then(Value::as_object)
            .and_then(|tickets| tickets.values().next());
        if let Some(ticket) = first_ticket {
            if ticket.get("dependencies").is_some_and(Value::is_array) {
                return OLDEST_VERSION.to_string();
            }
            if ticket.get("blockedBy").is_some() {
                return "0.2.0".to_string();
            }
        }

        OLDEST_VERSION.to_string()
    }

    /// Find the shortest step sequence from `from` to `to`.
    ///
    /// Breadth-first search over the version graph; fewest steps wins.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<&MigrationStep>> {
        if from == to {
            return Ok(Vec::new());
        }

        let mut outgoing: HashMap<&str, Vec<&MigrationStep>> = HashMap::new();
        for step in &self.steps {
            outgoing.entry(step.from).or_default().push(step);
        }

        let mut queue: VecDeque<&str> = VecDeque::from([from]);
        let mut seen: HashSet<&str> = HashSet::from([from]);
        let mut arrived_via: HashMap<&str, &MigrationStep> = HashMap::new();

        while let Some(version) = queue.pop_front() {
            for step in outgoing.get(version).map_or(&[][..], Vec::as_slice) {
                if !seen.insert(step.to) {
                    continue;
                }
                arrived_via.insert(step.to, step);
                if step.to == to {
                    let mut path = Vec::new();
                    let mut cursor = to;
                    while cursor != from {
                        let Some(step) = arrived_via.get(cursor) else {
                            break;
                        };
                        path.push(*step);
                        cursor = step.from;
                    }
                    path.reverse();
                    return Ok(path);
                }
                queue.push_back(step.to);
            }
        }

        Err(TicketError::MigrationPathNotFound {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Bring the document at `path` to [`CURRENT_VERSION`], if needed.
    ///
    /// Fatal on a missing path or a failing step: callers must not serve
    /// ticket operations after an error.
    pub fn ensure_current(&self, path: &Path) -> Result<MigrationOutcome> {
        if !path.exists() {
            return Ok(MigrationOutcome::NoDocument);
        }
        let raw = fs::read_to_string(path).map_err(|source| TicketError::StoreRead {
            path: path.to_path_buf(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(MigrationOutcome::NoDocument);
        }

        let doc: Value = serde_json::from_str(&raw).map_err(|source| TicketError::StoreCorrupt {
            path: path.to_path_buf(),
            source,
        })?;
        let detected = Self::detect_version(&doc);
        if detected == CURRENT_VERSION {
            return Ok(MigrationOutcome::AlreadyCurrent);
        }

        let plan = self.find_path(&detected, CURRENT_VERSION)?;
        info!(
            from = %detected,
            to = CURRENT_VERSION,
            steps = plan.len(),
            "migrating ticket document"
        );
        let step_count = plan.len();
        for step in plan {
            run_step(path, step)?;
        }

        warn_on_latent_cycles(path);
        Ok(MigrationOutcome::Migrated {
            from: detected,
            steps: step_count,
        })
    }
}

/// Migrated legacy data may carry cycles the validator never approved;
/// traversal tolerates them, but operators should know.
fn warn_on_latent_cycles(path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let Ok(doc) = serde_json::from_str::<Document>(&raw) else {
        return;
    };
    if has_cycle(&doc) {
        warn!(
            path = %path.display(),
            "migrated document contains a dependency cycle; affected tickets will never be ready"
        );
    }
}

/// Execute one step: back up, transform, re-stamp, overwrite.
fn run_step(path: &Path, step: &MigrationStep) -> Result<()> {
    let backup = backup_path(path, step.from);
    let fail = |source: anyhow::Error| TicketError::MigrationStep {
        from: step.from.to_string(),
        to: step.to.to_string(),
        source,
    };

    fs::copy(path, &backup)
        .map_err(|e| fail(anyhow::Error::new(e).context("writing backup")))?;

    let raw = fs::read_to_string(path)
        .map_err(|e| fail(anyhow::Error::new(e).context("reading document")))?;
    let mut doc: Value = serde_json::from_str(&raw)
        .map_err(|e| fail(anyhow::Error::new(e).context("parsing document")))?;

    (step.transform)(&mut doc).map_err(fail)?;
    doc["version"] = Value::String(step.to.to_string());

    let mut rendered = serde_json::to_string_pretty(&doc)
        .map_err(|e| fail(anyhow::Error::new(e).context("rendering document")))?;
    rendered.push('\n');
    fs::write(path, rendered)
        .map_err(|e| fail(anyhow::Error::new(e).context("writing document")))?;

    info!(from = step.from, to = step.to, backup = %backup.display(), "migration step applied");
    Ok(())
}

/// Backup location for the file as it was at `version`.
#[must_use]
pub fn backup_path(path: &Path, version: &str) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{version}.bak"));
    std::path::PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
