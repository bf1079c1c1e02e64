//! Ticket service: orchestrates the store, the dependency validator, and the
//! research-tree builder.
//!
//! # Contract
//!
//! Every operation is a full load -> validate -> mutate -> save cycle over
//! the whole document; nothing is cached between calls and no interleaving
//! point is exposed to callers. All validation runs against the in-memory
//! snapshot (plus any pending additions in the same batch) strictly before
//! the single write, so a failed operation leaves the persisted document
//! byte-for-byte unchanged; batches are all-or-nothing.
//!
//! A service instance (and every clone of it) holds one mutex over the
//! document, so in-process callers are serialized for the whole cycle
//! instead of relying on single-threaded use. Separate processes sharing a
//! file are NOT coordinated; keep a single writer per path.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, TicketError};
use crate::graph::research::ResearchNode;
use crate::graph::{build_tree, find_cycle, validate_exist};
use crate::model::ticket::normalize_projects;
use crate::model::{Document, Status, Ticket};
use crate::store::TicketStore;

// ---------------------------------------------------------------------------
// Request/response types
// ---------------------------------------------------------------------------

/// Input for creating one ticket.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub blocked_by: Vec<String>,
}

/// One update in a batch. `None` fields are left untouched; `Some` fields
/// replace the stored value wholesale.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TicketUpdate {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub projects: Option<Vec<String>>,
    pub blocked_by: Option<Vec<String>>,
    pub status: Option<Status>,
}

/// Conjunctive filters for [`TicketService::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive membership in `projects`.
    pub project: Option<String>,
    pub status: Option<Status>,
    /// Tickets whose `blockedBy` contains this id.
    pub depends_on: Option<String>,
}

/// A ready ticket as returned by [`TicketService::next`].
///
/// `blockedBy` is deliberately omitted: every entry is closed by definition
/// of readiness, and the research tree supersedes it as the useful view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTicket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub projects: Vec<String>,
    pub status: Status,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
    pub research_tree: ResearchNode,
}

// ---------------------------------------------------------------------------
// TicketService
// ---------------------------------------------------------------------------

/// The single synchronous entry point for all ticket operations.
#[derive(Debug, Clone)]
pub struct TicketService {
    store: TicketStore,
    /// Serializes whole load-mutate-save cycles across clones.
    doc_lock: Arc<Mutex<()>>,
}

impl TicketService {
    #[must_use]
    pub fn new(store: TicketStore) -> Self {
        Self {
            store,
            doc_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Bind a service to a document path.
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(TicketStore::new(path))
    }

    #[must_use]
    pub const fn store(&self) -> &TicketStore {
        &self.store
    }

    /// Take the document lock for one full operation. A poisoned lock only
    /// means another thread panicked mid-operation; the document itself is
    /// always either the old or the new full write, so we keep going.
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.doc_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Create one ticket.
    ///
    /// Validation order: required fields, existence of every `blockedBy`
    /// target, id mint, cycle check with the candidate edge set. Any failure
    /// aborts before the persisted counter or document is touched.
    pub fn create(&self, new: NewTicket) -> Result<Ticket> {
        validate_fields(&new)?;
        let _doc_guard = self.lock();
        let mut doc = self.store.load()?;
        validate_exist(&new.blocked_by, &doc, None)?;

        let id = TicketStore::next_ticket_id(&mut doc);
        let ticket = build_ticket(id, new);
        if let Some(path) = find_cycle(&ticket.id, &ticket.blocked_by, &doc) {
            return Err(TicketError::CircularDependency { path });
        }

        doc.tickets.insert(ticket.id.clone(), ticket.clone());
        self.store.save(&doc)?;
        info!(id = %ticket.id, "ticket created");
        Ok(ticket)
    }

    /// Create several tickets as one all-or-nothing batch.
    ///
    /// Two passes: every item is validated against the *original* snapshot
    /// first (items do not exist yet, so batch siblings cannot be referenced
    /// as dependencies; an explicit limitation), then ids are minted and
    /// each new ticket is cycle-checked against the snapshot as it
    /// accumulates the earlier siblings. One failure in either pass aborts
    /// the whole batch with zero writes.
    pub fn create_batch(&self, items: Vec<NewTicket>) -> Result<Vec<Ticket>> {
        let _doc_guard = self.lock();
        let mut doc = self.store.load()?;

        for item in &items {
            validate_fields(item)?;
            validate_exist(&item.blocked_by, &doc, None)?;
        }

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let id = TicketStore::next_ticket_id(&mut doc);
            let ticket = build_ticket(id, item);
            if let Some(path) = find_cycle(&ticket.id, &ticket.blocked_by, &doc) {
                return Err(TicketError::CircularDependency { path });
            }
            doc.tickets.insert(ticket.id.clone(), ticket.clone());
            created.push(ticket);
        }

        self.store.save(&doc)?;
        info!(count = created.len(), "ticket batch created");
        Ok(created)
    }

    /// Fetch one ticket by id.
    pub fn read(&self, id: &str) -> Result<Ticket> {
        let _doc_guard = self.lock();
        let doc = self.store.load()?;
        TicketStore::get(&doc, id).cloned()
    }

    /// Apply several updates as one all-or-nothing batch.
    ///
    /// Three strict phases, each covering the whole batch before the next
    /// begins: (1) every referenced id exists, (2) every field/dependency/
    /// cycle constraint holds against the pre-update document, (3) apply and
    /// save once. One invalid update rejects the whole batch untouched.
    pub fn update_batch(&self, updates: Vec<TicketUpdate>) -> Result<Vec<Ticket>> {
        let _doc_guard = self.lock();
        let mut doc = self.store.load()?;

        // Phase 1: existence.
        for update in &updates {
            if !doc.tickets.contains_key(&update.id) {
                return Err(TicketError::NotFound {
                    id: update.id.clone(),
                });
            }
        }

        // Phase 2: field and graph constraints, against the stored graph.
        for update in &updates {
            if let Some(title) = &update.title {
                require_non_empty("title", title)?;
            }
            if let Some(description) = &update.description {
                require_non_empty("description", description)?;
            }
            if let Some(edges) = &update.blocked_by {
                validate_exist(edges, &doc, Some(&update.id))?;
                if let Some(path) = find_cycle(&update.id, edges, &doc) {
                    return Err(TicketError::CircularDependency { path });
                }
            }
        }

        // Phase 3: apply.
        let now = Utc::now();
        let mut changed = Vec::with_capacity(updates.len());
        for update in updates {
            let Some(ticket) = doc.tickets.get_mut(&update.id) else {
                // Phase 1 already checked every id.
                return Err(TicketError::NotFound { id: update.id });
            };
            if let Some(title) = update.title {
                ticket.title = title;
            }
            if let Some(description) = update.description {
                ticket.description = description;
            }
            if let Some(projects) = update.projects {
                ticket.projects = normalize_projects(projects);
            }
            if let Some(edges) = update.blocked_by {
                ticket.blocked_by = edges;
            }
            if let Some(status) = update.status {
                ticket.status = status;
            }
            ticket.updated_at = now;
            changed.push(ticket.clone());
        }

        self.store.save(&doc)?;
        info!(count = changed.len(), "ticket batch updated");
        Ok(changed)
    }

    /// Delete one ticket and strip its id from every other ticket's
    /// `blockedBy`, as one persisted write.
    ///
    /// Tickets that merely lose a reference are otherwise untouched (their
    /// `updatedAt` does not refresh; the cleanup is bookkeeping, not an
    /// edit).
    pub fn delete(&self, id: &str) -> Result<()> {
        let _doc_guard = self.lock();
        let mut doc = self.store.load()?;
        if doc.tickets.remove(id).is_none() {
            return Err(TicketError::NotFound { id: id.to_string() });
        }
        for ticket in doc.tickets.values_mut() {
            ticket.blocked_by.retain(|dep| dep != id);
        }
        self.store.save(&doc)?;
        info!(%id, "ticket deleted");
        Ok(())
    }

    /// List tickets matching every given filter, newest first.
    pub fn list(&self, filter: &ListFilter) -> Result<Vec<Ticket>> {
        let _doc_guard = self.lock();
        let doc = self.store.load()?;
        let mut out: Vec<Ticket> = doc
            .tickets
            .values()
            .filter(|t| {
                filter
                    .project
                    .as_deref()
                    .is_none_or(|project| t.in_project(project))
                    && filter.status.is_none_or(|status| t.status == status)
                    && filter
                        .depends_on
                        .as_deref()
                        .is_none_or(|dep| t.blocked_by.iter().any(|b| b == dep))
            })
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        debug!(count = out.len(), "list");
        Ok(out)
    }

    /// Ready tickets (not closed, every blocker closed), newest first, each
    /// carrying its research tree.
    ///
    /// A `blockedBy` entry that resolves to no ticket can never become
    /// closed, so it keeps its ticket out of the ready set.
    pub fn next(&self, project: Option<&str>) -> Result<Vec<NextTicket>> {
        let _doc_guard = self.lock();
        let doc = self.store.load()?;
        let mut ready: Vec<Ticket> = doc
            .tickets
            .values()
            .filter(|t| t.status != Status::Closed)
            .filter(|t| is_ready(t, &doc))
            .filter(|t| project.is_none_or(|p| t.in_project(p)))
            .cloned()
            .collect();
        sort_newest_first(&mut ready);

        Ok(ready
            .into_iter()
            .map(|t| {
                let research_tree = build_tree(&t.id, &doc).unwrap_or_else(|| ResearchNode {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    unblocks: Vec::new(),
                });
                NextTicket {
                    id: t.id,
                    title: t.title,
                    description: t.description,
                    projects: t.projects,
                    status: t.status,
                    created_at: t.created_at,
                    updated_at: t.updated_at,
                    research_tree,
                }
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn build_ticket(id: String, new: NewTicket) -> Ticket {
    let now = Utc::now();
    Ticket {
        id,
        title: new.title,
        description: new.description,
        projects: normalize_projects(new.projects),
        blocked_by: new.blocked_by,
        status: Status::Open,
        created_at: now,
        updated_at: now,
    }
}

fn validate_fields(new: &NewTicket) -> Result<()> {
    require_non_empty("title", &new.title)?;
    require_non_empty("description", &new.description)
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TicketError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Ready means: no blockers, or every blocker resolves to a closed ticket.
fn is_ready(ticket: &Ticket, doc: &Document) -> bool {
    ticket
        .blocked_by
        .iter()
        .all(|dep| doc.tickets.get(dep).is_some_and(|t| t.status == Status::Closed))
}

/// `createdAt` descending, id descending as a deterministic tie-break.
fn sort_newest_first(tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
