//! Reverse-dependency traversal: what finishing a ticket unblocks.
//!
//! # Overview
//!
//! Where [`cycles`](crate::graph::cycles) walks `blockedBy` edges forward,
//! the research tree walks them in reverse: the children of a node are the
//! tickets whose `blockedBy` contains it, recursively. Closed tickets are
//! neither shown nor traversed.
//!
//! # Cycle guard
//!
//! Stored data can carry latent cycles (imported or legacy documents); the
//! validator only guards live mutations. The traversal therefore tracks the
//! ids visited on the *current path only*, copying the set into each branch:
//! a node re-entered along its own path expands to an empty `unblocks` list
//! instead of recursing forever. Diamonds are deliberately NOT deduplicated:
//! a ticket reachable through two parents is expanded under both, which can
//! be exponential in pathological diamond-heavy graphs and is acceptable at
//! the hundreds-of-tickets scale this store targets.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Document, Status};

/// One node of the cascade view: a ticket and everything it unblocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchNode {
    pub id: String,
    pub title: String,
    pub unblocks: Vec<ResearchNode>,
}

/// Build the research tree rooted at `ticket_id`.
///
/// Returns `None` when the id is unknown. The root itself is included even
/// if closed; descendants are filtered to non-closed tickets.
#[must_use]
pub fn build_tree(ticket_id: &str, doc: &Document) -> Option<ResearchNode> {
    let root = doc.tickets.get(ticket_id)?;
    Some(expand(&root.id, &root.title, doc, &HashSet::new()))
}

/// Expand one node, with `path` holding the ids already on this branch.
fn expand(id: &str, title: &str, doc: &Document, path: &HashSet<String>) -> ResearchNode {
    if path.contains(id) {
        // Already on this path: a latent cycle. Show the node, stop descending.
        return ResearchNode {
            id: id.to_string(),
            title: title.to_string(),
            unblocks: Vec::new(),
        };
    }

    let mut branch_path = path.clone();
    branch_path.insert(id.to_string());

    let unblocks = doc
        .tickets
        .values()
        .filter(|t| t.status != Status::Closed && t.blocked_by.iter().any(|dep| dep == id))
        .map(|t| expand(&t.id, &t.title, doc, &branch_path))
        .collect();

    ResearchNode {
        id: id.to_string(),
        title: title.to_string(),
        unblocks,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
