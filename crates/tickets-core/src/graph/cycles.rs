//! Cycle detection for the blocked-by dependency graph.
//!
//! # Overview
//!
//! `blockedBy` edges form a directed graph (ticket -> each ticket blocking
//! it). A cycle makes every ticket on it permanently un-ready, so candidate
//! edge sets are checked before any write commits them.
//!
//! # Design
//!
//! - **Hypothetical graph**: [`find_cycle`] treats the candidate's edges as
//!   already committed, overriding any stored value for that id. One check
//!   therefore serves both creation (the ticket does not exist yet) and
//!   update (stored edges are being replaced).
//! - **Three-color DFS**: unvisited / on-current-path / fully-processed.
//!   Re-entering an on-path node signals the cycle; the path is returned for
//!   error reporting.
//! - **O(V+E)**: one detection pass per create/update, not per edge.
//!
//! Ids referenced but absent from the document contribute no edges; dangling
//! references are an existence-validation concern, not a cycle concern.

use std::collections::HashMap;

use crate::model::Document;

/// DFS colors for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Currently on the DFS stack (in progress).
    Gray,
    /// Fully processed (all descendants visited).
    Black,
}

/// Detect whether committing `candidate_blocked_by` as the edges of
/// `candidate_id` would leave a cycle in the graph.
///
/// Returns the cycle path (first node repeated at the end, e.g.
/// `["A", "B", "A"]`) or `None` when the hypothetical graph is acyclic from
/// the candidate.
#[must_use]
pub fn find_cycle(
    candidate_id: &str,
    candidate_blocked_by: &[String],
    doc: &Document,
) -> Option<Vec<String>> {
    let mut color: HashMap<&str, Color> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();
    dfs(
        candidate_id,
        Some((candidate_id, candidate_blocked_by)),
        doc,
        &mut color,
        &mut path,
    )
}

/// Whether the stored graph contains any cycle at all.
///
/// Used after migrations to warn about latent cycles in imported or legacy
/// data; live mutations are guarded by [`find_cycle`] and never introduce
/// one.
#[must_use]
pub fn has_cycle(doc: &Document) -> bool {
    let mut color: HashMap<&str, Color> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();

    doc.tickets.values().any(|ticket| {
        color.get(ticket.id.as_str()).is_none()
            && dfs(&ticket.id, None, doc, &mut color, &mut path).is_some()
    })
}

/// Edges of `node` in the hypothetical graph: the override when `node` is
/// the candidate, its stored `blockedBy` otherwise.
fn edges<'d>(
    node: &str,
    override_edges: Option<(&str, &'d [String])>,
    doc: &'d Document,
) -> &'d [String] {
    match override_edges {
        Some((candidate_id, candidate_blocked_by)) if node == candidate_id => {
            candidate_blocked_by
        }
        _ => doc.blocked_by(node),
    }
}

fn dfs<'d>(
    node: &'d str,
    override_edges: Option<(&str, &'d [String])>,
    doc: &'d Document,
    color: &mut HashMap<&'d str, Color>,
    path: &mut Vec<&'d str>,
) -> Option<Vec<String>> {
    color.insert(node, Color::Gray);
    path.push(node);

    for dep in edges(node, override_edges, doc) {
        match color.get(dep.as_str()) {
            None => {
                if let Some(cycle) = dfs(dep, override_edges, doc, color, path) {
                    return Some(cycle);
                }
            }
            Some(Color::Gray) => {
                // Back edge: the cycle runs from dep's position on the path
                // through the current node and back.
                let start = path
                    .iter()
                    .position(|on_path| *on_path == dep.as_str())
                    .unwrap_or(0);
                let mut cycle: Vec<String> =
                    path[start..].iter().map(ToString::to_string).collect();
                cycle.push(dep.clone());
                return Some(cycle);
            }
            Some(Color::Black) => {} // already fully processed, no cycle through this edge
        }
    }

    path.pop();
    color.insert(node, Color::Black);
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
