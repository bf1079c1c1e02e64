//! End-to-end service flows over a real document file.
//!
//! Each test drives the public [`TicketService`] API against a temp file and
//! asserts the persisted outcomes, including the atomicity guarantees: a
//! failed batch leaves the file byte-for-byte unchanged.

use tempfile::TempDir;
use tickets_core::{NewTicket, Status, TicketError, TicketService, TicketUpdate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn service_in(dir: &TempDir) -> TicketService {
    TicketService::open(dir.path().join("tickets.json"))
}

fn new_ticket(title: &str, blocked_by: &[&str]) -> NewTicket {
    NewTicket {
        title: title.to_string(),
        description: format!("{title} description"),
        projects: vec![],
        blocked_by: blocked_by.iter().map(ToString::to_string).collect(),
    }
}

fn close(service: &TicketService, id: &str) {
    service
        .update_batch(vec![TicketUpdate {
            id: id.to_string(),
            status: Some(Status::Closed),
            ..TicketUpdate::default()
        }])
        .expect("close");
}

fn raw_file(service: &TicketService) -> String {
    std::fs::read_to_string(service.store().path()).expect("read file")
}

// ---------------------------------------------------------------------------
// Scenario: circular update is rejected and leaves both tickets unchanged
// ---------------------------------------------------------------------------

#[test]
fn circular_update_rejected_with_no_side_effects() {
    let dir = TempDir::new().expect("tempdir");
    let service = service_in(&dir);

    let a = service.create(new_ticket("A", &[])).expect("create A");
    let b = service.create(new_ticket("B", &[&a.id])).expect("create B");
    let before = raw_file(&service);

    let err = service
        .update_batch(vec![TicketUpdate {
            id: a.id.clone(),
            blocked_by: Some(vec![b.id.clone()]),
            ..TicketUpdate::default()
        }])
        .expect_err("cycle must be rejected");
    assert!(matches!(err, TicketError::CircularDependency { .. }));

    assert_eq!(raw_file(&service), before);
    assert!(service.read(&a.id).expect("read A").blocked_by.is_empty());
    assert_eq!(service.read(&b.id).expect("read B").blocked_by, vec![a.id]);
}

// ---------------------------------------------------------------------------
// Scenario: next() walks the unlock cascade as dependencies close
// ---------------------------------------------------------------------------

#[test]
fn next_shows_cascade_then_advances_when_dependency_closes() {
    let dir = TempDir::new().expect("tempdir");
    let service = service_in(&dir);

    let a = service.create(new_ticket("A", &[])).expect("create A");
    let b = service.create(new_ticket("B", &[&a.id])).expect("create B");
    let c = service.create(new_ticket("C", &[&b.id])).expect("create C");

    // Only A is ready; its tree shows B unblocking C.
    let ready = service.next(None).expect("next");
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].id, a.id);
    let tree = &ready[0].research_tree;
    assert_eq!(tree.unblocks.len(), 1);
    assert_eq!(tree.unblocks[0].id, b.id);
    assert_eq!(tree.unblocks[0].unblocks.len(), 1);
    assert_eq!(tree.unblocks[0].unblocks[0].id, c.id);

    // Close A: B becomes ready; A (closed) and C (blocked by open B) do not.
    close(&service, &a.id);
    let ready = service.next(None).expect("next");
    let ids: Vec<&str> = ready.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![b.id.as_str()]);
}

#[test]
fn next_never_returns_closed_tickets_and_only_ready_ones() {
    let dir = TempDir::new().expect("tempdir");
    let service = service_in(&dir);

    let a = service.create(new_ticket("A", &[])).expect("create");
    let b = service.create(new_ticket("B", &[&a.id])).expect("create");
    close(&service, &a.id);
    close(&service, &b.id);
    service.create(new_ticket("C", &[&a.id, &b.id])).expect("create");

    let ready = service.next(None).expect("next");
    for ticket in &ready {
        assert_ne!(ticket.status, Status::Closed);
    }
    // C is ready: both blockers are closed.
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].title, "C");
}

// ---------------------------------------------------------------------------
// Scenario: delete cleans up references automatically
// ---------------------------------------------------------------------------

#[test]
fn delete_strips_the_id_from_dependents() {
    let dir = TempDir::new().expect("tempdir");
    let service = service_in(&dir);

    let a = service.create(new_ticket("A", &[])).expect("create A");
    let b = service.create(new_ticket("B", &[&a.id])).expect("create B");

    service.delete(&a.id).expect("delete A");

    let b_after = service.read(&b.id).expect("read B");
    assert!(b_after.blocked_by.is_empty());
    assert_eq!(b_after.title, b.title);
    assert_eq!(b_after.status, b.status);
    assert_eq!(b_after.created_at, b.created_at);
}

// ---------------------------------------------------------------------------
// Scenario: batch update atomicity
// ---------------------------------------------------------------------------

#[test]
fn batch_update_with_unknown_id_changes_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let service = service_in(&dir);

    let x = service.create(new_ticket("X", &[])).expect("create X");
    let dep = service.create(new_ticket("Dep", &[])).expect("create Dep");
    let before = raw_file(&service);

    let err = service
        .update_batch(vec![
            TicketUpdate {
                id: x.id.clone(),
                blocked_by: Some(vec![dep.id.clone()]),
                ..TicketUpdate::default()
            },
            TicketUpdate {
                id: "missing".to_string(),
                title: Some("x".to_string()),
                ..TicketUpdate::default()
            },
        ])
        .expect_err("batch must fail");
    assert!(matches!(err, TicketError::NotFound { .. }));

    assert_eq!(raw_file(&service), before);
    let x_after = service.read(&x.id).expect("read X");
    assert!(x_after.blocked_by.is_empty());
    assert_eq!(x_after.updated_at, x.updated_at);
}

#[test]
fn batch_create_failure_leaves_the_file_untouched() {
    let dir = TempDir::new().expect("tempdir");
    let service = service_in(&dir);
    service.create(new_ticket("Seed", &[])).expect("create");
    let before = raw_file(&service);

    let err = service
        .create_batch(vec![
            new_ticket("Fine", &["TICKET-0001"]),
            new_ticket("Broken", &["TICKET-9999"]),
        ])
        .expect_err("batch must fail");
    assert!(matches!(err, TicketError::MissingDependency { .. }));
    assert_eq!(raw_file(&service), before);

    // The counter did not advance: the next create still gets 0002.
    let next = service.create(new_ticket("After", &[])).expect("create");
    assert_eq!(next.id, "TICKET-0002");
}

// ---------------------------------------------------------------------------
// Self-reference is unrepresentable through the service
// ---------------------------------------------------------------------------

#[test]
fn no_path_produces_a_self_blocking_ticket() {
    let dir = TempDir::new().expect("tempdir");
    let service = service_in(&dir);
    let a = service.create(new_ticket("A", &[])).expect("create");

    let err = service
        .update_batch(vec![TicketUpdate {
            id: a.id.clone(),
            blocked_by: Some(vec![a.id.clone()]),
            ..TicketUpdate::default()
        }])
        .expect_err("self-dependency must be rejected");
    assert!(matches!(err, TicketError::SelfDependency { .. }));

    let stored = service.read(&a.id).expect("read");
    assert!(!stored.blocked_by.contains(&a.id));
}

// ---------------------------------------------------------------------------
// Committed documents stay acyclic
// ---------------------------------------------------------------------------

#[test]
fn committed_graph_admits_a_topological_order() {
    let dir = TempDir::new().expect("tempdir");
    let service = service_in(&dir);

    let a = service.create(new_ticket("A", &[])).expect("create");
    let b = service.create(new_ticket("B", &[&a.id])).expect("create");
    let c = service
        .create(new_ticket("C", &[&a.id, &b.id]))
        .expect("create");
    service
        .update_batch(vec![TicketUpdate {
            id: b.id.clone(),
            blocked_by: Some(vec![a.id.clone()]),
            ..TicketUpdate::default()
        }])
        .expect("update");
    service.delete(&c.id).expect("delete");

    let doc = service.store().load().expect("load");
    assert!(!tickets_core::has_cycle(&doc));

    // Kahn-style check: repeatedly peel tickets whose blockers are gone.
    let mut remaining: Vec<_> = doc.tickets.values().cloned().collect();
    while !remaining.is_empty() {
        let ready_idx = remaining.iter().position(|t| {
            t.blocked_by
                .iter()
                .all(|dep| !remaining.iter().any(|r| &r.id == dep))
        });
        let idx = ready_idx.expect("acyclic graph must always have a source");
        remaining.swap_remove(idx);
    }
}
