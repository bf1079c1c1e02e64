//! Persisted data model: tickets, the document container, and id helpers.

pub mod ticket;
pub mod ticket_id;

pub use ticket::{Document, Status, Ticket};
