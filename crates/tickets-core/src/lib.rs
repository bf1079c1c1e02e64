//! tickets-core: data model, dependency-graph integrity, and schema
//! migration for the `tickets` tracker.
//!
//! # Conventions
//!
//! - **Errors**: library code returns [`error::TicketError`] (never panics);
//!   `anyhow` appears only inside migration transforms and at binaries.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Persistence**: one JSON document, loaded and saved whole per
//!   operation; see [`store::TicketStore`].

pub mod error;
pub mod graph;
pub mod migrate;
pub mod model;
pub mod service;
pub mod store;

pub use error::{ErrorCode, TicketError};
pub use graph::{ResearchNode, build_tree, find_cycle, has_cycle, validate_exist};
pub use migrate::{CURRENT_VERSION, MigrationManager, MigrationOutcome};
pub use model::{Document, Status, Ticket};
pub use service::{ListFilter, NewTicket, NextTicket, TicketService, TicketUpdate};
pub use store::TicketStore;
