//! Whole-document JSON persistence for the ticket collection.
//!
//! # Design
//!
//! The store is intentionally stateless: every service operation reloads the
//! full document, mutates it in memory, and writes it back as one unit. The
//! store is the sole owner of the on-disk representation and of id minting;
//! nothing is cached between calls.
//!
//! A missing (or empty) file is first-run state, not an error: [`TicketStore::load`]
//! yields a fresh document at the current schema version. Files that exist
//! but cannot be read or parsed surface as store errors.
//!
//! There is no cross-process locking. Two writers racing on the same path
//! can lose one writer's changes; single-writer access is the caller's
//! responsibility.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TicketError};
use crate::model::ticket_id;
use crate::model::{Document, Ticket};

/// Path-bound accessor for one ticket document.
#[derive(Debug, Clone)]
pub struct TicketStore {
    path: PathBuf,
}

impl TicketStore {
    /// Bind a store to a document path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The document path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full document.
    ///
    /// A missing or empty file yields [`Document::empty`]. An unreadable
    /// file maps to [`TicketError::StoreRead`]; malformed JSON maps to
    /// [`TicketError::StoreCorrupt`].
    pub fn load(&self) -> Result<Document> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no ticket file yet, starting empty");
            return Ok(Document::empty());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| TicketError::StoreRead {
            path: self.path.clone(),
            source,
        })?;

        if raw.trim().is_empty() {
            return Ok(Document::empty());
        }

        serde_json::from_str(&raw).map_err(|source| TicketError::StoreCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist the full document as pretty-printed UTF-8 JSON.
    pub fn save(&self, doc: &Document) -> Result<()> {
        let mut rendered =
            serde_json::to_string_pretty(doc).map_err(|source| TicketError::StoreCorrupt {
                path: self.path.clone(),
                source,
            })?;
        rendered.push('\n');

        fs::write(&self.path, rendered).map_err(|source| TicketError::StoreWrite {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), tickets = doc.tickets.len(), "document saved");
        Ok(())
    }

    /// Mint the next ticket id from the document counter and advance it.
    ///
    /// The increment only reaches disk when the caller saves the document,
    /// so a failed operation never burns an id.
    pub fn next_ticket_id(doc: &mut Document) -> String {
        let id = ticket_id::format_id(doc.next_id);
        doc.next_id += 1;
        id
    }

    /// Fetch one ticket by id.
    pub fn get<'d>(doc: &'d Document, id: &str) -> Result<&'d Ticket> {
        doc.tickets.get(id).ok_or_else(|| TicketError::NotFound {
            id: id.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::TicketStore;
    use crate::error::TicketError;
    use crate::migrate::CURRENT_VERSION;
    use crate::model::{Document, Status, Ticket};
    use chrono::Utc;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> TicketStore {
        TicketStore::new(dir.path().join("tickets.json"))
    }

    fn sample_ticket(id: &str) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: id.to_string(),
            title: "Sample".to_string(),
            description: "A sample ticket".to_string(),
            projects: vec![],
            blocked_by: vec![],
            status: Status::Open,
            created_at: now,
            updated_at: now,
        }
    }

    // -----------------------------------------------------------------------
    // load
    // -----------------------------------------------------------------------

    #[test]
    fn load_missing_file_starts_empty_at_current_version() {
        let dir = TempDir::new().expect("tempdir");
        let doc = store_in(&dir).load().expect("load");
        assert_eq!(doc.version, CURRENT_VERSION);
        assert!(doc.tickets.is_empty());
        assert_eq!(doc.next_id, 1);
    }

    #[test]
    fn load_empty_file_starts_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        std::fs::write(store.path(), "  \n").expect("write");
        let doc = store.load().expect("load");
        assert!(doc.tickets.is_empty());
    }

    #[test]
    fn load_corrupt_file_is_a_store_error() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").expect("write");
        let err = store.load().expect_err("must fail");
        assert!(matches!(err, TicketError::StoreCorrupt { .. }));
    }

    // -----------------------------------------------------------------------
    // save / round trip
    // -----------------------------------------------------------------------

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        let mut doc = Document::empty();
        let id = TicketStore::next_ticket_id(&mut doc);
        doc.tickets.insert(id.clone(), sample_ticket(&id));
        store.save(&doc).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded, doc);
    }

    #[test]
    fn save_writes_pretty_json_with_trailing_newline() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        store.save(&Document::empty()).expect("save");

        let raw = std::fs::read_to_string(store.path()).expect("read");
        assert!(raw.ends_with('\n'));
        assert!(raw.contains("\n  \"version\""), "expected indentation: {raw}");
    }

    // -----------------------------------------------------------------------
    // id minting
    // -----------------------------------------------------------------------

    #[test]
    fn next_ticket_id_formats_and_advances() {
        let mut doc = Document::empty();
        assert_eq!(TicketStore::next_ticket_id(&mut doc), "TICKET-0001");
        assert_eq!(TicketStore::next_ticket_id(&mut doc), "TICKET-0002");
        assert_eq!(doc.next_id, 3);
    }

    #[test]
    fn counter_survives_deletions() {
        let mut doc = Document::empty();
        let first = TicketStore::next_ticket_id(&mut doc);
        doc.tickets.insert(first.clone(), sample_ticket(&first));
        doc.tickets.remove(&first);
        // The counter never decreases; the old id is never reissued.
        assert_eq!(TicketStore::next_ticket_id(&mut doc), "TICKET-0002");
    }

    // -----------------------------------------------------------------------
    // get
    // -----------------------------------------------------------------------

    #[test]
    fn get_unknown_id_is_not_found() {
        let doc = Document::empty();
        let err = TicketStore::get(&doc, "TICKET-0001").expect_err("must fail");
        assert!(matches!(err, TicketError::NotFound { .. }));
    }
}
