//! Ticket id formatting and parsing.
//!
//! Ids are minted from the document's `nextId` counter as `TICKET-%04d`.
//! The numeric suffix widens past four digits once the counter outgrows
//! 9999; ids are never reused, even across deletions.

/// Prefix shared by every ticket id.
pub const ID_PREFIX: &str = "TICKET-";

/// Format a counter value as a ticket id (`42` -> `"TICKET-0042"`).
#[must_use]
pub fn format_id(n: u64) -> String {
    format!("{ID_PREFIX}{n:04}")
}

/// Extract the numeric suffix from a ticket id, if it has the expected shape.
///
/// Returns `None` for ids that do not start with the prefix or whose suffix
/// is not a decimal number.
#[must_use]
pub fn id_number(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}
