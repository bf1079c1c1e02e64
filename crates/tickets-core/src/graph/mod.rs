//! Dependency-graph integrity: validation, cycle detection, and the
//! reverse-dependency research tree.

pub mod cycles;
pub mod research;
pub mod validate;

pub use cycles::{find_cycle, has_cycle};
pub use research::{ResearchNode, build_tree};
pub use validate::validate_exist;
