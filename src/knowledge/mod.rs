//! Knowledge-concept table
//!
//! Static black-letter rules with per-concept SM-2 progress and a mastery
//! level that tracks recent recall quality.

pub mod builtin;
pub mod models;
pub mod storage;

pub use models::*;
pub use storage::ConceptStorage;
