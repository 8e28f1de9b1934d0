//! Performance log: one row per answered flashcard, concept, MBE question or
//! essay. Never mutated; aggregated by the analytics dashboard.

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::PerformanceLog;
