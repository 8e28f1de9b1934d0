//! Bar exam study toolkit: SM-2 flashcards, built-in concept drills, a
//! performance log with analytics, and an LLM tutor for MBE questions,
//! essays and explanations.

pub mod analytics;
pub mod config;
pub mod flashcards;
pub mod knowledge;
pub mod performance;
pub mod session;
pub mod storage;
pub mod subjects;
pub mod transfer;
pub mod tutor;

pub use config::AppConfig;
pub use storage::Database;
pub use subjects::Subject;
