mod database;
pub mod jsonl;

pub use database::{Database, Result, StorageError, DEFAULT_DB_FILE};
pub(crate) use database::{format_date, format_timestamp, parse_column, parse_date, parse_timestamp};
