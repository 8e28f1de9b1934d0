//! SQLite database holding cards, the performance log and concept progress.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

/// Default database file name inside the data directory
pub const DEFAULT_DB_FILE: &str = "iowa_bar_prep.db";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("Concept not found: {0}")]
    ConceptNotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS cards (
        id TEXT PRIMARY KEY,
        front TEXT NOT NULL,
        back TEXT NOT NULL,
        subject TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        ease_factor REAL NOT NULL DEFAULT 2.5,
        interval INTEGER NOT NULL DEFAULT 0,
        repetitions INTEGER NOT NULL DEFAULT 0,
        next_review TEXT NOT NULL,
        review_count INTEGER NOT NULL DEFAULT 0,
        last_reviewed TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    -- Append-only; rows are never updated
    CREATE TABLE IF NOT EXISTS performance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        study_date TEXT NOT NULL,
        subject TEXT NOT NULL,
        kind TEXT NOT NULL,
        item_id TEXT,
        correct INTEGER NOT NULL,
        quality INTEGER,
        response_time REAL
    );

    CREATE TABLE IF NOT EXISTS concept_progress (
        concept_id TEXT PRIMARY KEY,
        mastery_level REAL NOT NULL DEFAULT 0,
        ease_factor REAL NOT NULL DEFAULT 2.5,
        interval INTEGER NOT NULL DEFAULT 0,
        repetitions INTEGER NOT NULL DEFAULT 0,
        review_count INTEGER NOT NULL DEFAULT 0,
        next_review TEXT,
        last_reviewed TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_cards_next_review ON cards(next_review);
    CREATE INDEX IF NOT EXISTS idx_cards_subject ON cards(subject);
    CREATE INDEX IF NOT EXISTS idx_performance_study_date ON performance(study_date);
    CREATE INDEX IF NOT EXISTS idx_performance_subject ON performance(subject);
"#;

/// Owner of the single SQLite connection used by the stores
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        log::debug!("Opened study database at {:?}", path);

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path: None })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

// ===== Column conversions =====
//
// Dates, timestamps and ids are stored as TEXT. Parse failures surface as
// rusqlite conversion errors so row mappers can use `?`.

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub(crate) fn parse_column<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_date(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
