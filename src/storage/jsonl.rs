//! Append-only JSON Lines files.
//!
//! One serialized record per line. Readers are forgiving: blank lines and
//! lines that fail to parse are skipped with a warning.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::database::Result;

/// Records read back from a JSONL file, plus how many lines were unusable
#[derive(Debug, Clone)]
pub struct JsonlRead<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Append a record as a single line, creating the file and parent directories
pub fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(record)?;
    writeln!(file, "{}", json)?;

    Ok(())
}

/// Overwrite `path` with one line per record
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    for record in records {
        writeln!(file, "{}", serde_json::to_string(record)?)?;
    }
    file.flush()?;

    Ok(())
}

/// Read every parseable record. A missing file reads as empty.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<JsonlRead<T>> {
    if !path.exists() {
        return Ok(JsonlRead {
            records: Vec::new(),
            skipped: 0,
        });
    }

    let reader = BufReader::new(fs::File::open(path)?);
    let mut records = Vec::new();
    let mut skipped = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("Skipping malformed line {} in {:?}: {}", line_no + 1, path, e);
                skipped += 1;
            }
        }
    }

    Ok(JsonlRead { records, skipped })
}

/// Read the last `n` parseable records
pub fn read_last_records<T: DeserializeOwned>(path: &Path, n: usize) -> Result<Vec<T>> {
    let mut all = read_records::<T>(path)?.records;
    let start = all.len().saturating_sub(n);
    Ok(all.split_off(start))
}
