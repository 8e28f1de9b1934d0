//! Card export to JSONL

use std::path::Path;

use super::Result;
use crate::flashcards::FlashcardStorage;
use crate::storage::{jsonl, Database};
use crate::subjects::Subject;

/// Default export file name inside the data directory
pub const CARDS_EXPORT_FILE: &str = "cards.jsonl";

/// Write every card (optionally one subject) to `path`, schedule included.
/// Returns the number of cards written.
pub fn export_cards(db: &Database, path: &Path, subject: Option<Subject>) -> Result<usize> {
    let cards = FlashcardStorage::new(db).list_cards(subject)?;
    jsonl::write_records(path, &cards)?;
    log::info!("Exported {} cards to {:?}", cards.len(), path);
    Ok(cards.len())
}
