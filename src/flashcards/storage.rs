//! Storage operations for flashcards
//!
//! Cards live in the `cards` table, one row per card with its SM-2 schedule
//! flattened into columns. Due cards are found by comparing the ISO
//! `next_review` date against today.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::algorithm::{review, Quality};
use super::models::{CardSchedule, LearningCard, NewCard};
use crate::storage::{
    format_date, format_timestamp, parse_column, parse_date, parse_timestamp, Database, Result,
    StorageError,
};
use crate::subjects::Subject;

const CARD_COLUMNS: &str = "id, front, back, subject, tags, ease_factor, interval, repetitions, \
     next_review, review_count, last_reviewed, created_at, updated_at";

/// Storage manager for flashcard operations
pub struct FlashcardStorage<'a> {
    conn: &'a Connection,
}

impl<'a> FlashcardStorage<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { conn: db.conn() }
    }

    // ==================== Card Operations ====================

    /// Create a new card, due today
    pub fn create_card(&self, new_card: NewCard, today: NaiveDate) -> Result<LearningCard> {
        let card = LearningCard::new(new_card.subject, new_card.front, new_card.back, today)
            .with_tags(new_card.tags);
        self.insert_card(&card)?;
        log::info!("Created {} card {}", card.subject, card.id);
        Ok(card)
    }

    /// Insert a fully-formed card. Returns `false` if a card with the same id
    /// already exists, leaving the stored card untouched.
    pub fn insert_card(&self, card: &LearningCard) -> Result<bool> {
        let s = &card.schedule;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO cards (id, front, back, subject, tags, ease_factor, interval, \
             repetitions, next_review, review_count, last_reviewed, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                card.id.to_string(),
                card.front,
                card.back,
                card.subject.slug(),
                serde_json::to_string(&card.tags)?,
                s.ease_factor,
                s.interval,
                s.repetitions,
                format_date(s.next_review),
                s.review_count,
                s.last_reviewed.map(format_timestamp),
                format_timestamp(card.created_at),
                format_timestamp(card.updated_at),
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Get a specific card
    pub fn get_card(&self, card_id: Uuid) -> Result<LearningCard> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS),
                params![card_id.to_string()],
                card_from_row,
            )
            .optional()?
            .ok_or(StorageError::CardNotFound(card_id))
    }

    /// Find a card by full id or unique id prefix
    pub fn find_card(&self, id_or_prefix: &str) -> Result<Option<LearningCard>> {
        let prefix = id_or_prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(None);
        }

        // Literal prefix match; LIKE would treat % and _ as wildcards
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM cards WHERE substr(id, 1, length(?1)) = ?1 LIMIT 2",
            CARD_COLUMNS
        ))?;
        let mut matches = stmt
            .query_map(params![prefix], card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(if matches.len() == 1 { matches.pop() } else { None })
    }

    /// List all cards, optionally restricted to one subject
    pub fn list_cards(&self, subject: Option<Subject>) -> Result<Vec<LearningCard>> {
        let cards = match subject {
            Some(subject) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM cards WHERE subject = ?1 ORDER BY created_at",
                    CARD_COLUMNS
                ))?;
                let rows = stmt.query_map(params![subject.slug()], card_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM cards ORDER BY subject, created_at",
                    CARD_COLUMNS
                ))?;
                let rows = stmt.query_map([], card_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(cards)
    }

    /// Update a card's content and schedule
    pub fn update_card(&self, card: &LearningCard) -> Result<()> {
        let s = &card.schedule;
        let updated = self.conn.execute(
            "UPDATE cards SET front = ?2, back = ?3, subject = ?4, tags = ?5, ease_factor = ?6, \
             interval = ?7, repetitions = ?8, next_review = ?9, review_count = ?10, \
             last_reviewed = ?11, updated_at = ?12 WHERE id = ?1",
            params![
                card.id.to_string(),
                card.front,
                card.back,
                card.subject.slug(),
                serde_json::to_string(&card.tags)?,
                s.ease_factor,
                s.interval,
                s.repetitions,
                format_date(s.next_review),
                s.review_count,
                s.last_reviewed.map(format_timestamp),
                format_timestamp(card.updated_at),
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::CardNotFound(card.id));
        }
        Ok(())
    }

    /// Delete a card
    pub fn delete_card(&self, card_id: Uuid) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM cards WHERE id = ?1", params![card_id.to_string()])?;
        if deleted == 0 {
            return Err(StorageError::CardNotFound(card_id));
        }
        Ok(())
    }

    // ==================== Review Operations ====================

    /// Cards due on or before `today`, oldest due date first
    pub fn get_due_cards(
        &self,
        today: NaiveDate,
        subject: Option<Subject>,
        limit: Option<usize>,
    ) -> Result<Vec<LearningCard>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM cards WHERE next_review <= ?1 AND (?2 IS NULL OR subject = ?2) \
             ORDER BY next_review, created_at LIMIT ?3",
            CARD_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![format_date(today), subject.map(|s| s.slug()), limit],
            card_from_row,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Submit a review for a card and persist the new schedule
    pub fn submit_review(
        &self,
        card_id: Uuid,
        quality: Quality,
        today: NaiveDate,
    ) -> Result<LearningCard> {
        let mut card = self.get_card(card_id)?;
        let result = review(&card.schedule.sm2(), quality, today);

        let now = Utc::now();
        card.schedule.apply(&result, now);
        card.updated_at = now;
        self.update_card(&card)?;

        log::debug!(
            "Reviewed card {} (q={}): interval {}d, ease {:.2}",
            card.id,
            quality.value(),
            result.interval,
            result.ease_factor
        );
        Ok(card)
    }

    /// Number of stored cards
    pub fn count_cards(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Card counts per subject, subjects without cards omitted
    pub fn count_by_subject(&self) -> Result<Vec<(Subject, usize)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT subject, COUNT(*) FROM cards GROUP BY subject ORDER BY subject")?;
        let rows = stmt.query_map([], |row| {
            let subject: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((parse_column(0, &subject)?, count as usize))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn card_from_row(row: &Row) -> rusqlite::Result<LearningCard> {
    let id: String = row.get(0)?;
    let subject: String = row.get(3)?;
    let tags: String = row.get(4)?;
    let next_review: String = row.get(8)?;
    let last_reviewed: Option<String> = row.get(10)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;

    Ok(LearningCard {
        id: parse_column(0, &id)?,
        front: row.get(1)?,
        back: row.get(2)?,
        subject: parse_column(3, &subject)?,
        // Tags are cosmetic; a damaged column should not hide the card
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        schedule: CardSchedule {
            ease_factor: row.get(5)?,
            interval: row.get(6)?,
            repetitions: row.get(7)?,
            next_review: parse_date(8, &next_review)?,
            review_count: row.get(9)?,
            last_reviewed: last_reviewed
                .as_deref()
                .map(|ts| parse_timestamp(10, ts))
                .transpose()?,
        },
        created_at: parse_timestamp(11, &created_at)?,
        updated_at: parse_timestamp(12, &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap() + Duration::days(offset)
    }

    fn new_card(subject: Subject, front: &str) -> NewCard {
        NewCard {
            front: front.to_string(),
            back: format!("answer to {}", front),
            subject,
            tags: vec!["mbe".to_string()],
        }
    }

    #[test]
    fn test_create_and_get_card() {
        let db = Database::open_in_memory().unwrap();
        let storage = FlashcardStorage::new(&db);

        let created = storage
            .create_card(new_card(Subject::Contracts, "Mailbox rule?"), day(0))
            .unwrap();
        let fetched = storage.get_card(created.id).unwrap();

        assert_eq!(fetched.front, "Mailbox rule?");
        assert_eq!(fetched.subject, Subject::Contracts);
        assert_eq!(fetched.tags, vec!["mbe".to_string()]);
        assert_eq!(fetched.schedule, created.schedule);
        assert_eq!(storage.count_cards().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_card() {
        let db = Database::open_in_memory().unwrap();
        let storage = FlashcardStorage::new(&db);
        let id = Uuid::new_v4();

        assert!(matches!(storage.get_card(id), Err(StorageError::CardNotFound(missing)) if missing == id));
        assert!(matches!(storage.delete_card(id), Err(StorageError::CardNotFound(_))));
    }

    #[test]
    fn test_insert_duplicate_is_ignored() {
        let db = Database::open_in_memory().unwrap();
        let storage = FlashcardStorage::new(&db);

        let card = LearningCard::new(Subject::Torts, "Q".to_string(), "A".to_string(), day(0));
        assert!(storage.insert_card(&card).unwrap());
        assert!(!storage.insert_card(&card).unwrap());
        assert_eq!(storage.count_cards().unwrap(), 1);
    }

    #[test]
    fn test_list_by_subject() {
        let db = Database::open_in_memory().unwrap();
        let storage = FlashcardStorage::new(&db);

        storage.create_card(new_card(Subject::Torts, "a"), day(0)).unwrap();
        storage.create_card(new_card(Subject::Evidence, "b"), day(0)).unwrap();
        storage.create_card(new_card(Subject::Torts, "c"), day(0)).unwrap();

        assert_eq!(storage.list_cards(None).unwrap().len(), 3);
        let torts = storage.list_cards(Some(Subject::Torts)).unwrap();
        assert_eq!(torts.len(), 2);
        assert!(torts.iter().all(|c| c.subject == Subject::Torts));

        let counts = storage.count_by_subject().unwrap();
        assert_eq!(counts, vec![(Subject::Evidence, 1), (Subject::Torts, 2)]);
    }

    #[test]
    fn test_due_cards_by_date() {
        let db = Database::open_in_memory().unwrap();
        let storage = FlashcardStorage::new(&db);

        let future = storage.create_card(new_card(Subject::Torts, "future"), day(5)).unwrap();
        let old = storage.create_card(new_card(Subject::Torts, "old"), day(-3)).unwrap();
        let today = storage.create_card(new_card(Subject::Evidence, "today"), day(0)).unwrap();

        let due = storage.get_due_cards(day(0), None, None).unwrap();
        let ids: Vec<Uuid> = due.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![old.id, today.id]);
        assert!(!ids.contains(&future.id));

        let due_evidence = storage.get_due_cards(day(0), Some(Subject::Evidence), None).unwrap();
        assert_eq!(due_evidence.len(), 1);

        let limited = storage.get_due_cards(day(10), None, Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_submit_review_reschedules() {
        let db = Database::open_in_memory().unwrap();
        let storage = FlashcardStorage::new(&db);
        let card = storage.create_card(new_card(Subject::RealProperty, "RAP?"), day(0)).unwrap();

        let reviewed = storage.submit_review(card.id, Quality::new(5).unwrap(), day(0)).unwrap();
        assert_eq!(reviewed.schedule.interval, 1);
        assert_eq!(reviewed.schedule.repetitions, 1);
        assert_eq!(reviewed.schedule.ease_factor, 2.6);
        assert_eq!(reviewed.schedule.next_review, day(1));

        let reviewed = storage.submit_review(card.id, Quality::new(4).unwrap(), day(1)).unwrap();
        assert_eq!(reviewed.schedule.interval, 6);
        assert_eq!(reviewed.schedule.review_count, 2);

        // No longer due until the new date
        assert!(storage.get_due_cards(day(2), None, None).unwrap().is_empty());
        assert_eq!(storage.get_due_cards(day(7), None, None).unwrap().len(), 1);

        let failed = storage.submit_review(card.id, Quality::new(1).unwrap(), day(7)).unwrap();
        assert_eq!(failed.schedule.repetitions, 0);
        assert_eq!(failed.schedule.interval, 1);
        assert!(failed.schedule.ease_factor >= 1.3);
    }

    #[test]
    fn test_find_by_prefix_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let storage = FlashcardStorage::new(&db);
        let card = storage.create_card(new_card(Subject::Torts, "x"), day(0)).unwrap();

        let prefix = &card.id.to_string()[..8];
        assert_eq!(storage.find_card(prefix).unwrap().unwrap().id, card.id);

        storage.delete_card(card.id).unwrap();
        assert!(storage.find_card(prefix).unwrap().is_none());
    }

    #[test]
    fn test_find_card_matches_prefix_literally() {
        let db = Database::open_in_memory().unwrap();
        let storage = FlashcardStorage::new(&db);
        let card = storage.create_card(new_card(Subject::Torts, "x"), day(0)).unwrap();

        // A one-card deck must not resolve blank input or wildcards
        assert!(storage.find_card("").unwrap().is_none());
        assert!(storage.find_card("   ").unwrap().is_none());
        assert!(storage.find_card("%").unwrap().is_none());
        assert!(storage.find_card("_").unwrap().is_none());

        let upper = card.id.to_string()[..6].to_uppercase();
        assert_eq!(storage.find_card(&upper).unwrap().unwrap().id, card.id);
    }
}
