//! Append-only performance log in the `performance` table

use rusqlite::{params, Connection, Row};

use super::models::{PerformanceRecord, PracticeKind};
use crate::storage::{format_date, format_timestamp, parse_column, parse_date, parse_timestamp, Database, Result};
use crate::subjects::Subject;

const RECORD_COLUMNS: &str =
    "id, timestamp, study_date, subject, kind, item_id, correct, quality, response_time";

pub struct PerformanceLog<'a> {
    conn: &'a Connection,
}

impl<'a> PerformanceLog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { conn: db.conn() }
    }

    /// Append a record, returning its row id
    pub fn record(&self, record: &PerformanceRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO performance (timestamp, study_date, subject, kind, item_id, correct, \
             quality, response_time) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                format_timestamp(record.timestamp),
                format_date(record.study_date),
                record.subject.slug(),
                record.kind.as_str(),
                record.item_id,
                record.correct,
                record.quality,
                record.response_time,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent records first
    pub fn recent(&self, limit: usize, subject: Option<Subject>) -> Result<Vec<PerformanceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM performance WHERE (?1 IS NULL OR subject = ?1) \
             ORDER BY id DESC LIMIT ?2",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![subject.map(|s| s.slug()), limit as i64],
            record_from_row,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Records of one kind, oldest first
    pub fn by_kind(&self, kind: PracticeKind) -> Result<Vec<PerformanceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM performance WHERE kind = ?1 ORDER BY id",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map(params![kind.as_str()], record_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM performance", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn record_from_row(row: &Row) -> rusqlite::Result<PerformanceRecord> {
    let timestamp: String = row.get(1)?;
    let study_date: String = row.get(2)?;
    let subject: String = row.get(3)?;
    let kind: String = row.get(4)?;

    Ok(PerformanceRecord {
        id: Some(row.get(0)?),
        timestamp: parse_timestamp(1, &timestamp)?,
        study_date: parse_date(2, &study_date)?,
        subject: parse_column(3, &subject)?,
        kind: parse_column(4, &kind)?,
        item_id: row.get(5)?,
        correct: row.get(6)?,
        quality: row.get(7)?,
        response_time: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_record_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        let log = PerformanceLog::new(&db);
        let day = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();

        let id = log
            .record(
                &PerformanceRecord::new(Subject::Evidence, PracticeKind::Flashcard, true)
                    .with_item("card-1")
                    .with_quality(4)
                    .with_response_time(7.5)
                    .on(day),
            )
            .unwrap();
        log.record(&PerformanceRecord::new(Subject::Torts, PracticeKind::Mbe, false).on(day))
            .unwrap();

        let recent = log.recent(10, None).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].subject, Subject::Torts);
        assert_eq!(recent[0].quality, None);

        let first = &recent[1];
        assert_eq!(first.id, Some(id));
        assert_eq!(first.kind, PracticeKind::Flashcard);
        assert_eq!(first.item_id.as_deref(), Some("card-1"));
        assert_eq!(first.quality, Some(4));
        assert_eq!(first.response_time, Some(7.5));
        assert_eq!(first.study_date, day);
        assert!(first.correct);
    }

    #[test]
    fn test_recent_filters_and_limits() {
        let db = Database::open_in_memory().unwrap();
        let log = PerformanceLog::new(&db);

        for i in 0..5 {
            log.record(&PerformanceRecord::new(Subject::Contracts, PracticeKind::Concept, i % 2 == 0))
                .unwrap();
        }
        log.record(&PerformanceRecord::new(Subject::Evidence, PracticeKind::Essay, true))
            .unwrap();

        assert_eq!(log.count().unwrap(), 6);
        assert_eq!(log.recent(3, None).unwrap().len(), 3);
        assert_eq!(log.recent(10, Some(Subject::Contracts)).unwrap().len(), 5);
        assert_eq!(log.by_kind(PracticeKind::Essay).unwrap().len(), 1);
    }
}
