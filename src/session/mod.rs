//! Study sessions
//!
//! A session owns the queue of items to practice and writes each grade
//! through to the schedule and the performance log. The CLI only handles
//! presentation and timing.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use crate::flashcards::{FlashcardStorage, LearningCard, Quality};
use crate::knowledge::{ConceptStorage, KnowledgeNode};
use crate::performance::{PerformanceLog, PerformanceRecord, PracticeKind};
use crate::storage::{Database, Result};
use crate::subjects::Subject;

/// Running totals for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub reviewed: usize,
    pub correct: usize,
    pub skipped: usize,
    /// Seconds spent answering, summed
    pub total_time: f64,
}

impl SessionStats {
    fn add(&mut self, quality: Quality, elapsed: Duration) {
        self.reviewed += 1;
        if quality.is_correct() {
            self.correct += 1;
        }
        self.total_time += elapsed.as_secs_f64();
    }

    /// Fraction of graded items rated 3 or better
    pub fn accuracy(&self) -> f64 {
        if self.reviewed == 0 {
            0.0
        } else {
            self.correct as f64 / self.reviewed as f64
        }
    }

    pub fn avg_response_time(&self) -> f64 {
        if self.reviewed == 0 {
            0.0
        } else {
            self.total_time / self.reviewed as f64
        }
    }
}

/// Flashcard review over the cards due today
pub struct ReviewSession<'a> {
    cards: FlashcardStorage<'a>,
    log: PerformanceLog<'a>,
    queue: VecDeque<LearningCard>,
    total: usize,
    today: NaiveDate,
    stats: SessionStats,
}

impl<'a> ReviewSession<'a> {
    /// Load due cards, oldest first, up to `limit`
    pub fn start(
        db: &'a Database,
        today: NaiveDate,
        subject: Option<Subject>,
        limit: Option<usize>,
    ) -> Result<Self> {
        let cards = FlashcardStorage::new(db);
        let queue: VecDeque<LearningCard> = cards.get_due_cards(today, subject, limit)?.into();
        log::info!("Review session started with {} due cards", queue.len());

        Ok(Self {
            cards,
            log: PerformanceLog::new(db),
            total: queue.len(),
            queue,
            today,
            stats: SessionStats::default(),
        })
    }

    pub fn current(&self) -> Option<&LearningCard> {
        self.queue.front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// 1-based position of the current card
    pub fn position(&self) -> usize {
        self.total - self.queue.len() + 1
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Grade the current card and advance. Returns the rescheduled card, or
    /// `None` when the session is already finished.
    pub fn grade(&mut self, quality: Quality, elapsed: Duration) -> Result<Option<LearningCard>> {
        let Some(card) = self.queue.pop_front() else {
            return Ok(None);
        };

        let updated = self.cards.submit_review(card.id, quality, self.today)?;
        self.log.record(
            &PerformanceRecord::new(card.subject, PracticeKind::Flashcard, quality.is_correct())
                .with_item(card.id.to_string())
                .with_quality(quality.value())
                .with_response_time(elapsed.as_secs_f64())
                .on(self.today),
        )?;
        self.stats.add(quality, elapsed);

        Ok(Some(updated))
    }

    /// Drop the current card without grading it; it stays due
    pub fn skip(&mut self) {
        if self.queue.pop_front().is_some() {
            self.stats.skipped += 1;
        }
    }
}

/// Recall drill over built-in concepts that are due
pub struct ConceptDrill<'a> {
    concepts: ConceptStorage<'a>,
    log: PerformanceLog<'a>,
    queue: VecDeque<KnowledgeNode>,
    total: usize,
    today: NaiveDate,
    stats: SessionStats,
}

impl<'a> ConceptDrill<'a> {
    /// Load due concepts: unseen first, then by due date, then weakest mastery
    pub fn start(
        db: &'a Database,
        today: NaiveDate,
        subject: Option<Subject>,
        limit: Option<usize>,
    ) -> Result<Self> {
        let concepts = ConceptStorage::new(db);
        let mut due = concepts.due_concepts(today, subject)?;
        if let Some(limit) = limit {
            due.truncate(limit);
        }
        log::info!("Concept drill started with {} concepts", due.len());

        Ok(Self {
            concepts,
            log: PerformanceLog::new(db),
            total: due.len(),
            queue: due.into(),
            today,
            stats: SessionStats::default(),
        })
    }

    pub fn current(&self) -> Option<&KnowledgeNode> {
        self.queue.front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn position(&self) -> usize {
        self.total - self.queue.len() + 1
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Grade recall of the current concept and advance
    pub fn grade(&mut self, quality: Quality, elapsed: Duration) -> Result<Option<KnowledgeNode>> {
        let Some(concept) = self.queue.pop_front() else {
            return Ok(None);
        };

        let updated = self.concepts.review_concept(&concept.id, quality, self.today)?;
        self.log.record(
            &PerformanceRecord::new(concept.subject, PracticeKind::Concept, quality.is_correct())
                .with_item(concept.id.clone())
                .with_quality(quality.value())
                .with_response_time(elapsed.as_secs_f64())
                .on(self.today),
        )?;
        self.stats.add(quality, elapsed);

        Ok(Some(updated))
    }

    pub fn skip(&mut self) {
        if self.queue.pop_front().is_some() {
            self.stats.skipped += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::NewCard;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
    }

    fn seed_cards(db: &Database, count: usize) {
        let storage = FlashcardStorage::new(db);
        for i in 0..count {
            storage
                .create_card(
                    NewCard {
                        front: format!("Q{}", i),
                        back: format!("A{}", i),
                        subject: if i % 2 == 0 { Subject::Torts } else { Subject::Evidence },
                        tags: Vec::new(),
                    },
                    today(),
                )
                .unwrap();
        }
    }

    #[test]
    fn test_review_session_grades_and_logs() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(&temp_dir.path().join("study.db")).unwrap();
        seed_cards(&db, 3);

        let mut session = ReviewSession::start(&db, today(), None, None).unwrap();
        assert_eq!(session.total(), 3);
        assert_eq!(session.position(), 1);

        let first = session
            .grade(Quality::new(5).unwrap(), Duration::from_secs(4))
            .unwrap()
            .unwrap();
        assert_eq!(first.schedule.interval, 1);
        assert_eq!(first.schedule.next_review, NaiveDate::from_ymd_opt(2026, 4, 2).unwrap());

        session.grade(Quality::new(2).unwrap(), Duration::from_secs(10)).unwrap();
        session.skip();
        assert!(session.is_finished());
        assert!(session.grade(Quality::new(5).unwrap(), Duration::ZERO).unwrap().is_none());

        let stats = session.stats();
        assert_eq!(stats.reviewed, 2);
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.accuracy(), 0.5);
        assert_eq!(stats.avg_response_time(), 7.0);

        let log = PerformanceLog::new(&db);
        let records = log.by_kind(PracticeKind::Flashcard).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].quality, Some(5));
        assert_eq!(records[0].study_date, today());
        assert!(!records[1].correct);

        // The failed card and the skipped card are still due tomorrow
        let due = FlashcardStorage::new(&db)
            .get_due_cards(NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(), None, None)
            .unwrap();
        assert_eq!(due.len(), 3);
        let due_today = FlashcardStorage::new(&db).get_due_cards(today(), None, None).unwrap();
        assert_eq!(due_today.len(), 1);
    }

    #[test]
    fn test_review_session_respects_subject_and_limit() {
        let db = Database::open_in_memory().unwrap();
        seed_cards(&db, 5);

        let session = ReviewSession::start(&db, today(), Some(Subject::Torts), None).unwrap();
        assert_eq!(session.total(), 3);
        assert!(session.current().unwrap().subject == Subject::Torts);

        let session = ReviewSession::start(&db, today(), None, Some(2)).unwrap();
        assert_eq!(session.total(), 2);
    }

    #[test]
    fn test_concept_drill_orders_weakest_first() {
        let db = Database::open_in_memory().unwrap();
        let concepts = ConceptStorage::new(&db);
        let evidence = concepts.list_concepts(Some(Subject::Evidence)).unwrap();
        assert!(evidence.len() >= 2);

        // Reviewed with a pass: due tomorrow, so it drops out of today's drill
        concepts
            .review_concept(&evidence[0].id, Quality::new(5).unwrap(), today())
            .unwrap();

        let mut drill = ConceptDrill::start(&db, today(), Some(Subject::Evidence), None).unwrap();
        assert_eq!(drill.total(), evidence.len() - 1);
        assert!(drill.current().unwrap().id != evidence[0].id);

        let graded = drill
            .grade(Quality::new(4).unwrap(), Duration::from_secs(20))
            .unwrap()
            .unwrap();
        assert_eq!(graded.progress.review_count, 1);
        assert!(graded.progress.mastery_level > 0.0);

        let records = PerformanceLog::new(&db).by_kind(PracticeKind::Concept).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item_id.as_deref(), Some(graded.id.as_str()));
    }

    #[test]
    fn test_concept_drill_limit() {
        let db = Database::open_in_memory().unwrap();
        let drill = ConceptDrill::start(&db, today(), None, Some(4)).unwrap();
        assert_eq!(drill.total(), 4);
        assert_eq!(drill.remaining(), 4);
    }
}
