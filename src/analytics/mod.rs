//! Study dashboard
//!
//! Aggregates the `cards` and `performance` tables with plain COUNT/AVG
//! queries and folds in concept mastery.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rusqlite::params;
use serde::Serialize;

use crate::knowledge::ConceptStorage;
use crate::storage::{format_date, parse_column, parse_date, Database, Result};
use crate::subjects::Subject;

/// Subjects need this many attempts before they can be called weak
pub const MIN_ATTEMPTS_FOR_WEAKNESS: usize = 3;

const WEAKEST_LIMIT: usize = 3;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: Option<NaiveDate>,
    pub total_cards: usize,
    pub due_cards: usize,
    pub new_cards: usize,
    pub reviews_today: usize,
    pub correct_today: usize,
    pub total_attempts: usize,
    pub overall_accuracy: Option<f64>,
    pub avg_response_time: Option<f64>,
    pub streak_days: u32,
    pub subjects: Vec<SubjectStats>,
    pub weakest: Vec<Subject>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub subject: Subject,
    pub cards: usize,
    pub due_cards: usize,
    pub attempts: usize,
    pub correct: usize,
    pub accuracy: Option<f64>,
    pub avg_response_time: Option<f64>,
    pub concepts: usize,
    pub avg_mastery: Option<f64>,
}

impl SubjectStats {
    fn empty(subject: Subject) -> Self {
        Self {
            subject,
            cards: 0,
            due_cards: 0,
            attempts: 0,
            correct: 0,
            accuracy: None,
            avg_response_time: None,
            concepts: 0,
            avg_mastery: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.cards == 0 && self.attempts == 0 && self.concepts == 0
    }
}

/// Build the dashboard as of `today`
pub fn build_dashboard(db: &Database, today: NaiveDate) -> Result<Dashboard> {
    let conn = db.conn();
    let today_str = format_date(today);
    let mut subjects: BTreeMap<Subject, SubjectStats> = Subject::ALL
        .iter()
        .map(|&s| (s, SubjectStats::empty(s)))
        .collect();

    // Cards per subject
    let mut stmt = conn.prepare(
        "SELECT subject, COUNT(*), \
         COALESCE(SUM(CASE WHEN next_review <= ?1 THEN 1 ELSE 0 END), 0), \
         COALESCE(SUM(CASE WHEN review_count = 0 THEN 1 ELSE 0 END), 0) \
         FROM cards GROUP BY subject",
    )?;
    let card_rows = stmt.query_map(params![today_str], |row| {
        let subject: String = row.get(0)?;
        Ok((
            parse_column::<Subject>(0, &subject)?,
            row.get::<_, i64>(1)? as usize,
            row.get::<_, i64>(2)? as usize,
            row.get::<_, i64>(3)? as usize,
        ))
    })?;

    let mut dashboard = Dashboard {
        today: Some(today),
        ..Default::default()
    };
    for row in card_rows {
        let (subject, cards, due, new) = row?;
        let stats = subjects.entry(subject).or_insert_with(|| SubjectStats::empty(subject));
        stats.cards = cards;
        stats.due_cards = due;
        dashboard.total_cards += cards;
        dashboard.due_cards += due;
        dashboard.new_cards += new;
    }

    // Attempts per subject
    let mut stmt = conn.prepare(
        "SELECT subject, COUNT(*), COALESCE(SUM(correct), 0), AVG(response_time) \
         FROM performance GROUP BY subject",
    )?;
    let perf_rows = stmt.query_map([], |row| {
        let subject: String = row.get(0)?;
        Ok((
            parse_column::<Subject>(0, &subject)?,
            row.get::<_, i64>(1)? as usize,
            row.get::<_, i64>(2)? as usize,
            row.get::<_, Option<f64>>(3)?,
        ))
    })?;
    for row in perf_rows {
        let (subject, attempts, correct, avg_time) = row?;
        let stats = subjects.entry(subject).or_insert_with(|| SubjectStats::empty(subject));
        stats.attempts = attempts;
        stats.correct = correct;
        stats.accuracy = ratio(correct, attempts);
        stats.avg_response_time = avg_time;
    }

    let (attempts, correct, avg_time): (i64, i64, Option<f64>) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(correct), 0), AVG(response_time) FROM performance",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    dashboard.total_attempts = attempts as usize;
    dashboard.overall_accuracy = ratio(correct as usize, attempts as usize);
    dashboard.avg_response_time = avg_time;

    let (reviews_today, correct_today): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(correct), 0) FROM performance WHERE study_date = ?1",
        params![today_str],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    dashboard.reviews_today = reviews_today as usize;
    dashboard.correct_today = correct_today as usize;

    let mut stmt = conn.prepare("SELECT DISTINCT study_date FROM performance")?;
    let days = stmt
        .query_map([], |row| {
            let day: String = row.get(0)?;
            parse_date(0, &day)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    dashboard.streak_days = study_streak(&days, today);

    // Concept mastery per subject
    for concept in ConceptStorage::new(db).list_concepts(None)? {
        let stats = subjects
            .entry(concept.subject)
            .or_insert_with(|| SubjectStats::empty(concept.subject));
        let total = stats.avg_mastery.unwrap_or(0.0) * stats.concepts as f64;
        stats.concepts += 1;
        stats.avg_mastery = Some((total + concept.progress.mastery_level) / stats.concepts as f64);
    }

    dashboard.weakest = weakest_subjects(subjects.values());
    dashboard.subjects = subjects.into_values().filter(|s| !s.is_empty()).collect();

    Ok(dashboard)
}

fn ratio(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64)
    }
}

/// Lowest-accuracy subjects among those with enough attempts
fn weakest_subjects<'a>(stats: impl Iterator<Item = &'a SubjectStats>) -> Vec<Subject> {
    let mut candidates: Vec<(Subject, f64)> = stats
        .filter(|s| s.attempts >= MIN_ATTEMPTS_FOR_WEAKNESS)
        .filter_map(|s| s.accuracy.map(|a| (s.subject, a)))
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    candidates.into_iter().take(WEAKEST_LIMIT).map(|(s, _)| s).collect()
}

/// Consecutive study days ending today, or yesterday if nothing yet today
pub fn study_streak(days: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut day = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        day = day - Duration::days(1);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::{FlashcardStorage, NewCard, Quality};
    use crate::performance::{PerformanceLog, PerformanceRecord, PracticeKind};

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 15).unwrap() + Duration::days(offset)
    }

    fn card(subject: Subject, front: &str) -> NewCard {
        NewCard {
            front: front.to_string(),
            back: "back".to_string(),
            subject,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_streak() {
        assert_eq!(study_streak(&[], day(0)), 0);
        assert_eq!(study_streak(&[day(0), day(-1), day(-2), day(-4)], day(0)), 3);
        // Nothing yet today keeps yesterday's streak alive
        assert_eq!(study_streak(&[day(-1), day(-2)], day(0)), 2);
        assert_eq!(study_streak(&[day(-2), day(-3)], day(0)), 0);
    }

    #[test]
    fn test_empty_dashboard() {
        let db = Database::open_in_memory().unwrap();
        let dashboard = build_dashboard(&db, day(0)).unwrap();

        assert_eq!(dashboard.total_cards, 0);
        assert_eq!(dashboard.overall_accuracy, None);
        assert_eq!(dashboard.streak_days, 0);
        assert!(dashboard.weakest.is_empty());
        // Built-in concepts still show up per subject
        assert!(dashboard.subjects.iter().any(|s| s.concepts > 0));
    }

    #[test]
    fn test_dashboard_aggregates() {
        let db = Database::open_in_memory().unwrap();
        let cards = FlashcardStorage::new(&db);
        let log = PerformanceLog::new(&db);

        let torts = cards.create_card(card(Subject::Torts, "t1"), day(0)).unwrap();
        cards.create_card(card(Subject::Torts, "t2"), day(3)).unwrap();
        cards.create_card(card(Subject::Evidence, "e1"), day(-1)).unwrap();
        cards.submit_review(torts.id, Quality::new(5).unwrap(), day(0)).unwrap();

        let entries = [
            (Subject::Torts, true, 4.0, day(0)),
            (Subject::Torts, true, 6.0, day(0)),
            (Subject::Torts, false, 8.0, day(-1)),
            (Subject::Evidence, false, 2.0, day(-1)),
            (Subject::Evidence, false, 2.0, day(-2)),
            (Subject::Evidence, true, 2.0, day(-2)),
        ];
        for (subject, correct, secs, date) in entries {
            log.record(
                &PerformanceRecord::new(subject, PracticeKind::Flashcard, correct)
                    .with_response_time(secs)
                    .on(date),
            )
            .unwrap();
        }

        let dashboard = build_dashboard(&db, day(0)).unwrap();

        assert_eq!(dashboard.total_cards, 3);
        // t1 was pushed to tomorrow, t2 is in the future, e1 is overdue
        assert_eq!(dashboard.due_cards, 1);
        assert_eq!(dashboard.new_cards, 2);
        assert_eq!(dashboard.total_attempts, 6);
        assert_eq!(dashboard.reviews_today, 2);
        assert_eq!(dashboard.correct_today, 2);
        assert_eq!(dashboard.streak_days, 3);
        assert!((dashboard.overall_accuracy.unwrap() - 0.5).abs() < 1e-9);
        assert!((dashboard.avg_response_time.unwrap() - 4.0).abs() < 1e-9);

        let torts_stats = dashboard.subjects.iter().find(|s| s.subject == Subject::Torts).unwrap();
        assert_eq!(torts_stats.cards, 2);
        assert_eq!(torts_stats.attempts, 3);
        assert!((torts_stats.accuracy.unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert!((torts_stats.avg_response_time.unwrap() - 6.0).abs() < 1e-9);

        assert_eq!(dashboard.weakest, vec![Subject::Evidence, Subject::Torts]);
    }

    #[test]
    fn test_concept_mastery_feeds_dashboard() {
        let db = Database::open_in_memory().unwrap();
        let concepts = ConceptStorage::new(&db);
        concepts
            .review_concept("crim-miranda", Quality::new(5).unwrap(), day(0))
            .unwrap();

        let dashboard = build_dashboard(&db, day(0)).unwrap();
        let crim = dashboard
            .subjects
            .iter()
            .find(|s| s.subject == Subject::CriminalLaw)
            .unwrap();
        assert_eq!(crim.concepts, 3);
        assert!((crim.avg_mastery.unwrap() - 0.1).abs() < 1e-9);
    }
}
