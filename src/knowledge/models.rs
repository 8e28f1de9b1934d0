//! Data models for the knowledge-concept table

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::flashcards::algorithm::{ReviewResult, Sm2State, DEFAULT_EASE_FACTOR};
use crate::subjects::Subject;

/// Weight of the newest rating in the mastery moving average
const MASTERY_WEIGHT: f64 = 0.3;

/// A black-letter rule with its review progress
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeNode {
    pub id: String,
    pub name: String,
    pub subject: Subject,
    /// 1 (foundational) to 5 (hardest)
    pub difficulty: u8,
    pub rule: String,
    pub elements: Vec<String>,
    pub exceptions: Vec<String>,
    pub common_traps: Vec<String>,
    #[serde(flatten)]
    pub progress: ConceptProgress,
}

impl KnowledgeNode {
    /// Whether the concept should come up in a drill on `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.progress.next_review.map_or(true, |d| d <= today)
    }
}

/// Mutable review state for a concept, persisted separately from the static text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptProgress {
    /// Moving average of normalized ratings, 0.0 to 1.0
    pub mastery_level: f64,
    pub ease_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
    pub review_count: u32,
    /// `None` until the first review; unreviewed concepts are always due
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl Default for ConceptProgress {
    fn default() -> Self {
        Self {
            mastery_level: 0.0,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
            review_count: 0,
            next_review: None,
            last_reviewed: None,
        }
    }
}

impl ConceptProgress {
    pub fn sm2(&self) -> Sm2State {
        Sm2State {
            ease_factor: self.ease_factor,
            interval: self.interval,
            repetitions: self.repetitions,
        }
    }

    /// Fold an SM-2 result and the raw rating into the progress
    pub fn apply(&mut self, result: &ReviewResult, quality: u8, reviewed_at: DateTime<Utc>) {
        let score = quality as f64 / 5.0;
        let mastery = self.mastery_level + MASTERY_WEIGHT * (score - self.mastery_level);

        self.mastery_level = ((mastery * 100.0).round() / 100.0).clamp(0.0, 1.0);
        self.ease_factor = result.ease_factor;
        self.interval = result.interval;
        self.repetitions = result.repetitions;
        self.review_count += 1;
        self.next_review = Some(result.next_review);
        self.last_reviewed = Some(reviewed_at);
    }

    /// Coarse label for dashboards
    pub fn mastery_label(&self) -> &'static str {
        match self.mastery_level {
            m if self.review_count == 0 && m == 0.0 => "unseen",
            m if m < 0.4 => "weak",
            m if m < 0.7 => "developing",
            m if m < 0.9 => "solid",
            _ => "mastered",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::algorithm::{review, Quality};

    #[test]
    fn test_mastery_moves_toward_rating() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let mut progress = ConceptProgress::default();

        let result = review(&progress.sm2(), Quality::new(5).unwrap(), today);
        progress.apply(&result, 5, Utc::now());
        assert_eq!(progress.mastery_level, 0.3);
        assert_eq!(progress.review_count, 1);
        assert_eq!(progress.next_review, Some(NaiveDate::from_ymd_opt(2026, 6, 2).unwrap()));

        let result = review(&progress.sm2(), Quality::new(0).unwrap(), today);
        progress.apply(&result, 0, Utc::now());
        assert_eq!(progress.mastery_level, 0.21);
        assert_eq!(progress.repetitions, 0);
    }

    #[test]
    fn test_mastery_labels() {
        let mut progress = ConceptProgress::default();
        assert_eq!(progress.mastery_label(), "unseen");
        progress.review_count = 3;
        progress.mastery_level = 0.5;
        assert_eq!(progress.mastery_label(), "developing");
        progress.mastery_level = 0.95;
        assert_eq!(progress.mastery_label(), "mastered");
    }
}
