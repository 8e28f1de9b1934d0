//! Data models for the flashcard system

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::{ReviewResult, Sm2State, DEFAULT_EASE_FACTOR};
use crate::subjects::Subject;

/// A flashcard with question (front) and answer (back) and its schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningCard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    pub subject: Subject,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub schedule: CardSchedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearningCard {
    /// A new card, due on `today`
    pub fn new(subject: Subject, front: String, back: String, today: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            front,
            back,
            subject,
            tags: Vec::new(),
            schedule: CardSchedule::new(today),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Check if the card is due for review
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.schedule.next_review <= today
    }
}

/// Spaced repetition fields for a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSchedule {
    /// SM-2 ease factor (default 2.5)
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Current interval in days
    #[serde(default)]
    pub interval: u32,
    /// Consecutive correct reviews
    #[serde(default)]
    pub repetitions: u32,
    /// Calendar date the card is next due
    pub next_review: NaiveDate,
    /// Total number of reviews
    #[serde(default)]
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

impl CardSchedule {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
            next_review: today,
            review_count: 0,
            last_reviewed: None,
        }
    }

    pub fn sm2(&self) -> Sm2State {
        Sm2State {
            ease_factor: self.ease_factor,
            interval: self.interval,
            repetitions: self.repetitions,
        }
    }

    /// Clamp the SM-2 fields into their valid ranges
    pub fn normalize(&mut self) {
        let state = self.sm2().normalized();
        self.ease_factor = state.ease_factor;
        self.interval = state.interval;
    }

    /// Fold a review result into the schedule
    pub fn apply(&mut self, result: &ReviewResult, reviewed_at: DateTime<Utc>) {
        self.ease_factor = result.ease_factor;
        self.interval = result.interval;
        self.repetitions = result.repetitions;
        self.next_review = result.next_review;
        self.review_count += 1;
        self.last_reviewed = Some(reviewed_at);
    }

    pub fn is_new(&self) -> bool {
        self.review_count == 0
    }
}

/// Fields accepted when creating a card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub front: String,
    pub back: String,
    pub subject: Subject,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::algorithm::{review, Quality};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 10).unwrap()
    }

    #[test]
    fn test_new_card_is_due_today() {
        let card = LearningCard::new(
            Subject::Torts,
            "Elements of negligence?".to_string(),
            "Duty, breach, causation, damages".to_string(),
            today(),
        );
        assert!(card.is_due(today()));
        assert!(card.schedule.is_new());
        assert_eq!(card.schedule.ease_factor, 2.5);
    }

    #[test]
    fn test_apply_review() {
        let mut schedule = CardSchedule::new(today());
        let result = review(&schedule.sm2(), Quality::new(5).unwrap(), today());
        schedule.apply(&result, Utc::now());

        assert_eq!(schedule.repetitions, 1);
        assert_eq!(schedule.review_count, 1);
        assert!(schedule.last_reviewed.is_some());
        assert_eq!(schedule.next_review, NaiveDate::from_ymd_opt(2026, 5, 11).unwrap());
    }

    #[test]
    fn test_card_json_is_flat() {
        let card = LearningCard::new(
            Subject::Evidence,
            "Hearsay?".to_string(),
            "Out-of-court statement offered for its truth".to_string(),
            today(),
        );
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["subject"], "evidence");
        assert_eq!(value["easeFactor"], 2.5);
        assert_eq!(value["nextReview"], "2026-05-10");
        assert!(value.get("schedule").is_none());
    }

    #[test]
    fn test_card_json_defaults_schedule_fields() {
        let json = r#"{
            "id": "0b5f7b0c-3f34-4a3e-9a49-3c4cc0d9e6a1",
            "front": "Q",
            "back": "A",
            "subject": "torts",
            "nextReview": "2026-01-01",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }"#;
        let card: LearningCard = serde_json::from_str(json).unwrap();
        assert_eq!(card.schedule.ease_factor, 2.5);
        assert_eq!(card.schedule.repetitions, 0);
        assert!(card.tags.is_empty());
    }
}
