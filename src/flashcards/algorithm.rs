//! SM-2 Spaced Repetition Algorithm
//!
//! Implementation of the SuperMemo 2 algorithm for calculating
//! review intervals based on user performance. Flashcards and knowledge
//! concepts are both scheduled through [`review`].
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing answer, remembered
//! - 2: Incorrect, but answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to items that have never been reviewed
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Longest interval ever scheduled, in days (about a century)
pub const MAX_INTERVAL: u32 = 36_500;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Quality must be between 0 and 5, got {0}")]
pub struct InvalidQuality(pub i64);

/// A validated SM-2 quality rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: i64) -> Result<Self, InvalidQuality> {
        if (0..=5).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Ratings of 3 and above count as a successful recall
    pub fn is_correct(self) -> bool {
        self.0 >= 3
    }
}

impl TryFrom<u8> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Quality::new(value as i64)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

/// Scheduling fields shared by flashcards and concepts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sm2State {
    pub ease_factor: f64,
    /// Current interval in days (0 until the first review)
    pub interval: u32,
    /// Consecutive successful reviews
    pub repetitions: u32,
}

impl Sm2State {
    /// Bring a state from outside the scheduler (imports, hand-edited rows)
    /// back inside the ease factor floor and interval cap
    pub fn normalized(self) -> Self {
        let ease_factor = if self.ease_factor.is_finite() {
            self.ease_factor.max(MIN_EASE_FACTOR)
        } else {
            DEFAULT_EASE_FACTOR
        };
        Self {
            ease_factor,
            interval: self.interval.min(MAX_INTERVAL),
            repetitions: self.repetitions,
        }
    }
}

impl Default for Sm2State {
    fn default() -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
        }
    }
}

/// Result of calculating the next review
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewResult {
    pub ease_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
    pub next_review: NaiveDate,
}

impl ReviewResult {
    pub fn state(&self) -> Sm2State {
        Sm2State {
            ease_factor: self.ease_factor,
            interval: self.interval,
            repetitions: self.repetitions,
        }
    }
}

/// Calculate the next review using the SM-2 update.
///
/// The interval for a mature item grows by the ease factor held *before* this
/// review; the ease factor update applies to every rating, including failures.
pub fn review(state: &Sm2State, quality: Quality, reviewed_on: NaiveDate) -> ReviewResult {
    let state = state.normalized();
    let q = quality.value() as i64;

    let (interval, repetitions) = if quality.is_correct() {
        let interval = match state.repetitions {
            0 => 1,
            1 => 6,
            _ => grow_interval(state.interval, state.ease_factor),
        };
        (interval, state.repetitions.saturating_add(1))
    } else {
        (1, 0)
    };

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), computed in hundredths
    let d = 5 - q;
    let delta_hundredths = 10 - d * (8 + 2 * d);
    let ease_factor =
        round_hundredths(state.ease_factor + delta_hundredths as f64 / 100.0).max(MIN_EASE_FACTOR);

    ReviewResult {
        ease_factor,
        interval,
        repetitions,
        next_review: reviewed_on
            .checked_add_days(Days::new(interval as u64))
            .unwrap_or(NaiveDate::MAX),
    }
}

fn grow_interval(interval: u32, ease_factor: f64) -> u32 {
    // Tolerance keeps exact products such as 10 * 2.3 from flooring down a day
    let grown = (interval as f64 * ease_factor + 1e-9).floor();
    (grown.min(MAX_INTERVAL as f64) as u32).max(1)
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calculate the preview intervals for each answer button.
///
/// Returns intervals for: Again (1), Hard (3), Good (4), Easy (5)
pub fn preview_intervals(state: &Sm2State, today: NaiveDate) -> [u32; 4] {
    [1u8, 3, 4, 5].map(|q| review(state, Quality(q), today).interval)
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    if days == 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn q(value: i64) -> Quality {
        Quality::new(value).unwrap()
    }

    fn state(ease_factor: f64, interval: u32, repetitions: u32) -> Sm2State {
        Sm2State {
            ease_factor,
            interval,
            repetitions,
        }
    }

    #[test]
    fn test_first_review_correct() {
        let result = review(&state(2.5, 1, 0), q(5), today());

        assert_eq!(result.interval, 1);
        assert_eq!(result.repetitions, 1);
        assert_eq!(result.ease_factor, 2.6);
        assert_eq!(result.next_review, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn test_second_review_correct() {
        for quality in 3..=5 {
            let result = review(&state(2.5, 1, 1), q(quality), today());
            assert_eq!(result.interval, 6);
            assert_eq!(result.repetitions, 2);
        }
    }

    #[test]
    fn test_subsequent_review_correct() {
        let result = review(&state(2.5, 6, 2), q(4), today());

        // 6 * 2.5 = 15, and quality 4 leaves the ease factor alone
        assert_eq!(result.interval, 15);
        assert_eq!(result.ease_factor, 2.5);
        assert_eq!(result.repetitions, 3);
    }

    #[test]
    fn test_mature_interval_is_floored() {
        // 10 * 2.36 = 23.6
        let result = review(&state(2.36, 10, 4), q(3), today());
        assert_eq!(result.interval, 23);

        // 10 * 2.3 must not drift to 22 through float error
        let result = review(&state(2.3, 10, 4), q(5), today());
        assert_eq!(result.interval, 23);
    }

    #[test]
    fn test_review_incorrect_resets() {
        for quality in 0..3 {
            let result = review(&state(2.5, 30, 7), q(quality), today());
            assert_eq!(result.interval, 1);
            assert_eq!(result.repetitions, 0);
            assert_eq!(result.next_review, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        }
    }

    #[test]
    fn test_ease_factor_deltas() {
        let base = state(2.5, 6, 2);
        let expected = [(0, 1.7), (1, 1.96), (2, 2.18), (3, 2.36), (4, 2.5), (5, 2.6)];
        for (quality, ease) in expected {
            let result = review(&base, q(quality), today());
            assert!(
                (result.ease_factor - ease).abs() < 1e-9,
                "quality {} gave {}",
                quality,
                result.ease_factor
            );
        }
    }

    #[test]
    fn test_ease_factor_minimum() {
        let mut current = state(1.4, 10, 5);

        // Repeated failures never push the ease factor below the floor
        for quality in [0, 1, 2, 0, 3, 0, 1] {
            let result = review(&current, q(quality), today());
            assert!(result.ease_factor >= MIN_EASE_FACTOR);
            current = result.state();
        }
        assert_eq!(current.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_interval_never_below_one() {
        // A corrupt mature state with a zero interval still schedules a day out
        let result = review(&state(2.5, 0, 3), q(5), today());
        assert_eq!(result.interval, 1);
    }

    #[test]
    fn test_out_of_range_state_is_normalized() {
        // An imported schedule with a broken ease factor and a huge interval
        let result = review(&state(0.2, 4_000_000_000, 3), q(5), today());

        assert!(result.ease_factor >= MIN_EASE_FACTOR);
        assert_eq!(result.interval, MAX_INTERVAL);
        assert_eq!(
            result.next_review,
            today().checked_add_days(Days::new(MAX_INTERVAL as u64)).unwrap()
        );

        let preview = preview_intervals(&state(f64::NAN, u32::MAX, 5), today());
        assert_eq!(preview, [1, MAX_INTERVAL, MAX_INTERVAL, MAX_INTERVAL]);
    }

    #[test]
    fn test_review_near_calendar_end_does_not_overflow() {
        let result = review(&state(2.5, MAX_INTERVAL, 9), q(5), NaiveDate::MAX);
        assert_eq!(result.next_review, NaiveDate::MAX);
    }

    #[test]
    fn test_quality_validation() {
        assert!(Quality::new(-1).is_err());
        assert!(Quality::new(6).is_err());
        assert_eq!(Quality::new(3).unwrap().value(), 3);
        assert!(Quality::new(3).unwrap().is_correct());
        assert!(!Quality::new(2).unwrap().is_correct());
        assert!(serde_json::from_str::<Quality>("9").is_err());
    }

    #[test]
    fn test_preview_intervals() {
        let preview = preview_intervals(&state(2.5, 6, 2), today());
        assert_eq!(preview, [1, 15, 15, 15]);

        let preview = preview_intervals(&Sm2State::default(), today());
        assert_eq!(preview, [1, 1, 1, 1]);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }
}
