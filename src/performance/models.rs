use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::subjects::Subject;

/// What kind of practice produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeKind {
    Flashcard,
    Concept,
    Mbe,
    Essay,
}

#[derive(Error, Debug)]
#[error("Unknown practice kind: {0}")]
pub struct UnknownPracticeKind(String);

impl PracticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PracticeKind::Flashcard => "flashcard",
            PracticeKind::Concept => "concept",
            PracticeKind::Mbe => "mbe",
            PracticeKind::Essay => "essay",
        }
    }
}

impl fmt::Display for PracticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PracticeKind {
    type Err = UnknownPracticeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flashcard" => Ok(PracticeKind::Flashcard),
            "concept" => Ok(PracticeKind::Concept),
            "mbe" => Ok(PracticeKind::Mbe),
            "essay" => Ok(PracticeKind::Essay),
            other => Err(UnknownPracticeKind(other.to_string())),
        }
    }
}

/// One answered item. Records are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    /// Row id, assigned by the database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    /// Local calendar day the answer was given, used for daily counts and streaks
    pub study_date: NaiveDate,
    pub subject: Subject,
    pub kind: PracticeKind,
    /// Card id, concept id or other item reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub correct: bool,
    /// SM-2 style rating when one was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    /// Seconds from prompt to answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

impl PerformanceRecord {
    pub fn new(subject: Subject, kind: PracticeKind, correct: bool) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            study_date: Local::now().date_naive(),
            subject,
            kind,
            item_id: None,
            correct,
            quality: None,
            response_time: None,
        }
    }

    pub fn with_item(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_response_time(mut self, seconds: f64) -> Self {
        self.response_time = Some(seconds);
        self
    }

    pub fn on(mut self, study_date: NaiveDate) -> Self {
        self.study_date = study_date;
        self
    }
}
