//! Types exchanged with the LLM tutor

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subjects::Subject;

/// OpenAI-compatible chat completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Grok,
}

impl Provider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Grok => "https://api.x.ai/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Grok => "grok-2-latest",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Grok => "XAI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => f.write_str("openai"),
            Provider::Grok => f.write_str("grok"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "grok" | "xai" => Ok(Provider::Grok),
            other => Err(format!("unknown provider '{}', expected openai or grok", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// MBE difficulty requested from the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => f.write_str("easy"),
            Difficulty::Medium => f.write_str("medium"),
            Difficulty::Hard => f.write_str("hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// A generated multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub stem: String,
    /// Answer choices in order, labelled A, B, C, D
    pub choices: Vec<String>,
    /// Letter of the correct choice
    pub answer: char,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
}

impl GeneratedQuestion {
    pub fn choice_letters(&self) -> impl Iterator<Item = char> + '_ {
        (b'A'..).map(char::from).take(self.choices.len())
    }

    /// Whether `letter` (any case) is the keyed answer
    pub fn is_correct(&self, letter: char) -> bool {
        letter.to_ascii_uppercase() == self.answer
    }

    pub fn answer_text(&self) -> Option<&str> {
        if !self.answer.is_ascii_uppercase() {
            return None;
        }
        let idx = (self.answer as u8 - b'A') as usize;
        self.choices.get(idx).map(String::as_str)
    }
}

/// Grading of a free-text answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvaluation {
    pub correct: bool,
    /// 0-5, on the same scale as SM-2 ratings
    pub quality: u8,
    pub feedback: String,
    #[serde(default)]
    pub missing_points: Vec<String>,
}

/// A flashcard proposed by the tutor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub front: String,
    pub back: String,
}

/// An essay fact pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayPrompt {
    pub fact_pattern: String,
    pub call_of_question: String,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Grading of an essay answer on the 1-6 MEE scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayGrade {
    pub score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub issues_missed: Vec<String>,
    pub summary: String,
}

impl EssayGrade {
    /// Scores of 4 and above are passing on the MEE scale
    pub fn is_passing(&self) -> bool {
        self.score >= 4
    }
}

/// One line of the quiz transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub timestamp: DateTime<Utc>,
    pub subject: Subject,
    pub question: GeneratedQuestion,
    pub user_answer: char,
    pub correct: bool,
    pub response_time: f64,
}
