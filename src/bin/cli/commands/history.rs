use anyhow::{Context, Result};

use barprep_lib::storage::jsonl;
use barprep_lib::tutor::QuizAttempt;
use barprep_lib::Subject;

use crate::app::App;
use crate::render::terminal::{paint, rule, truncate, Color};
use crate::OutputFormat;

/// Most recent entries of the performance log
pub fn run(
    app: &App,
    limit: usize,
    subject: Option<Subject>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let records = app
        .performance()
        .recent(limit, subject)
        .context("Failed to read performance log")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Plain => {
            if records.is_empty() {
                println!("No practice recorded yet.");
                return Ok(());
            }

            println!(
                "{:<16} {:<10} {:<24} {:<8} {:>7} {:>7}",
                "When", "Kind", "Subject", "Result", "Rating", "Time"
            );
            println!(
                "{} {} {} {} {} {}",
                rule(16),
                rule(10),
                rule(24),
                rule(8),
                rule(7),
                rule(7)
            );

            for record in &records {
                let result = if record.correct {
                    paint(&format!("{:<8}", "right"), Color::GREEN, use_color)
                } else {
                    paint(&format!("{:<8}", "wrong"), Color::RED, use_color)
                };
                let rating = record
                    .quality
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let time = record
                    .response_time
                    .map(|t| format!("{:.1}s", t))
                    .unwrap_or_else(|| "-".to_string());

                println!(
                    "{:<16} {:<10} {:<24} {} {:>7} {:>7}",
                    record
                        .timestamp
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string(),
                    record.kind.as_str(),
                    record.subject.name(),
                    result,
                    rating,
                    time
                );
            }
        }
    }

    Ok(())
}

/// Last quiz questions from the JSONL transcript
pub fn run_quiz(app: &App, limit: usize, format: &OutputFormat, use_color: bool) -> Result<()> {
    let path = app.quiz_history_path();
    let attempts: Vec<QuizAttempt> = jsonl::read_last_records(&path, limit)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&attempts)?),
        OutputFormat::Plain => {
            if attempts.is_empty() {
                println!("No quiz history yet. Run `barprep quiz`.");
                return Ok(());
            }

            for attempt in attempts.iter().rev() {
                let mark = if attempt.correct {
                    paint("\u{2713}", Color::GREEN, use_color)
                } else {
                    paint("\u{2717}", Color::RED, use_color)
                };
                println!(
                    "{} {} {:<24} {} (you {}, key {}) {:.0}s",
                    mark,
                    attempt
                        .timestamp
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string(),
                    attempt.subject.name(),
                    truncate(&attempt.question.stem, 50),
                    attempt.user_answer,
                    attempt.question.answer,
                    attempt.response_time
                );
            }
        }
    }

    Ok(())
}
