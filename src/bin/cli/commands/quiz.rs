use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use rand::seq::SliceRandom;

use barprep_lib::knowledge::KnowledgeNode;
use barprep_lib::performance::{PerformanceRecord, PracticeKind};
use barprep_lib::storage::jsonl;
use barprep_lib::tutor::{Difficulty, GeneratedQuestion, QuizAttempt};
use barprep_lib::Subject;

use crate::app::App;
use crate::prompt;
use crate::render::terminal::{heading, paint, percent, print_wrapped, verdict, Color};

/// How many of a subject's weakest concepts a question may target
const WEAK_CONCEPT_POOL: usize = 3;

pub fn run(
    app: &App,
    subject: Option<Subject>,
    count: Option<usize>,
    difficulty: Difficulty,
    use_color: bool,
) -> Result<()> {
    let tutor = app.tutor()?;
    let count = count.unwrap_or(app.config.review.quiz_length).max(1);
    let history_path = app.quiz_history_path();
    let mut rng = rand::thread_rng();

    let mut answered = 0usize;
    let mut correct = 0usize;

    println!("{}", heading(&format!("MBE quiz: {} {} questions", count, difficulty), use_color));

    for number in 1..=count {
        let subject = match subject {
            Some(s) => s,
            None => *Subject::MBE.choose(&mut rng).unwrap_or(&Subject::Torts),
        };
        let target = pick_concept(app, subject, &mut rng)?;

        println!(
            "\n{} {}",
            paint(&format!("[{}/{}]", number, count), Color::GRAY, use_color),
            paint(subject.name(), Color::CYAN, use_color)
        );
        println!("{}", paint("Generating question...", Color::GRAY, use_color));

        let question = match tutor.generate_question(subject, target.as_ref(), difficulty) {
            Ok(q) => q,
            Err(e) => {
                println!("{}", paint(&format!("Could not get a question: {}", e), Color::RED, use_color));
                continue;
            }
        };

        print_question(&question);
        let letters: Vec<char> = question.choice_letters().collect();

        let started = Instant::now();
        let Some(letter) = prompt::read_choice(&letters)? else {
            break;
        };
        let elapsed = started.elapsed().as_secs_f64();

        let is_correct = question.is_correct(letter);
        answered += 1;
        if is_correct {
            correct += 1;
        }

        println!("\n{}", verdict(is_correct, use_color));
        if !is_correct {
            println!(
                "Answer: {}) {}",
                question.answer,
                question.answer_text().unwrap_or_default()
            );
        }
        print_wrapped(&question.explanation, "  ");

        let item = target
            .as_ref()
            .map(|c| c.id.clone())
            .or_else(|| question.concept.clone());
        let mut record = PerformanceRecord::new(subject, PracticeKind::Mbe, is_correct)
            .with_response_time(elapsed)
            .on(App::today());
        if let Some(item) = item {
            record = record.with_item(item);
        }
        app.performance()
            .record(&record)
            .context("Failed to record answer")?;

        let attempt = QuizAttempt {
            timestamp: Utc::now(),
            subject,
            question,
            user_answer: letter,
            correct: is_correct,
            response_time: elapsed,
        };
        if let Err(e) = jsonl::append_record(&history_path, &attempt) {
            log::warn!("Failed to append to quiz history {:?}: {}", history_path, e);
        }
    }

    println!("\n{}", heading("Quiz complete", use_color));
    if answered > 0 {
        println!(
            "  {} of {} correct ({})",
            correct,
            answered,
            percent(correct as f64 / answered as f64)
        );
    } else {
        println!("  No questions answered.");
    }

    Ok(())
}

/// Aim at one of the subject's weakest concepts, if it has any
fn pick_concept(app: &App, subject: Subject, rng: &mut impl rand::Rng) -> Result<Option<KnowledgeNode>> {
    let mut concepts = app
        .concepts()
        .list_concepts(Some(subject))
        .context("Failed to list concepts")?;
    concepts.sort_by(|a, b| a.progress.mastery_level.total_cmp(&b.progress.mastery_level));
    concepts.truncate(WEAK_CONCEPT_POOL);

    Ok(concepts.choose(rng).cloned())
}

fn print_question(question: &GeneratedQuestion) {
    println!();
    print_wrapped(&question.stem, "");
    println!();
    for (letter, choice) in question.choice_letters().zip(&question.choices) {
        print_wrapped(&format!("{}) {}", letter, choice), "  ");
    }
}
