use std::time::Instant;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;

use barprep_lib::performance::{PerformanceRecord, PracticeKind};
use barprep_lib::Subject;

use crate::app::App;
use crate::prompt;
use crate::render::terminal::{heading, paint, print_list, print_wrapped, Color};

pub fn run(app: &App, subject: Option<Subject>, use_color: bool) -> Result<()> {
    let tutor = app.tutor()?;
    let subject = match subject {
        Some(s) => s,
        None => *Subject::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&Subject::Contracts),
    };

    println!("{}", paint(&format!("Generating a {} essay question...", subject), Color::GRAY, use_color));
    let essay_prompt = match tutor.generate_essay(subject) {
        Ok(p) => p,
        Err(e) => {
            println!("{}", paint(&format!("Could not get an essay question: {}", e), Color::RED, use_color));
            return Ok(());
        }
    };

    println!("\n{}", heading(&format!("{} essay", subject), use_color));
    print_wrapped(&essay_prompt.fact_pattern, "");
    println!();
    print_wrapped(&essay_prompt.call_of_question, "");
    println!();

    let started = Instant::now();
    let essay = prompt::read_block("Write your answer:")?;
    let elapsed = started.elapsed().as_secs_f64();

    if essay.trim().is_empty() {
        println!("No answer given.");
        print_list("Issues to spot", &essay_prompt.issues, use_color);
        return Ok(());
    }

    println!("{}", paint("Grading...", Color::GRAY, use_color));
    let grade = match tutor.grade_essay(subject, &essay_prompt, &essay) {
        Ok(g) => g,
        Err(e) => {
            println!("{}", paint(&format!("Could not grade the essay: {}", e), Color::RED, use_color));
            return Ok(());
        }
    };

    let score_color = if grade.is_passing() { Color::GREEN } else { Color::RED };
    println!(
        "\n{} {}",
        heading("Score:", use_color),
        paint(&format!("{}/6", grade.score), score_color, use_color)
    );
    print_wrapped(&grade.summary, "  ");
    print_list("Strengths", &grade.strengths, use_color);
    print_list("Weaknesses", &grade.weaknesses, use_color);
    print_list("Issues missed", &grade.issues_missed, use_color);

    app.performance()
        .record(
            &PerformanceRecord::new(subject, PracticeKind::Essay, grade.is_passing())
                .with_response_time(elapsed)
                .on(App::today()),
        )
        .context("Failed to record essay")?;

    Ok(())
}
