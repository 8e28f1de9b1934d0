use std::time::Instant;

use anyhow::{Context, Result};

use barprep_lib::flashcards::algorithm::{format_interval, preview_intervals};
use barprep_lib::session::{ReviewSession, SessionStats};
use barprep_lib::Subject;

use crate::app::App;
use crate::prompt::{self, Grade};
use crate::render::terminal::{heading, paint, percent, print_wrapped, Color};

pub fn run(app: &App, subject: Option<Subject>, limit: Option<usize>, use_color: bool) -> Result<()> {
    let today = App::today();
    let limit = limit.unwrap_or(app.config.review.session_limit);
    let mut session = ReviewSession::start(&app.db, today, subject, Some(limit))
        .context("Failed to load due cards")?;

    if session.is_finished() {
        println!("No cards due. Add some with `barprep card add` or `barprep generate`.");
        return Ok(());
    }

    println!(
        "{}",
        heading(&format!("Reviewing {} due cards", session.total()), use_color)
    );

    while let Some(card) = session.current() {
        println!(
            "\n{} {}",
            paint(&format!("[{}/{}]", session.position(), session.total()), Color::GRAY, use_color),
            paint(card.subject.name(), Color::CYAN, use_color)
        );
        print_wrapped(&card.front, "  ");

        let started = Instant::now();
        if prompt::read_line("\nPress Enter to reveal the answer (q to quit) ")?
            .map_or(true, |s| s.eq_ignore_ascii_case("q"))
        {
            break;
        }
        let elapsed = started.elapsed();

        println!("{}", paint("Answer:", Color::GREEN, use_color));
        print_wrapped(&card.back, "  ");

        let [again, hard, good, easy] = preview_intervals(&card.schedule.sm2(), today);
        println!(
            "{}",
            paint(
                &format!(
                    "0-2 again ({}) | 3 hard ({}) | 4 good ({}) | 5 easy ({})",
                    format_interval(again),
                    format_interval(hard),
                    format_interval(good),
                    format_interval(easy)
                ),
                Color::GRAY,
                use_color
            )
        );

        match prompt::read_grade()? {
            Grade::Rated(quality) => {
                if let Some(updated) = session
                    .grade(quality, elapsed)
                    .context("Failed to save review")?
                {
                    println!("Next review {} ({})", updated.schedule.next_review, format_interval(updated.schedule.interval));
                }
            }
            Grade::Skip => session.skip(),
            Grade::Quit => break,
        }
    }

    print_summary(session.stats(), session.remaining(), use_color);
    Ok(())
}

pub fn print_summary(stats: &SessionStats, remaining: usize, use_color: bool) {
    println!("\n{}", heading("Session complete", use_color));
    println!("  Reviewed:  {}", stats.reviewed);
    if stats.reviewed > 0 {
        println!("  Correct:   {} ({})", stats.correct, percent(stats.accuracy()));
        println!("  Avg time:  {:.1}s", stats.avg_response_time());
    }
    if stats.skipped > 0 {
        println!("  Skipped:   {}", stats.skipped);
    }
    if remaining > 0 {
        println!("  Left for later: {}", remaining);
    }
}
