use anyhow::{Context, Result};

use barprep_lib::analytics::{build_dashboard, MIN_ATTEMPTS_FOR_WEAKNESS};

use crate::app::App;
use crate::render::terminal::{heading, meter, paint, percent, rule, Color};
use crate::OutputFormat;

fn opt_percent(value: Option<f64>) -> String {
    value.map(percent).unwrap_or_else(|| "-".to_string())
}

fn opt_seconds(value: Option<f64>) -> String {
    value
        .map(|s| format!("{:.1}s", s))
        .unwrap_or_else(|| "-".to_string())
}

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let dashboard = build_dashboard(&app.db, App::today()).context("Failed to build dashboard")?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    println!("{}", heading("Study dashboard", use_color));
    println!(
        "  Cards: {} total, {} due, {} new",
        dashboard.total_cards, dashboard.due_cards, dashboard.new_cards
    );
    println!(
        "  Today: {} answered, {} correct",
        dashboard.reviews_today, dashboard.correct_today
    );
    println!(
        "  All time: {} answered, {} accuracy, {} average",
        dashboard.total_attempts,
        opt_percent(dashboard.overall_accuracy),
        opt_seconds(dashboard.avg_response_time)
    );
    let streak = format!(
        "{} day{}",
        dashboard.streak_days,
        if dashboard.streak_days == 1 { "" } else { "s" }
    );
    println!("  Streak: {}", paint(&streak, Color::YELLOW, use_color));

    println!(
        "\n{:<24} {:>5} {:>4} {:>8} {:>8} {:>7}  {}",
        "Subject", "Cards", "Due", "Answered", "Accuracy", "Time", "Mastery"
    );
    println!(
        "{} {} {} {} {} {}  {}",
        rule(24),
        rule(5),
        rule(4),
        rule(8),
        rule(8),
        rule(7),
        rule(16)
    );
    for stats in &dashboard.subjects {
        let mastery = stats
            .avg_mastery
            .map(|m| format!("{} {}", meter(m, use_color), percent(m)))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:>5} {:>4} {:>8} {:>8} {:>7}  {}",
            stats.subject.name(),
            stats.cards,
            stats.due_cards,
            stats.attempts,
            opt_percent(stats.accuracy),
            opt_seconds(stats.avg_response_time),
            mastery
        );
    }

    if dashboard.weakest.is_empty() {
        println!(
            "\n{}",
            paint(
                &format!(
                    "Answer at least {} questions in a subject to see weak areas.",
                    MIN_ATTEMPTS_FOR_WEAKNESS
                ),
                Color::GRAY,
                use_color
            )
        );
    } else {
        let names: Vec<&str> = dashboard.weakest.iter().map(|s| s.name()).collect();
        println!("\nFocus next on: {}", paint(&names.join(", "), Color::RED, use_color));
    }

    Ok(())
}
