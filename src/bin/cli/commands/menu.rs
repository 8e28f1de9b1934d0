use anyhow::{Context, Result};

use barprep_lib::tutor::Difficulty;

use crate::app::App;
use crate::commands;
use crate::prompt;
use crate::render::terminal::{heading, paint, Color};
use crate::OutputFormat;

const ITEMS: [&str; 11] = [
    "Review due flashcards",
    "Concept drill",
    "MBE quiz",
    "Essay practice",
    "Explain a concept",
    "Ask the tutor",
    "Add a flashcard",
    "Generate flashcards",
    "Browse concepts",
    "Dashboard",
    "Recent history",
];

/// Numbered text menu. An action that fails is reported and the menu carries on.
pub fn run(app: &App, use_color: bool) -> Result<()> {
    loop {
        print_menu(app, use_color);

        let Some(choice) = prompt::read_line("\nChoose: ")? else {
            return Ok(());
        };
        let outcome = match choice.as_str() {
            "0" | "q" | "quit" => return Ok(()),
            "" => continue,
            "1" => commands::review::run(app, None, None, use_color),
            "2" => prompt::read_subject("Subject (Enter for all): ")
                .and_then(|subject| commands::concepts::run_drill(app, subject, None, use_color)),
            "3" => prompt::read_subject("Subject (Enter for mixed MBE): ")
                .and_then(|subject| commands::quiz::run(app, subject, None, Difficulty::Medium, use_color)),
            "4" => prompt::read_subject("Subject (Enter for random): ")
                .and_then(|subject| commands::essay::run(app, subject, use_color)),
            "5" => explain(app, use_color),
            "6" => commands::tutor::run_ask(app, None, use_color),
            "7" => add_card(app),
            "8" => generate(app),
            "9" => commands::concepts::run_list(app, None, &OutputFormat::Plain, use_color),
            "10" => commands::stats::run(app, &OutputFormat::Plain, use_color),
            "11" => commands::history::run(app, 20, None, &OutputFormat::Plain, use_color),
            other => {
                println!("Unknown choice '{}'", other);
                continue;
            }
        };

        if let Err(e) = outcome {
            println!("{}", paint(&format!("Error: {:#}", e), Color::RED, use_color));
        }
    }
}

fn print_menu(app: &App, use_color: bool) {
    let due = app
        .cards()
        .get_due_cards(App::today(), None, None)
        .map(|cards| cards.len())
        .unwrap_or(0);

    println!("\n{}", heading("Iowa Bar Prep", use_color));
    if due > 0 {
        println!("{}", paint(&format!("{} cards due today", due), Color::YELLOW, use_color));
    }
    for (i, item) in ITEMS.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, item);
    }
    println!("   0. Quit");
}

fn explain(app: &App, use_color: bool) -> Result<()> {
    let Some(query) = prompt::read_line("Concept id or name: ")? else {
        return Ok(());
    };
    if query.is_empty() {
        return Ok(());
    }
    commands::tutor::run_explain(app, &query, use_color)
}

fn add_card(app: &App) -> Result<()> {
    let Some(subject) = prompt::read_subject("Subject: ")? else {
        println!("A subject is required.");
        return Ok(());
    };
    let front = prompt::read_line("Front: ")?.unwrap_or_default();
    let back = prompt::read_line("Back: ")?.unwrap_or_default();
    let tags = prompt::read_line("Tags (comma-separated, optional): ")?.unwrap_or_default();

    commands::card::run_add(
        app,
        subject,
        front,
        back,
        Some(tags.as_str()).filter(|t| !t.is_empty()),
        &OutputFormat::Plain,
    )
}

fn generate(app: &App) -> Result<()> {
    let Some(subject) = prompt::read_subject("Subject: ")? else {
        println!("A subject is required.");
        return Ok(());
    };
    let count = prompt::read_line("How many cards? [5] ")?
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>())
        .transpose()
        .context("Not a number")?
        .unwrap_or(5);

    commands::generate::run(app, subject, count, None, false, &OutputFormat::Plain)
}
