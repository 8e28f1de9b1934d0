use anyhow::{bail, Context, Result};

use barprep_lib::flashcards::algorithm::{format_interval, preview_intervals};
use barprep_lib::flashcards::{LearningCard, NewCard};
use barprep_lib::Subject;

use crate::app::App;
use crate::render::terminal::{heading, paint, print_wrapped, rule, truncate, Color};
use crate::OutputFormat;

pub fn run_add(
    app: &App,
    subject: Subject,
    front: String,
    back: String,
    tags: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    if front.trim().is_empty() || back.trim().is_empty() {
        bail!("Both --front and --back must be non-empty");
    }

    let tags = tags
        .map(|t| {
            t.split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let card = app
        .cards()
        .create_card(
            NewCard {
                front: front.trim().to_string(),
                back: back.trim().to_string(),
                subject,
                tags,
            },
            App::today(),
        )
        .context("Failed to create card")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => {
            println!("Added {} card: \"{}\"", card.subject, truncate(&card.front, 60));
            println!("  ID: {}", card.id);
        }
    }

    Ok(())
}

pub fn run_list(
    app: &App,
    subject: Option<Subject>,
    due_only: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let today = App::today();
    let cards = if due_only {
        app.cards().get_due_cards(today, subject, None)
    } else {
        app.cards().list_cards(subject)
    };
    let cards = cards.context("Failed to list cards")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards{}.", if due_only { " due" } else { "" });
                return Ok(());
            }

            let front_width = 48;
            let subject_width = 22;
            println!(
                "{:<8} {:<sw$} {:<fw$} {}",
                "ID",
                "Subject",
                "Front",
                "Next review",
                sw = subject_width,
                fw = front_width
            );
            println!(
                "{} {} {} {}",
                rule(8),
                rule(subject_width),
                rule(front_width),
                rule(11)
            );

            for card in &cards {
                let next = if card.is_due(today) {
                    paint("due", Color::YELLOW, use_color)
                } else {
                    card.schedule.next_review.to_string()
                };
                println!(
                    "{:<8} {:<sw$} {:<fw$} {}",
                    &card.id.to_string()[..8],
                    card.subject.name(),
                    truncate(&card.front, front_width),
                    next,
                    sw = subject_width,
                    fw = front_width
                );
            }

            println!("\n{} cards", cards.len());
        }
    }

    Ok(())
}

pub fn run_show(app: &App, id: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let card = app.find_card(id)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => print_card(&card, use_color),
    }

    Ok(())
}

fn print_card(card: &LearningCard, use_color: bool) {
    let s = &card.schedule;

    println!("{}", heading(&format!("{} card {}", card.subject, card.id), use_color));
    if !card.tags.is_empty() {
        println!(
            "Tags: {}",
            card.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ")
        );
    }
    println!("\n{}", paint("Front", Color::CYAN, use_color));
    print_wrapped(&card.front, "  ");
    println!("\n{}", paint("Back", Color::CYAN, use_color));
    print_wrapped(&card.back, "  ");

    println!();
    println!("Next review:  {}", s.next_review);
    println!("Interval:     {}", format_interval(s.interval));
    println!("Ease factor:  {:.2}", s.ease_factor);
    println!("Repetitions:  {}", s.repetitions);
    println!("Reviews:      {}", s.review_count);
    if let Some(last) = s.last_reviewed {
        println!("Last review:  {}", last.format("%Y-%m-%d %H:%M UTC"));
    }

    let [again, hard, good, easy] = preview_intervals(&s.sm2(), App::today());
    println!(
        "{}",
        paint(
            &format!(
                "If reviewed today: again {} / hard {} / good {} / easy {}",
                format_interval(again),
                format_interval(hard),
                format_interval(good),
                format_interval(easy)
            ),
            Color::GRAY,
            use_color
        )
    );
}

pub fn run_delete(app: &App, id: &str, format: &OutputFormat) -> Result<()> {
    let card = app.find_card(id)?;
    app.cards()
        .delete_card(card.id)
        .context("Failed to delete card")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "deleted": card.id.to_string() });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deleted card \"{}\"", truncate(&card.front, 60)),
    }

    Ok(())
}
