use anyhow::{bail, Context, Result};

use barprep_lib::flashcards::NewCard;
use barprep_lib::Subject;

use crate::app::App;
use crate::prompt;
use crate::render::terminal::print_wrapped;
use crate::OutputFormat;

pub fn run(
    app: &App,
    subject: Subject,
    count: usize,
    notes: Option<&str>,
    yes: bool,
    format: &OutputFormat,
) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }

    let tutor = app.tutor()?;
    let generated = tutor
        .generate_flashcards(subject, count, notes)
        .context("Flashcard generation failed")?;

    if generated.is_empty() {
        bail!("The tutor returned no usable cards");
    }

    if let OutputFormat::Plain = format {
        for (i, card) in generated.iter().enumerate() {
            println!("\n{}. {}", i + 1, card.front);
            print_wrapped(&card.back, "   ");
        }
        println!();
        if !yes && !prompt::confirm(&format!("Add these {} cards to the deck?", generated.len()))? {
            println!("Discarded.");
            return Ok(());
        }
    }

    let today = App::today();
    let storage = app.cards();
    let mut saved = Vec::with_capacity(generated.len());
    for card in generated {
        saved.push(
            storage
                .create_card(
                    NewCard {
                        front: card.front,
                        back: card.back,
                        subject,
                        tags: vec!["generated".to_string()],
                    },
                    today,
                )
                .context("Failed to save card")?,
        );
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&saved)?),
        OutputFormat::Plain => println!("Added {} {} cards.", saved.len(), subject),
    }

    Ok(())
}
