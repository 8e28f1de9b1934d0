use std::time::Instant;

use anyhow::{Context, Result};

use barprep_lib::knowledge::KnowledgeNode;
use barprep_lib::session::ConceptDrill;
use barprep_lib::Subject;

use crate::app::App;
use crate::commands::review::print_summary;
use crate::prompt::{self, Grade};
use crate::render::terminal::{heading, meter, paint, percent, print_list, print_wrapped, rule, truncate, Color};
use crate::OutputFormat;

pub fn run_list(
    app: &App,
    subject: Option<Subject>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let concepts = app
        .concepts()
        .list_concepts(subject)
        .context("Failed to list concepts")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&concepts)?),
        OutputFormat::Plain => {
            let today = App::today();
            let mut current: Option<Subject> = None;

            for concept in &concepts {
                if current != Some(concept.subject) {
                    current = Some(concept.subject);
                    println!("\n{}", heading(concept.subject.name(), use_color));
                }

                let progress = &concept.progress;
                let due = if concept.is_due(today) {
                    paint(" due", Color::YELLOW, use_color)
                } else {
                    String::new()
                };
                println!(
                    "  {:<26} {:<34} {} {:>4} {}{}",
                    concept.id,
                    truncate(&concept.name, 34),
                    meter(progress.mastery_level, use_color),
                    percent(progress.mastery_level),
                    progress.mastery_label(),
                    due
                );
            }

            println!("\n{} concepts", concepts.len());
        }
    }

    Ok(())
}

pub fn run_show(app: &App, query: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let concept = app.find_concept(query)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&concept)?),
        OutputFormat::Plain => print_concept(&concept, use_color),
    }

    Ok(())
}

pub fn print_concept(concept: &KnowledgeNode, use_color: bool) {
    println!(
        "{} {}",
        heading(&concept.name, use_color),
        paint(
            &format!("({}, difficulty {}/5)", concept.subject, concept.difficulty),
            Color::GRAY,
            use_color
        )
    );
    println!("{}", rule(60));
    print_wrapped(&concept.rule, "");
    println!();
    print_list("Elements", &concept.elements, use_color);
    print_list("Exceptions", &concept.exceptions, use_color);
    print_list("Common traps", &concept.common_traps, use_color);

    let progress = &concept.progress;
    println!(
        "\nMastery: {} {} ({})",
        meter(progress.mastery_level, use_color),
        percent(progress.mastery_level),
        progress.mastery_label()
    );
    match progress.next_review {
        Some(date) => println!("Next review: {} ({} reviews)", date, progress.review_count),
        None => println!("Not reviewed yet"),
    }
}

/// Recall drill: state the rule from memory, compare, self-rate
pub fn run_drill(app: &App, subject: Option<Subject>, limit: Option<usize>, use_color: bool) -> Result<()> {
    let limit = limit.unwrap_or(app.config.review.session_limit);
    let mut drill = ConceptDrill::start(&app.db, App::today(), subject, Some(limit))
        .context("Failed to load concepts")?;

    if drill.is_finished() {
        println!("No concepts due. Come back tomorrow.");
        return Ok(());
    }

    println!("{}", heading(&format!("Drilling {} concepts", drill.total()), use_color));
    println!("State each rule from memory, then compare.");

    while let Some(concept) = drill.current() {
        println!(
            "\n{} {} {}",
            paint(&format!("[{}/{}]", drill.position(), drill.total()), Color::GRAY, use_color),
            heading(&concept.name, use_color),
            paint(&format!("({})", concept.subject), Color::CYAN, use_color)
        );

        let started = Instant::now();
        let Some(answer) = prompt::read_line("Your statement of the rule (q to quit): ")? else {
            break;
        };
        if answer.eq_ignore_ascii_case("q") {
            break;
        }
        let elapsed = started.elapsed();

        println!("{}", paint("Rule:", Color::GREEN, use_color));
        print_wrapped(&concept.rule, "  ");
        print_list("Elements", &concept.elements, use_color);
        print_list("Common traps", &concept.common_traps, use_color);

        match prompt::read_grade()? {
            Grade::Rated(quality) => {
                if let Some(updated) = drill.grade(quality, elapsed).context("Failed to save progress")? {
                    println!(
                        "Mastery now {} ({})",
                        percent(updated.progress.mastery_level),
                        updated.progress.mastery_label()
                    );
                }
            }
            Grade::Skip => drill.skip(),
            Grade::Quit => break,
        }
    }

    print_summary(drill.stats(), drill.remaining(), use_color);
    Ok(())
}
