mod app;
mod commands;
mod prompt;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use barprep_lib::tutor::Difficulty;
use barprep_lib::Subject;

#[derive(Parser)]
#[command(name = "barprep", about = "Bar exam study toolkit: flashcards, drills and an AI tutor", version)]
struct Cli {
    /// Data directory (default: $BARPREP_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create the data directory, database and a default config
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Manage flashcards
    #[command(subcommand)]
    Card(CardCommand),

    /// Review the flashcards due today
    Review {
        /// Only cards of this subject
        #[arg(long)]
        subject: Option<Subject>,
        /// Maximum cards this session (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List built-in concepts with mastery
    Concepts {
        #[arg(long)]
        subject: Option<Subject>,
    },

    /// Show one concept in full
    Concept {
        /// Concept id or name
        id: String,
    },

    /// Recall drill over due concepts
    Drill {
        #[arg(long)]
        subject: Option<Subject>,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// AI-generated MBE multiple-choice quiz
    Quiz {
        /// Subject (default: a random MBE subject per question)
        #[arg(long)]
        subject: Option<Subject>,
        /// Number of questions (default from config)
        #[arg(long)]
        count: Option<usize>,
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
    },

    /// AI-generated essay question with grading
    Essay {
        #[arg(long)]
        subject: Option<Subject>,
    },

    /// AI explanation of a concept
    Explain {
        /// Concept id or name
        concept: String,
    },

    /// Ask the tutor questions (follow-ups keep the conversation)
    Ask {
        /// First question (prompted for if omitted)
        question: Option<String>,
    },

    /// Generate flashcards with the tutor and add them to the deck
    Generate {
        #[arg(long)]
        subject: Subject,
        #[arg(long, default_value = "5")]
        count: usize,
        /// Notes file to base the cards on (use "-" to read from stdin)
        #[arg(long)]
        notes: Option<String>,
        /// Save without asking
        #[arg(long, short)]
        yes: bool,
    },

    /// Import cards from a .jsonl or .csv file
    Import {
        path: PathBuf,
    },

    /// Export cards to JSONL (default: <data-dir>/cards.jsonl)
    Export {
        path: Option<PathBuf>,
        #[arg(long)]
        subject: Option<Subject>,
    },

    /// Study dashboard
    Stats,

    /// Recent practice history
    History {
        #[arg(long, default_value = "20")]
        limit: usize,
        #[arg(long)]
        subject: Option<Subject>,
        /// Show the quiz transcript instead of the performance log
        #[arg(long)]
        quiz: bool,
    },

    /// Interactive numbered menu (the default)
    Menu,
}

#[derive(Subcommand)]
enum CardCommand {
    /// Add a card
    Add {
        #[arg(long)]
        subject: Subject,
        #[arg(long)]
        front: String,
        #[arg(long)]
        back: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// List cards
    List {
        #[arg(long)]
        subject: Option<Subject>,
        /// Only cards due today
        #[arg(long)]
        due: bool,
    },

    /// Show a card and its schedule
    Show {
        /// Card id or unique prefix
        id: String,
    },

    /// Delete a card
    Delete {
        /// Card id or unique prefix
        id: String,
    },
}

/// Resolve "-" as stdin, anything else as a file path
fn resolve_notes(notes: Option<String>) -> anyhow::Result<Option<String>> {
    use anyhow::Context;

    match notes.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
                .context("Failed to read notes from stdin")?;
            Ok(Some(buf))
        }
        Some(path) => std::fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("Failed to read notes file {}", path)),
        None => Ok(None),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        None | Some(Command::Menu) => {
            let app = app::App::new(data_dir)?;
            commands::menu::run(&app, use_color)?;
        }
        Some(Command::Init { force }) => {
            commands::init::run(data_dir, force, &cli.format)?;
        }
        Some(Command::Card(subcmd)) => {
            let app = app::App::new(data_dir)?;
            match subcmd {
                CardCommand::Add { subject, front, back, tags } => {
                    commands::card::run_add(&app, subject, front, back, tags.as_deref(), &cli.format)?;
                }
                CardCommand::List { subject, due } => {
                    commands::card::run_list(&app, subject, due, &cli.format, use_color)?;
                }
                CardCommand::Show { id } => {
                    commands::card::run_show(&app, &id, &cli.format, use_color)?;
                }
                CardCommand::Delete { id } => {
                    commands::card::run_delete(&app, &id, &cli.format)?;
                }
            }
        }
        Some(Command::Review { subject, limit }) => {
            let app = app::App::new(data_dir)?;
            commands::review::run(&app, subject, limit, use_color)?;
        }
        Some(Command::Concepts { subject }) => {
            let app = app::App::new(data_dir)?;
            commands::concepts::run_list(&app, subject, &cli.format, use_color)?;
        }
        Some(Command::Concept { id }) => {
            let app = app::App::new(data_dir)?;
            commands::concepts::run_show(&app, &id, &cli.format, use_color)?;
        }
        Some(Command::Drill { subject, limit }) => {
            let app = app::App::new(data_dir)?;
            commands::concepts::run_drill(&app, subject, limit, use_color)?;
        }
        Some(Command::Quiz { subject, count, difficulty }) => {
            let app = app::App::new(data_dir)?;
            commands::quiz::run(&app, subject, count, difficulty, use_color)?;
        }
        Some(Command::Essay { subject }) => {
            let app = app::App::new(data_dir)?;
            commands::essay::run(&app, subject, use_color)?;
        }
        Some(Command::Explain { concept }) => {
            let app = app::App::new(data_dir)?;
            commands::tutor::run_explain(&app, &concept, use_color)?;
        }
        Some(Command::Ask { question }) => {
            let app = app::App::new(data_dir)?;
            commands::tutor::run_ask(&app, question, use_color)?;
        }
        Some(Command::Generate { subject, count, notes, yes }) => {
            let app = app::App::new(data_dir)?;
            let notes = resolve_notes(notes)?;
            commands::generate::run(&app, subject, count, notes.as_deref(), yes, &cli.format)?;
        }
        Some(Command::Import { path }) => {
            let app = app::App::new(data_dir)?;
            commands::transfer::run_import(&app, &path, &cli.format)?;
        }
        Some(Command::Export { path, subject }) => {
            let app = app::App::new(data_dir)?;
            commands::transfer::run_export(&app, path, subject, &cli.format)?;
        }
        Some(Command::Stats) => {
            let app = app::App::new(data_dir)?;
            commands::stats::run(&app, &cli.format, use_color)?;
        }
        Some(Command::History { limit, subject, quiz }) => {
            let app = app::App::new(data_dir)?;
            if quiz {
                commands::history::run_quiz(&app, limit, &cli.format, use_color)?;
            } else {
                commands::history::run(&app, limit, subject, &cli.format, use_color)?;
            }
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
