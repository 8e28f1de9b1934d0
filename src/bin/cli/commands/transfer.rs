use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use barprep_lib::transfer::{export_cards, import_cards, CARDS_EXPORT_FILE};
use barprep_lib::Subject;

use crate::app::App;
use crate::OutputFormat;

pub fn run_import(app: &App, path: &Path, format: &OutputFormat) -> Result<()> {
    let summary = import_cards(&app.db, path, App::today())
        .with_context(|| format!("Failed to import {}", path.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => {
            println!("Imported {} cards from {}", summary.imported, path.display());
            if summary.duplicates > 0 {
                println!("  {} already in the deck", summary.duplicates);
            }
            if summary.skipped > 0 {
                println!("  {} lines skipped (run with RUST_LOG=warn for details)", summary.skipped);
            }
        }
    }

    Ok(())
}

pub fn run_export(
    app: &App,
    path: Option<PathBuf>,
    subject: Option<Subject>,
    format: &OutputFormat,
) -> Result<()> {
    let path = path.unwrap_or_else(|| app.data_dir.join(CARDS_EXPORT_FILE));
    let count = export_cards(&app.db, &path, subject)
        .with_context(|| format!("Failed to export to {}", path.display()))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "exported": count, "path": path });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Exported {} cards to {}", count, path.display()),
    }

    Ok(())
}
