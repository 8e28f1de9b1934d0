use std::path::Path;

use anyhow::{Context, Result};

use barprep_lib::config::{self, AppConfig};
use barprep_lib::flashcards::FlashcardStorage;
use barprep_lib::knowledge::builtin::get_builtin_concepts;
use barprep_lib::Database;

use crate::OutputFormat;

pub fn run(data_dir: Option<&Path>, force: bool, format: &OutputFormat) -> Result<()> {
    let data_dir = config::resolve_data_dir(data_dir).context("Failed to get data directory")?;
    let config_path = data_dir.join(config::CONFIG_FILE);

    let wrote_config = force || !config_path.exists();
    if wrote_config {
        AppConfig::default()
            .save(&data_dir)
            .context("Failed to write config")?;
    }

    let config = AppConfig::load(&data_dir).context("Failed to load config")?;
    let db_path = config.database_path(&data_dir);
    let db = Database::open(&db_path)
        .with_context(|| format!("Failed to create database {}", db_path.display()))?;
    let cards = FlashcardStorage::new(&db)
        .count_cards()
        .context("Failed to count cards")?;
    let concepts = get_builtin_concepts().len();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "dataDir": data_dir,
                "config": config_path,
                "configWritten": wrote_config,
                "database": db_path,
                "cards": cards,
                "concepts": concepts,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Data directory: {}", data_dir.display());
            if wrote_config {
                println!("  Wrote config: {}", config_path.display());
            } else {
                println!("  Config exists: {} (use --force to overwrite)", config_path.display());
            }
            println!("  Database: {}", db_path.display());
            println!("  {} cards, {} built-in concepts", cards, concepts);
            println!(
                "\nSet {} to use the AI tutor.",
                config.tutor.provider.api_key_env()
            );
        }
    }

    Ok(())
}
