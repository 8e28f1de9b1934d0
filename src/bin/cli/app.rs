use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};

use barprep_lib::config::{self, AppConfig};
use barprep_lib::flashcards::{FlashcardStorage, LearningCard};
use barprep_lib::knowledge::{ConceptStorage, KnowledgeNode};
use barprep_lib::performance::PerformanceLog;
use barprep_lib::tutor::{OpenAiClient, Tutor};
use barprep_lib::Database;

/// Shared application state for CLI commands
pub struct App {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub db: Database,
}

impl App {
    /// Open the data directory, its config and database
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = config::resolve_data_dir(data_dir).context("Failed to get data directory")?;
        let config = AppConfig::load(&data_dir)
            .with_context(|| format!("Failed to load config from {}", data_dir.display()))?;

        let db_path = config.database_path(&data_dir);
        let db = Database::open(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        Ok(Self {
            data_dir,
            config,
            db,
        })
    }

    /// Review dates follow the local calendar
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn cards(&self) -> FlashcardStorage<'_> {
        FlashcardStorage::new(&self.db)
    }

    pub fn concepts(&self) -> ConceptStorage<'_> {
        ConceptStorage::new(&self.db)
    }

    pub fn performance(&self) -> PerformanceLog<'_> {
        PerformanceLog::new(&self.db)
    }

    pub fn quiz_history_path(&self) -> PathBuf {
        self.config.quiz_history_path(&self.data_dir)
    }

    /// Build the LLM tutor from config and the provider's API key variable
    pub fn tutor(&self) -> Result<Tutor<OpenAiClient>> {
        let tutor_config = &self.config.tutor;
        let client = OpenAiClient::from_env(
            tutor_config.provider,
            tutor_config.base_url.as_deref(),
            tutor_config.model.as_deref(),
            tutor_config.timeout(),
        )
        .with_context(|| format!("Failed to set up the {} tutor", tutor_config.provider))?;

        log::debug!("Using {} model {}", tutor_config.provider, client.model());
        Ok(Tutor::new(client, tutor_config.completion_options()))
    }

    /// Find a card by id or unique id prefix
    pub fn find_card(&self, id: &str) -> Result<LearningCard> {
        self.cards()
            .find_card(id)
            .context("Failed to look up card")?
            .with_context(|| format!("No single card matches id '{}'", id))
    }

    /// Find a concept by id, or by a query matching exactly one id or name
    pub fn find_concept(&self, query: &str) -> Result<KnowledgeNode> {
        let mut matches = self
            .concepts()
            .search_concepts(query)
            .context("Failed to search concepts")?;

        match matches.len() {
            0 => bail!("No concept matching '{}'. Run `barprep concepts` to list them.", query),
            1 => Ok(matches.remove(0)),
            _ => bail!(
                "Ambiguous concept '{}'. Matches:\n{}",
                query,
                matches
                    .iter()
                    .map(|c| format!("  - {} ({})", c.id, c.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }
}
