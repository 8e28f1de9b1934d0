//! Application configuration
//!
//! Settings live in `<data_dir>/config.toml`; a missing file means defaults.
//! API keys are read from the environment only.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::DEFAULT_DB_FILE;
use crate::tutor::{CompletionOptions, Provider};

pub const CONFIG_FILE: &str = "config.toml";
pub const DATA_DIR_ENV: &str = "BARPREP_DATA_DIR";
pub const QUIZ_HISTORY_FILE: &str = "quiz_history.jsonl";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine a data directory; pass --data-dir or set BARPREP_DATA_DIR")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AppConfig {
    /// Database file name, relative to the data directory
    pub database_file: String,
    pub tutor: TutorConfig,
    pub review: ReviewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_file: DEFAULT_DB_FILE.to_string(),
            tutor: TutorConfig::default(),
            review: ReviewConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    pub provider: Provider,
    /// Defaults to the provider's model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Override for self-hosted or proxied endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            model: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 1500,
            timeout_secs: 60,
        }
    }
}

impl TutorConfig {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Maximum cards per review session
    pub session_limit: usize,
    /// Questions per quiz when not given on the command line
    pub quiz_length: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            session_limit: 50,
            quiz_length: 5,
        }
    }
}

/// Resolve the data directory: explicit path, then `BARPREP_DATA_DIR`, then
/// the platform data directory
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(DATA_DIR_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::data_local_dir()
        .map(|p| p.join("barprep"))
        .ok_or(ConfigError::DataDirNotFound)
}

impl AppConfig {
    /// Load `config.toml` from `data_dir`, or defaults if it does not exist
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, data_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(CONFIG_FILE);
        fs::write(&path, toml::to_string_pretty(self)?)?;
        log::info!("Wrote config to {:?}", path);
        Ok(path)
    }

    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }

    pub fn quiz_history_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(QUIZ_HISTORY_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(
            config.database_path(temp_dir.path()),
            temp_dir.path().join("iowa_bar_prep.db")
        );
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.tutor.provider = Provider::Grok;
        config.tutor.model = Some("grok-beta".to_string());
        config.review.session_limit = 20;

        config.save(temp_dir.path()).unwrap();
        let loaded = AppConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "[tutor]\nprovider = \"grok\"\ntemperature = 0.3\n",
        )
        .unwrap();

        let config = AppConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.tutor.provider, Provider::Grok);
        assert_eq!(config.tutor.temperature, 0.3);
        assert_eq!(config.tutor.max_tokens, 1500);
        assert_eq!(config.database_file, DEFAULT_DB_FILE);
        assert_eq!(config.review.quiz_length, 5);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE), "review = 3\n").unwrap();
        assert!(matches!(AppConfig::load(temp_dir.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/barprep-explicit"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/barprep-explicit"));
    }
}
