//! Application configuration

use sentiscope_classifiers::ClassifierConfig;
use sentiscope_jobs::history::{DEFAULT_PAGE_SIZE, DEFAULT_STORED_TEXT_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for job summaries, reports and history
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Column read from uploads when none is given
    #[serde(default = "default_text_column")]
    pub text_column: String,

    /// Classifier and batch settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// History settings
    #[serde(default)]
    pub history: HistoryConfig,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, data_dir: Option<&Path>) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config: Self = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(dir) = data_dir {
            config.data_dir = dir.to_path_buf();
        }

        config.classifier.validate()?;
        if config.history.page_size == 0 {
            anyhow::bail!("history.page_size must be at least 1");
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            text_column: default_text_column(),
            classifier: ClassifierConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

/// History configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Rows per history page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Characters of input text kept per stored analysis
    #[serde(default = "default_stored_text_limit")]
    pub stored_text_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            stored_text_limit: default_stored_text_limit(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./sentiscope-data")
}

fn default_text_column() -> String {
    "reviewText".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_stored_text_limit() -> usize {
    DEFAULT_STORED_TEXT_LIMIT
}
