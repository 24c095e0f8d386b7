//! Configuration for the keyword classifier and the batch runner

use sentiscope_core::{Error, Result, Variant};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest item cap a caller may request for one batch
pub const MAX_ITEMS_LIMIT: usize = 1000;

/// Configuration for classification and batch runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Keyword lists used by the classifier
    #[serde(default)]
    pub lexicon: Lexicon,

    /// Rows handed to the classifier per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Default cap on rows per batch (1..=1000)
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Variant used when the caller does not pick one
    #[serde(default)]
    pub default_variant: Variant,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            lexicon: Lexicon::default(),
            chunk_size: default_chunk_size(),
            max_items: default_max_items(),
            default_variant: Variant::default(),
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse classifier config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the batch runner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be at least 1"));
        }
        validate_max_items(self.max_items)?;
        if self.lexicon.positive.is_empty() || self.lexicon.negative.is_empty() {
            return Err(Error::config("lexicon word lists must not be empty"));
        }
        Ok(())
    }
}

/// Check an item cap against the accepted range
pub fn validate_max_items(max_items: usize) -> Result<()> {
    if !(1..=MAX_ITEMS_LIMIT).contains(&max_items) {
        return Err(Error::config(format!(
            "max_items must be between 1 and {MAX_ITEMS_LIMIT}, got {max_items}"
        )));
    }
    Ok(())
}

/// Positive and negative keyword lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        let positive = [
            "good",
            "great",
            "excellent",
            "love",
            "best",
            "perfect",
            "amazing",
            "awesome",
        ];
        let negative = [
            "bad",
            "poor",
            "terrible",
            "worst",
            "disappointed",
            "waste",
            "horrible",
            "awful",
        ];

        Self {
            positive: positive.iter().map(|w| w.to_string()).collect(),
            negative: negative.iter().map(|w| w.to_string()).collect(),
        }
    }
}

fn default_chunk_size() -> usize {
    50
}

fn default_max_items() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.chunk_size, 50);
        assert_eq!(config.max_items, 100);
        assert_eq!(config.default_variant, Variant::Fast);
        assert_eq!(config.lexicon.positive.len(), 8);
        assert_eq!(config.lexicon.negative.len(), 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
chunk_size: 10
default_variant: deep_learning
"#;
        let config = ClassifierConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.max_items, 100);
        assert_eq!(config.default_variant, Variant::Accurate);
        assert_eq!(config.lexicon, Lexicon::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ClassifierConfig::from_yaml("chunk_size: 0").is_err());
        assert!(ClassifierConfig::from_yaml("max_items: 0").is_err());
        assert!(ClassifierConfig::from_yaml("max_items: 1001").is_err());
        assert!(ClassifierConfig::from_yaml("max_items: 1000").is_ok());
    }

    #[test]
    fn test_custom_lexicon_yaml() {
        let yaml = r#"
lexicon:
  positive: ["stellar"]
  negative: ["meh"]
"#;
        let config = ClassifierConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.lexicon.positive, vec!["stellar".to_string()]);
    }

    #[test]
    fn test_spelled_out_default_lexicon_matches_builtin() {
        let yaml = r#"
lexicon:
  positive: [good, great, excellent, love, best, perfect, amazing, awesome]
  negative: [bad, poor, terrible, worst, disappointed, waste, horrible, awful]
"#;
        let config = ClassifierConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.lexicon, Lexicon::default());
    }
}
