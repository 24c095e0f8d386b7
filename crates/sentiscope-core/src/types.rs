//! Core types for Sentiscope

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentiment class assigned to a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// All labels, in the order they are reported
    pub const ALL: [SentimentLabel; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// Label of a single row in a batch; `Error` marks a row whose
/// classification failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemLabel {
    Positive,
    Negative,
    Neutral,
    Error,
}

impl ItemLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Error => "error",
        }
    }

    /// The sentiment behind this label, or `None` for error rows
    pub fn sentiment(&self) -> Option<SentimentLabel> {
        match self {
            Self::Positive => Some(SentimentLabel::Positive),
            Self::Negative => Some(SentimentLabel::Negative),
            Self::Neutral => Some(SentimentLabel::Neutral),
            Self::Error => None,
        }
    }
}

impl From<SentimentLabel> for ItemLabel {
    fn from(label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Positive => Self::Positive,
            SentimentLabel::Negative => Self::Negative,
            SentimentLabel::Neutral => Self::Neutral,
        }
    }
}

impl fmt::Display for ItemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("error") {
            return Ok(Self::Error);
        }
        s.parse::<SentimentLabel>().map(Self::from)
    }
}

/// Which named heuristic path to run.
///
/// Both variants share the same algorithm and only differ in the model
/// name reported with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    #[serde(alias = "ensemble")]
    Fast,
    #[serde(alias = "deep_learning")]
    Accurate,
}

impl Variant {
    /// Display name of the model behind this variant
    pub fn model_name(&self) -> &'static str {
        match self {
            Self::Fast => "Keyword-based Analyzer",
            Self::Accurate => "DL Model (Placeholder)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Accurate => "accurate",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" | "ensemble" => Ok(Self::Fast),
            "accurate" | "deep_learning" => Ok(Self::Accurate),
            other => Err(format!("unknown variant: {other} (expected fast or accurate)")),
        }
    }
}

/// Probability distribution over the three sentiment classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl Probabilities {
    /// Starting distribution for a label before confidence is applied
    pub fn base(label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Positive => Self {
                positive: 0.7,
                negative: 0.1,
                neutral: 0.2,
            },
            SentimentLabel::Negative => Self {
                positive: 0.1,
                negative: 0.7,
                neutral: 0.2,
            },
            SentimentLabel::Neutral => Self {
                positive: 0.3,
                negative: 0.3,
                neutral: 0.4,
            },
        }
    }

    /// Overwrite this distribution so `label` carries `confidence` and the
    /// remaining mass is split between the other two classes.
    ///
    /// The last class is derived as `1 - a - b` so the record always sums
    /// to one.
    pub fn concentrate(self, label: SentimentLabel, confidence: f64) -> Self {
        let rest = (1.0 - confidence) / 2.0;
        match label {
            SentimentLabel::Positive => Self {
                positive: confidence,
                negative: rest,
                neutral: 1.0 - confidence - rest,
            },
            SentimentLabel::Negative => Self {
                negative: confidence,
                positive: rest,
                neutral: 1.0 - confidence - rest,
            },
            SentimentLabel::Neutral => Self {
                neutral: confidence,
                negative: rest,
                positive: 1.0 - confidence - rest,
            },
        }
    }

    pub fn get(&self, label: SentimentLabel) -> f64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    pub fn sum(&self) -> f64 {
        self.positive + self.negative + self.neutral
    }
}

/// Simple statistics about the classified text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextStatistics {
    /// Whitespace-separated tokens
    pub word_count: usize,

    /// Unicode scalar values
    pub char_count: usize,
}

impl TextStatistics {
    pub fn of(text: &str) -> Self {
        Self {
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
        }
    }
}

/// Result of classifying one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Input text
    pub text: String,

    /// Winning sentiment
    pub label: SentimentLabel,

    /// Confidence score (0.0-1.0), equal to `probabilities[label]`
    pub confidence: f64,

    /// All class probabilities
    pub probabilities: Probabilities,

    /// Name of the heuristic variant that produced this result
    pub model_name: String,

    #[serde(flatten)]
    pub statistics: TextStatistics,
}

impl ClassificationResult {
    /// Low-information result used when classification cannot run
    pub fn fallback(text: &str, variant: Variant) -> Self {
        let confidence = 0.6;
        Self {
            text: text.to_string(),
            label: SentimentLabel::Neutral,
            confidence,
            probabilities: Probabilities::base(SentimentLabel::Neutral)
                .concentrate(SentimentLabel::Neutral, confidence),
            model_name: variant.model_name().to_string(),
            statistics: TextStatistics::of(text),
        }
    }
}

/// Number of characters kept in a row preview
pub const PREVIEW_CHARS: usize = 100;

/// First 100 characters of `text`, with `...` appended when truncated
pub fn text_preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Outcome for one row of a batch. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult {
    /// Position in the original input sequence
    pub index: usize,

    pub text_preview: String,

    pub label: ItemLabel,

    /// 0 when `label` is `Error`
    pub confidence: f64,

    /// Model name, or `"Error"` for failed rows
    pub model_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl BatchItemResult {
    /// Build a row from a successful classification
    pub fn success(index: usize, text: &str, result: &ClassificationResult) -> Self {
        Self {
            index,
            text_preview: text_preview(text),
            label: result.label.into(),
            confidence: result.confidence,
            model_name: result.model_name.clone(),
            error_message: None,
        }
    }

    /// Build an error row
    pub fn failure(index: usize, text: &str, message: impl Into<String>) -> Self {
        Self {
            index,
            text_preview: text_preview(text),
            label: ItemLabel::Error,
            confidence: 0.0,
            model_name: "Error".to_string(),
            error_message: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.label == ItemLabel::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concentrate_overwrites_base() {
        let probs = Probabilities::base(SentimentLabel::Positive)
            .concentrate(SentimentLabel::Positive, 0.8);
        assert_eq!(probs.positive, 0.8);
        assert!((probs.negative - 0.1).abs() < 1e-12);
        assert!((probs.neutral - 0.1).abs() < 1e-12);
        assert!((probs.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fallback_is_neutral() {
        let result = ClassificationResult::fallback("anything", Variant::Fast);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.confidence, 0.6);
        assert_eq!(result.probabilities.neutral, 0.6);
        assert!((result.probabilities.positive - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_text_preview_truncates_on_chars() {
        let short = "short text";
        assert_eq!(text_preview(short), short);

        let exact = "a".repeat(100);
        assert_eq!(text_preview(&exact), exact);

        let long = "é".repeat(150);
        let preview = text_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 103);
    }

    #[test]
    fn test_variant_parsing_accepts_legacy_names() {
        assert_eq!("ensemble".parse::<Variant>().unwrap(), Variant::Fast);
        assert_eq!("deep_learning".parse::<Variant>().unwrap(), Variant::Accurate);
        assert_eq!("ACCURATE".parse::<Variant>().unwrap(), Variant::Accurate);
        assert!("bert".parse::<Variant>().is_err());
    }

    #[test]
    fn test_item_label_round_trips_through_str() {
        assert_eq!("error".parse::<ItemLabel>().unwrap(), ItemLabel::Error);
        assert_eq!("Positive".parse::<ItemLabel>().unwrap(), ItemLabel::Positive);
        assert_eq!(ItemLabel::Error.sentiment(), None);
    }

    #[test]
    fn test_text_statistics() {
        let stats = TextStatistics::of("  two   words ");
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.char_count, 14);
        assert_eq!(TextStatistics::of(""), TextStatistics::default());
    }
}
