//! Lexicon-based sentiment classifier
//!
//! Counts how many words of a positive and a negative lexicon occur in the
//! lower-cased text and turns the larger count into a label and a
//! confidence score.
//!
//! Matching is plain substring containment, not word-boundary aware:
//! "badge" counts as "bad" and "goodbye" counts as "good". Each lexicon
//! word counts at most once no matter how often it occurs. This is a known
//! limitation kept for compatibility with previously stored results.

use crate::classifier::Classifier;
use crate::config::Lexicon;
use aho_corasick::AhoCorasick;
use sentiscope_core::{
    ClassificationResult, Error, Probabilities, Result, SentimentLabel, TextStatistics, Variant,
};
use std::sync::OnceLock;
use tracing::warn;

/// Confidence reported when neither lexicon wins
pub const NEUTRAL_CONFIDENCE: f64 = 0.6;

/// Confidence with a single winning keyword is `BASE + STEP`
pub const BASE_CONFIDENCE: f64 = 0.7;
pub const CONFIDENCE_STEP: f64 = 0.05;
pub const MAX_CONFIDENCE: f64 = 0.95;

pub struct KeywordClassifier {
    name: String,
    positive: WordSet,
    negative: WordSet,
}

/// Compiled lexicon plus the number of distinct words in it
struct WordSet {
    matcher: AhoCorasick,
    len: usize,
}

impl WordSet {
    fn build(kind: &str, words: &[String]) -> Result<Self> {
        let mut words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        words.sort();
        words.dedup();

        if words.iter().any(|w| w.is_empty()) {
            return Err(Error::classifier(format!(
                "{kind} lexicon contains an empty word"
            )));
        }

        let matcher = AhoCorasick::new(&words).map_err(|e| {
            Error::classifier(format!("Failed to build {kind} sentiment matcher: {e}"))
        })?;

        Ok(Self {
            matcher,
            len: words.len(),
        })
    }

    /// Number of distinct lexicon words found as substrings of `haystack`
    fn count_in(&self, haystack: &str) -> usize {
        let mut seen = vec![false; self.len];
        for m in self.matcher.find_overlapping_iter(haystack) {
            seen[m.pattern().as_usize()] = true;
        }
        seen.into_iter().filter(|hit| *hit).count()
    }
}

impl KeywordClassifier {
    /// Classifier with the built-in lexicon
    pub fn new() -> Result<Self> {
        Self::with_lexicon("keyword", &Lexicon::default())
    }

    pub fn with_lexicon(name: impl Into<String>, lexicon: &Lexicon) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            positive: WordSet::build("positive", &lexicon.positive)?,
            negative: WordSet::build("negative", &lexicon.negative)?,
        })
    }

    /// Count the keyword hits for `text` as `(positive, negative)`
    pub fn keyword_counts(&self, text: &str) -> (usize, usize) {
        let lowered = text.to_lowercase();
        (
            self.positive.count_in(&lowered),
            self.negative.count_in(&lowered),
        )
    }

    /// Classify `text`. Infallible: every input gets a result.
    pub fn analyze(&self, text: &str, variant: Variant) -> ClassificationResult {
        let (pos_count, neg_count) = self.keyword_counts(text);
        let (label, confidence) = decide(pos_count, neg_count);

        ClassificationResult {
            text: text.to_string(),
            label,
            confidence,
            probabilities: Probabilities::base(label).concentrate(label, confidence),
            model_name: variant.model_name().to_string(),
            statistics: TextStatistics::of(text),
        }
    }
}

/// Turn keyword counts into a label and a confidence score
pub fn decide(pos_count: usize, neg_count: usize) -> (SentimentLabel, f64) {
    if pos_count > neg_count {
        (SentimentLabel::Positive, confidence_for(pos_count))
    } else if neg_count > pos_count {
        (SentimentLabel::Negative, confidence_for(neg_count))
    } else {
        (SentimentLabel::Neutral, NEUTRAL_CONFIDENCE)
    }
}

fn confidence_for(hits: usize) -> f64 {
    MAX_CONFIDENCE.min(BASE_CONFIDENCE + CONFIDENCE_STEP * hits as f64)
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str, variant: Variant) -> Result<ClassificationResult> {
        Ok(self.analyze(text, variant))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Classify with the built-in lexicon.
///
/// Never fails: if the default classifier cannot be built the neutral
/// fallback result is returned.
pub fn classify(text: &str, variant: Variant) -> ClassificationResult {
    static DEFAULT: OnceLock<Option<KeywordClassifier>> = OnceLock::new();

    let classifier = DEFAULT.get_or_init(|| match KeywordClassifier::new() {
        Ok(classifier) => Some(classifier),
        Err(e) => {
            warn!(error = %e, "Default keyword classifier unavailable, using neutral fallback");
            None
        }
    });

    match classifier {
        Some(classifier) => classifier.analyze(text, variant),
        None => ClassificationResult::fallback(text, variant),
    }
}

/// Zero-sized handle to the built-in classifier, for callers that want
/// the `Classifier` trait without owning a compiled lexicon
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinClassifier;

impl Classifier for BuiltinClassifier {
    fn classify(&self, text: &str, variant: Variant) -> Result<ClassificationResult> {
        Ok(classify(text, variant))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
