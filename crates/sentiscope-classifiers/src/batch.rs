//! Chunked batch runner
//!
//! Classifies a sequence of texts one after another. Rows are handed out in
//! fixed-size chunks so a caller with a request-duration budget can stop
//! between chunks; chunking never changes results or their order.
//!
//! A classifier error on one row becomes an `error` row and the run
//! continues. Nothing short of a panic aborts a batch.

use crate::classifier::Classifier;
use crate::sentiment::BuiltinClassifier;
use sentiscope_core::{BatchItemResult, Variant};
use std::time::Instant;
use tracing::{debug, warn};

/// Default number of rows per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Runs a classifier over many texts
pub struct BatchRunner<C> {
    classifier: C,
    chunk_size: usize,
}

impl<C: Classifier> BatchRunner<C> {
    /// Create a runner with the default chunk size
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the chunk size (values below 1 are raised to 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Classify every text, returning one row per input in input order
    pub fn run<S: AsRef<str>>(&self, texts: &[S], variant: Variant) -> Vec<BatchItemResult> {
        let start = Instant::now();
        let mut results = Vec::with_capacity(texts.len());

        for chunk in self.chunks(texts, variant) {
            results.extend(chunk);
        }

        metrics::histogram!("sentiscope_batch_duration_us")
            .record(start.elapsed().as_micros() as f64);
        results
    }

    /// Lazily classify `texts` one chunk at a time.
    ///
    /// Each yielded chunk carries indices relative to the start of `texts`.
    pub fn chunks<'a, S: AsRef<str>>(
        &'a self,
        texts: &'a [S],
        variant: Variant,
    ) -> impl Iterator<Item = Vec<BatchItemResult>> + 'a {
        texts
            .chunks(self.chunk_size)
            .enumerate()
            .map(move |(chunk_no, chunk)| {
                let offset = chunk_no * self.chunk_size;
                debug!(
                    chunk = chunk_no,
                    offset,
                    rows = chunk.len(),
                    "Classifying chunk"
                );
                self.run_chunk(offset, chunk, variant)
            })
    }

    /// Classify one chunk whose first row sits at `offset` in the full input
    pub fn run_chunk<S: AsRef<str>>(
        &self,
        offset: usize,
        chunk: &[S],
        variant: Variant,
    ) -> Vec<BatchItemResult> {
        chunk
            .iter()
            .enumerate()
            .map(|(i, text)| self.classify_item(offset + i, text.as_ref(), variant))
            .collect()
    }

    fn classify_item(&self, index: usize, text: &str, variant: Variant) -> BatchItemResult {
        let item = match self.classifier.classify(text, variant) {
            Ok(result) => BatchItemResult::success(index, text, &result),
            Err(e) => {
                warn!(
                    index,
                    classifier = self.classifier.name(),
                    error = %e,
                    "Row classification failed"
                );
                BatchItemResult::failure(index, text, e.to_string())
            }
        };

        metrics::counter!("sentiscope_items_classified_total", "label" => item.label.as_str())
            .increment(1);
        item
    }
}

/// Classify `texts` with the built-in classifier in chunks of
/// [`DEFAULT_CHUNK_SIZE`]
pub fn run_batch<S: AsRef<str>>(texts: &[S], variant: Variant) -> Vec<BatchItemResult> {
    BatchRunner::new(BuiltinClassifier).run(texts, variant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentiscope_core::{ClassificationResult, Error, ItemLabel, Result};

    /// Fails on texts containing a marker
    struct MarkerFailing;

    impl Classifier for MarkerFailing {
        fn classify(&self, text: &str, variant: Variant) -> Result<ClassificationResult> {
            if text.contains("FAIL") {
                return Err(Error::classifier("marker found"));
            }
            Ok(crate::sentiment::classify(text, variant))
        }

        fn name(&self) -> &str {
            "marker"
        }
    }

    #[test]
    fn test_preserves_length_and_order() {
        let texts: Vec<String> = (0..7).map(|i| format!("text {i} good")).collect();
        let results = run_batch(&texts, Variant::Fast);
        assert_eq!(results.len(), texts.len());
        for (i, item) in results.iter().enumerate() {
            assert_eq!(item.index, i);
            assert_eq!(item.text_preview, texts[i]);
        }
    }

    #[test]
    fn test_empty_input() {
        let texts: Vec<&str> = Vec::new();
        assert!(run_batch(&texts, Variant::Fast).is_empty());
    }

    #[test]
    fn test_chunking_does_not_change_results() {
        let texts: Vec<String> = (0..23)
            .map(|i| match i % 3 {
                0 => format!("great item {i}"),
                1 => format!("awful item {i}"),
                _ => format!("plain item {i}"),
            })
            .collect();

        let whole = BatchRunner::new(BuiltinClassifier)
            .with_chunk_size(100)
            .run(&texts, Variant::Fast);
        let chunked = BatchRunner::new(BuiltinClassifier)
            .with_chunk_size(4)
            .run(&texts, Variant::Fast);

        assert_eq!(whole, chunked);
    }

    #[test]
    fn test_chunks_iterator_offsets() {
        let texts = vec!["a"; 5];
        let runner = BatchRunner::new(BuiltinClassifier).with_chunk_size(2);
        let chunks: Vec<Vec<BatchItemResult>> = runner.chunks(&texts, Variant::Fast).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1][0].index, 2);
        assert_eq!(chunks[2][0].index, 4);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let runner = BatchRunner::new(BuiltinClassifier).with_chunk_size(0);
        assert_eq!(runner.chunk_size(), 1);
    }

    #[test]
    fn test_failure_is_isolated() {
        let texts = ["good", "bad", "ok", "FAIL here", "great"];
        let results = BatchRunner::new(MarkerFailing).run(&texts, Variant::Fast);

        assert_eq!(results.len(), 5);
        let errors: Vec<_> = results.iter().filter(|r| r.is_error()).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, 3);
        assert_eq!(errors[0].confidence, 0.0);
        assert_eq!(errors[0].model_name, "Error");
        assert!(errors[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("marker found"));
        assert_eq!(results[4].label, ItemLabel::Positive);
    }

    #[test]
    fn test_long_text_preview_on_error() {
        let text = format!("FAIL {}", "x".repeat(200));
        let results = BatchRunner::new(MarkerFailing).run(&[text], Variant::Fast);
        assert!(results[0].text_preview.ends_with("..."));
        assert_eq!(results[0].text_preview.chars().count(), 103);
    }
}
