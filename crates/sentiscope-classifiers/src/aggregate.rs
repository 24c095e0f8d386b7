//! Batch aggregation
//!
//! Reduces a finished batch to label counts and a mean confidence.

use sentiscope_core::{BatchItemResult, ItemLabel};
use serde::{Deserialize, Serialize};

/// Summary statistics for one batch
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchAggregate {
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,

    /// Rows whose classification failed
    pub error_count: usize,

    /// Mean confidence over every row, error rows included at 0
    pub average_confidence: f64,
}

impl BatchAggregate {
    /// Rows that received a sentiment label
    pub fn classified(&self) -> usize {
        self.positive_count + self.negative_count + self.neutral_count
    }
}

/// Tally labels and average confidence.
///
/// Error rows are left out of the three label counts but still count in
/// the average's denominator, pulling the average down.
pub fn aggregate(results: &[BatchItemResult]) -> BatchAggregate {
    let mut summary = BatchAggregate::default();
    let mut confidence_sum = 0.0;

    for item in results {
        match item.label {
            ItemLabel::Positive => summary.positive_count += 1,
            ItemLabel::Negative => summary.negative_count += 1,
            ItemLabel::Neutral => summary.neutral_count += 1,
            ItemLabel::Error => summary.error_count += 1,
        }
        confidence_sum += item.confidence;
    }

    if !results.is_empty() {
        summary.average_confidence = confidence_sum / results.len() as f64;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize, label: ItemLabel, confidence: f64) -> BatchItemResult {
        BatchItemResult {
            index,
            text_preview: format!("row {index}"),
            label,
            confidence,
            model_name: "test".to_string(),
            error_message: None,
        }
    }

    #[test]
    fn test_empty_batch() {
        let summary = aggregate(&[]);
        assert_eq!(summary, BatchAggregate::default());
        assert_eq!(summary.average_confidence, 0.0);
    }

    #[test]
    fn test_errors_excluded_from_counts_but_not_average() {
        let results = vec![
            item(0, ItemLabel::Positive, 0.8),
            BatchItemResult::failure(1, "broken", "boom"),
            item(2, ItemLabel::Negative, 0.7),
        ];

        let summary = aggregate(&results);
        assert_eq!(summary.positive_count, 1);
        assert_eq!(summary.negative_count, 1);
        assert_eq!(summary.neutral_count, 0);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.classified(), 2);
        assert!((summary.average_confidence - (0.8 + 0.0 + 0.7) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_errors_average_zero() {
        let results = vec![
            BatchItemResult::failure(0, "a", "x"),
            BatchItemResult::failure(1, "b", "y"),
        ];
        let summary = aggregate(&results);
        assert_eq!(summary.classified(), 0);
        assert_eq!(summary.average_confidence, 0.0);
    }
}
