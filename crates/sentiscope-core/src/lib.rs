//! Sentiscope Core
//!
//! Core types and error handling shared across Sentiscope components.
//!
//! This crate provides:
//! - Sentiment labels, variants and the three-class probability record
//! - Per-text and per-row classification results
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    text_preview, BatchItemResult, ClassificationResult, ItemLabel, Probabilities,
    SentimentLabel, TextStatistics, Variant,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        BatchItemResult, ClassificationResult, ItemLabel, Probabilities, SentimentLabel, Variant,
    };
}
