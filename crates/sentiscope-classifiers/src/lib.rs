//! Sentiscope Classifiers
//!
//! Sentiment classification and the bulk pipeline built on it:
//! - `sentiment`: keyword-count classifier (pure, deterministic)
//! - `batch`: chunked runner that isolates per-row failures
//! - `aggregate`: label counts and mean confidence for a finished batch
//!
//! Everything here is synchronous and holds no mutable state.

pub mod aggregate;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod sentiment;

pub use aggregate::{aggregate, BatchAggregate};
pub use batch::{run_batch, BatchRunner, DEFAULT_CHUNK_SIZE};
pub use classifier::Classifier;
pub use config::{validate_max_items, ClassifierConfig, Lexicon, MAX_ITEMS_LIMIT};
pub use sentiment::{classify, BuiltinClassifier, KeywordClassifier};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aggregate::{aggregate, BatchAggregate};
    pub use crate::batch::{run_batch, BatchRunner};
    pub use crate::classifier::Classifier;
    pub use crate::sentiment::{classify, KeywordClassifier};
}
