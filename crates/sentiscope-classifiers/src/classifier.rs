//! Classifier trait

use sentiscope_core::{ClassificationResult, Result, Variant};

/// Trait for all sentiment classifiers.
///
/// Implementations are pure: no I/O, no mutable state between calls, so a
/// single instance can be shared across threads without locking.
pub trait Classifier: Send + Sync {
    /// Classify the given text.
    ///
    /// An `Err` is a fault for this text only; batch callers record it on
    /// the affected row and keep going.
    fn classify(&self, text: &str, variant: Variant) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn classify(&self, text: &str, variant: Variant) -> Result<ClassificationResult> {
        (**self).classify(text, variant)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<C: Classifier + ?Sized> Classifier for std::sync::Arc<C> {
    fn classify(&self, text: &str, variant: Variant) -> Result<ClassificationResult> {
        (**self).classify(text, variant)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
