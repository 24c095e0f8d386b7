//! Property tests for the keyword classifier and the batch runner

use proptest::prelude::*;
use sentiscope_classifiers::{classify, run_batch, BatchRunner, BuiltinClassifier};
use sentiscope_core::{SentimentLabel, Variant};

fn variant() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::Fast), Just(Variant::Accurate)]
}

/// Free text mixed with lexicon words so all three labels show up
fn review_text() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        "[a-zA-Z]{1,8}",
        Just("good".to_string()),
        Just("Amazing".to_string()),
        Just("awful".to_string()),
        Just("WASTE".to_string()),
        Just("love".to_string()),
        Just("poor".to_string()),
    ];
    prop::collection::vec(word, 0..20).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn probabilities_form_a_distribution(text in review_text(), v in variant()) {
        let result = classify(&text, v);
        let p = result.probabilities;
        prop_assert!((p.sum() - 1.0).abs() <= 1e-9);
        for value in [p.positive, p.negative, p.neutral] {
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn label_probability_equals_confidence(text in review_text(), v in variant()) {
        let result = classify(&text, v);
        prop_assert_eq!(result.probabilities.get(result.label), result.confidence);

        let rest = (1.0 - result.confidence) / 2.0;
        for label in SentimentLabel::ALL {
            if label != result.label {
                prop_assert!((result.probabilities.get(label) - rest).abs() <= 1e-12);
            }
        }
    }

    #[test]
    fn confidence_follows_label(text in review_text()) {
        let result = classify(&text, Variant::Fast);
        match result.label {
            SentimentLabel::Neutral => prop_assert_eq!(result.confidence, 0.6),
            _ => prop_assert!(result.confidence > 0.7 && result.confidence <= 0.95),
        }
    }

    #[test]
    fn classify_is_deterministic(text in any::<String>(), v in variant()) {
        let first = classify(&text, v);
        let second = classify(&text, v);
        prop_assert_eq!(first.label, second.label);
        prop_assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
        prop_assert_eq!(
            first.probabilities.positive.to_bits(),
            second.probabilities.positive.to_bits()
        );
        prop_assert_eq!(
            first.probabilities.negative.to_bits(),
            second.probabilities.negative.to_bits()
        );
        prop_assert_eq!(
            first.probabilities.neutral.to_bits(),
            second.probabilities.neutral.to_bits()
        );
        prop_assert_eq!(first, second);
    }

    #[test]
    fn batch_preserves_length_and_order(texts in prop::collection::vec(review_text(), 0..120)) {
        let results = run_batch(&texts, Variant::Fast);
        prop_assert_eq!(results.len(), texts.len());
        for (i, item) in results.iter().enumerate() {
            prop_assert_eq!(item.index, i);
        }
    }

    #[test]
    fn chunk_size_is_not_observable(
        texts in prop::collection::vec(review_text(), 0..60),
        chunk_size in 1usize..70,
    ) {
        let reference = run_batch(&texts, Variant::Fast);
        let chunked = BatchRunner::new(BuiltinClassifier)
            .with_chunk_size(chunk_size)
            .run(&texts, Variant::Fast);
        prop_assert_eq!(reference, chunked);
    }
}
