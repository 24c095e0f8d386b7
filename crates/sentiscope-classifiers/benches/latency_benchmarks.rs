//! Latency benchmarks for the keyword classifier and the batch runner
//!
//! Run with: cargo bench -p sentiscope-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sentiscope_classifiers::{classify, BatchRunner, KeywordClassifier};
use sentiscope_core::Variant;

fn benchmark_classify(c: &mut Criterion) {
    let long_review =
        "The packaging was good but the product itself was a waste of money. ".repeat(20);
    let test_cases = vec![
        ("empty", String::new()),
        ("short_positive", "Best purchase ever! Highly recommend.".to_string()),
        (
            "medium_negative",
            "Complete waste of money. Stopped working after two days, terrible support."
                .to_string(),
        ),
        ("long_mixed", long_review),
    ];

    let mut group = c.benchmark_group("Keyword_Classifier");
    group.sample_size(100);

    for (name, text) in &test_cases {
        group.bench_with_input(BenchmarkId::new("classify", name), text, |b, text| {
            b.iter(|| classify(black_box(text), Variant::Fast));
        });
    }

    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let classifier = KeywordClassifier::new().expect("Failed to build keyword classifier");
    let samples = [
        "This product is absolutely amazing! Works perfectly and exceeded my expectations.",
        "Not happy with the quality. Stopped working after just 2 days of use.",
        "It's okay for the price. Nothing special but gets the job done.",
        "Best purchase ever! Highly recommend to everyone.",
        "Complete waste of money. Don't buy this product.",
    ];

    let mut group = c.benchmark_group("Batch_Runner");

    for size in [50usize, 500, 1000] {
        let texts: Vec<&str> = samples.iter().cycle().take(size).copied().collect();
        let runner = BatchRunner::new(&classifier);

        group.bench_with_input(BenchmarkId::new("run", size), &texts, |b, texts| {
            b.iter(|| runner.run(black_box(texts), Variant::Fast));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_classify, benchmark_batch);
criterion_main!(benches);
