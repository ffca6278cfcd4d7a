//! Corpus Statistics Benchmark
//!
//! Measures one-pass statistics over synthetic review corpora and the cost of
//! reconciling a single analysis against them.
//!
//! This benchmark tests:
//! - CorpusStatistics::from_rows() at various corpus sizes
//! - CSV ingestion through read_rows()
//! - reconcile() and top_words() on a loaded corpus

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use review_core::{AnalysisResult, Aspect, AspectAssessment, PercentileBoundary, Sentiment};
use review_engine::{CorpusStatistics, DatasetRow, read_rows, reconcile};

/// Review fragments combined into synthetic rows
const FRAGMENTS: &[&str] = &[
    "The package arrived two days late and the box was crushed.",
    "Customer service issued a refund within an hour.",
    "Great price for the quality, would buy again.",
    "The product stopped working after a week.",
    "Prime delivery was fast as always.",
    "Support never answered my emails about the return.",
    "Cheap material but it does the job.",
    "Overpriced compared to other shops.",
];

/// Deterministic synthetic row; rating cycles through 1 to 5
fn generate_row(i: usize) -> DatasetRow {
    let first = FRAGMENTS[i % FRAGMENTS.len()];
    let second = FRAGMENTS[(i * 7 + 3) % FRAGMENTS.len()];
    let rating = (i % 5) as u8 + 1;
    DatasetRow::labeled(
        format!("{first} {second}"),
        Sentiment::from_rating(rating),
        Some(rating),
    )
}

fn generate_rows(size: usize) -> Vec<DatasetRow> {
    (0..size).map(generate_row).collect()
}

fn generate_csv(size: usize) -> String {
    let mut csv = String::from("Rating,Review Text\n");
    for i in 0..size {
        let row = generate_row(i);
        csv.push_str(&format!(
            "Rated {} out of 5 stars,\"{}\"\n",
            row.rating.unwrap_or(3),
            row.text
        ));
    }
    csv
}

/// Benchmarks statistics computation at various corpus sizes
fn from_rows_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_rows");

    for size in [1_000, 10_000, 50_000] {
        let rows = generate_rows(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("rows", size), &rows, |b, rows| {
            b.iter(|| black_box(CorpusStatistics::from_rows(rows).unwrap()))
        });
    }

    group.finish();
}

/// Benchmarks CSV parsing and labelling
fn csv_ingestion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_ingestion");

    for size in [1_000, 10_000] {
        let csv = generate_csv(size);

        group.throughput(Throughput::Bytes(csv.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", size), &csv, |b, csv| {
            b.iter(|| black_box(read_rows(csv.as_bytes()).unwrap()))
        });
    }

    group.finish();
}

/// Benchmarks per-request work against a loaded corpus
fn query_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("corpus_query");
    let stats = CorpusStatistics::from_rows(generate_rows(10_000)).unwrap();

    let mut result = AnalysisResult::new(Sentiment::Negative, 0.85);
    result.aspects.insert(
        Aspect::Delivery,
        AspectAssessment::new(Sentiment::Negative, 0.9).with_evidence(["arrived late"]),
    );

    group.bench_function("reconcile", |b| {
        b.iter(|| black_box(reconcile(&result, &stats, PercentileBoundary::Inclusive)))
    });

    group.bench_function("top_words_50", |b| {
        b.iter(|| black_box(stats.top_words(50)))
    });

    group.finish();
}

criterion_group!(
    benches,
    from_rows_benchmark,
    csv_ingestion_benchmark,
    query_benchmark
);
criterion_main!(benches);
