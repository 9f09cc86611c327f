//! Benchmarks for query filter extraction and subset selection
//!
//! Measures:
//! - Rule-based criteria extraction per query
//! - Selection over corpora of increasing size

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use metarag_core::{
    select_candidates, DocType, Document, FilterCriteria, FilterRules, IndexedDocument,
    MetadataRecord, QueryFilterExtractor, SAMPLE_QUERIES,
};

const SERVICES: &[&str] = &["Authentication API", "Storage Service", "Billing API"];
const VERSIONS: &[&str] = &["1.0", "2.0", "2.0.1", "3.0"];

fn create_corpus(count: usize) -> Vec<IndexedDocument> {
    (0..count)
        .map(|i| {
            let id = format!("doc{}", i);
            let doc_type = match i % 3 {
                0 => DocType::Reference,
                1 => DocType::Guide,
                _ => DocType::Troubleshooting,
            };
            let metadata = MetadataRecord::empty(&id)
                .with_service(SERVICES[i % SERVICES.len()])
                .with_version(VERSIONS[i % VERSIONS.len()])
                .with_doc_type(doc_type);
            IndexedDocument::new(
                Document::new(&id, format!("Document {}", i), "Benchmark content"),
                metadata,
            )
        })
        .collect()
}

fn bench_extract_filters(c: &mut Criterion) {
    let extractor = QueryFilterExtractor::new(FilterRules::default());

    c.bench_function("extract_filters_sample_queries", |b| {
        b.iter(|| {
            for query in SAMPLE_QUERIES {
                black_box(extractor.extract(black_box(query)));
            }
        })
    });
}

fn bench_select_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_candidates");
    let criteria = FilterCriteria::new()
        .with_service("authentication")
        .with_version("2.0")
        .with_doc_type("reference");

    for size in [100, 1_000, 10_000] {
        let corpus = create_corpus(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &corpus, |b, corpus| {
            b.iter(|| black_box(select_candidates(corpus, &criteria).len()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract_filters, bench_select_candidates);
criterion_main!(benches);
