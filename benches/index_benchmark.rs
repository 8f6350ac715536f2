use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pdfsearch::core::types::DocId;
use pdfsearch::index::handle::SearchIndex;
use pdfsearch::index::inverted::Term;
use pdfsearch::storage::wal::SyncMode;
use rand::Rng;

/// Synthetic document text drawn from a small vocabulary, so queries hit
/// many posting lists.
fn document_text(words: usize) -> String {
    let mut rng = rand::thread_rng();
    let vocabulary = [
        "annual", "revenue", "growth", "quarterly", "report", "forecast", "margin", "outlook",
        "summary", "figures", "audit", "statement", "fiscal", "capital", "earnings",
    ];
    (0..words)
        .map(|_| vocabulary[rng.gen_range(0..vocabulary.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_upsert(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let index = SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap();

    c.bench_function("upsert_100_word_document", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let text = document_text(100);
            index
                .upsert(DocId(format!("d-{:08}", i)), black_box(&text))
                .unwrap();
            i += 1;
        });
    });
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_top_20");

    for corpus_size in [100usize, 1_000, 10_000].iter() {
        let dir = tempfile::tempdir().unwrap();
        let index = SearchIndex::open(dir.path().join("idx"), 1, SyncMode::Batch).unwrap();
        for i in 0..*corpus_size {
            index
                .upsert(DocId(format!("d-{:08}", i)), &document_text(100))
                .unwrap();
        }
        let terms = vec![Term::new("annual"), Term::new("revenue")];

        group.bench_with_input(
            BenchmarkId::from_parameter(corpus_size),
            corpus_size,
            |b, _| {
                b.iter(|| black_box(index.query(&terms, 20)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_upsert, bench_query);
criterion_main!(benches);
