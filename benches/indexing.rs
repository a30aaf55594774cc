//! Shard-building and low-level encoding benchmarks.
//!
//! Run with: `cargo bench --bench indexing`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grepcore::bloom::extract_word_fragment_keys;
use grepcore::index::types::{Branch, Repository};
use grepcore::index::writer::ShardBuilder;
use grepcore::ngram::{extract_ngrams_with_positions, unique_ngrams};
use std::collections::BTreeMap;

fn sample_repo() -> Repository {
    Repository {
        id: 1,
        name: "bench/repo".to_string(),
        rank: 0,
        branches: vec![Branch { name: "main".to_string(), version: "v1".to_string() }],
        sub_repos: Vec::new(),
        tombstone: false,
        priority: 0,
        file_tombstones: Vec::new(),
        config: BTreeMap::new(),
        url_template: None,
        line_fragment_template: None,
    }
}

fn sample_file(i: usize) -> String {
    format!(
        "fn function_{i}() {{\n    println!(\"hello from function {i}\");\n    let x = {i} * 2;\n    let y = x + 1;\n}}\n\nstruct Struct{i} {{\n    field: i32,\n    name: String,\n}}\n"
    )
}

fn bench_shard_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("shard_build");
    for file_count in [10usize, 100, 500] {
        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            &file_count,
            |b, &n| {
                b.iter(|| {
                    let mut builder = ShardBuilder::new();
                    let repo = sample_repo();
                    for i in 0..n {
                        builder
                            .add_document(
                                repo.clone(),
                                "main",
                                &format!("file_{i}.rs"),
                                &sample_file(i),
                                &[],
                            )
                            .unwrap();
                    }
                    black_box(builder.finish().unwrap())
                })
            },
        );
    }
    group.finish();
}

fn bench_trigram_extraction(c: &mut Criterion) {
    let small = sample_file(0);
    let medium = small.repeat(20);
    let large = small.repeat(200);

    let mut group = c.benchmark_group("trigram_extraction");
    for (label, content) in [("small", &small), ("medium", &medium), ("large", &large)] {
        group.bench_function(label, |b| {
            b.iter(|| unique_ngrams(black_box(content)))
        });
        group.bench_function(format!("{label}_with_positions"), |b| {
            b.iter(|| extract_ngrams_with_positions(black_box(content)))
        });
    }
    group.finish();
}

fn bench_bloom_fragment_extraction(c: &mut Criterion) {
    let content = sample_file(0).repeat(50);
    c.bench_function("bloom_word_fragments", |b| {
        b.iter(|| extract_word_fragment_keys(black_box(content.as_bytes())))
    });
}

criterion_group!(
    benches,
    bench_shard_build,
    bench_trigram_extraction,
    bench_bloom_fragment_extraction,
);
criterion_main!(benches);
