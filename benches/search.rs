//! Search-path benchmarks over an in-memory shard.
//!
//! Run with: `cargo bench --bench search`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grepcore::cancel::CancellationToken;
use grepcore::config::SearchOptions;
use grepcore::index::reader::IndexData;
use grepcore::index::types::{Branch, Repository};
use grepcore::index::writer::ShardBuilder;
use grepcore::query::ast::Query;
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
        "fn getUserById_{i}(userId: i32) -> Option<User> {{\n    let user_name = \"test_user_{i}\";\n    some_function_call(arg1, arg2);\n    // needle appears in every file here\n}}\n"
    )
}

fn build_fixture_index(file_count: usize) -> IndexData {
    let mut builder = ShardBuilder::new();
    let repo = sample_repo();
    for i in 0..file_count {
        builder
            .add_document(repo.clone(), "main", &format!("file_{i}.rs"), &sample_file(i), &[])
            .unwrap();
    }
    IndexData::open_bytes(builder.finish().unwrap()).unwrap()
}

fn bench_substring_search(c: &mut Criterion) {
    let index = build_fixture_index(500);
    let options = SearchOptions::default();

    c.bench_function("substring_common_literal", |b| {
        let query = Query::substring("needle", false, false, true);
        b.iter(|| {
            index
                .search(black_box(&query), &options, &CancellationToken::new())
                .unwrap()
        })
    });

    c.bench_function("substring_rare_literal", |b| {
        let query = Query::substring("getUserById_499", false, false, true);
        b.iter(|| {
            index
                .search(black_box(&query), &options, &CancellationToken::new())
                .unwrap()
        })
    });
}

fn bench_regexp_search(c: &mut Criterion) {
    let index = build_fixture_index(500);
    let options = SearchOptions::default();

    c.bench_function("regexp_digit_suffix", |b| {
        let query = Query::regexp(r"getUserById_\d+", false, false, true);
        b.iter(|| {
            index
                .search(black_box(&query), &options, &CancellationToken::new())
                .unwrap()
        })
    });
}

fn bench_compound_query(c: &mut Criterion) {
    let index = build_fixture_index(500);
    let options = SearchOptions::default();

    c.bench_function("and_or_combination", |b| {
        let query = Query::and([
            Query::or([
                Query::substring("needle", false, false, true),
                Query::substring("nonexistent", false, false, true),
            ]),
            Query::not(Query::substring("file_0.rs", false, true, false)),
        ]);
        b.iter(|| {
            index
                .search(black_box(&query), &options, &CancellationToken::new())
                .unwrap()
        })
    });
}

fn bench_bm25_search(c: &mut Criterion) {
    let index = build_fixture_index(500);
    let mut options = SearchOptions::default();
    options.use_bm25 = true;

    c.bench_function("bm25_ranked", |b| {
        let query = Query::substring("needle", false, false, true);
        b.iter(|| {
            index
                .search(black_box(&query), &options, &CancellationToken::new())
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_substring_search,
    bench_regexp_search,
    bench_compound_query,
    bench_bm25_search,
);
criterion_main!(benches);
