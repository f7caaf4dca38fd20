//! Benchmarks for level token parsing.
//!
//! Run with: cargo bench --bench level

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use debugserver::admin::validate_and_normalize;
use debugserver::level::normalize;

use axum::http::Method;

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("level/normalize");

    group.bench_function("canonical", |b| b.iter(|| normalize(black_box(b"debug"))));

    group.bench_function("mixed_case", |b| b.iter(|| normalize(black_box(b"DeBuG"))));

    group.bench_function("ordinal", |b| b.iter(|| normalize(black_box(b"3"))));

    group.bench_function("trailing_newline", |b| {
        b.iter(|| normalize(black_box(b"warn\n")))
    });

    group.bench_function("unrecognized", |b| {
        b.iter(|| normalize(black_box(b"verbose")))
    });

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("level/validate");

    group.bench_function("post_plaintext", |b| {
        b.iter(|| validate_and_normalize(&Method::POST, None, black_box(b"info")))
    });

    group.bench_function("wrong_method", |b| {
        b.iter(|| validate_and_normalize(&Method::GET, None, black_box(b"info")))
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_validate);
criterion_main!(benches);
