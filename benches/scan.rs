//! Scan and selection benchmarks over a synthetic query log
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use querylog::request::QueryRecord;
use querylog::stats::{QueryLog, ScanConfig, top_k};
use querylog::utils::{fnv1a_hash, fnv1a_hash_fast, percent_decode};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const BASE_TIMESTAMP: u64 = 1_438_387_200;
const RECORDS: u64 = 200_000;

/// Create a loosely sorted log: one record per second, up to 2 minutes of disorder
fn create_benchmark_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("queries.tsv");

    let mut content = String::with_capacity(RECORDS as usize * 40);
    let mut state = 0x2545f4914f6cdd1du64;
    for i in 0..RECORDS {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let ts = BASE_TIMESTAMP + i - (state % 120).min(i);
        // Skewed popularity: low ids are much more frequent
        let id = (state >> 20) % 1_000 * ((state >> 40) % 1_000) / 1_000;
        content.push_str(&format!("{}\thttp%3A%2F%2Fexample.com%2Fsearch%3Fq%3Dterm{}\n", ts, id));
    }
    fs::write(&path, content).expect("Failed to write log");

    (temp_dir, path)
}

fn bench_scan(c: &mut Criterion) {
    let (_temp_dir, path) = create_benchmark_log();
    let log = QueryLog::open(&path).expect("Failed to open log");

    let mut group = c.benchmark_group("scan");

    group.bench_function("full", |b| {
        let config = ScanConfig::default().with_fast_seek(false, 0);
        b.iter(|| log.scan(black_box(&config)).distinct_count())
    });

    for window in [60u64, 3_600, 36_000] {
        let from = BASE_TIMESTAMP + RECORDS / 2;
        let config = ScanConfig::default()
            .with_fast_seek(true, 900)
            .with_range(Some(from), Some(from + window));
        group.bench_with_input(BenchmarkId::new("fast_seek", window), &config, |b, config| {
            b.iter(|| log.scan(black_box(config)).distinct_count())
        });
    }

    group.finish();

    c.bench_function("locate", |b| {
        let target = QueryRecord::at(BASE_TIMESTAMP + RECORDS / 3);
        b.iter(|| log.records().locate(black_box(&target)).offset())
    });
}

fn bench_top_k(c: &mut Criterion) {
    let entries: Vec<(u32, u64)> = (0..100_000u32)
        .map(|i| (i, (i as u64).wrapping_mul(2654435761) % 10_007))
        .collect();

    let mut group = c.benchmark_group("top_k");
    for k in [10usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            b.iter(|| top_k(black_box(entries.iter().copied()), k))
        });
    }
    group.finish();
}

fn bench_hashing(c: &mut Criterion) {
    let query = b"http%3A%2F%2Fexample.com%2Fsearch%3Fq%3Dsome+longer+query";

    let mut group = c.benchmark_group("hashing");
    group.bench_function("fnv1a", |b| b.iter(|| fnv1a_hash(black_box(query))));
    group.bench_function("fnv1a_fast", |b| b.iter(|| fnv1a_hash_fast(black_box(query))));
    group.finish();

    c.bench_function("percent_decode", |b| b.iter(|| percent_decode(black_box(query))));
}

criterion_group!(benches, bench_scan, bench_top_k, bench_hashing);
criterion_main!(benches);
