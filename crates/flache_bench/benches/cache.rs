//! Cache benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flache_bench::{runtime, sample_data};
use flache_core::{BytesCodec, Cache, CacheConfig, ShardPath};
use serde_json::json;
use tempfile::TempDir;

/// Benchmark key to path derivation.
fn bench_shard_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("shard_path");

    for len in [8usize, 64, 512].iter() {
        let key = "k".repeat(*len);
        group.throughput(Throughput::Bytes(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &key, |b, key| {
            b.iter(|| black_box(ShardPath::for_key(black_box(key))));
        });
    }

    group.finish();
}

/// Benchmark JSON set on a directory cache.
fn bench_json_set(c: &mut Criterion) {
    let rt = runtime();
    let dir = TempDir::new().unwrap();
    let cache: Cache = Cache::new(CacheConfig::new().path(dir.path()));
    let value = json!({"says": "Hi there", "n": [1, 2, 3]});

    let mut group = c.benchmark_group("json_set");
    group.sample_size(50);
    group.bench_function("small", |b| {
        let mut i = 0u64;
        b.to_async(&rt).iter(|| {
            i += 1;
            let key = format!("key-{}", i % 1024);
            let cache = &cache;
            let value = &value;
            async move { cache.set(key, value).await.unwrap() }
        });
    });
    group.finish();
}

/// Benchmark get of raw entries of various sizes.
fn bench_bytes_get(c: &mut Criterion) {
    let rt = runtime();
    let dir = TempDir::new().unwrap();
    let cache: Cache<BytesCodec> = Cache::new(CacheConfig::new().path(dir.path()));

    let mut group = c.benchmark_group("bytes_get");
    group.sample_size(50);

    for size in [256usize, 4096, 65536].iter() {
        let key = format!("entry-{size}");
        rt.block_on(cache.set(&key, &sample_data(*size))).unwrap();

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &key, |b, key| {
            b.to_async(&rt)
                .iter(|| async { black_box(cache.get(key).await.unwrap()) });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shard_path, bench_json_set, bench_bytes_get);
criterion_main!(benches);
