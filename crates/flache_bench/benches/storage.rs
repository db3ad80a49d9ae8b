//! Storage handle benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flache_bench::{runtime, sample_data};
use flache_storage::{DirectoryTree, StorageHandle, StorageTree, StreamOptions};
use futures::StreamExt;
use tempfile::TempDir;

async fn drain(handle: &StorageHandle, options: StreamOptions) -> usize {
    let mut stream = handle.stream_with(options);
    let mut total = 0;
    while let Some(chunk) = stream.next().await {
        total += chunk.unwrap().len();
    }
    total
}

/// Benchmark streaming an in-memory handle with different chunk sizes.
fn bench_memory_stream(c: &mut Criterion) {
    let rt = runtime();
    let handle = StorageHandle::from_bytes(sample_data(1 << 20));

    let mut group = c.benchmark_group("memory_stream");
    group.throughput(Throughput::Bytes(1 << 20));

    for chunk in [4096usize, 65536].iter() {
        let options = StreamOptions::new().with_chunk_size(*chunk);
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &options, |b, options| {
            b.to_async(&rt)
                .iter(|| async { black_box(drain(&handle, *options).await) });
        });
    }

    group.finish();
}

/// Benchmark streaming a file handle.
fn bench_file_stream(c: &mut Criterion) {
    let rt = runtime();
    let dir = TempDir::new().unwrap();
    let tree = DirectoryTree::new(dir.path());
    rt.block_on(tree.write_file("aa/bb/blob", &sample_data(1 << 20)))
        .unwrap();
    let handle = rt.block_on(tree.open_file("aa/bb/blob")).unwrap();

    let mut group = c.benchmark_group("file_stream");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(1 << 20));
    group.bench_function("1MiB", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(drain(&handle, StreamOptions::default()).await) });
    });
    group.finish();
}

criterion_group!(benches, bench_memory_stream, bench_file_stream);
criterion_main!(benches);
