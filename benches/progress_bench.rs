//! Benchmarks for progress accounting overhead on upload bodies.

use std::io::{Cursor, Read};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use snapshot_upload::cloud::chunking::plan_chunks;
use snapshot_upload::cloud::progress::ProgressReader;
use snapshot_upload::models::ProgressEvent;

/// Drain a reader with the given read size
fn drain<R: Read>(mut reader: R, read_size: usize) -> u64 {
    let mut buf = vec![0u8; read_size];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    total
}

/// Benchmark ProgressReader against a bare reader for different read sizes
fn bench_progress_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("progress_reader");
    let data = vec![0u8; 8 * 1024 * 1024];

    let read_sizes = vec![
        (4 * 1024, "4KB"),
        (64 * 1024, "64KB"),
        (1024 * 1024, "1MB"),
    ];

    for (read_size, name) in read_sizes {
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::new("bare", name), &read_size, |b, &size| {
            b.iter(|| drain(Cursor::new(black_box(&data[..])), size));
        });

        group.bench_with_input(BenchmarkId::new("with_progress", name), &read_size, |b, &size| {
            b.iter(|| {
                let reader = ProgressReader::new(
                    Cursor::new(black_box(&data[..])),
                    data.len() as u64,
                    Arc::new(|event: ProgressEvent| {
                        black_box(event);
                    }),
                );
                drain(reader, size)
            });
        });
    }

    group.finish();
}

/// Benchmark chunk planning for large snapshots
fn bench_plan_chunks(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_chunks");

    for (file_size, name) in [(1u64 << 30, "1GB"), (1u64 << 36, "64GB")] {
        group.bench_function(name, |b| {
            b.iter(|| plan_chunks(black_box(file_size), black_box(8 * 1024 * 1024)).count());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_progress_reader, bench_plan_chunks);
criterion_main!(benches);
