// Write performance benchmarks for chunklog

use chunklog::{ChunkedCompressedWriter, ChunkedPlainWriter, RecordWriter};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::hint::black_box;
use tempfile::TempDir;

fn make_records(count: usize) -> Vec<String> {
    let mut rng = rand::rng();
    (0..count)
        .map(|i| {
            let len: usize = rng.random_range(16..256);
            format!("{{\"seq\":{},\"body\":\"{}\"}}", i, "v".repeat(len))
        })
        .collect()
}

fn benchmark_plain_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_write");
    let records = make_records(10_000);
    let bytes: u64 = records.iter().map(|r| r.len() as u64 + 1).sum();
    group.throughput(Throughput::Bytes(bytes));

    for threshold in [4 * 1024u64, 64 * 1024, 64 * 1024 * 1024].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(threshold), threshold, |b, &threshold| {
            b.iter(|| {
                let temp_dir = TempDir::new().unwrap();
                let mut writer =
                    ChunkedPlainWriter::with_threshold("bench", temp_dir.path(), 0, threshold)
                        .unwrap();
                for record in &records {
                    writer.write(record).unwrap();
                }
                writer.close().unwrap();
                black_box(writer.num_chunks());
            });
        });
    }

    group.finish();
}

fn benchmark_gzip_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip_write");
    let records = make_records(10_000);
    let bytes: u64 = records.iter().map(|r| r.len() as u64 + 1).sum();
    group.throughput(Throughput::Bytes(bytes));

    // Small thresholds pay a gzip member header and trailer per chunk
    for threshold in [4 * 1024u64, 64 * 1024, 64 * 1024 * 1024].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(threshold), threshold, |b, &threshold| {
            b.iter(|| {
                let temp_dir = TempDir::new().unwrap();
                let mut writer =
                    ChunkedCompressedWriter::with_threshold("bench", temp_dir.path(), 0, threshold)
                        .unwrap();
                for record in &records {
                    writer.write(record).unwrap();
                }
                writer.close().unwrap();
                black_box(writer.num_chunks());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_plain_write, benchmark_gzip_write);
criterion_main!(benches);
