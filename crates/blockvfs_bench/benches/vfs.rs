//! Virtual file benchmarks.

use blockvfs_bench::{bench_data, bench_vfs};
use blockvfs_core::{blocks, OpenFlags, Vfs, VfsFile};
use blockvfs_store::{DirObjectStore, InMemoryObjectStore};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

/// Benchmark block addressing for reads spanning many blocks.
fn bench_block_addressing(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_addressing");

    for block_size in [512usize, 4096, 65536].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(block_size), block_size, |b, &bs| {
            b.iter(|| {
                let total: usize = blocks(black_box(12_345), black_box(1 << 20), bs)
                    .map(|span| span.len)
                    .sum();
                black_box(total);
            });
        });
    }

    group.finish();
}

/// Benchmark page-sized writes into an in-memory bucket.
fn bench_inmemory_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_write");

    for page in [1024usize, 4096, 16384].iter() {
        group.throughput(Throughput::Bytes(*page as u64));
        group.bench_with_input(BenchmarkId::from_parameter(page), page, |b, &page| {
            let vfs = bench_vfs(Arc::new(InMemoryObjectStore::new()), 4096);
            let mut file = vfs.open("bench.db", OpenFlags::READWRITE).unwrap();
            let data = bench_data(page);
            let mut n = 0u64;

            b.iter(|| {
                // Cycle over 64 pages so the bucket stays small
                let offset = (n % 64) * page as u64;
                file.write(black_box(&data), offset).unwrap();
                n += 1;
            });
        });
    }

    group.finish();
}

/// Benchmark unaligned reads from an in-memory bucket.
fn bench_inmemory_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_read");

    for size in [100usize, 4096, 32768].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let vfs = bench_vfs(Arc::new(InMemoryObjectStore::new()), 4096);
            vfs.deserialize("bench.db", &bench_data(1 << 20)[..]).unwrap();
            let file = vfs.open("bench.db", OpenFlags::READONLY).unwrap();

            b.iter(|| {
                let result = file.read(black_box(size), black_box(1000)).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark page writes into a directory bucket.
fn bench_dir_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("dir_write");

    // Every put syncs a file
    group.sample_size(20);

    group.throughput(Throughput::Bytes(4096));
    group.bench_function("page_4096", |b| {
        let temp_dir = TempDir::new().unwrap();
        let store = DirObjectStore::open(&temp_dir.path().join("bucket")).unwrap();
        let vfs = bench_vfs(Arc::new(store), 4096);
        let mut file = vfs.open("bench.db", OpenFlags::READWRITE).unwrap();
        let data = bench_data(4096);
        let mut n = 0u64;

        b.iter(|| {
            file.write(black_box(&data), (n % 16) * 4096).unwrap();
            n += 1;
        });
    });

    group.finish();
}

/// Benchmark whole-file export and import.
fn bench_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer");
    let size = 4 << 20;
    group.throughput(Throughput::Bytes(size as u64));

    group.bench_function("export_4mb", |b| {
        let vfs = bench_vfs(Arc::new(InMemoryObjectStore::new()), 65536);
        vfs.deserialize("bench.db", &bench_data(size)[..]).unwrap();
        let mut buf = Vec::with_capacity(size);

        b.iter(|| {
            buf.clear();
            vfs.serialize("bench.db").unwrap().read_to_end(&mut buf).unwrap();
            black_box(buf.len());
        });
    });

    group.bench_function("import_4mb", |b| {
        let vfs = bench_vfs(Arc::new(InMemoryObjectStore::new()), 65536);
        let data = bench_data(size);

        b.iter(|| {
            let written = vfs.deserialize("bench.db", black_box(&data[..])).unwrap();
            black_box(written);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_block_addressing,
    bench_inmemory_write,
    bench_inmemory_read,
    bench_dir_write,
    bench_transfer,
);

criterion_main!(benches);
