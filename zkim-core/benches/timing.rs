//! Benchmarks for the chunker/compressor and three-layer encryptor hot path.
//!
//! Run with: `cargo bench --bench timing`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use zkim_core::chunker::{self, CompressionAlgorithm};
use zkim_core::encryptor;
use zkim_core::keys;
use zkim_core::metadata::Metadata;
use zkim_core::storage::InMemoryBackend;
use zkim_core::{FileService, ZkimConfig};

const PAYLOAD_SIZES: &[usize] = &[1024, 65_536, 1_048_576, 4 * 1_048_576];

fn bench_chunker(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunker_process");

    for &size in PAYLOAD_SIZES {
        let data = vec![0x42u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("gzip", size), &data, |b, data| {
            b.iter(|| {
                chunker::process(data, true, CompressionAlgorithm::Gzip, 6, chunker::DEFAULT_CHUNK_SIZE).unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("none", size), &data, |b, data| {
            b.iter(|| {
                chunker::process(data, false, CompressionAlgorithm::None, 0, chunker::DEFAULT_CHUNK_SIZE).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_three_layer_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt_layers");

    let platform_key = [1u8; 32];
    let user_key = [2u8; 32];
    let metadata = Metadata::new("bench.bin", "application/octet-stream", "user-1");

    for &size in PAYLOAD_SIZES {
        let data = vec![0x24u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("layers", size), &data, |b, data| {
            b.iter(|| {
                let layer_keys = keys::derive_layer_keys(&platform_key, &user_key).unwrap();
                encryptor::encrypt_layers(
                    "bench-file-id",
                    data,
                    &metadata,
                    &layer_keys.user_layer_key,
                    &layer_keys.platform_layer_key,
                )
                .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_create(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("file_service_create");

    for &size in &[1024usize, 65_536] {
        let data = vec![0x11u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("skip_store", size), &data, |b, data| {
            let storage = std::sync::Arc::new(InMemoryBackend::new());
            let service = FileService::new(ZkimConfig::default(), storage);
            b.iter(|| {
                rt.block_on(async {
                    service
                        .create(data, "user-1", &[3u8; 32], &[4u8; 32], None, true)
                        .await
                        .unwrap()
                })
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chunker, bench_three_layer_encrypt, bench_create);
criterion_main!(benches);
