//! Benchmark for chunk generation performance.
//!
//! TARGET: a 256-unit chunk well inside one frame budget per worker
//!
//! Run with: cargo bench --package strata_procedural --bench chunk_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_procedural::{
    ChunkCoord, ChunkGenerator, HeightGrid, NoiseSettings, RegionTable, WorldSeed,
};

fn generator(chunk_size: u32) -> ChunkGenerator {
    ChunkGenerator::new(
        NoiseSettings::with_seed(WorldSeed::new(42)),
        RegionTable::landmass(),
        chunk_size,
    )
    .expect("valid benchmark parameters")
}

fn benchmark_single_chunk(c: &mut Criterion) {
    let gen = generator(256);

    let mut group = c.benchmark_group("single_chunk");
    group.throughput(Throughput::Elements(257 * 257));
    group.sample_size(20);

    group.bench_function("chunk_256_generation", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(gen.generate_at(ChunkCoord::new(coord, coord / 2)))
        });
    });

    group.finish();
}

fn benchmark_neighbourhood(c: &mut Criterion) {
    let gen = generator(64);

    let mut group = c.benchmark_group("neighbourhood");
    group.throughput(Throughput::Elements(9));

    group.bench_function("3x3_chunks_64", |b| {
        b.iter(|| {
            for coord in ChunkCoord::new(0, 0).neighbourhood(1) {
                black_box(gen.generate_at(coord)).ok();
            }
        });
    });

    group.finish();
}

fn benchmark_classification(c: &mut Criterion) {
    let table = RegionTable::landmass();
    let values: Vec<f32> = (0..257 * 257u32).map(|i| (i % 1000) as f32 / 1000.0).collect();
    let grid = HeightGrid::from_values(257, 257, values).expect("grid size");

    c.bench_function("classify_257x257", |b| {
        b.iter(|| black_box(table.classify(black_box(&grid))));
    });
}

fn benchmark_snapshot(c: &mut Criterion) {
    let payload = generator(256)
        .generate_at(ChunkCoord::new(3, 3))
        .expect("chunk generation");

    c.bench_function("snapshot_encode_256", |b| {
        b.iter(|| black_box(payload.to_compressed_bytes()));
    });
}

criterion_group!(
    benches,
    benchmark_single_chunk,
    benchmark_neighbourhood,
    benchmark_classification,
    benchmark_snapshot,
);
criterion_main!(benches);
