//! Benchmark for noise generation performance.
//!
//! TARGET: 1,000,000 samples per second
//!
//! Run with: cargo bench --package strata_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_procedural::{generate_noise_map, NoiseSettings, PerlinNoise, WorldPos, WorldSeed};

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = PerlinNoise::new();

    c.bench_function("single_noise_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x), black_box(x * 0.7)))
        });
    });
}

fn benchmark_million_samples(c: &mut Criterion) {
    let noise = PerlinNoise::new();

    let mut group = c.benchmark_group("million_samples");
    group.throughput(Throughput::Elements(1_000_000));
    group.sample_size(10);

    group.bench_function("1M_noise_samples", |b| {
        b.iter(|| {
            for i in 0..1_000_000u32 {
                let x = f64::from(i % 1000) * 0.1;
                let y = f64::from(i / 1000) * 0.1;
                black_box(noise.sample(x, y));
            }
        });
    });

    group.finish();
}

fn benchmark_noise_map(c: &mut Criterion) {
    let settings = NoiseSettings::with_seed(WorldSeed::new(42));

    let mut group = c.benchmark_group("noise_map");
    group.throughput(Throughput::Elements(257 * 257));
    group.sample_size(20);

    group.bench_function("257x257_five_octaves", |b| {
        b.iter(|| black_box(generate_noise_map(257, 257, &settings, WorldPos::ORIGIN)));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_million_samples,
    benchmark_noise_map,
);
criterion_main!(benches);
