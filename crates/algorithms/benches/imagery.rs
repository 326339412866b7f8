//! Benchmarks for imagery algorithms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vegclass_algorithms::imagery::{gaussian_background, ndvi, savi, BackgroundParams};
use vegclass_core::{GeoTransform, Raster};

fn create_band(size: usize, base: f32) -> Raster<f32> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0));
    for row in 0..size {
        for col in 0..size {
            let v = base + ((row * 7 + col * 13) % 200) as f32;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn bench_ndvi(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/ndvi");
    for size in [256, 512, 1024, 2048] {
        let nir = create_band(size, 300.0);
        let red = create_band(size, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ndvi(black_box(&nir), black_box(&red)).unwrap())
        });
    }
    group.finish();
}

fn bench_savi(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/savi");
    for size in [256, 512, 1024, 2048] {
        let nir = create_band(size, 300.0);
        let red = create_band(size, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| savi(black_box(&nir), black_box(&red), 0.5).unwrap())
        });
    }
    group.finish();
}

fn bench_gaussian_background(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/gaussian_background");
    group.sample_size(20);
    let params = BackgroundParams::default();
    for size in [256, 512, 1024] {
        let band = create_band(size, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| gaussian_background(black_box(&band), &params).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ndvi, bench_savi, bench_gaussian_background);
criterion_main!(benches);
