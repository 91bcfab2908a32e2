// Fit and classify throughput of the matching engine
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use facegate_core::{Embedding, Face, MatchingEngine, Uid, Warehouse};
use image::GrayImage;
use rand::prelude::*;

const DIM: usize = 256;

fn random_embedding(rng: &mut impl Rng) -> Embedding {
    let data: Vec<f32> = (0..DIM).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    Embedding::new(data).normalized()
}

fn gallery(size: usize) -> Warehouse {
    let mut rng = rand::rng();
    let mut wh = Warehouse::new();
    for i in 0..size {
        let face = Face::new(GrayImage::new(1, 1), Uid((i % 100) as u32))
            .with_embedding(random_embedding(&mut rng));
        wh.add(face);
    }
    wh
}

fn benchmark_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");

    for size in [100, 1000, 10000].iter() {
        let wh = gallery(*size);
        group.bench_with_input(BenchmarkId::new("flat", size), size, |b, _| {
            let mut engine = MatchingEngine::default();
            b.iter(|| engine.fit(black_box(&wh)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let mut rng = rand::rng();

    for size in [100, 1000, 10000].iter() {
        let mut engine = MatchingEngine::default();
        engine.fit(&gallery(*size)).unwrap();
        let query = random_embedding(&mut rng);

        group.bench_with_input(BenchmarkId::new("flat", size), size, |b, _| {
            b.iter(|| engine.classify(black_box(&query)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_fit, benchmark_classify);
criterion_main!(benches);
