//! Criterion microbenches for the four generator families.
//!
//! The polynomial family dominates: every gate check scans the 2000-sample locus.
//! Results live under `target/criterion`.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use marginbench::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn bench_families(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let cfg = SamplerCfg::default();
    let cases = [
        ("hyperplane", FamilyParams::Hyperplane { dim: 2 }),
        ("polynomial-d2", FamilyParams::Polynomial { degree: 2 }),
        ("ellipse", FamilyParams::Ellipse { circle: false }),
        ("rectangle", FamilyParams::Rectangle),
    ];
    for (name, params) in cases {
        let spec = GenerateSpec::new(params, 100, 0.01);
        group.bench_function(BenchmarkId::new(name, "n100"), |b| {
            b.iter_batched(
                || ReplayToken { seed: 42, index: 0 },
                |mut tok| {
                    tok.index = tok.index.wrapping_add(1);
                    black_box(generate_replay(&spec, tok, &cfg))
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");
    let mut rng = StdRng::seed_from_u64(7);
    let curve = PolyCurve::draw(&mut rng, 3, 1.0);
    let ellipse = Ellipse::draw(&mut rng, false, 1.0);
    let p = random_vector(&mut rng, 2);
    group.bench_function("polynomial", |b| b.iter(|| curve.distance(black_box(&p))));
    group.bench_function("ellipse", |b| b.iter(|| ellipse.distance(black_box(&p))));
    group.finish();
}

criterion_group!(benches, bench_families, bench_distance);
criterion_main!(benches);
