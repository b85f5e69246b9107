use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use harmonic_af::amplification::AmplificationField;
use harmonic_af::impedance::Impedance;
use harmonic_af::polygon::{Polygon, SamplingBudget};
use harmonic_af::sweep::SweepSpec;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("amplification_field");
    let site = Impedance::new(100.0, 30.0);
    for step in [10.0, 2.0] {
        let grid = SweepSpec::new((0.0, 1000.0), (-1000.0, 1000.0), step)
            .build()
            .expect("valid sweep");
        group.bench_function(BenchmarkId::new("grid_cells", grid.len()), |b| {
            b.iter(|| AmplificationField::compute(site, 0.75, &grid))
        });
    }
    group.finish();
}

fn bench_interior_sampling(c: &mut Criterion) {
    let polygon = Polygon::new(vec![
        Impedance::new(8.78, 28.99),
        Impedance::new(11.54, 24.95),
        Impedance::new(30.0, 5.0),
        Impedance::new(5.6, 15.03),
        Impedance::new(4.79, 17.36),
    ])
    .expect("simple polygon");
    c.bench_function("sample_interior_1000", |b| {
        b.iter_batched(
            || ChaCha8Rng::seed_from_u64(42),
            |mut rng| polygon.sample_interior(1000, SamplingBudget::default(), &mut rng),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_field, bench_interior_sampling);
criterion_main!(benches);
