use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dirichlet_density::convergence::{log_bounds, sample_convergence, ConvergenceSampler};
use dirichlet_density::density::estimate_density;
use dirichlet_density::sieve::generate_primes;

fn bench_sieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("sieve");
    group.sample_size(20);

    for bound in [10_000u64, 100_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(bound), &bound, |b, &bound| {
            b.iter(|| generate_primes(bound));
        });
    }

    group.finish();
}

fn bench_density(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_density");
    let primes = generate_primes(1_000_000);

    for n in [4u64, 12, 210] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| estimate_density(&primes, n));
        });
    }

    group.finish();
}

fn bench_convergence(c: &mut Criterion) {
    let mut group = c.benchmark_group("convergence");
    group.sample_size(10);
    let bounds = log_bounds(1_000, 1_000_000, 40).unwrap_or_default();

    group.bench_function("single_sieve", |b| {
        b.iter(|| sample_convergence(4, &bounds));
    });

    // Baseline: a fresh sieve per sample point.
    group.bench_function("resieve_per_bound", |b| {
        b.iter(|| {
            bounds
                .iter()
                .map(|&bound| estimate_density(&generate_primes(bound), 4))
                .collect::<Vec<_>>()
        });
    });

    let primes = generate_primes(1_000_000);
    group.bench_function("shared_sieve", |b| {
        let sampler = ConvergenceSampler::new(&primes);
        b.iter(|| sampler.trajectory(4, &bounds));
    });

    group.finish();
}

criterion_group!(benches, bench_sieve, bench_density, bench_convergence);
criterion_main!(benches);
