use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::distributions::{Distribution, Uniform};

use flex_bits::{FlexibleDeltaIndexVector, FlexibleIndexVector};

mod common;

fn bench_compress(b: &mut Criterion) {
    let mut rng = rand::thread_rng();

    let mut group = b.benchmark_group("Index vector: compress");
    group.plot_config(common::plot_config());

    for l in common::SIZES {
        let values = common::fill_random_vec(&mut rng, l, 1 << 20);
        let sequence = common::fill_monotone_vec(&mut rng, l, 1 << 6);

        group.bench_with_input(BenchmarkId::new("plain", l), &l, |b, _| {
            b.iter_batched(
                || FlexibleIndexVector::from(values.as_slice()),
                |mut vec| {
                    vec.compress();
                    black_box(vec)
                },
                BatchSize::LargeInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("delta", l), &l, |b, _| {
            b.iter_batched(
                || FlexibleDeltaIndexVector::from(sequence.as_slice()),
                |mut vec| {
                    vec.compress().unwrap();
                    black_box(vec)
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_access(b: &mut Criterion) {
    let mut rng = rand::thread_rng();

    let mut group = b.benchmark_group("Index vector: access");
    group.plot_config(common::plot_config());

    for l in common::SIZES {
        let dense = FlexibleIndexVector::from(common::fill_random_vec(&mut rng, l, 1 << 20));
        let mut packed = dense.clone();
        packed.compress();
        let sample = Uniform::new(0, l);

        group.bench_with_input(BenchmarkId::new("dense get", l), &l, |b, _| {
            b.iter_batched(
                || sample.sample(&mut rng),
                |e| black_box(dense.get_unchecked(e)),
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("packed get", l), &l, |b, _| {
            b.iter_batched(
                || sample.sample(&mut rng),
                |e| black_box(packed.get_unchecked(e)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_iter(b: &mut Criterion) {
    let mut rng = rand::thread_rng();

    let mut group = b.benchmark_group("Index vector: iteration");
    group.plot_config(common::plot_config());

    for l in common::SIZES {
        let mut packed = FlexibleIndexVector::from(common::fill_random_vec(&mut rng, l, 1 << 20));
        packed.compress();
        let mut delta = FlexibleDeltaIndexVector::from(common::fill_monotone_vec(&mut rng, l, 1 << 6));
        delta.compress().unwrap();

        group.bench_with_input(BenchmarkId::new("packed", l), &l, |b, _| {
            b.iter(|| black_box(packed.iter().fold(0u64, u64::wrapping_add)))
        });

        group.bench_with_input(BenchmarkId::new("delta", l), &l, |b, _| {
            b.iter(|| black_box(delta.iter().fold(0u64, u64::wrapping_add)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_access, bench_iter);
criterion_main!(benches);
