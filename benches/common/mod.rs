#![allow(dead_code)]

use criterion::PlotConfiguration;
use rand::distributions::{Distribution, Uniform};
use rand::prelude::ThreadRng;

pub const SIZES: [usize; 8] = [
    1 << 8,
    1 << 10,
    1 << 12,
    1 << 14,
    1 << 16,
    1 << 18,
    1 << 20,
    1 << 22,
];

/// `len` uniformly random values below `bound`
pub fn fill_random_vec(rng: &mut ThreadRng, len: usize, bound: u64) -> Vec<u64> {
    let sample = Uniform::new(0, bound);

    let mut vec = Vec::with_capacity(len);
    for _ in 0..len {
        vec.push(sample.sample(rng));
    }

    vec
}

/// `len` non-decreasing values whose consecutive differences are below `max_gap`
pub fn fill_monotone_vec(rng: &mut ThreadRng, len: usize, max_gap: u64) -> Vec<u64> {
    let sample = Uniform::new(0, max_gap);

    let mut sum = 0;
    let mut vec = Vec::with_capacity(len);
    for _ in 0..len {
        sum += sample.sample(rng);
        vec.push(sum);
    }

    vec
}

pub fn plot_config() -> PlotConfiguration {
    PlotConfiguration::default().summary_scale(criterion::AxisScale::Logarithmic)
}
