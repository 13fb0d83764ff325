//! Gaussian fills and unbiased shuffling.

use rand::Rng;
use std::f32::consts::TAU;

/// Fill `data` with N(0, sigma²) draws using the Box–Muller transform.
///
/// Draws come in pairs; for an odd-length buffer the last pair's sine term is
/// discarded.
pub fn randomize_gaussian<R: Rng + ?Sized>(rng: &mut R, data: &mut [f32], sigma: f32) {
    for pair in data.chunks_mut(2) {
        let mut u1: f32 = rng.gen();
        while u1 <= f32::MIN_POSITIVE {
            u1 = rng.gen();
        }
        let u2: f32 = rng.gen();

        let radius = (-2.0 * u1.ln()).sqrt() * sigma;
        let (sin, cos) = (TAU * u2).sin_cos();

        pair[0] = radius * cos;
        if let Some(second) = pair.get_mut(1) {
            *second = radius * sin;
        }
    }
}

/// Uniform integer in `[0, upper)` by modulo rejection.
fn uniform_below<R: Rng + ?Sized>(rng: &mut R, upper: u64) -> u64 {
    debug_assert!(upper > 0);
    // Largest multiple of `upper` that fits; draws at or above it are redrawn
    let zone = u64::MAX - (u64::MAX % upper);
    loop {
        let draw = rng.next_u64();
        if draw < zone {
            return draw % upper;
        }
    }
}

/// Fisher–Yates shuffle with an unbiased index source.
pub fn shuffle_in_place<T, R: Rng + ?Sized>(rng: &mut R, data: &mut [T]) {
    for i in (1..data.len()).rev() {
        let j = uniform_below(rng, i as u64 + 1) as usize;
        data.swap(i, j);
    }
}
