//! Uniform in-place shuffling.

use rand::Rng;

/// Shuffle a slice in place using Fisher-Yates.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
