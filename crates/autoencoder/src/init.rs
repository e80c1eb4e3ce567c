use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Half-width of the initial weight interval.
pub const INIT_RANGE: f32 = 0.01;

/// Seeded ChaCha8 generator used wherever reproducible weights are needed.
pub fn make_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform draw from `[-0.01, 0.01)`.
pub fn small_random_number<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(-INIT_RANGE..INIT_RANGE)
}
