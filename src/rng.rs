//! Seedable randomness shared by every behavior in a round.

use bevy_ecs::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// World-scoped random source.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(ChaCha8Rng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        Self::seeded(seed.unwrap_or_else(rand::random))
    }

    /// Uniform integer in `lo..=hi`. Collapses to `lo` when the range is empty.
    pub fn rand_int(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.0.gen_range(lo..=hi)
    }

    /// True with probability `1 / n`. `n` of 0 or 1 always succeeds.
    pub fn one_in(&mut self, n: u32) -> bool {
        n <= 1 || self.0.gen_range(0..n) == 0
    }

    /// Uniform float in `lo..hi`.
    pub fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.0.gen_range(lo..hi)
    }

    /// Random whole-degree heading in `0..=359`.
    pub fn heading(&mut self) -> f32 {
        self.rand_int(0, 359) as f32
    }
}

/// Runs `f` with the world's RNG, installing an entropy-seeded one if absent.
pub fn with_rng<T>(world: &mut World, f: impl FnOnce(&mut SimRng) -> T) -> T {
    let mut rng = world.get_resource_or_insert_with(|| SimRng::from_seed_option(None));
    f(&mut *rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SimRng::seeded(42);
        let mut b = SimRng::seeded(42);
        for _ in 0..32 {
            assert_eq!(a.rand_int(0, 1000), b.rand_int(0, 1000));
        }
    }

    #[test]
    fn test_rand_int_inclusive_bounds() {
        let mut rng = SimRng::seeded(1);
        let mut saw_lo = false;
        let mut saw_hi = false;
        for _ in 0..2000 {
            let v = rng.rand_int(1, 3);
            assert!((1..=3).contains(&v));
            saw_lo |= v == 1;
            saw_hi |= v == 3;
        }
        assert!(saw_lo && saw_hi);
    }

    #[test]
    fn test_empty_range_collapses() {
        let mut rng = SimRng::seeded(1);
        assert_eq!(rng.rand_int(0, -40), 0);
        assert_eq!(rng.uniform(5.0, 5.0), 5.0);
    }

    #[test]
    fn test_one_in_one_always_fires() {
        let mut rng = SimRng::seeded(3);
        assert!((0..100).all(|_| rng.one_in(1)));
        assert!((0..100).all(|_| rng.one_in(0)));
    }

    #[test]
    fn test_heading_range() {
        let mut rng = SimRng::seeded(5);
        for _ in 0..500 {
            let h = rng.heading();
            assert!((0.0..360.0).contains(&h));
        }
    }

    #[test]
    fn test_with_rng_installs_resource() {
        let mut world = World::new();
        let v = with_rng(&mut world, |rng| rng.rand_int(0, 10));
        assert!((0..=10).contains(&v));
        assert!(world.get_resource::<SimRng>().is_some());
    }
}
