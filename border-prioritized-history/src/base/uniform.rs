//! Source of uniform random values used for sampling.
use rand::{rngs::StdRng, Rng};

/// Produces uniform random values in a range.
///
/// Sampling only needs this capability, so tests can plug in a seeded or
/// scripted source.
pub trait UniformSource {
    /// Returns a value in `[low, high)`. Returns `low` if `high <= low`.
    ///
    /// The stratified sampler of this crate only draws positions with
    /// [`uniform_int`](Self::uniform_int). This method serves samplers built
    /// outside the crate, e.g. ones drawing a point of the cumulative mass
    /// within each bucket.
    fn uniform(&mut self, low: f32, high: f32) -> f32;

    /// Returns an integer in `[low, high)`. Returns `low` if `high <= low`.
    fn uniform_int(&mut self, low: usize, high: usize) -> usize;
}

impl UniformSource for StdRng {
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        self.gen_range(low..high)
    }

    fn uniform_int(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        self.gen_range(low..high)
    }
}

impl UniformSource for fastrand::Rng {
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        low + (high - low) * self.f32()
    }

    fn uniform_int(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        self.usize(low..high)
    }
}

#[cfg(test)]
mod tests {
    use super::UniformSource;
    use rand::{rngs::StdRng, SeedableRng};

    fn check_ranges<R: UniformSource>(rng: &mut R) {
        for _ in 0..1000 {
            let v = rng.uniform(-1.0, 2.0);
            assert!((-1.0..2.0).contains(&v));
            let i = rng.uniform_int(3, 7);
            assert!((3..7).contains(&i));
        }
        assert_eq!(rng.uniform(1.0, 1.0), 1.0);
        assert_eq!(rng.uniform_int(5, 5), 5);
        assert_eq!(rng.uniform_int(5, 2), 5);
    }

    #[test]
    fn test_std_rng() {
        check_ranges(&mut StdRng::seed_from_u64(42));
    }

    #[test]
    fn test_fastrand() {
        check_ranges(&mut fastrand::Rng::with_seed(42));
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let xs = (0..16).map(|_| a.uniform_int(0, 100)).collect::<Vec<_>>();
        let ys = (0..16).map(|_| b.uniform_int(0, 100)).collect::<Vec<_>>();
        assert_eq!(xs, ys);
    }
}
