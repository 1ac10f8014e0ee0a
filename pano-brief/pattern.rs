use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of intensity comparisons, one per descriptor bit
pub const PATTERN_PAIRS: usize = 256;

/// Radius of the disc the sampling points are drawn from
pub const PATTERN_RADIUS: i32 = 13;

const PATTERN_SEED: u64 = 0x0b21_ef5e_ed00_2561;

/// One comparison: offsets of the two sampled points relative to the keypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestPair {
    pub p1: (i32, i32),
    pub p2: (i32, i32),
}

/// Fixed sampling pattern. Every run of the program draws the same pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingPattern {
    pairs: Vec<TestPair>,
}

impl SamplingPattern {
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(PATTERN_SEED);
        let mut pairs = Vec::with_capacity(PATTERN_PAIRS);
        while pairs.len() < PATTERN_PAIRS {
            let p1 = Self::point_in_disc(&mut rng);
            let p2 = Self::point_in_disc(&mut rng);
            if p1 != p2 {
                pairs.push(TestPair { p1, p2 });
            }
        }
        Self { pairs }
    }

    pub fn pairs(&self) -> &[TestPair] {
        &self.pairs
    }

    /// Rejection sampling, uniform over the integer points of the disc
    fn point_in_disc<R: Rng>(rng: &mut R) -> (i32, i32) {
        loop {
            let x = rng.random_range(-PATTERN_RADIUS..=PATTERN_RADIUS);
            let y = rng.random_range(-PATTERN_RADIUS..=PATTERN_RADIUS);
            if x * x + y * y <= PATTERN_RADIUS * PATTERN_RADIUS {
                return (x, y);
            }
        }
    }
}

impl Default for SamplingPattern {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_size_and_bounds() {
        let pattern = SamplingPattern::new();
        assert_eq!(pattern.pairs().len(), PATTERN_PAIRS);
        for pair in pattern.pairs() {
            assert_ne!(pair.p1, pair.p2);
            for (x, y) in [pair.p1, pair.p2] {
                assert!(x * x + y * y <= PATTERN_RADIUS * PATTERN_RADIUS);
            }
        }
    }

    #[test]
    fn test_pattern_is_fixed() {
        assert_eq!(SamplingPattern::new(), SamplingPattern::new());
    }

    #[test]
    fn test_pattern_covers_the_disc() {
        let pattern = SamplingPattern::new();
        let max_x = pattern.pairs().iter().map(|p| p.p1.0.max(p.p2.0)).max().unwrap();
        let min_y = pattern.pairs().iter().map(|p| p.p1.1.min(p.p2.1)).min().unwrap();
        assert!(max_x >= PATTERN_RADIUS - 3);
        assert!(min_y <= -(PATTERN_RADIUS - 3));
    }
}
