use pano_core::Match;
use tracing::debug;

use crate::error::{MatchError, MatchResult};

/// Lowe's ratio test over two-nearest-neighbour lists
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioTest {
    ratio: f32,
}

impl RatioTest {
    pub fn new(ratio: f32) -> MatchResult<Self> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(MatchError::InvalidRatio(ratio));
        }
        Ok(Self { ratio })
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Keep the best neighbour of each query when it is clearly closer than
    /// the second one. Queries with fewer than two neighbours are dropped.
    /// Output follows query order.
    pub fn filter(&self, knn: &[Vec<Match>]) -> Vec<Match> {
        let good: Vec<Match> = knn
            .iter()
            .filter_map(|neighbours| match neighbours.as_slice() {
                [best, second, ..] if self.accepts(best, second) => Some(*best),
                _ => None,
            })
            .collect();

        debug!(candidates = knn.len(), accepted = good.len(), ratio = self.ratio, "ratio test");
        good
    }

    #[inline]
    fn accepts(&self, best: &Match, second: &Match) -> bool {
        (best.distance as f32) < self.ratio * second.distance as f32
    }
}

impl Default for RatioTest {
    fn default() -> Self {
        Self { ratio: 0.6 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn m(query_idx: usize, train_idx: usize, distance: u32) -> Match {
        Match { query_idx, train_idx, distance }
    }

    #[test]
    fn test_ratio_validation() {
        assert!(RatioTest::new(0.6).is_ok());
        assert!(RatioTest::new(1.0).is_ok());
        assert_eq!(RatioTest::new(0.0).unwrap_err(), MatchError::InvalidRatio(0.0));
        assert!(RatioTest::new(1.5).is_err());
        assert!(RatioTest::new(f32::NAN).is_err());
    }

    #[test]
    fn test_accepts_only_distinctive_matches() {
        let test = RatioTest::default();
        let knn = vec![
            vec![m(0, 4, 10), m(0, 7, 40)], // 10 < 24
            vec![m(1, 2, 30), m(1, 3, 40)], // 30 >= 24
            vec![m(2, 5, 12), m(2, 1, 20)], // 12 == 12, strict
            vec![m(3, 0, 0), m(3, 1, 1)],
        ];
        let good = test.filter(&knn);
        assert_eq!(good, vec![m(0, 4, 10), m(3, 0, 0)]);
    }

    #[test]
    fn test_single_neighbour_is_rejected() {
        let test = RatioTest::new(1.0).unwrap();
        assert!(test.filter(&[vec![m(0, 0, 0)], vec![]]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_output_is_subset_satisfying_ratio(
            pairs in prop::collection::vec((0u32..256, 0u32..256), 0..50),
            ratio in 0.05f32..=1.0,
        ) {
            let knn: Vec<Vec<Match>> = pairs
                .iter()
                .enumerate()
                .map(|(i, &(a, b))| vec![m(i, 0, a.min(b)), m(i, 1, a.max(b))])
                .collect();
            let good = RatioTest::new(ratio).unwrap().filter(&knn);
            prop_assert!(good.len() <= knn.len());
            for pair in good.windows(2) {
                prop_assert!(pair[0].query_idx < pair[1].query_idx);
            }
            for g in &good {
                let second = knn[g.query_idx][1].distance;
                prop_assert!((g.distance as f32) < ratio * second as f32);
            }
        }
    }
}
