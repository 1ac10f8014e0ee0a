use pano_core::{Descriptor, Match, hamming_distance};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{MatchError, MatchResult};

/// Brute-force k-nearest-neighbour matcher over binary descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorMatcher {
    k: usize,
}

impl DescriptorMatcher {
    /// Two neighbours, as required by the ratio test
    pub const DEFAULT_K: usize = 2;

    pub fn new(k: usize) -> MatchResult<Self> {
        if k == 0 {
            return Err(MatchError::InvalidNeighbourCount(k));
        }
        Ok(Self { k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// For every query descriptor, its `k` nearest train descriptors sorted
    /// by ascending distance. Equal distances keep the lower train index
    /// first. Fewer than `k` neighbours are returned when `train` is short.
    pub fn knn_match(&self, query: &[Descriptor], train: &[Descriptor]) -> Vec<Vec<Match>> {
        let knn: Vec<Vec<Match>> = query
            .par_iter()
            .enumerate()
            .map(|(query_idx, q)| self.nearest(query_idx, q, train))
            .collect();

        debug!(queries = query.len(), train = train.len(), k = self.k, "knn matching done");
        knn
    }

    fn nearest(&self, query_idx: usize, q: &Descriptor, train: &[Descriptor]) -> Vec<Match> {
        let mut best: Vec<Match> = Vec::with_capacity(self.k + 1);

        for (train_idx, t) in train.iter().enumerate() {
            let distance = hamming_distance(q, t);
            if best.len() == self.k && best.last().is_some_and(|m| distance >= m.distance) {
                continue;
            }
            // Insert after every entry that is not farther, so ties stay in index order
            let pos = best.partition_point(|m| m.distance <= distance);
            best.insert(
                pos,
                Match {
                    query_idx,
                    train_idx,
                    distance,
                },
            );
            best.truncate(self.k);
        }

        best
    }
}

impl Default for DescriptorMatcher {
    fn default() -> Self {
        Self { k: Self::DEFAULT_K }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn desc(bits_set: usize) -> Descriptor {
        let mut d = [0u8; 32];
        for i in 0..bits_set {
            d[i / 8] |= 1 << (i % 8);
        }
        d
    }

    #[test]
    fn test_invalid_k() {
        assert_eq!(DescriptorMatcher::new(0).unwrap_err(), MatchError::InvalidNeighbourCount(0));
        assert_eq!(DescriptorMatcher::default().k(), 2);
    }

    #[test]
    fn test_neighbour_counts_follow_train_size() {
        let matcher = DescriptorMatcher::default();
        let query = vec![desc(3), desc(10)];

        let knn = matcher.knn_match(&query, &[desc(1), desc(5), desc(20)]);
        assert!(knn.iter().all(|n| n.len() == 2));

        let knn = matcher.knn_match(&query, &[desc(1)]);
        assert!(knn.iter().all(|n| n.len() == 1));

        let knn = matcher.knn_match(&query, &[]);
        assert_eq!(knn.len(), 2);
        assert!(knn.iter().all(|n| n.is_empty()));

        assert!(matcher.knn_match(&[], &[desc(1)]).is_empty());
    }

    #[test]
    fn test_neighbours_sorted_and_indexed() {
        let matcher = DescriptorMatcher::default();
        let knn = matcher.knn_match(&[desc(10)], &[desc(0), desc(12), desc(9), desc(30)]);
        let n = &knn[0];
        assert_eq!((n[0].train_idx, n[0].distance), (2, 1));
        assert_eq!((n[1].train_idx, n[1].distance), (1, 2));
        assert!(n.iter().all(|m| m.query_idx == 0));
    }

    #[test]
    fn test_ties_resolve_to_lowest_train_index() {
        let matcher = DescriptorMatcher::default();
        let train = vec![desc(20), desc(4), desc(4), desc(4)];
        let knn = matcher.knn_match(&[desc(4)], &train);
        assert_eq!(knn[0][0].train_idx, 1);
        assert_eq!(knn[0][1].train_idx, 2);
    }

    proptest! {
        #[test]
        fn prop_matches_exhaustive_sort(
            query in prop::collection::vec(prop::array::uniform32(any::<u8>()), 1..8),
            train in prop::collection::vec(prop::array::uniform32(any::<u8>()), 0..20),
            k in 1usize..4,
        ) {
            let matcher = DescriptorMatcher::new(k).unwrap();
            let knn = matcher.knn_match(&query, &train);
            prop_assert_eq!(knn.len(), query.len());
            for (qi, neighbours) in knn.iter().enumerate() {
                let mut expected: Vec<(u32, usize)> = train
                    .iter()
                    .enumerate()
                    .map(|(ti, t)| (hamming_distance(&query[qi], t), ti))
                    .collect();
                expected.sort();
                expected.truncate(k);
                let got: Vec<(u32, usize)> = neighbours.iter().map(|m| (m.distance, m.train_idx)).collect();
                prop_assert_eq!(got, expected);
            }
        }
    }
}
