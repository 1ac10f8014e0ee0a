use pano_core::{Homography, RansacConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::Correspondence;
use crate::dlt::{fit_homography, is_degenerate_sample, reprojection_error};
use crate::error::{DegeneracyReason, HomographyError, HomographyResult};

/// Correspondences in a minimal sample
pub const SAMPLE_SIZE: usize = 4;

/// Outcome of a successful estimation
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub homography: Homography,
    /// Indices into the input correspondences, ascending
    pub inliers: Vec<usize>,
    pub iterations: usize,
}

impl Estimate {
    pub fn inlier_ratio(&self, total: usize) -> f64 {
        if total == 0 { 0.0 } else { self.inliers.len() as f64 / total as f64 }
    }
}

/// RANSAC homography estimator.
#[derive(Debug, Clone)]
pub struct HomographyEstimator {
    config: RansacConfig,
    min_match_count: usize,
}

impl HomographyEstimator {
    pub fn new(config: RansacConfig, min_match_count: usize) -> Self {
        Self {
            config,
            min_match_count,
        }
    }

    pub fn config(&self) -> &RansacConfig {
        &self.config
    }

    /// Smallest number of correspondences accepted
    pub fn required(&self) -> usize {
        self.min_match_count.max(SAMPLE_SIZE)
    }

    /// Estimate with a generator seeded from the configuration, or from OS
    /// entropy when no seed is configured.
    pub fn estimate(&self, points: &[Correspondence]) -> HomographyResult<Estimate> {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        self.estimate_with_rng(points, &mut rng)
    }

    /// Estimate using the given random source for sampling.
    pub fn estimate_with_rng<R: Rng>(&self, points: &[Correspondence], rng: &mut R) -> HomographyResult<Estimate> {
        let n = points.len();
        let required = self.required();
        if n < required {
            return Err(HomographyError::InsufficientCorrespondences { found: n, required });
        }

        let threshold = self.config.reprojection_threshold;
        let mut max_iterations = self.config.max_iterations.max(1);
        let mut iterations = 0;
        let mut degenerate = 0;
        let mut best: Option<(Homography, Vec<usize>)> = None;
        let mut sample = Vec::with_capacity(SAMPLE_SIZE);

        while iterations < max_iterations {
            iterations += 1;
            random_sample_into(rng, n, SAMPLE_SIZE, &mut sample);
            let picked = [points[sample[0]], points[sample[1]], points[sample[2]], points[sample[3]]];
            if is_degenerate_sample(&picked) {
                degenerate += 1;
                continue;
            }

            let src = picked.map(|c| c.src);
            let dst = picked.map(|c| c.dst);
            let Some(h) = fit_homography(&src, &dst) else {
                degenerate += 1;
                continue;
            };

            let inliers = collect_inliers(&h, points, threshold);
            let best_count = best.as_ref().map_or(0, |(_, b)| b.len());
            if inliers.len() > best_count {
                let ratio = inliers.len() as f64 / n as f64;
                max_iterations = max_iterations.min(adaptive_iterations(ratio, SAMPLE_SIZE, self.config.confidence));
                best = Some((h, inliers));
            }
        }

        let Some((mut homography, mut inliers)) = best else {
            debug!(iterations, degenerate, "no valid homography sample");
            return Err(HomographyError::DegenerateConfiguration(DegeneracyReason::NoValidSample));
        };
        if inliers.len() < SAMPLE_SIZE {
            return Err(HomographyError::DegenerateConfiguration(DegeneracyReason::TooFewInliers {
                inliers: inliers.len(),
            }));
        }

        // Least-squares refit on the consensus set; kept only if it holds on to
        // at least as many inliers
        let src: Vec<(f64, f64)> = inliers.iter().map(|&i| points[i].src).collect();
        let dst: Vec<(f64, f64)> = inliers.iter().map(|&i| points[i].dst).collect();
        if let Some(refit) = fit_homography(&src, &dst) {
            let refit_inliers = collect_inliers(&refit, points, threshold);
            if refit_inliers.len() >= inliers.len() {
                homography = refit;
                inliers = refit_inliers;
            }
        }

        debug!(
            correspondences = n,
            inliers = inliers.len(),
            iterations,
            degenerate,
            "homography estimated"
        );

        Ok(Estimate {
            homography,
            inliers,
            iterations,
        })
    }
}

fn collect_inliers(h: &Homography, points: &[Correspondence], threshold: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, c)| reprojection_error(h, c) <= threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Floyd's algorithm: `k` distinct indices from `0..n` into `buffer`.
fn random_sample_into<R: Rng>(rng: &mut R, n: usize, k: usize, buffer: &mut Vec<usize>) {
    debug_assert!(k <= n, "Cannot sample {} indices from {}", k, n);
    buffer.clear();
    for j in (n - k)..n {
        let t = rng.random_range(0..=j);
        if buffer.contains(&t) {
            buffer.push(j);
        } else {
            buffer.push(t);
        }
    }
}

/// Iterations needed to draw one all-inlier sample with the given
/// confidence: `log(1 - confidence) / log(1 - w^n)`.
fn adaptive_iterations(inlier_ratio: f64, sample_size: usize, confidence: f64) -> usize {
    if inlier_ratio <= 0.0 {
        return usize::MAX;
    }
    if inlier_ratio >= 1.0 {
        return 1;
    }

    let w_n = inlier_ratio.powi(sample_size as i32);
    let log_outlier = (1.0 - w_n).ln();
    if log_outlier >= 0.0 {
        return usize::MAX;
    }

    let n = ((1.0 - confidence).ln() / log_outlier).ceil();
    if n.is_finite() && n >= 1.0 { n as usize } else { 1 }
}
