use std::fmt;

use pano_brief::BriefGenerator;
use pano_compose::Compositor;
use pano_core::{Features, Homography, Image, Match, StitchConfig};
use pano_fast::FastDetector;
use pano_homography::{Correspondence, Estimate, HomographyEstimator};
use pano_match::{DescriptorMatcher, RatioTest};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::error::StitchResult;

/// Stages of a stitching run, in the order they complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    Loaded,
    FeaturesExtracted,
    Matched,
    Filtered,
    HomographyEstimated,
    Composited,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Loaded => "loaded",
            PipelineStage::FeaturesExtracted => "features extracted",
            PipelineStage::Matched => "matched",
            PipelineStage::Filtered => "filtered",
            PipelineStage::HomographyEstimated => "homography estimated",
            PipelineStage::Composited => "composited",
        };
        f.write_str(name)
    }
}

/// Counts gathered along a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchReport {
    pub first_keypoints: usize,
    pub second_keypoints: usize,
    /// Queries with at least one neighbour
    pub candidate_matches: usize,
    pub good_matches: usize,
    pub inliers: usize,
    pub ransac_iterations: usize,
    pub canvas_size: (usize, usize),
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct Panorama {
    pub canvas: Image,
    /// Maps second-image coordinates into the first image
    pub homography: Homography,
    /// Ratio-test survivors consistent with `homography`
    pub inliers: Vec<Match>,
    pub first_features: Features,
    pub second_features: Features,
    pub report: StitchReport,
}

/// Two-image stitching pipeline: extract, match, filter, estimate, composite.
pub struct Stitcher {
    config: StitchConfig,
    detector: FastDetector,
    describer: BriefGenerator,
    matcher: DescriptorMatcher,
    ratio_test: RatioTest,
    estimator: HomographyEstimator,
    compositor: Compositor,
}

impl Stitcher {
    /// Validates the configuration before any work is done
    pub fn new(config: StitchConfig) -> StitchResult<Self> {
        config.validate()?;
        Ok(Self {
            detector: FastDetector::new(config.features.clone())?,
            describer: BriefGenerator::new(),
            matcher: DescriptorMatcher::default(),
            ratio_test: RatioTest::new(config.matching.ratio_threshold)?,
            estimator: HomographyEstimator::new(config.ransac.clone(), config.matching.min_match_count),
            compositor: Compositor::new(config.compose.clone()),
            config,
        })
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    /// Keypoints and descriptors of one image, strongest first
    pub fn extract_features(&self, image: &Image) -> StitchResult<Features> {
        let gray = image.to_luma();
        let detection = self.detector.detect(&gray)?;
        let descriptors = self.describer.describe(&detection.pyramid, &detection.keypoints)?;
        Ok(Features::new(detection.keypoints, descriptors)?)
    }

    /// Two nearest second-image neighbours for every first-image descriptor
    pub fn match_features(&self, first: &Features, second: &Features) -> Vec<Vec<Match>> {
        self.matcher.knn_match(first.descriptors(), second.descriptors())
    }

    pub fn filter_matches(&self, knn: &[Vec<Match>]) -> Vec<Match> {
        self.ratio_test.filter(knn)
    }

    /// Point pairs for estimation: second-image keypoint as source, first-image
    /// keypoint as destination. Matches whose indices fall outside either
    /// feature set are skipped.
    pub fn correspondences(first: &Features, second: &Features, matches: &[Match]) -> Vec<Correspondence> {
        matches
            .iter()
            .filter_map(|m| {
                let s = second.keypoints().get(m.train_idx)?;
                let d = first.keypoints().get(m.query_idx)?;
                Some(Correspondence::new((s.x as f64, s.y as f64), (d.x as f64, d.y as f64)))
            })
            .collect()
    }

    pub fn estimate_homography_with_rng<R: Rng>(
        &self,
        first: &Features,
        second: &Features,
        matches: &[Match],
        rng: &mut R,
    ) -> StitchResult<Estimate> {
        let points = Self::correspondences(first, second, matches);
        Ok(self.estimator.estimate_with_rng(&points, rng)?)
    }

    /// Stitch `second` onto `first`. RANSAC draws from the configured seed,
    /// or from OS entropy when none is set.
    pub fn stitch(&self, first: &Image, second: &Image) -> StitchResult<Panorama> {
        let mut rng = match self.config.ransac.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        self.stitch_with_rng(first, second, &mut rng)
    }

    pub fn stitch_with_rng<R: Rng>(&self, first: &Image, second: &Image, rng: &mut R) -> StitchResult<Panorama> {
        let mut report = StitchReport::default();
        info!(
            first = ?first.dimensions(),
            second = ?second.dimensions(),
            stage = %PipelineStage::Loaded,
            "stage complete"
        );

        let (first_features, second_features) =
            rayon::join(|| self.extract_features(first), || self.extract_features(second));
        let (first_features, second_features) = (first_features?, second_features?);
        report.first_keypoints = first_features.len();
        report.second_keypoints = second_features.len();
        info!(
            first = report.first_keypoints,
            second = report.second_keypoints,
            stage = %PipelineStage::FeaturesExtracted,
            "stage complete"
        );

        let knn = self.match_features(&first_features, &second_features);
        report.candidate_matches = knn.iter().filter(|n| !n.is_empty()).count();
        info!(candidates = report.candidate_matches, stage = %PipelineStage::Matched, "stage complete");

        let good = self.filter_matches(&knn);
        report.good_matches = good.len();
        info!(good = report.good_matches, stage = %PipelineStage::Filtered, "stage complete");

        let estimate = self.estimate_homography_with_rng(&first_features, &second_features, &good, rng)?;
        report.inliers = estimate.inliers.len();
        report.ransac_iterations = estimate.iterations;
        info!(
            inliers = report.inliers,
            iterations = report.ransac_iterations,
            stage = %PipelineStage::HomographyEstimated,
            "stage complete"
        );

        let canvas = self.compositor.composite(first, second, &estimate.homography)?;
        report.canvas_size = canvas.dimensions();
        info!(canvas = ?report.canvas_size, stage = %PipelineStage::Composited, "stage complete");

        let inliers = estimate.inliers.iter().map(|&i| good[i]).collect();
        Ok(Panorama {
            canvas,
            homography: estimate.homography,
            inliers,
            first_features,
            second_features,
            report,
        })
    }
}
