use crate::error::{CoreError, CoreResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keypoint detection and description settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeatureConfig {
    /// Upper bound on keypoints kept per image
    pub max_features: usize,
    /// FAST segment-test intensity threshold
    pub fast_threshold: u8,
    /// Diameter of the orientation/descriptor patch (odd)
    pub patch_size: usize,
    /// Pixels skipped at every pyramid level border
    pub edge_threshold: usize,
    pub n_levels: usize,
    pub scale_factor: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_features: 2000,
            fast_threshold: 20,
            patch_size: 31,
            edge_threshold: 16,
            n_levels: 8,
            scale_factor: 1.2,
        }
    }
}

/// Descriptor matching and ratio-test settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    /// Accept a match only if `best < ratio_threshold * second_best`
    pub ratio_threshold: f32,
    /// Good matches required before homography estimation is attempted
    pub min_match_count: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: 0.6,
            min_match_count: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RansacConfig {
    /// Inlier tolerance in pixels
    pub reprojection_threshold: f64,
    pub max_iterations: usize,
    /// Target probability of having drawn an all-inlier sample
    pub confidence: f64,
    /// Fixed sampling seed; `None` draws from OS entropy
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub seed: Option<u64>,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            reprojection_threshold: 5.0,
            max_iterations: 2000,
            confidence: 0.995,
            seed: None,
        }
    }
}

/// Resampling used when warping the second image onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComposeConfig {
    pub interpolation: Interpolation,
    /// Largest canvas side accepted before compositing is refused
    pub max_canvas_side: usize,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Bilinear,
            max_canvas_side: 16384,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StitchConfig {
    pub features: FeatureConfig,
    pub matching: MatchConfig,
    pub ransac: RansacConfig,
    pub compose: ComposeConfig,
    pub n_threads: usize,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            matching: MatchConfig::default(),
            ransac: RansacConfig::default(),
            compose: ComposeConfig::default(),
            n_threads: num_cpus::get().max(1),
        }
    }
}

fn invalid(msg: impl Into<String>) -> CoreError {
    CoreError::InvalidConfig(msg.into())
}

impl StitchConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> CoreResult<()> {
        let f = &self.features;
        if f.max_features == 0 {
            return Err(invalid("max_features must be at least 1"));
        }
        if f.fast_threshold == 0 || f.fast_threshold > 127 {
            return Err(invalid(format!("fast_threshold {} must be 1-127", f.fast_threshold)));
        }
        if f.patch_size < 7 || f.patch_size % 2 == 0 {
            return Err(invalid(format!("patch_size {} must be odd and >= 7", f.patch_size)));
        }
        if f.edge_threshold <= f.patch_size / 2 {
            return Err(invalid(format!(
                "edge_threshold {} must exceed half the patch size {}",
                f.edge_threshold, f.patch_size
            )));
        }
        if f.n_levels == 0 {
            return Err(invalid("n_levels must be at least 1"));
        }
        if !(f.scale_factor > 1.0) {
            return Err(invalid(format!("scale_factor {} must be > 1", f.scale_factor)));
        }

        let m = &self.matching;
        if !(m.ratio_threshold > 0.0 && m.ratio_threshold <= 1.0) {
            return Err(invalid(format!("ratio_threshold {} must be in (0, 1]", m.ratio_threshold)));
        }
        if m.min_match_count < 4 {
            return Err(invalid(format!(
                "min_match_count {} must be at least 4",
                m.min_match_count
            )));
        }

        let r = &self.ransac;
        if !(r.reprojection_threshold > 0.0) {
            return Err(invalid("reprojection_threshold must be positive"));
        }
        if r.max_iterations == 0 {
            return Err(invalid("max_iterations must be at least 1"));
        }
        if !(r.confidence > 0.0 && r.confidence < 1.0) {
            return Err(invalid(format!("confidence {} must be in (0, 1)", r.confidence)));
        }

        if self.compose.max_canvas_side == 0 {
            return Err(invalid("max_canvas_side must be at least 1"));
        }
        if self.n_threads == 0 {
            return Err(invalid("n_threads must be at least 1"));
        }
        Ok(())
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "StitchConfig: max_features={}, fast_threshold={}, levels={}x{:.2}, ratio={}, min_matches={}, reproj={}px, seed={:?}, {:?}",
            self.features.max_features,
            self.features.fast_threshold,
            self.features.n_levels,
            self.features.scale_factor,
            self.matching.ratio_threshold,
            self.matching.min_match_count,
            self.ransac.reprojection_threshold,
            self.ransac.seed,
            self.compose.interpolation,
        )
    }

    /// Load configuration from a `.json` or `.toml` file (chosen by extension)
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    /// Save configuration, format chosen by extension
    #[cfg(feature = "serde")]
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => self.to_json()?,
            _ => self.to_toml()?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Serialize to JSON string
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserialize from TOML string
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
