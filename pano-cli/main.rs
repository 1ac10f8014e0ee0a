use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use pano_cli::decode::{load_image, save_image};
use pano_cli::visualize::{draw_keypoints, draw_matches};
use pano_cli::{Image, Interpolation, Panorama, StitchConfig, Stitcher, init_thread_pool};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pano")]
#[command(about = "Stitch two overlapping photographs into one panorama")]
struct Cli {
    /// Reference image; its pixels win where the images overlap
    first: PathBuf,
    /// Image warped into the reference frame
    second: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    /// TOML or JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    max_features: Option<usize>,
    #[arg(long)]
    ratio: Option<f32>,
    #[arg(long)]
    min_matches: Option<usize>,
    #[arg(long)]
    reprojection_threshold: Option<f64>,
    /// Fixed RANSAC seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Nearest-neighbour instead of bilinear resampling
    #[arg(long)]
    nearest: bool,
    /// Write keypoint overlays for both inputs into this directory
    #[arg(long)]
    keypoints_out: Option<PathBuf>,
    /// Write a side-by-side image of the inlier matches
    #[arg(long)]
    matches_out: Option<PathBuf>,
    #[arg(long, default_value_t = 50)]
    match_preview: usize,
}

impl Cli {
    fn stitch_config(&self) -> Result<StitchConfig> {
        let mut config = match &self.config {
            Some(path) => StitchConfig::load(path)
                .map_err(|e| anyhow!("{e}"))
                .with_context(|| format!("loading config {}", path.display()))?,
            None => StitchConfig::default(),
        };
        if let Some(n) = self.max_features {
            config.features.max_features = n;
        }
        if let Some(r) = self.ratio {
            config.matching.ratio_threshold = r;
        }
        if let Some(n) = self.min_matches {
            config.matching.min_match_count = n;
        }
        if let Some(t) = self.reprojection_threshold {
            config.ransac.reprojection_threshold = t;
        }
        if self.seed.is_some() {
            config.ransac.seed = self.seed;
        }
        if self.nearest {
            config.compose.interpolation = Interpolation::Nearest;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();
    let config = cli.stitch_config()?;
    info!("{}", config.summary());

    if let Err(e) = init_thread_pool(config.n_threads) {
        warn!("thread pool already initialised: {e}");
    }

    let first = load_image(&cli.first).with_context(|| format!("reading {}", cli.first.display()))?;
    let second = load_image(&cli.second).with_context(|| format!("reading {}", cli.second.display()))?;

    let stitcher = Stitcher::new(config)?;
    let t0 = Instant::now();
    let panorama = stitcher.stitch(&first, &second).context("stitching failed")?;
    info!(elapsed = ?t0.elapsed(), report = ?panorama.report, "stitched");

    save_image(&panorama.canvas, &cli.output).with_context(|| format!("writing {}", cli.output.display()))?;
    info!("saved panorama to {}", cli.output.display());

    if let Some(dir) = &cli.keypoints_out {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let inputs = [
            ("first", &first, &panorama.first_features),
            ("second", &second, &panorama.second_features),
        ];
        for (name, image, features) in inputs {
            let path = dir.join(format!("{name}_keypoints.png"));
            draw_keypoints(image, features.keypoints())?
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(keypoints = features.len(), "saved {}", path.display());
        }
    }

    if let Some(path) = &cli.matches_out {
        write_matches(path, &first, &second, &panorama, cli.match_preview)?;
    }

    Ok(())
}

fn write_matches(path: &Path, first: &Image, second: &Image, panorama: &Panorama, limit: usize) -> Result<()> {
    let preview = draw_matches(
        first,
        panorama.first_features.keypoints(),
        second,
        panorama.second_features.keypoints(),
        &panorama.inliers,
        limit,
    )?;
    preview.save(path).with_context(|| format!("writing {}", path.display()))?;
    info!(drawn = panorama.inliers.len().min(limit), "saved {}", path.display());
    Ok(())
}
