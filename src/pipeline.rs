use std::path::PathBuf;
use std::sync::Arc;

use crate::binarize::binarize_with_divisor;
use crate::config::Config;
use crate::errors::{RidgeError, Result};
use crate::grid::Grid;
use crate::image_io::{save_grid, InputGrid};
use crate::kernel::{apply_kernel, apply_kernel_async, GradientMagnitude, SOBEL_DX, SOBEL_DY, SUM_9X9};
use crate::normalize::normalize_to;
use crate::regions::{denoise_regions, RegionStats};

/// Every intermediate grid of one enhancement run, final ridge map included.
pub struct EnhancedStages {
    pub normalized: Grid,
    pub gradient_x: Grid,
    pub gradient_y: Grid,
    pub magnitude: Grid,
    pub smoothed: Grid,
    pub binarized: Grid,
    pub denoised: Grid,
    pub stats: RegionStats,
}

impl EnhancedStages {
    /// Stages in pipeline order with their output file suffixes.
    pub fn stages(&self) -> [(&'static str, &Grid); 7] {
        [
            ("normalized", &self.normalized),
            ("gradient_x", &self.gradient_x),
            ("gradient_y", &self.gradient_y),
            ("magnitude", &self.magnitude),
            ("smoothed", &self.smoothed),
            ("binarized", &self.binarized),
            ("ridges", &self.denoised),
        ]
    }
}

/// Run the full enhancement chain over one grid.
///
/// Normalizes intensity, computes both Sobel gradients concurrently, derives
/// the gradient magnitude and its smoothed form as diagnostic stages, then
/// binarizes the normalized grid and erases speckle regions from the result.
pub fn enhance_grid(input: &Grid, config: &Config) -> Result<EnhancedStages> {
    let mut normalized = Grid::with_bounds(input.bounds());
    normalize_to(
        input,
        &mut normalized,
        config.desired_mean,
        config.desired_variance,
    )?;

    // Both gradients read the shared normalized grid; each task owns its
    // output until joined.
    let shared = Arc::new(normalized);
    let task_x = apply_kernel_async(
        SOBEL_DX,
        Arc::clone(&shared),
        Grid::with_bounds(shared.bounds()),
    );
    let task_y = apply_kernel_async(
        SOBEL_DY,
        Arc::clone(&shared),
        Grid::with_bounds(shared.bounds()),
    );
    let gradient_x = task_x.join()?;
    let gradient_y = task_y.join()?;
    let normalized = Arc::try_unwrap(shared).unwrap_or_else(|shared| (*shared).clone());

    let mut magnitude = Grid::with_bounds(normalized.bounds());
    let magnitude_kernel = GradientMagnitude::new(gradient_x.clone(), gradient_y.clone());
    apply_kernel(&magnitude_kernel, &normalized, &mut magnitude)?;

    let mut smoothed = Grid::with_bounds(normalized.bounds());
    apply_kernel(&SUM_9X9, &magnitude, &mut smoothed)?;

    let mut binarized = Grid::with_bounds(normalized.bounds());
    binarize_with_divisor(&normalized, &mut binarized, config.threshold_divisor)?;

    let mut denoised = binarized.clone();
    let stats = denoise_regions(&mut denoised)?;

    Ok(EnhancedStages {
        normalized,
        gradient_x,
        gradient_y,
        magnitude,
        smoothed,
        binarized,
        denoised,
        stats,
    })
}

/// Process a single input image and write its outputs.
pub fn process_image(input: InputGrid, config: &Config, debug: bool) -> Result<RegionStats> {
    let InputGrid { grid, stem, .. } = input;

    let stages = enhance_grid(&grid, config)?;
    let stats = stages.stats;

    if debug {
        println!("Region analysis for {}:", stem);
        println!("  Regions found: {}", stats.regions);
        println!("  Mean region size: {:.1} pixels", stats.mean_region_size);
        println!(
            "  Erased: {} regions, {} pixels",
            stats.erased_regions, stats.erased_pixels
        );
    }

    let output_dir = PathBuf::from(&config.output_dir);
    std::fs::create_dir_all(&output_dir).map_err(RidgeError::Io)?;

    // Intermediate stages are only worth the disk when asked for.
    if debug || config.save_stages {
        for (name, stage) in stages.stages() {
            if name == "ridges" {
                continue;
            }
            save_grid(stage, output_dir.join(format!("{}_{}.png", stem, name)))?;
        }
    }

    save_grid(
        &stages.denoised,
        output_dir.join(format!("{}_ridges.png", stem)),
    )?;

    Ok(stats)
}
