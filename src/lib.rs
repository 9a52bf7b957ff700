// src/lib.rs - Library interface for RidgePrint

pub mod binarize;
pub mod config;
pub mod errors;
pub mod grid;
pub mod image_io;
pub mod kernel;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod regions;

// Re-export commonly used types and functions
pub use config::Config;
pub use errors::{Result, RidgeError};
pub use grid::{Bounds, Grid, BLACK, WHITE};
pub use image_io::{image_files_in_dir, load_grid, save_grid, InputGrid};
pub use pipeline::{enhance_grid, process_image, EnhancedStages};

// Re-export kernel machinery
pub use kernel::{
    apply_kernel,
    apply_kernel_async,
    BoxSum,
    GradientMagnitude,
    Kernel,
    Kernel3x3,
    KernelTask,
    SOBEL_DX,
    SOBEL_DY,
    SUM_9X9,
};

// Re-export enhancement stages
pub use binarize::{binarize, binarize_with_divisor, MEAN_DIVISOR};
pub use normalize::{normalize, normalize_to, DESIRED_MEAN, DESIRED_VARIANCE};
pub use regions::{denoise_regions, RegionStats};
