mod binarize;
mod config;
mod errors;
mod grid;
mod image_io;
mod kernel;
mod normalize;
mod output;
mod pipeline;
mod regions;
mod viewer;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use rayon::prelude::*;

use config::Config;
use errors::{Result, RidgeError};
use image_io::{image_files_in_dir, load_grid};
use output::{write_region_csv, RegionRow};
use pipeline::{enhance_grid, process_image};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "RidgePrint - Fingerprint Ridge Map Enhancement")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "ridgeprint.toml")]
    config: String,

    /// Binarization threshold divisor (overwrites config)
    #[clap(short = 't', long)]
    divisor: Option<f64>,

    /// Enable debug mode (save intermediate images and print more info)
    #[clap(short, long)]
    debug: bool,

    /// Process files one at a time instead of in parallel
    #[clap(long)]
    sequential: bool,

    /// Launch the interactive stage viewer
    #[clap(long)]
    view: bool,
}

/// Main function
fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration, falling back to defaults when no file is present
    let mut config = if Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_dir = output;
    }

    if let Some(divisor) = args.divisor {
        config.threshold_divisor = divisor;
    }

    if args.sequential {
        config.use_parallel = false;
    }

    // Check if viewer mode is enabled
    if args.view {
        // The viewer shows one image's stages
        let input_path = PathBuf::from(&config.input_path);

        if input_path.is_file() {
            println!("Viewing stages for: {}", input_path.display());
            let input = load_grid(&input_path, config.resize_dimensions)?;
            let stages = enhance_grid(&input.grid, &config)?;
            return viewer::run_viewer(&input.stem, &stages);
        } else {
            return Err(RidgeError::Config(
                "Viewer mode requires a single input file, not a directory".to_string(),
            ));
        }
    }

    // Validate configuration
    config.validate()?;

    // Start timing
    let start_time = Instant::now();

    // Process input
    let input_path = PathBuf::from(&config.input_path);
    let mut rows: Vec<RegionRow> = Vec::new();

    if input_path.is_file() {
        // Process single file
        println!("Processing single file: {}", input_path.display());
        rows.push(process_path(&input_path, &config, args.debug)?);
    } else if input_path.is_dir() {
        // Process all supported images in directory
        println!("Processing directory: {}", input_path.display());
        let files = image_files_in_dir(&input_path)?;

        println!("Found {} image files", files.len());

        if config.use_parallel {
            // Process files in parallel
            rows = files
                .par_iter()
                .filter_map(|path| {
                    println!("Processing: {}", path.display());
                    match process_path(path, &config, args.debug) {
                        Ok(row) => Some(row),
                        Err(e) => {
                            eprintln!("Error processing {}: {}", path.display(), e);
                            None
                        }
                    }
                })
                .collect();
        } else {
            // Process files sequentially
            for path in &files {
                println!("Processing: {}", path.display());
                match process_path(path, &config, args.debug) {
                    Ok(row) => rows.push(row),
                    Err(e) => eprintln!("Error processing {}: {}", path.display(), e),
                }
            }
        }
    } else {
        return Err(RidgeError::InvalidPath(input_path));
    }

    // Write the batch report
    rows.sort_by(|a, b| a.file.cmp(&b.file).then_with(|| a.folder.cmp(&b.folder)));
    write_region_csv(&rows, &config.output_dir)?;

    // Report elapsed time
    let elapsed = start_time.elapsed();
    println!(
        "Enhanced {} images in {:.2} seconds",
        rows.len(),
        elapsed.as_secs_f64()
    );

    Ok(())
}

/// Load one image, enhance it, and return its report row.
fn process_path(path: &Path, config: &Config, debug: bool) -> Result<RegionRow> {
    let input = load_grid(path, config.resize_dimensions)?;
    let file = input.stem.clone();
    let folder = input.subfolder().to_string();
    let stats = process_image(input, config, debug)?;
    Ok(RegionRow { file, folder, stats })
}
