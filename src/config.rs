use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::binarize::MEAN_DIVISOR;
use crate::errors::{RidgeError, Result};
use crate::normalize::{DESIRED_MEAN, DESIRED_VARIANCE};

/// Configuration for RidgePrint
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub input_path: String,
    pub output_dir: String,

    /// Input images are stretched to these dimensions before processing.
    #[serde(default = "default_resize_dimensions")]
    pub resize_dimensions: Option<[u32; 2]>,

    /// Divisor applied to the global mean when binarizing.
    #[serde(default = "default_threshold_divisor")]
    pub threshold_divisor: f64,

    #[serde(default = "default_desired_mean")]
    pub desired_mean: f64,

    #[serde(default = "default_desired_variance")]
    pub desired_variance: f64,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    /// Write every intermediate stage next to the final ridge map.
    #[serde(default)]
    pub save_stages: bool,
}

fn default_resize_dimensions() -> Option<[u32; 2]> {
    Some([400, 400])
}

fn default_threshold_divisor() -> f64 {
    MEAN_DIVISOR
}

fn default_desired_mean() -> f64 {
    DESIRED_MEAN
}

fn default_desired_variance() -> f64 {
    DESIRED_VARIANCE
}

fn default_parallel() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RidgeError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            RidgeError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Create default configuration
    pub fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_dir: "./output".to_string(),
            resize_dimensions: Some([400, 400]),
            threshold_divisor: MEAN_DIVISOR,
            desired_mean: DESIRED_MEAN,
            desired_variance: DESIRED_VARIANCE,
            use_parallel: true,
            save_stages: false,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Check input path exists
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(RidgeError::InvalidPath(input_path));
        }

        if self.threshold_divisor <= 0.0 {
            return Err(RidgeError::Config(
                "threshold_divisor must be > 0.0".to_string(),
            ));
        }

        if self.desired_variance <= 0.0 {
            return Err(RidgeError::Config(
                "desired_variance must be > 0.0".to_string(),
            ));
        }

        if let Some([width, height]) = self.resize_dimensions {
            if width == 0 || height == 0 {
                return Err(RidgeError::Config(
                    "resize_dimensions must be non-zero".to_string(),
                ));
            }
        }

        // Create the output directory if it doesn't exist
        let output_dir = PathBuf::from(&self.output_dir);
        fs::create_dir_all(&output_dir).map_err(|e| {
            RidgeError::Io(io::Error::new(
                ErrorKind::Other,
                format!("Failed to create output directory: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RidgeError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(RidgeError::Io)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn minimal_toml_fills_tunable_defaults() {
        let config: Config = toml::from_str(
            r#"
            input_path = "./scans"
            output_dir = "./enhanced"
            "#,
        )
        .unwrap();
        assert_eq!(config.resize_dimensions, Some([400, 400]));
        assert_approx_eq!(config.threshold_divisor, MEAN_DIVISOR);
        assert_approx_eq!(config.desired_mean, DESIRED_MEAN);
        assert_approx_eq!(config.desired_variance, DESIRED_VARIANCE);
        assert!(config.use_parallel);
        assert!(!config.save_stages);
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.input_path, config.input_path);
        assert_eq!(parsed.resize_dimensions, config.resize_dimensions);
        assert_approx_eq!(parsed.threshold_divisor, config.threshold_divisor);
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let mut config = Config::default();
        config.input_path = ".".to_string();
        config.threshold_divisor = 0.0;
        assert!(matches!(config.validate(), Err(RidgeError::Config(_))));
    }

    #[test]
    fn zero_resize_dimension_is_rejected() {
        let mut config = Config::default();
        config.input_path = ".".to_string();
        config.resize_dimensions = Some([0, 400]);
        assert!(matches!(config.validate(), Err(RidgeError::Config(_))));
    }
}
