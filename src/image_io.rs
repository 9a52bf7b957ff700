use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::ImageFormat;

use crate::errors::{RidgeError, Result};
use crate::grid::Grid;

/// A loaded input grid with its source metadata
pub struct InputGrid {
    pub grid: Grid,
    pub path: PathBuf,
    pub stem: String,
}

impl InputGrid {
    /// Name of the immediate parent directory, "root" when the path has
    /// none. Keeps rows from different scan folders apart in the batch
    /// report when their file stems collide.
    pub fn subfolder(&self) -> &str {
        self.path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("root")
    }
}

/// Get all supported image files from a directory (recursively)
pub fn image_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(RidgeError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(RidgeError::Config(format!(
            "{} is not a directory",
            dir_path.display()
        )));
    }

    let mut files = Vec::new();
    find_image_files_recursive(dir_path, &mut files)?;

    Ok(files)
}

/// Helper function to recursively search for image files
fn find_image_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir_path).map_err(RidgeError::Io)?;

    for entry in entries {
        let entry = entry.map_err(RidgeError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            find_image_files_recursive(&path, result)?;
        } else if path.is_file() && is_supported_image(&path) {
            result.push(path);
        }
    }

    Ok(())
}

fn is_supported_image(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            ext == "png" || ext == "jpg" || ext == "jpeg"
        }
        None => false,
    }
}

/// Load an image as a grayscale grid, optionally resizing it first.
///
/// Resizing ignores the source aspect ratio so every grid in a batch gets
/// identical dimensions.
pub fn load_grid<P: AsRef<Path>>(path: P, resize: Option<[u32; 2]>) -> Result<InputGrid> {
    let path = path.as_ref();

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| RidgeError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let img = image::open(path).map_err(RidgeError::Image)?;
    let img = match resize {
        Some([width, height]) => img.resize_exact(width, height, FilterType::Triangle),
        None => img,
    };

    Ok(InputGrid {
        grid: Grid::from_gray(&img.to_luma8()),
        path: path.to_path_buf(),
        stem,
    })
}

/// Save a grid as a PNG at the specified path
pub fn save_grid<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    grid.to_gray()
        .save_with_format(path, ImageFormat::Png)
        .map_err(RidgeError::Image)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subfolder_is_the_immediate_parent_directory() {
        let nested = InputGrid {
            grid: Grid::new(1, 1),
            path: PathBuf::from("scans/left_hand/thumb.png"),
            stem: "thumb".to_string(),
        };
        assert_eq!(nested.subfolder(), "left_hand");

        let bare = InputGrid {
            grid: Grid::new(1, 1),
            path: PathBuf::from("thumb.png"),
            stem: "thumb".to_string(),
        };
        assert_eq!(bare.subfolder(), "root");
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert!(is_supported_image(Path::new("scans/thumb.PNG")));
        assert!(is_supported_image(Path::new("scans/thumb.jpeg")));
        assert!(is_supported_image(Path::new("scans/thumb.jpg")));
        assert!(!is_supported_image(Path::new("scans/thumb.tiff")));
        assert!(!is_supported_image(Path::new("scans/notes.txt")));
        assert!(!is_supported_image(Path::new("scans/noext")));
    }
}
