use csv::Writer;
use std::fs;
use std::path::Path;

use crate::errors::{RidgeError, Result};
use crate::regions::RegionStats;

/// One row of the batch summary report
pub struct RegionRow {
    pub file: String,
    pub folder: String,
    pub stats: RegionStats,
}

/// Write per-file region statistics to regions.csv
pub fn write_region_csv<P: AsRef<Path>>(rows: &[RegionRow], output_dir: P) -> Result<()> {
    let output_path = output_dir.as_ref().join("regions.csv");

    // Create directory if it doesn't exist
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| RidgeError::Io(e))?;
    }

    let mut writer = Writer::from_path(&output_path).map_err(|e| RidgeError::CsvOutput(e))?;

    writer
        .write_record(&[
            "File",
            "Folder",
            "Regions",
            "Erased_Regions",
            "Erased_Pixels",
            "Mean_Region_Size",
        ])
        .map_err(|e| RidgeError::CsvOutput(e))?;

    for row in rows {
        writer
            .write_record(&[
                row.file.clone(),
                row.folder.clone(),
                row.stats.regions.to_string(),
                row.stats.erased_regions.to_string(),
                row.stats.erased_pixels.to_string(),
                format!("{:.6}", row.stats.mean_region_size),
            ])
            .map_err(|e| RidgeError::CsvOutput(e))?;
    }

    writer
        .flush()
        .map_err(|e| RidgeError::CsvOutput(csv::Error::from(e)))?;

    Ok(())
}
