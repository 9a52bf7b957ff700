use crate::errors::{RidgeError, Result};
use crate::grid::{Bounds, Grid, BLACK, WHITE};

/// Neighbor offsets in push order: W, N, E, S, NW, NE, SE, SW.
const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, 0),
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, -1),
    (1, -1),
    (1, 1),
    (-1, 1),
];

/// Summary of one denoising run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    /// Connected components found in the interior, both levels counted.
    pub regions: usize,
    /// Regions below the size threshold that were rewritten.
    pub erased_regions: usize,
    /// Pixels rewritten while erasing.
    pub erased_pixels: usize,
    /// Interior pixel count divided by the region count; the erase threshold
    /// is the square root of this value.
    pub mean_region_size: f64,
}

/// Remove speckle regions from a two-level grid in place.
///
/// Every 8-connected run of same-level pixels in the interior is a region;
/// regions smaller than the square root of the mean region size are erased.
/// Label ids start at 1 and skip the white sentinel value, so a label can
/// never read as an unvisited pixel and erased regions always come out
/// white. The outermost 1-pixel border is left untouched.
pub fn denoise_regions(grid: &mut Grid) -> Result<RegionStats> {
    let interior = grid.bounds().shrink(1);
    if interior.is_empty() {
        return Err(RidgeError::NoInterior {
            width: grid.width(),
            height: grid.height(),
        });
    }
    for y in interior.min_y..interior.max_y {
        for x in interior.min_x..interior.max_x {
            let value = grid.at(x, y);
            if value != BLACK && value != WHITE {
                return Err(RidgeError::NotBinary { x, y, value });
            }
        }
    }

    let (labels, next_label, regions) = label_regions(grid);

    let mut histogram = vec![0usize; next_label as usize];
    for y in interior.min_y..interior.max_y {
        for x in interior.min_x..interior.max_x {
            histogram[labels.at(x, y) as usize] += 1;
        }
    }

    let interior_pixels = interior.width() as usize * interior.height() as usize;
    let mean_region_size = interior_pixels as f64 / regions as f64;
    let min_size = mean_region_size.sqrt();

    let mut erased_pixels = 0usize;
    for y in interior.min_y..interior.max_y {
        for x in interior.min_x..interior.max_x {
            let label = labels.at(x, y);
            if (histogram[label as usize] as f64) < min_size {
                let level = if label == WHITE { BLACK } else { WHITE };
                grid.set(x, y, level);
                erased_pixels += 1;
            }
        }
    }

    let erased_regions = (1..next_label)
        .filter(|&id| {
            let count = histogram[id as usize];
            count > 0 && (count as f64) < min_size
        })
        .count();

    Ok(RegionStats {
        regions,
        erased_regions,
        erased_pixels,
        mean_region_size,
    })
}

/// Label every interior region of `source` on a scratch copy.
///
/// Returns the label grid, one past the highest id handed out, and the
/// number of regions found.
fn label_regions(source: &Grid) -> (Grid, u32, usize) {
    let interior = source.bounds().shrink(1);
    let mut labels = source.clone();
    let mut next_label: u32 = 1;
    let mut regions = 0usize;
    for y in interior.min_y..interior.max_y {
        for x in interior.min_x..interior.max_x {
            let value = labels.at(x, y);
            if value == BLACK || value == WHITE {
                if next_label == WHITE as u32 {
                    next_label += 1;
                }
                fill_region(&mut labels, interior, x, y, f64::from(next_label));
                next_label += 1;
                regions += 1;
            }
        }
    }
    (labels, next_label, regions)
}

/// Flood-fill one region with an explicit stack, halting at the interior
/// boundary. Candidates are validated when popped, so duplicates on the
/// stack are harmless.
fn fill_region(labels: &mut Grid, interior: Bounds, seed_x: i32, seed_y: i32, label: f64) {
    let level = labels.at(seed_x, seed_y);
    let mut stack = vec![(seed_x, seed_y)];
    while let Some((x, y)) = stack.pop() {
        if !interior.contains(x, y) {
            continue;
        }
        if labels.at(x, y) != level {
            continue;
        }
        labels.set(x, y, label);
        for (dx, dy) in NEIGHBORS_8 {
            stack.push((x + dx, y + dy));
        }
    }
}
