use crate::errors::{RidgeError, Result};
use crate::grid::{Grid, BLACK, WHITE};

/// Default divisor applied to the global mean when deriving the threshold.
pub const MEAN_DIVISOR: f64 = std::f64::consts::PI;

/// Binarize `input` into `output` with the default mean divisor.
pub fn binarize(input: &Grid, output: &mut Grid) -> Result<()> {
    binarize_with_divisor(input, output, MEAN_DIVISOR)
}

/// Reduce a grayscale grid to the two ridge levels.
///
/// The threshold is the global mean over the full bounds divided by
/// `divisor`; samples strictly below it become [`BLACK`], everything else
/// [`WHITE`]. Every pixel of `output` is written, border included.
pub fn binarize_with_divisor(input: &Grid, output: &mut Grid, divisor: f64) -> Result<()> {
    if !input.same_shape(output) {
        return Err(RidgeError::ShapeMismatch {
            expected: input.bounds(),
            actual: output.bounds(),
        });
    }
    let threshold = input.mean() / divisor;
    let bounds = input.bounds();
    for y in bounds.min_y..bounds.max_y {
        for x in bounds.min_x..bounds.max_x {
            let level = if input.at(x, y) < threshold { BLACK } else { WHITE };
            output.set(x, y, level);
        }
    }
    Ok(())
}
