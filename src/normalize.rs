use crate::errors::{RidgeError, Result};
use crate::grid::Grid;

/// Target mean for intensity normalization.
pub const DESIRED_MEAN: f64 = 100.0;
/// Target variance for intensity normalization. Wide enough that samples a
/// full deviation below the mean land under the default binarization
/// threshold of `DESIRED_MEAN / pi`.
pub const DESIRED_VARIANCE: f64 = 5000.0;

/// Normalize `input` into `output` with the default mean and variance targets.
pub fn normalize(input: &Grid, output: &mut Grid) -> Result<()> {
    normalize_to(input, output, DESIRED_MEAN, DESIRED_VARIANCE)
}

/// Pointwise mean/variance normalization.
///
/// Each sample is displaced from `desired_mean` by
/// `sqrt(desired_variance * (p - mean)^2 / variance)`, keeping its side of
/// the mean. A zero-variance input has no spread to remap and comes out as
/// the constant `desired_mean`.
pub fn normalize_to(
    input: &Grid,
    output: &mut Grid,
    desired_mean: f64,
    desired_variance: f64,
) -> Result<()> {
    if !input.same_shape(output) {
        return Err(RidgeError::ShapeMismatch {
            expected: input.bounds(),
            actual: output.bounds(),
        });
    }
    let mean = input.mean();
    let variance = input.variance(mean);
    let bounds = input.bounds();
    for y in bounds.min_y..bounds.max_y {
        for x in bounds.min_x..bounds.max_x {
            if variance == 0.0 {
                output.set(x, y, desired_mean);
                continue;
            }
            let pixel = input.at(x, y);
            let spread = pixel - mean;
            let delta = (desired_variance * spread * spread / variance).sqrt();
            let value = if pixel > mean {
                desired_mean + delta
            } else {
                desired_mean - delta
            };
            output.set(x, y, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn filled(width: u32, height: u32, value: f64) -> Grid {
        let mut grid = Grid::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                grid.set(x, y, value);
            }
        }
        grid
    }

    #[test]
    fn constant_grid_maps_to_the_desired_mean() {
        let input = filled(6, 6, 42.0);
        let mut output = Grid::new(6, 6);
        normalize(&input, &mut output).unwrap();
        for y in 0..6 {
            for x in 0..6 {
                assert_approx_eq!(output.at(x, y), DESIRED_MEAN);
            }
        }
    }

    #[test]
    fn grid_already_at_the_targets_is_a_fixed_point() {
        let mut input = Grid::new(4, 1);
        for (x, value) in [90.0, 110.0, 90.0, 110.0].into_iter().enumerate() {
            input.set(x as i32, 0, value);
        }
        // Mean 100, variance 100: targets matching the input's own stats.
        let mut output = Grid::new(4, 1);
        normalize_to(&input, &mut output, 100.0, 100.0).unwrap();
        for x in 0..4 {
            assert_approx_eq!(output.at(x, 0), input.at(x, 0));
        }
    }

    #[test]
    fn default_targets_push_dark_samples_below_the_threshold() {
        // Equal halves at the two 8-bit extremes sit exactly one deviation
        // from the mean; the defaults must map the dark half under
        // DESIRED_MEAN / pi so binarization can still find ridges.
        let mut input = Grid::new(4, 1);
        for (x, value) in [0.0, 255.0, 0.0, 255.0].into_iter().enumerate() {
            input.set(x as i32, 0, value);
        }
        let mut output = Grid::new(4, 1);
        normalize(&input, &mut output).unwrap();
        let threshold = DESIRED_MEAN / std::f64::consts::PI;
        assert!(output.at(0, 0) < threshold);
        assert!(output.at(1, 0) > threshold);
        assert_approx_eq!(output.at(0, 0), DESIRED_MEAN - 5000.0f64.sqrt());
        assert_approx_eq!(output.at(1, 0), DESIRED_MEAN + 5000.0f64.sqrt());
    }

    #[test]
    fn custom_targets_rescale_the_spread() {
        let mut input = Grid::new(4, 1);
        for (x, value) in [90.0, 110.0, 90.0, 110.0].into_iter().enumerate() {
            input.set(x as i32, 0, value);
        }
        let mut output = Grid::new(4, 1);
        normalize_to(&input, &mut output, 50.0, 25.0).unwrap();
        assert_approx_eq!(output.at(0, 0), 45.0);
        assert_approx_eq!(output.at(1, 0), 55.0);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let input = Grid::new(4, 4);
        let mut output = Grid::new(4, 3);
        assert!(matches!(
            normalize(&input, &mut output),
            Err(RidgeError::ShapeMismatch { .. })
        ));
    }
}
