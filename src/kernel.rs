use std::sync::Arc;
use std::thread;

use crate::errors::{RidgeError, Result};
use crate::grid::Grid;

/// Horizontal Sobel gradient kernel.
pub const SOBEL_DX: Kernel3x3 = Kernel3x3::new([[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]]);
/// Vertical Sobel gradient kernel.
pub const SOBEL_DY: Kernel3x3 = Kernel3x3::new([[-1, -2, -1], [0, 0, 0], [1, 2, 1]]);
/// Unweighted 9x9 window sum, the smoothing/local-energy primitive.
pub const SUM_9X9: BoxSum = BoxSum::new(9);

/// A pure stencil rule mapping a grid neighborhood to a scalar response.
///
/// Kernels hold no mutable state and are freely shared across concurrent
/// applications writing to different output grids.
pub trait Kernel: Send + Sync {
    fn apply(&self, input: &Grid, x: i32, y: i32) -> f64;
}

/// Weighted 3x3 convolution with signed integer weights, `weights[j][i]`
/// indexed by (y offset + 1, x offset + 1).
#[derive(Debug, Clone, Copy)]
pub struct Kernel3x3 {
    weights: [[i32; 3]; 3],
}

impl Kernel3x3 {
    pub const fn new(weights: [[i32; 3]; 3]) -> Self {
        Self { weights }
    }
}

impl Kernel for Kernel3x3 {
    fn apply(&self, input: &Grid, x: i32, y: i32) -> f64 {
        let mut sum = 0.0;
        for j in -1..=1i32 {
            for i in -1..=1i32 {
                let weight = self.weights[(j + 1) as usize][(i + 1) as usize];
                sum += f64::from(weight) * input.at(x + i, y + j);
            }
        }
        sum
    }
}

/// Unweighted NxN box sum. Samples past the grid edge read as 0, so windows
/// overhanging the rim are effectively truncated.
#[derive(Debug, Clone, Copy)]
pub struct BoxSum {
    size: u32,
}

impl BoxSum {
    pub const fn new(size: u32) -> Self {
        Self { size }
    }

    #[inline]
    fn radius(&self) -> i32 {
        (self.size as i32 - 1) / 2
    }
}

impl Kernel for BoxSum {
    fn apply(&self, input: &Grid, x: i32, y: i32) -> f64 {
        let radius = self.radius();
        let mut sum = 0.0;
        for j in -radius..=radius {
            for i in -radius..=radius {
                sum += input.at(x + i, y + j);
            }
        }
        sum
    }
}

/// Gradient-magnitude kernel over a pair of precomputed gradient grids.
///
/// The response at (x, y) is `sqrt(gx^2 + gy^2)` of the captured grids; the
/// nominal input grid is ignored.
#[derive(Debug, Clone)]
pub struct GradientMagnitude {
    gx: Grid,
    gy: Grid,
}

impl GradientMagnitude {
    pub fn new(gx: Grid, gy: Grid) -> Self {
        Self { gx, gy }
    }
}

impl Kernel for GradientMagnitude {
    fn apply(&self, _input: &Grid, x: i32, y: i32) -> f64 {
        let gx = self.gx.at(x, y);
        let gy = self.gy.at(x, y);
        (gx * gx + gy * gy).sqrt()
    }
}

/// Evaluate `kernel` over the interior of `input` and write the responses,
/// rescaled to the 0-255 range, into the interior of `output`.
///
/// Two passes: the first finds the global min/max response (responses are
/// cached so each pixel is evaluated once), the second rescales with
/// `255 * (value - min) / (max - min)` truncated to an 8-bit integer. When
/// every response is identical the rescale would divide by zero; the interior
/// is written as 0 instead. The outermost 1-pixel border of `output` is never
/// written.
pub fn apply_kernel(kernel: &dyn Kernel, input: &Grid, output: &mut Grid) -> Result<()> {
    if !input.same_shape(output) {
        return Err(RidgeError::ShapeMismatch {
            expected: input.bounds(),
            actual: output.bounds(),
        });
    }
    let interior = input.bounds().shrink(1);
    if interior.is_empty() {
        return Err(RidgeError::NoInterior {
            width: input.width(),
            height: input.height(),
        });
    }

    // Pass 1: evaluate every interior pixel, tracking the global range.
    let mut responses = Vec::with_capacity(interior.width() as usize * interior.height() as usize);
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for y in interior.min_y..interior.max_y {
        for x in interior.min_x..interior.max_x {
            let value = kernel.apply(input, x, y);
            min = min.min(value);
            max = max.max(value);
            responses.push(value);
        }
    }

    // Pass 2: rescale the cached responses into the 8-bit output range.
    let range = max - min;
    let row_len = interior.width() as usize;
    for y in interior.min_y..interior.max_y {
        let row = (y - interior.min_y) as usize * row_len;
        for x in interior.min_x..interior.max_x {
            let value = responses[row + (x - interior.min_x) as usize];
            let scaled = if range == 0.0 {
                0.0
            } else {
                f64::from((255.0 * (value - min) / range) as u8)
            };
            output.set(x, y, scaled);
        }
    }

    Ok(())
}

/// Join handle for a background kernel application.
///
/// The task owns its output grid until joined; engine errors and task panics
/// both surface from [`KernelTask::join`] instead of being dropped.
pub struct KernelTask {
    handle: thread::JoinHandle<Result<Grid>>,
}

impl KernelTask {
    /// Wait for the task and take its output grid. Unconditional; there is no
    /// timeout or cancellation.
    pub fn join(self) -> Result<Grid> {
        match self.handle.join() {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "kernel task panicked".to_string());
                Err(RidgeError::TaskFailed(message))
            }
        }
    }
}

/// Launch [`apply_kernel`] on a background thread and return a join handle.
///
/// The task takes ownership of `output` and hands it back from `join`, so two
/// tasks can never race on one output grid; the input is shared read-only.
pub fn apply_kernel_async<K>(kernel: K, input: Arc<Grid>, mut output: Grid) -> KernelTask
where
    K: Kernel + 'static,
{
    let handle = thread::spawn(move || {
        apply_kernel(&kernel, &input, &mut output)?;
        Ok(output)
    });
    KernelTask { handle }
}
