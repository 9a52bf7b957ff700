use image::GrayImage;

/// Binary sentinel for ridge pixels.
pub const BLACK: f64 = 0.0;
/// Binary sentinel for background pixels.
pub const WHITE: f64 = 255.0;

/// Rectangular addressable region `[min_x, max_x) x [min_y, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds anchored at the origin with the given dimensions.
    pub fn of_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x).max(0) as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y).max(0) as u32
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// The same rectangle with `margin` pixels peeled off every side.
    pub fn shrink(&self, margin: i32) -> Self {
        Self::new(
            self.min_x + margin,
            self.min_y + margin,
            self.max_x - margin,
            self.max_y - margin,
        )
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }
}

/// Rectangular buffer of `f64` samples addressed by (x, y) within bounds.
///
/// The same storage carries different value semantics as a fingerprint moves
/// through the pipeline: grayscale intensity (0-255 by convention), the
/// two-level [`BLACK`]/[`WHITE`] sentinels after binarization, and integer
/// region labels inside the denoiser's scratch copy. The grid itself does not
/// tag which stage it holds; each operation documents what it expects and
/// what it produces.
///
/// Reads outside the bounds return 0.0 and writes outside the bounds are
/// dropped, so stencils that overhang the edge see a zero margin instead of
/// faulting.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    bounds: Bounds,
    data: Vec<f64>,
}

impl Grid {
    /// Zero-filled grid anchored at the origin.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_bounds(Bounds::of_size(width, height))
    }

    /// Zero-filled grid over an arbitrary bounds rectangle.
    pub fn with_bounds(bounds: Bounds) -> Self {
        let len = bounds.width() as usize * bounds.height() as usize;
        Self {
            bounds,
            data: vec![0.0; len],
        }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.bounds.height()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y - self.bounds.min_y) as usize * self.bounds.width() as usize
            + (x - self.bounds.min_x) as usize
    }

    /// Sample at (x, y); 0.0 when the coordinate is outside the bounds.
    #[inline]
    pub fn at(&self, x: i32, y: i32) -> f64 {
        if self.bounds.contains(x, y) {
            self.data[self.index(x, y)]
        } else {
            0.0
        }
    }

    /// Store `value` at (x, y); dropped when the coordinate is outside the bounds.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: f64) {
        if self.bounds.contains(x, y) {
            let i = self.index(x, y);
            self.data[i] = value;
        }
    }

    /// Whether two grids cover the same bounds rectangle.
    #[inline]
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.bounds == other.bounds
    }

    /// Mean over every sample in the bounds (border included).
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().sum();
        sum / self.data.len() as f64
    }

    /// Population variance around `mean` over every sample in the bounds.
    pub fn variance(&self, mean: f64) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|v| (v - mean) * (v - mean)).sum();
        sum / self.data.len() as f64
    }

    /// Wrap an 8-bit grayscale image as a grid anchored at the origin.
    pub fn from_gray(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let mut grid = Grid::new(width, height);
        for (x, y, pixel) in image.enumerate_pixels() {
            grid.set(x as i32, y as i32, f64::from(pixel[0]));
        }
        grid
    }

    /// Render the grid as an 8-bit grayscale image, clamping samples to 0-255.
    pub fn to_gray(&self) -> GrayImage {
        let mut image = GrayImage::new(self.width(), self.height());
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let value = self.at(self.bounds.min_x + x as i32, self.bounds.min_y + y as i32);
            pixel[0] = value.clamp(0.0, 255.0) as u8;
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn out_of_bounds_reads_are_zero() {
        let mut grid = Grid::new(4, 4);
        grid.set(0, 0, 42.0);
        assert_eq!(grid.at(0, 0), 42.0);
        assert_eq!(grid.at(-1, 0), 0.0);
        assert_eq!(grid.at(0, 4), 0.0);
        assert_eq!(grid.at(100, 100), 0.0);
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut grid = Grid::new(4, 4);
        grid.set(-1, -1, 99.0);
        grid.set(4, 0, 99.0);
        assert!((0..4).all(|y| (0..4).all(|x| grid.at(x, y) == 0.0)));
    }

    #[test]
    fn offset_bounds_address_correctly() {
        let mut grid = Grid::with_bounds(Bounds::new(10, 20, 14, 24));
        grid.set(10, 20, 1.0);
        grid.set(13, 23, 2.0);
        assert_eq!(grid.at(10, 20), 1.0);
        assert_eq!(grid.at(13, 23), 2.0);
        assert_eq!(grid.at(0, 0), 0.0);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 4);
    }

    #[test]
    fn mean_and_variance_over_full_bounds() {
        let mut grid = Grid::new(2, 2);
        grid.set(0, 0, 10.0);
        grid.set(1, 0, 20.0);
        grid.set(0, 1, 30.0);
        grid.set(1, 1, 40.0);
        let mean = grid.mean();
        assert_approx_eq!(mean, 25.0);
        assert_approx_eq!(grid.variance(mean), 125.0);
    }

    #[test]
    fn gray_round_trip_preserves_samples() {
        let mut image = GrayImage::new(3, 2);
        for (i, pixel) in image.pixels_mut().enumerate() {
            pixel[0] = (i * 40) as u8;
        }
        let grid = Grid::from_gray(&image);
        assert_eq!(grid.at(2, 1), 200.0);
        assert_eq!(grid.to_gray(), image);
    }

    #[test]
    fn to_gray_clamps_out_of_range_samples() {
        let mut grid = Grid::new(2, 1);
        grid.set(0, 0, -20.0);
        grid.set(1, 0, 300.0);
        let image = grid.to_gray();
        assert_eq!(image.get_pixel(0, 0)[0], 0);
        assert_eq!(image.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn shrink_yields_interior_bounds() {
        let bounds = Bounds::of_size(5, 5).shrink(1);
        assert_eq!(bounds, Bounds::new(1, 1, 4, 4));
        assert!(bounds.contains(1, 1));
        assert!(!bounds.contains(0, 1));
        assert!(!bounds.contains(4, 4));
        assert!(Bounds::of_size(2, 2).shrink(1).is_empty());
    }
}
