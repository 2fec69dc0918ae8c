//! Separable Gaussian blur that transposes while it filters.
//!
//! Each pass convolves the rows of the source and writes source row `y`,
//! column `x` to destination row `x`, column `y`. Two passes blur both axes
//! and restore the original orientation, so the inner loop always walks a
//! contiguous row.
//!
//! Source rows are split into one contiguous range per rayon worker. Each
//! range owns a disjoint block of destination columns, handed out as its own
//! `ArrayViewMut3`, so workers share nothing mutable and need no locking.
//! The calling thread blurs the last range itself and the pass returns only
//! after every range is done.

use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis};

use super::color::{alpha_channel, color_channels};
use super::kernel::GaussianKernel;

/// Which way a buffer currently faces relative to the image it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Upright,
    Transposed,
}

impl Orientation {
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Upright => Orientation::Transposed,
            Orientation::Transposed => Orientation::Upright,
        }
    }
}

/// Pixel buffer tagged with its orientation.
///
/// A blur pass reads one `OrientedImage` and writes the other way around, so
/// the tag flips with every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientedImage {
    pixels: Array3<u8>,
    orientation: Orientation,
}

impl OrientedImage {
    /// Wrap an upright image.
    pub fn new(pixels: Array3<u8>) -> Self {
        Self {
            pixels,
            orientation: Orientation::Upright,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    pub fn into_pixels(self) -> Array3<u8> {
        self.pixels
    }

    /// Shape of the image as seen upright: (height, width, channels).
    pub fn upright_dim(&self) -> (usize, usize, usize) {
        let (rows, cols, channels) = self.pixels.dim();
        match self.orientation {
            Orientation::Upright => (rows, cols, channels),
            Orientation::Transposed => (cols, rows, channels),
        }
    }
}

/// Blur engine bound to one precomputed kernel.
#[derive(Debug, Clone)]
pub struct SeparableBlur {
    kernel: GaussianKernel,
}

impl SeparableBlur {
    /// # Panics
    /// Panics if `radius` is zero (see [`GaussianKernel::new`]).
    pub fn new(radius: usize, sigma: f64) -> Self {
        Self::with_kernel(GaussianKernel::new(radius, sigma))
    }

    pub fn with_kernel(kernel: GaussianKernel) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    /// Blur the rows of `source` and return the result transposed.
    ///
    /// # Arguments
    /// * `source` - Image (height, width, channels) with 1-4 channels
    ///
    /// # Returns
    /// Image shaped (width, height, channels)
    pub fn blur_and_transpose(&self, source: ArrayView3<u8>) -> Array3<u8> {
        let mut dest = Array3::<u8>::zeros((0, 0, source.dim().2));
        self.blur_and_transpose_into(source, &mut dest);
        dest
    }

    /// Same as [`blur_and_transpose`](Self::blur_and_transpose) but reuses
    /// `dest`, reallocating it only when its shape is not the transposed
    /// shape of `source`.
    pub fn blur_and_transpose_into(&self, source: ArrayView3<u8>, dest: &mut Array3<u8>) {
        let (height, width, channels) = source.dim();
        if dest.dim() != (width, height, channels) {
            *dest = Array3::<u8>::zeros((width, height, channels));
        }
        if height == 0 || width == 0 {
            return;
        }

        let tasks = rayon::current_num_threads().max(1);
        let lines_per_task = height / tasks;

        rayon::scope(|scope| {
            let mut remaining = dest.view_mut();
            let mut first_row = 0;

            if lines_per_task > 0 {
                for _ in 1..tasks {
                    let (chunk, rest) = remaining.split_at(Axis(1), lines_per_task);
                    remaining = rest;
                    let start = first_row;
                    scope.spawn(move |_| self.blur_rows(source, chunk, start));
                    first_row += lines_per_task;
                }
            }

            self.blur_rows(source, remaining, first_row);
        });
    }

    /// One transposing pass from `source` into `dest`.
    ///
    /// `dest` ends up facing the other way from `source`.
    pub fn blur_pass(&self, source: &OrientedImage, dest: &mut OrientedImage) {
        self.blur_and_transpose_into(source.pixels.view(), &mut dest.pixels);
        dest.orientation = source.orientation.flipped();
    }

    /// Run `rounds` full rounds (two transposing passes each) on `image`.
    ///
    /// Even pass counts keep the orientation of `image`.
    pub fn blur_oriented(&self, image: &mut OrientedImage, rounds: usize) {
        let channels = image.pixels.dim().2;
        let mut scratch = OrientedImage::new(Array3::<u8>::zeros((0, 0, channels)));

        for _ in 0..rounds {
            self.blur_pass(image, &mut scratch);
            self.blur_pass(&scratch, image);
        }
    }

    /// Blur an upright `image` in place with `rounds` full rounds.
    pub fn blur(&self, image: &mut Array3<u8>, rounds: usize) {
        let mut oriented = OrientedImage::new(std::mem::take(image));
        self.blur_oriented(&mut oriented, rounds);
        *image = oriented.into_pixels();
    }

    /// Blur source rows `first_row..` into the matching destination columns.
    ///
    /// `dest` is the column block for those rows: its column `i` receives
    /// source row `first_row + i`.
    fn blur_rows(&self, source: ArrayView3<u8>, mut dest: ArrayViewMut3<u8>, first_row: usize) {
        let (_, width, channels) = source.dim();
        let color_channels = color_channels(channels);
        let alpha = alpha_channel(channels);
        let offset = self.kernel.offset();
        let weights = self.kernel.weights();

        for column in 0..dest.dim().1 {
            let row = source.index_axis(Axis(0), first_row + column);

            for x in 0..width {
                let (start, end) = self.kernel.clipped_range(x, width);
                let total = self.kernel.window_weight(start, end) as u64;

                let mut sums = [0u64; 4];
                for k in start..end {
                    let sx = x + k - offset;
                    let weight = weights[k] as u64;
                    for c in 0..color_channels {
                        sums[c] += row[[sx, c]] as u64 * weight;
                    }
                }

                for c in 0..color_channels {
                    dest[[x, column, c]] = (sums[c] / total) as u8;
                }
                if let Some(a) = alpha {
                    dest[[x, column, a]] = row[[x, a]];
                }
            }
        }
    }
}
