//! Integer Gaussian kernel for the separable blur.
//!
//! Weights are sampled from the Gaussian density and scaled so the center
//! tap is exactly [`CENTER_WEIGHT`]. Alongside the weights the kernel keeps
//! suffix sums (`prefix_sums[i] = sum(weights[i..])`), which give the total
//! weight of a window clipped at an image edge in O(1).

use std::f64::consts::PI;

/// Weight of the center tap after scaling.
pub const CENTER_WEIGHT: f64 = 257.0;

/// Precomputed blur weights and their running sums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaussianKernel {
    radius: usize,
    weights: Vec<u32>,
    prefix_sums: Vec<u32>,
}

impl GaussianKernel {
    /// Build a kernel of `2 * radius - 1` taps.
    ///
    /// # Arguments
    /// * `radius` - Half-width including the center tap (must be >= 1)
    /// * `sigma` - Standard deviation of the Gaussian (must be > 0)
    ///
    /// # Panics
    /// Panics if `radius` is zero. Callers validate the radius before
    /// building a kernel.
    pub fn new(radius: usize, sigma: f64) -> Self {
        assert!(radius >= 1, "gaussian kernel radius must be at least 1");

        let kernel_size = 2 * radius - 1;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let norm = 1.0 / ((2.0 * PI).sqrt() * sigma);

        // Left half up to and including the center
        let half: Vec<f64> = (0..radius)
            .map(|i| {
                let x = i as f64 - (radius - 1) as f64;
                (-(x * x) / two_sigma_sq).exp() * norm
            })
            .collect();

        let scalar = CENTER_WEIGHT / half[radius - 1];

        let weights: Vec<u32> = (0..kernel_size)
            .map(|i| {
                let v = if i < radius {
                    half[i]
                } else {
                    half[kernel_size - i - 1]
                };
                ((v * scalar).round() as u32).max(1)
            })
            .collect();

        let mut prefix_sums = vec![0u32; kernel_size + 1];
        for i in (0..kernel_size).rev() {
            prefix_sums[i] = prefix_sums[i + 1] + weights[i];
        }

        Self {
            radius,
            weights,
            prefix_sums,
        }
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    #[inline]
    pub fn kernel_size(&self) -> usize {
        self.weights.len()
    }

    /// Distance from the first tap to the center tap.
    #[inline]
    pub fn offset(&self) -> usize {
        self.radius - 1
    }

    #[inline]
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// `prefix_sums[i]` is the sum of `weights[i..]`; the last entry is 0.
    #[inline]
    pub fn prefix_sums(&self) -> &[u32] {
        &self.prefix_sums
    }

    /// Total weight of taps `start..end`.
    #[inline]
    pub fn window_weight(&self, start: usize, end: usize) -> u32 {
        self.prefix_sums[start] - self.prefix_sums[end]
    }

    /// Tap range `start..end` that stays inside a row of `width` pixels when
    /// the kernel is centered on column `x` (`x < width`).
    ///
    /// Tap `k` reads column `x + k - offset`.
    #[inline]
    pub fn clipped_range(&self, x: usize, width: usize) -> (usize, usize) {
        let offset = self.offset();
        let start = offset.saturating_sub(x);
        let end = (width + offset - x).min(self.kernel_size());
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_weights() {
        let kernel = GaussianKernel::new(4, 1.2);
        assert_eq!(kernel.weights(), &[11, 64, 182, 257, 182, 64, 11]);
        assert_eq!(kernel.prefix_sums()[0], 771);
    }

    #[test]
    fn test_symmetric() {
        for radius in 2..12 {
            for &sigma in &[0.5, 1.2, 3.0, 10.0] {
                let kernel = GaussianKernel::new(radius, sigma);
                let w = kernel.weights();
                let n = kernel.kernel_size();
                assert_eq!(n, 2 * radius - 1);
                for i in 0..n {
                    assert_eq!(w[i], w[n - 1 - i]);
                }
                assert_eq!(w[radius - 1], 257);
                assert!(w.iter().all(|&v| (1..=257).contains(&v)));
            }
        }
    }

    #[test]
    fn test_prefix_sums_non_increasing() {
        let kernel = GaussianKernel::new(6, 2.0);
        let sums = kernel.prefix_sums();
        assert_eq!(sums.len(), kernel.kernel_size() + 1);
        assert_eq!(sums[kernel.kernel_size()], 0);
        for pair in sums.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert_eq!(sums[0], kernel.weights().iter().sum::<u32>());
    }

    #[test]
    fn test_radius_one_is_single_tap() {
        let kernel = GaussianKernel::new(1, 1.0);
        assert_eq!(kernel.weights(), &[257]);
        assert_eq!(kernel.clipped_range(0, 1), (0, 1));
    }

    #[test]
    fn test_clipped_range_edges() {
        let kernel = GaussianKernel::new(4, 1.2);
        // Left edge: taps before column 0 are dropped
        assert_eq!(kernel.clipped_range(0, 100), (3, 7));
        assert_eq!(kernel.clipped_range(1, 100), (2, 7));
        // Interior
        assert_eq!(kernel.clipped_range(50, 100), (0, 7));
        // Right edge
        assert_eq!(kernel.clipped_range(99, 100), (0, 4));
        // Narrower than the kernel
        assert_eq!(kernel.clipped_range(0, 2), (3, 5));
        assert_eq!(kernel.clipped_range(1, 2), (2, 4));
    }

    #[test]
    fn test_window_weight() {
        let kernel = GaussianKernel::new(4, 1.2);
        assert_eq!(kernel.window_weight(3, 7), 257 + 182 + 64 + 11);
        assert_eq!(kernel.window_weight(0, 7), 771);
        assert_eq!(kernel.window_weight(2, 2), 0);
    }

    #[test]
    #[should_panic]
    fn test_zero_radius_rejected() {
        GaussianKernel::new(0, 1.0);
    }
}
