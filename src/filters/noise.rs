//! Luminance noise for background images.
//!
//! Every pixel gets one random offset in `[-25, 24]` that is added to all of
//! its color channels, so the grain changes brightness without tinting.
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1) - processes the single channel
//! - **Gray + alpha**: (height, width, 2) - processes gray, preserves alpha
//! - **RGB**: (height, width, 3) - processes all 3 channels
//! - **RGBA**: (height, width, 4) - processes RGB, preserves alpha

use std::time::{SystemTime, UNIX_EPOCH};

use ndarray::ArrayViewMut3;

use super::color::color_channels;

/// Number of distinct offsets.
pub const NOISE_SPAN: u32 = 50;

/// Subtracted from the raw draw so offsets straddle zero.
pub const NOISE_BIAS: i32 = 25;

// ============================================================================
// Seedable RNG
// ============================================================================

/// Linear congruential generator (MINSTD multiplier) for reproducible noise.
#[derive(Debug, Clone)]
pub struct NoiseRng {
    state: u64,
}

impl NoiseRng {
    pub fn new(seed: u64) -> Self {
        NoiseRng {
            state: seed.wrapping_add(1), // Avoid zero
        }
    }

    /// Seed from the wall clock.
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(nanos)
    }

    /// Generate next random u32.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(48271).wrapping_add(1) % 2147483647;
        self.state as u32
    }

    /// Next per-pixel offset in `[-NOISE_BIAS, NOISE_SPAN - NOISE_BIAS)`.
    #[inline]
    pub fn next_offset(&mut self) -> i32 {
        (self.next_u32() % NOISE_SPAN) as i32 - NOISE_BIAS
    }
}

// ============================================================================
// Add Noise
// ============================================================================

/// Add correlated noise in place.
///
/// # Arguments
/// * `image` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `rng` - Random source; the same seed gives the same grain
pub fn add_noise(mut image: ArrayViewMut3<u8>, rng: &mut NoiseRng) {
    let (height, width, channels) = image.dim();
    let color_channels = color_channels(channels);

    for y in 0..height {
        for x in 0..width {
            let noise = rng.next_offset();
            for c in 0..color_channels {
                let v = image[[y, x, c]] as i32 + noise;
                image[[y, x, c]] = v.clamp(0, 255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_offsets_in_range() {
        let mut rng = NoiseRng::new(7);
        for _ in 0..10_000 {
            let offset = rng.next_offset();
            assert!((-25..=24).contains(&offset));
        }
    }

    #[test]
    fn test_channels_share_offset() {
        let mut img = Array3::<u8>::from_elem((8, 8, 4), 128);
        add_noise(img.view_mut(), &mut NoiseRng::new(42));

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(img[[y, x, 0]], img[[y, x, 1]]);
                assert_eq!(img[[y, x, 1]], img[[y, x, 2]]);
                assert!((103..=152).contains(&img[[y, x, 0]]));
                assert_eq!(img[[y, x, 3]], 128); // Alpha untouched
            }
        }
    }

    #[test]
    fn test_gray_alpha_keeps_alpha() {
        let mut img = Array3::from_shape_fn((6, 6, 2), |(_, _, c)| if c == 1 { 255 } else { 128 });
        add_noise(img.view_mut(), &mut NoiseRng::new(3));
        assert!(img.slice(ndarray::s![.., .., 1]).iter().all(|&a| a == 255));
        assert!(img.slice(ndarray::s![.., .., 0]).iter().any(|&v| v != 128));
    }

    #[test]
    fn test_same_seed_same_grain() {
        let mut a = Array3::<u8>::from_elem((5, 7, 3), 90);
        let mut b = a.clone();
        add_noise(a.view_mut(), &mut NoiseRng::new(3));
        add_noise(b.view_mut(), &mut NoiseRng::new(3));
        assert_eq!(a, b);

        let mut c = Array3::<u8>::from_elem((5, 7, 3), 90);
        add_noise(c.view_mut(), &mut NoiseRng::new(4));
        assert_ne!(a, c);
    }

    #[test]
    fn test_clamps_at_edges() {
        let mut black = Array3::<u8>::zeros((6, 6, 3));
        add_noise(black.view_mut(), &mut NoiseRng::new(1));
        assert!(black.iter().all(|&v| v <= 24));

        let mut white = Array3::<u8>::from_elem((6, 6, 3), 255);
        add_noise(white.view_mut(), &mut NoiseRng::new(1));
        assert!(white.iter().all(|&v| v >= 230));
    }
}
