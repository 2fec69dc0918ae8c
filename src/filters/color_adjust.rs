//! Color adjustment filters: Darken, Saturate, Tone Curve, Mean Value.
//!
//! These are pixel-wise operations that don't require spatial context.
//! All of them mutate the buffer in place.
//!
//! ## Supported Formats
//!
//! All filters accept images with 1, 2, 3, or 4 channels:
//! - **Grayscale**: (height, width, 1) - single luminance channel
//! - **Gray + alpha**: (height, width, 2) - luminance, alpha
//! - **RGB**: (height, width, 3) - red, green, blue
//! - **RGBA**: (height, width, 4) - red, green, blue, alpha
//!
//! Alpha channel (if present) is always preserved unchanged.

use ndarray::{ArrayView3, ArrayViewMut3};

use super::color::{color_channels, hsv_to_rgb, pixel_hsv, rgb_to_hsv, Hsv};
use super::tone_curve::CURVE_SIZE;

/// Channel multiplier used by [`darken`].
pub const DARKEN_FACTOR: f64 = 0.85;

/// Channel multiplier used by [`darken_more`].
pub const DARKEN_MORE_FACTOR: f64 = 0.5;

/// Saturation multiplier used by [`saturate`].
pub const SATURATION_FACTOR: f64 = 1.5;

/// Rewrite every pixel through its HSV form.
///
/// Grayscale images pass their single channel as an achromatic color and
/// store the returned value.
fn map_hsv(image: &mut ArrayViewMut3<u8>, mut f: impl FnMut(Hsv) -> Hsv) {
    let (height, width, channels) = image.dim();

    for y in 0..height {
        for x in 0..width {
            if channels < 3 {
                let hsv = f(Hsv::achromatic(image[[y, x, 0]]));
                image[[y, x, 0]] = hsv.value;
                continue;
            }

            let hsv = rgb_to_hsv(image[[y, x, 0]], image[[y, x, 1]], image[[y, x, 2]]);
            let (r, g, b) = hsv_to_rgb(f(hsv));
            image[[y, x, 0]] = r;
            image[[y, x, 1]] = g;
            image[[y, x, 2]] = b;
        }
    }
}

// ============================================================================
// Darken
// ============================================================================

/// Multiply every color channel by `factor`, truncating.
///
/// # Arguments
/// * `image` - Image with 1-4 channels (height, width, channels)
/// * `factor` - Channel multiplier, 0.0-1.0 darkens
pub fn darken_by(mut image: ArrayViewMut3<u8>, factor: f64) {
    let (height, width, channels) = image.dim();
    let color_channels = color_channels(channels);

    for y in 0..height {
        for x in 0..width {
            for c in 0..color_channels {
                let v = image[[y, x, c]] as f64 * factor;
                image[[y, x, c]] = v.clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Darken by [`DARKEN_FACTOR`].
pub fn darken(image: ArrayViewMut3<u8>) {
    darken_by(image, DARKEN_FACTOR);
}

/// Darken by [`DARKEN_MORE_FACTOR`].
pub fn darken_more(image: ArrayViewMut3<u8>) {
    darken_by(image, DARKEN_MORE_FACTOR);
}

// ============================================================================
// Saturation
// ============================================================================

/// Multiply HSV saturation by `factor`, clamped to 255.
///
/// Hue and value are kept. Gray pixels and grayscale images are unchanged.
pub fn saturate_by(mut image: ArrayViewMut3<u8>, factor: f64) {
    if image.dim().2 < 3 {
        return;
    }

    map_hsv(&mut image, |hsv| {
        if hsv.is_achromatic() {
            return hsv;
        }
        let saturation = (hsv.saturation as f64 * factor).clamp(0.0, 255.0) as u8;
        hsv.with_saturation(saturation)
    });
}

/// Saturate by [`SATURATION_FACTOR`].
pub fn saturate(image: ArrayViewMut3<u8>) {
    saturate_by(image, SATURATION_FACTOR);
}

// ============================================================================
// Tone Curve
// ============================================================================

/// Replace each pixel's HSV value with `curve[value]`.
///
/// Hue and saturation are kept.
pub fn apply_tone_curve(mut image: ArrayViewMut3<u8>, curve: &[u8; CURVE_SIZE]) {
    map_hsv(&mut image, |hsv| hsv.with_value(curve[hsv.value as usize]));
}

// ============================================================================
// Mean Value
// ============================================================================

/// Arithmetic mean of the HSV value channel, truncated.
///
/// Returns 0 for an empty image.
pub fn mean_value(image: ArrayView3<u8>) -> u8 {
    let (height, width, _) = image.dim();
    let count = (height * width) as u64;
    if count == 0 {
        return 0;
    }

    let mut total = 0u64;
    for y in 0..height {
        for x in 0..width {
            total += pixel_hsv(&image, y, x).value as u64;
        }
    }
    (total / count) as u8
}
