//! Filter modules for the background pipeline.
//!
//! ## Supported Formats
//!
//! Filters accept images with 1, 2, 3, or 4 channels:
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Grayscale8 | (H, W, 1) | u8 | Single luminance channel, 0-255 |
//! | GrayAlpha8 | (H, W, 2) | u8 | Luminance + alpha, 0-255 |
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha, 0-255 |
//!
//! ## Architecture
//!
//! - **Alpha preservation** - Alpha channel (if present) is always preserved
//! - **Grayscale handling** - Color-dependent filters (saturation, hue lookup) are no-ops for grayscale
//! - **Lookup tables** - Kernel, tone curve and hue table are built once, then read-only
//! - **Parallel blur** - Only the blur fans out over rayon; the rest is single-threaded
//!
//! ## Filter Categories
//!
//! - **Blur**: Gaussian kernel and the transposing separable blur
//! - **Tonal**: tone curve, darken, mean value
//! - **Color**: HSV model, saturate, hue lookup table
//! - **Noise**: correlated grain

pub mod color;
pub mod kernel;
pub mod blur;
pub mod tone_curve;
pub mod color_adjust;
pub mod noise;
pub mod color_lookup;
