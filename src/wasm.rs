//! WebAssembly exports for the background filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Buffers are
//! flat RGBA bytes (length = width * height * 4); a buffer whose length does
//! not match the dimensions yields an empty result.

use ndarray::Array3;
use wasm_bindgen::prelude::*;

use crate::background::{config::BackgroundConfig, geometry::RectF, BackgroundCompositor};
use crate::filters::blur::SeparableBlur;
use crate::filters::color_adjust::{apply_tone_curve, saturate};
use crate::filters::noise::{add_noise, NoiseRng};
use crate::filters::tone_curve::tone_curve;

fn rgba(data: &[u8], width: usize, height: usize) -> Option<Array3<u8>> {
    Array3::from_shape_vec((height, width, 4), data.to_vec()).ok()
}

fn into_flat(image: Array3<u8>) -> Vec<u8> {
    if image.is_standard_layout() {
        image.into_raw_vec_and_offset().0
    } else {
        image.iter().copied().collect()
    }
}

// ============================================================================
// Blur
// ============================================================================

/// Blur an RGBA image in place (same width and height on return).
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `rounds` - Blur rounds (two transposing passes each)
/// * `radius` - Kernel radius, center tap included
/// * `sigma` - Gaussian standard deviation
#[wasm_bindgen]
pub fn blur_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    rounds: usize,
    radius: usize,
    sigma: f64,
) -> Vec<u8> {
    let Some(mut image) = rgba(data, width, height) else {
        return Vec::new();
    };
    let sigma = if sigma.is_finite() && sigma > 0.0 { sigma } else { 1.2 };
    SeparableBlur::new(radius.max(1), sigma).blur(&mut image, rounds);
    into_flat(image)
}

// ============================================================================
// Tone / color
// ============================================================================

#[wasm_bindgen]
pub fn tone_curve_rgba_wasm(data: &[u8], width: usize, height: usize, white_level: f64) -> Vec<u8> {
    let Some(mut image) = rgba(data, width, height) else {
        return Vec::new();
    };
    apply_tone_curve(image.view_mut(), &tone_curve(white_level));
    into_flat(image)
}

#[wasm_bindgen]
pub fn saturate_rgba_wasm(data: &[u8], width: usize, height: usize) -> Vec<u8> {
    let Some(mut image) = rgba(data, width, height) else {
        return Vec::new();
    };
    saturate(image.view_mut());
    into_flat(image)
}

#[wasm_bindgen]
pub fn add_noise_rgba_wasm(data: &[u8], width: usize, height: usize, seed: u64) -> Vec<u8> {
    let Some(mut image) = rgba(data, width, height) else {
        return Vec::new();
    };
    add_noise(image.view_mut(), &mut NoiseRng::new(seed));
    into_flat(image)
}

// ============================================================================
// Compositor
// ============================================================================

/// Build a background without texture.
///
/// The output is `app_width / round(pixel_ratio * 4)` pixels wide with the
/// input's aspect ratio; an empty vector means nothing was produced.
#[wasm_bindgen]
pub fn build_background_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    app_width: f64,
    app_height: f64,
    pixel_ratio: f64,
) -> Vec<u8> {
    let Some(image) = rgba(data, width, height) else {
        return Vec::new();
    };
    let config = BackgroundConfig {
        pixel_ratio,
        noise_seed: Some(0),
        ..BackgroundConfig::default()
    };
    BackgroundCompositor::from_config(&config)
        .build_background_image(image.view(), None, RectF::from_size(app_width, app_height))
        .map(into_flat)
        .unwrap_or_default()
}
