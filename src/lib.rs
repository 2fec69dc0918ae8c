//! Silica background generator.
//!
//! Turns a photo into a soft, tinted wallpaper: crop to the app rectangle,
//! downscale, blur with a parallel separable Gaussian, remap brightness
//! through a tone curve, boost saturation, and optionally add grain and a
//! translucent texture.
//!
//! ## Image Format
//! Filters take `ndarray` buffers shaped (height, width, channels):
//! - **Grayscale**: (height, width, 1) - single channel
//! - **Gray + alpha**: (height, width, 2) - single channel + alpha
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha
//!
//! Alpha, when present, is carried through unchanged. The compositor and the
//! file helpers in [`io`] always produce RGBA.
//!
//! ## Layout
//! - [`filters`] - kernel, blur, tone curve, color adjustments, noise, hue lookup
//! - [`layer_effects`] - texture overlay
//! - [`background`] - the compositor, its config and crop geometry
//! - [`io`] - decode/encode and filesystem collaborators

pub mod background;
pub mod error;
pub mod filters;
pub mod io;
pub mod layer_effects;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use background::{config::BackgroundConfig, geometry::RectF, BackgroundCompositor};
pub use error::{BackgroundError, BackgroundResult};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::prelude::*;

    use crate::background::{config::BackgroundConfig, geometry::RectF, BackgroundCompositor};
    use crate::filters::blur::SeparableBlur;
    use crate::filters::color::Hsv;
    use crate::filters::color_adjust;
    use crate::filters::color_lookup::ColorLookupTable;
    use crate::filters::noise::{self as noise_mod, NoiseRng};
    use crate::filters::tone_curve as tone_curve_mod;

    // ========================================================================
    // Blur
    // ========================================================================

    /// Blur the rows of an image and return it transposed (W, H, C).
    #[pyfunction]
    #[pyo3(signature = (image, radius=4, sigma=1.2))]
    pub fn blur_and_transpose<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        radius: usize,
        sigma: f64,
    ) -> Bound<'py, PyArray3<u8>> {
        let blur = SeparableBlur::new(radius.max(1), sigma);
        blur.blur_and_transpose(image.as_array()).into_pyarray(py)
    }

    /// Full separable blur, `rounds` rounds of two transposing passes.
    #[pyfunction]
    #[pyo3(signature = (image, rounds=5, radius=4, sigma=1.2))]
    pub fn blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        rounds: usize,
        radius: usize,
        sigma: f64,
    ) -> Bound<'py, PyArray3<u8>> {
        let mut result = image.as_array().to_owned();
        SeparableBlur::new(radius.max(1), sigma).blur(&mut result, rounds);
        result.into_pyarray(py)
    }

    // ========================================================================
    // Tone / color
    // ========================================================================

    /// 256-entry tone curve for a white level.
    #[pyfunction]
    pub fn tone_curve(white_level: f64) -> Vec<u8> {
        tone_curve_mod::tone_curve(white_level).to_vec()
    }

    #[pyfunction]
    pub fn apply_tone_curve<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        white_level: f64,
    ) -> Bound<'py, PyArray3<u8>> {
        let mut result = image.as_array().to_owned();
        color_adjust::apply_tone_curve(result.view_mut(), &tone_curve_mod::tone_curve(white_level));
        result.into_pyarray(py)
    }

    #[pyfunction]
    #[pyo3(signature = (image, factor=1.5))]
    pub fn saturate<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        factor: f64,
    ) -> Bound<'py, PyArray3<u8>> {
        let mut result = image.as_array().to_owned();
        color_adjust::saturate_by(result.view_mut(), factor);
        result.into_pyarray(py)
    }

    #[pyfunction]
    pub fn add_noise<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        seed: u64,
    ) -> Bound<'py, PyArray3<u8>> {
        let mut result = image.as_array().to_owned();
        noise_mod::add_noise(result.view_mut(), &mut NoiseRng::new(seed));
        result.into_pyarray(py)
    }

    /// Retarget saturation/value along a palette of (hue, saturation, value).
    #[pyfunction]
    pub fn remap_colors<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        palette: Vec<(u16, u8, u8)>,
    ) -> Bound<'py, PyArray3<u8>> {
        let colors: Vec<Hsv> = palette.into_iter().map(|(h, s, v)| Hsv::new(h, s, v)).collect();
        let table = ColorLookupTable::new(&colors);
        let mut result = image.as_array().to_owned();
        table.remap_image(result.view_mut());
        result.into_pyarray(py)
    }

    // ========================================================================
    // Compositor
    // ========================================================================

    /// Build a background for an app rectangle of `app_width` x `app_height`.
    #[pyfunction]
    #[pyo3(signature = (image, app_width, app_height, texture=None, pixel_ratio=1.0, blur_rounds=5, seed=None))]
    #[allow(clippy::too_many_arguments)]
    pub fn build_background<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        app_width: f64,
        app_height: f64,
        texture: Option<PyReadonlyArray3<'py, u8>>,
        pixel_ratio: f64,
        blur_rounds: usize,
        seed: Option<u64>,
    ) -> Option<Bound<'py, PyArray3<u8>>> {
        let config = BackgroundConfig {
            pixel_ratio,
            blur_rounds,
            noise_seed: seed,
            ..BackgroundConfig::default()
        };
        let mut compositor = BackgroundCompositor::from_config(&config);
        let texture = texture.as_ref().map(|t| t.as_array());
        compositor
            .build_background_image(image.as_array(), texture, RectF::from_size(app_width, app_height))
            .map(|result| result.into_pyarray(py))
    }

    /// Silica background Rust extension module
    #[pymodule]
    pub fn silica_background(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Blur
        m.add_function(wrap_pyfunction!(blur_and_transpose, m)?)?;
        m.add_function(wrap_pyfunction!(blur, m)?)?;

        // Tone / color
        m.add_function(wrap_pyfunction!(tone_curve, m)?)?;
        m.add_function(wrap_pyfunction!(apply_tone_curve, m)?)?;
        m.add_function(wrap_pyfunction!(saturate, m)?)?;
        m.add_function(wrap_pyfunction!(add_noise, m)?)?;
        m.add_function(wrap_pyfunction!(remap_colors, m)?)?;

        // Compositor
        m.add_function(wrap_pyfunction!(build_background, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::silica_background;
