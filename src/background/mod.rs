//! Background compositor.
//!
//! Orchestrates the wallpaper pipeline: crop to the app rectangle, scale down
//! by the app scale factor, blur, tone curve and saturation, then optionally
//! scale back up, add grain and overlay a texture.
//!
//! Every buffer leaving the compositor is RGBA shaped (height, width, 4).

pub mod config;
pub mod geometry;

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use ndarray::{s, Array3, ArrayView3};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::BackgroundResult;
use crate::filters::{
    blur::SeparableBlur,
    color_adjust::{apply_tone_curve, mean_value, saturate},
    noise::{add_noise, NoiseRng},
    tone_curve::ToneCurveTable,
};
use crate::io;
use crate::layer_effects::texture_overlay::{overlay_texture, TEXTURE_OPACITY};

use self::config::BackgroundConfig;
use self::geometry::RectF;

/// White level used when no texture is composited on top.
pub const NO_OVERLAY_WHITE_LEVEL: f64 = 1.0;

/// Dimmer white level used under a texture overlay.
pub const OVERLAY_WHITE_LEVEL: f64 = 0.4;

/// Images with `width <= MIN_BLUR_EXTENT` or `height < MIN_BLUR_EXTENT` are
/// not blurred.
pub const MIN_BLUR_EXTENT: usize = 50;

/// JPEG quality of the portrait output.
pub const PORTRAIT_JPEG_QUALITY: u8 = 95;

/// Pixel ratio steps per scale factor unit.
const SCALE_STEPS: f64 = 4.0;

/// Stateful background generator.
#[derive(Debug)]
pub struct BackgroundCompositor {
    output_dir: PathBuf,
    app_image_path: Option<PathBuf>,
    pixel_ratio: f64,
    blur_rounds: usize,
    blur_radius: usize,
    blur_sigma: f64,
    blur: SeparableBlur,
    tone_curve: ToneCurveTable,
    noise: NoiseRng,
}

impl BackgroundCompositor {
    /// Create a compositor writing into `output_dir`.
    ///
    /// The directory is created if missing; failure is logged and the
    /// compositor is still usable in memory.
    pub fn new(output_dir: impl Into<PathBuf>, config: &BackgroundConfig) -> Self {
        let mut compositor = Self::from_config(config);
        compositor.output_dir = output_dir.into();
        if !compositor.output_dir.as_os_str().is_empty() {
            io::ensure_dir(&compositor.output_dir);
        }
        compositor
    }

    /// Create a compositor with no output directory.
    pub fn from_config(config: &BackgroundConfig) -> Self {
        let blur_radius = config.blur_radius.max(1);
        let blur_sigma = if config.blur_sigma.is_finite() && config.blur_sigma > 0.0 {
            config.blur_sigma
        } else {
            warn!(sigma = config.blur_sigma, "invalid blur sigma in config, using 1.2");
            1.2
        };
        if config.blur_radius == 0 {
            warn!("blur radius 0 in config, using 1");
        }

        Self {
            output_dir: PathBuf::new(),
            app_image_path: None,
            pixel_ratio: config.pixel_ratio,
            blur_rounds: config.blur_rounds,
            blur_radius,
            blur_sigma,
            blur: SeparableBlur::new(blur_radius, blur_sigma),
            tone_curve: ToneCurveTable::with_white_level(config.white_level),
            noise: config
                .noise_seed
                .map(NoiseRng::new)
                .unwrap_or_else(NoiseRng::from_clock),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path written by the last portrait build.
    pub fn app_image_path(&self) -> Option<&Path> {
        self.app_image_path.as_deref()
    }

    pub fn white_level(&self) -> Option<f64> {
        self.tone_curve.white_level()
    }

    pub fn tone_curve(&self) -> &ToneCurveTable {
        &self.tone_curve
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn blur_rounds(&self) -> usize {
        self.blur_rounds
    }

    pub fn blur_radius(&self) -> usize {
        self.blur_radius
    }

    pub fn blur_sigma(&self) -> f64 {
        self.blur_sigma
    }

    /// `round(pixel_ratio * 4)`, never below 1.
    pub fn app_scale_factor(&self) -> u32 {
        let factor = (self.pixel_ratio * SCALE_STEPS).round();
        if factor.is_finite() && factor >= 1.0 {
            factor as u32
        } else {
            1
        }
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    /// Set the tone curve white level, recomputing only on change.
    pub fn set_white_level(&mut self, white_level: f64) {
        if self.tone_curve.set_white_level(white_level) {
            debug!(white_level, "tone curve recomputed");
        }
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.pixel_ratio = pixel_ratio;
    }

    pub fn set_blur_rounds(&mut self, rounds: usize) {
        self.blur_rounds = rounds;
    }

    /// Set the kernel radius. Zero is rejected.
    pub fn set_blur_radius(&mut self, radius: usize) {
        if radius == 0 {
            warn!("ignoring blur radius 0");
            return;
        }
        if radius != self.blur_radius {
            self.blur_radius = radius;
            self.blur = SeparableBlur::new(radius, self.blur_sigma);
        }
    }

    /// Set the kernel sigma. Non-positive or non-finite values are rejected.
    pub fn set_blur_sigma(&mut self, sigma: f64) {
        if !(sigma.is_finite() && sigma > 0.0) {
            warn!(sigma, "ignoring invalid blur sigma");
            return;
        }
        if sigma != self.blur_sigma {
            self.blur_sigma = sigma;
            self.blur = SeparableBlur::new(self.blur_radius, sigma);
        }
    }

    /// Reseed the grain generator.
    pub fn set_noise_seed(&mut self, seed: u64) {
        self.noise = NoiseRng::new(seed);
    }

    // ------------------------------------------------------------------------
    // Stages
    // ------------------------------------------------------------------------

    /// Apply the current tone curve.
    pub fn curves(&self, image: &mut Array3<u8>) {
        apply_tone_curve(image.view_mut(), self.tone_curve.table());
    }

    pub fn saturate(&self, image: &mut Array3<u8>) {
        saturate(image.view_mut());
    }

    pub fn add_noise(&mut self, image: &mut Array3<u8>) {
        add_noise(image.view_mut(), &mut self.noise);
    }

    /// Run `blur_rounds` rounds of the separable blur.
    ///
    /// Undersized images are left untouched.
    pub fn blur(&self, image: &mut Array3<u8>) {
        let (height, width, _) = image.dim();
        if width <= MIN_BLUR_EXTENT || height < MIN_BLUR_EXTENT {
            debug!(width, height, "image too small, skipping blur");
            return;
        }
        self.blur.blur(image, self.blur_rounds);
    }

    /// Blur, then tone curve, then saturate.
    pub fn process_app_wallpaper(&self, image: &mut Array3<u8>) {
        self.blur(image);
        self.curves(image);
        self.saturate(image);
    }

    /// Mean HSV value of `image`.
    pub fn extract_mean_value(&self, image: ArrayView3<u8>) -> u8 {
        mean_value(image)
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Build a background from `input` for the app rectangle `app_rect`.
    ///
    /// Without a texture the whole input is scaled to the reduced width.
    /// With one, the input is cropped to `app_rect` first, and the result is
    /// scaled back to `app_rect` width, grained and overlaid with the
    /// texture.
    ///
    /// Returns `None` for an empty input or a degenerate rectangle.
    #[tracing::instrument(level = "debug", skip(self, input, texture), fields(has_texture = texture.is_some()))]
    pub fn build_background_image(
        &mut self,
        input: ArrayView3<u8>,
        texture: Option<ArrayView3<u8>>,
        app_rect: RectF,
    ) -> Option<Array3<u8>> {
        if input.is_empty() {
            warn!("empty input image");
            return None;
        }

        let target = app_rect.to_pixel_rect();
        let target_width = target.width / self.app_scale_factor();
        if target_width == 0 {
            warn!(app_width = target.width, "app rectangle too narrow");
            return None;
        }
        debug!(target_width, scale = self.app_scale_factor(), "scaling input");

        let Some(texture) = texture.filter(|t| !t.is_empty()) else {
            self.set_white_level(NO_OVERLAY_WHITE_LEVEL);
            let mut image = io::scale_to_width(input, target_width, FilterType::Nearest);
            self.process_app_wallpaper(&mut image);
            return Some(image);
        };

        self.set_white_level(OVERLAY_WHITE_LEVEL);
        let cropped = crop(input, app_rect)?;
        let mut image = io::scale_to_width(cropped.view(), target_width, FilterType::Nearest);
        self.process_app_wallpaper(&mut image);

        let mut image = io::scale_to_width(image.view(), target.width, FilterType::Triangle);
        self.add_noise(&mut image);
        overlay_texture(image.view_mut(), texture, TEXTURE_OPACITY);
        Some(image)
    }

    /// Build the background for `input_path` and save it as JPEG in the
    /// output directory.
    ///
    /// Returns the written path, or `None` when nothing was produced.
    #[tracing::instrument(skip(self, input, input_path, texture), fields(path = %input_path.display()))]
    pub fn build_background_image_for_portrait(
        &mut self,
        input: ArrayView3<u8>,
        input_path: &Path,
        texture: Option<ArrayView3<u8>>,
        app_rect: RectF,
    ) -> BackgroundResult<Option<PathBuf>> {
        if input.is_empty() {
            return Ok(None);
        }

        let output_path = self.portrait_output_path(input_path);
        self.app_image_path = Some(output_path.clone());

        let Some(image) = self.build_background_image(input, texture, app_rect) else {
            return Ok(None);
        };
        io::save_jpeg(&output_path, image.view(), PORTRAIT_JPEG_QUALITY)?;
        Ok(Some(output_path))
    }

    /// `<output_dir>/<hex xxh3 of input_path>ap.jpg`.
    ///
    /// Depends only on the bytes of `input_path`.
    pub fn portrait_output_path(&self, input_path: &Path) -> PathBuf {
        let hash = xxh3_64(input_path.as_os_str().as_encoded_bytes());
        self.output_dir.join(format!("{hash:x}ap.jpg"))
    }
}

/// Copy the part of `input` covered by `rect`, clipped to the image.
fn crop(input: ArrayView3<u8>, rect: RectF) -> Option<Array3<u8>> {
    let (height, width, _) = input.dim();
    let clip = rect.to_pixel_rect().clamp_to(width as u32, height as u32);
    if clip.is_empty() {
        warn!(?rect, "app rectangle lies outside the input");
        return None;
    }

    let (x, y) = (clip.x as usize, clip.y as usize);
    let (w, h) = (clip.width as usize, clip.height as usize);
    Some(input.slice(s![y..y + h, x..x + w, ..]).to_owned())
}
