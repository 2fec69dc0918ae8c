//! Image file and filesystem collaborators.
//!
//! Decoding, encoding and resampling go through the `image` crate; the
//! filters only ever see `Array3<u8>` buffers shaped (height, width, 4).

use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};

use image::{
    codecs::jpeg::JpegEncoder, imageops, imageops::FilterType, DynamicImage, ImageReader, Rgba,
    RgbaImage,
};
use ndarray::{Array3, ArrayView3};
use tracing::warn;

use crate::background::geometry::{center_crop_rect, RectF};
use crate::error::{BackgroundError, BackgroundResult};

// ============================================================================
// Buffer conversion
// ============================================================================

/// Copy an ndarray image (1, 3 or 4 channels) into an RGBA image.
///
/// Missing alpha becomes opaque; one channel is spread to gray.
pub fn to_rgba_image(image: ArrayView3<u8>) -> RgbaImage {
    let (height, width, channels) = image.dim();

    RgbaImage::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        match channels {
            0 => Rgba([0, 0, 0, 255]),
            1 | 2 => {
                let v = image[[y, x, 0]];
                let a = if channels == 2 { image[[y, x, 1]] } else { 255 };
                Rgba([v, v, v, a])
            }
            _ => {
                let a = if channels > 3 { image[[y, x, 3]] } else { 255 };
                Rgba([image[[y, x, 0]], image[[y, x, 1]], image[[y, x, 2]], a])
            }
        }
    })
}

/// Copy an RGBA image into an ndarray shaped (height, width, 4).
pub fn from_rgba_image(image: &RgbaImage) -> Array3<u8> {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 4), |(y, x, c)| {
        image.get_pixel(x as u32, y as u32)[c]
    })
}

// ============================================================================
// Resampling
// ============================================================================

/// Resize to exactly `width` x `height`.
///
/// Empty inputs or targets give an empty RGBA buffer.
pub fn scale_to(image: ArrayView3<u8>, width: u32, height: u32, filter: FilterType) -> Array3<u8> {
    if image.is_empty() || width == 0 || height == 0 {
        return Array3::<u8>::zeros((0, 0, 4));
    }
    let scaled = imageops::resize(&to_rgba_image(image), width, height, filter);
    from_rgba_image(&scaled)
}

/// Resize to `width`, keeping the aspect ratio (height rounded, at least 1).
pub fn scale_to_width(image: ArrayView3<u8>, width: u32, filter: FilterType) -> Array3<u8> {
    let (src_h, src_w, _) = image.dim();
    if src_w == 0 || src_h == 0 {
        return Array3::<u8>::zeros((0, 0, 4));
    }
    let height = (src_h as f64 * width as f64 / src_w as f64).round().max(1.0) as u32;
    scale_to(image, width, height, filter)
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode an image file into RGBA.
pub fn load_image(path: impl AsRef<Path>) -> BackgroundResult<Array3<u8>> {
    let decoded = image::open(path)?.to_rgba8();
    Ok(from_rgba_image(&decoded))
}

/// Natural size of an image file without decoding the pixels.
pub fn image_dimensions(path: impl AsRef<Path>) -> BackgroundResult<(u32, u32)> {
    Ok(ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()?)
}

/// Load `path` center-cropped to the aspect of `rect` and scaled to its size.
pub fn load_app_background(path: impl AsRef<Path>, rect: RectF) -> BackgroundResult<Array3<u8>> {
    let path = path.as_ref();
    let (width, height) = image_dimensions(path)?;
    let clip = center_crop_rect(width, height, rect);

    let decoded = image::open(path)?.to_rgba8();
    let cropped = imageops::crop_imm(&decoded, clip.x, clip.y, clip.width, clip.height).to_image();

    let target = rect.to_pixel_rect();
    if cropped.width() == 0 || cropped.height() == 0 || target.is_empty() {
        return Err(BackgroundError::invalid_buffer(format!(
            "cannot fit {}x{} image into {}x{}",
            width, height, target.width, target.height
        )));
    }
    let scaled = imageops::resize(&cropped, target.width, target.height, FilterType::Triangle);
    Ok(from_rgba_image(&scaled))
}

/// Load the overlay texture, logging and returning `None` when unavailable.
pub fn load_texture(path: impl AsRef<Path>) -> Option<Array3<u8>> {
    let path = path.as_ref();
    match load_image(path) {
        Ok(texture) if !texture.is_empty() => Some(texture),
        Ok(_) => {
            warn!(path = %path.display(), "background texture is empty");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "background texture is not available");
            None
        }
    }
}

// ============================================================================
// Encoding / filesystem
// ============================================================================

/// Encode as JPEG at `quality` (1-100). Alpha is dropped.
pub fn save_jpeg(path: impl AsRef<Path>, image: ArrayView3<u8>, quality: u8) -> BackgroundResult<()> {
    if image.is_empty() {
        return Err(BackgroundError::invalid_buffer("refusing to encode an empty image"));
    }

    let rgb = DynamicImage::ImageRgba8(to_rgba_image(image)).to_rgb8();
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;
    Ok(())
}

/// Create `path` and its parents. Failure is logged, never fatal.
pub fn ensure_dir(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match fs::create_dir_all(path) {
        Ok(()) => true,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to create directory");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn checker(height: usize, width: usize) -> Array3<u8> {
        Array3::from_shape_fn((height, width, 4), |(y, x, c)| {
            if c == 3 {
                255
            } else if (x + y) % 2 == 0 {
                220
            } else {
                30
            }
        })
    }

    #[test]
    fn test_rgba_round_trip() {
        let img = checker(3, 5);
        assert_eq!(from_rgba_image(&to_rgba_image(img.view())), img);
    }

    #[test]
    fn test_rgb_gets_opaque_alpha() {
        let img = Array3::<u8>::from_elem((2, 2, 3), 40);
        let rgba = from_rgba_image(&to_rgba_image(img.view()));
        assert_eq!(rgba.dim(), (2, 2, 4));
        assert_eq!(rgba[[1, 1, 3]], 255);
        assert_eq!(rgba[[1, 1, 0]], 40);
    }

    #[test]
    fn test_scale_to_width_keeps_aspect() {
        let img = checker(100, 200);
        let out = scale_to_width(img.view(), 50, FilterType::Nearest);
        assert_eq!(out.dim(), (25, 50, 4));
    }

    #[test]
    fn test_scale_uniform_stays_uniform() {
        let img = Array3::<u8>::from_elem((40, 60, 4), 128);
        let out = scale_to(img.view(), 17, 9, FilterType::Triangle);
        assert_eq!(out.dim(), (9, 17, 4));
        assert!(out.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_scale_empty() {
        let img = Array3::<u8>::zeros((0, 0, 4));
        assert!(scale_to_width(img.view(), 10, FilterType::Nearest).is_empty());
    }

    #[test]
    fn test_jpeg_round_trip_dimensions() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("out.jpg");
        let img = Array3::<u8>::from_elem((12, 20, 4), 90);

        save_jpeg(&path, img.view(), 95).expect("save");
        assert_eq!(image_dimensions(&path).expect("dims"), (20, 12));

        let loaded = load_image(&path).expect("load");
        assert_eq!(loaded.dim(), (12, 20, 4));
        assert!((loaded[[6, 10, 0]] as i32 - 90).abs() <= 3);
    }

    #[test]
    fn test_save_empty_rejected() {
        let dir = tempdir().expect("tempdir");
        let img = Array3::<u8>::zeros((0, 0, 4));
        let err = save_jpeg(dir.path().join("x.jpg"), img.view(), 95).unwrap_err();
        assert!(matches!(err, BackgroundError::InvalidBuffer(_)));
    }

    #[test]
    fn test_load_app_background_crops_center() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("wide.png");

        // Left and right thirds red, middle green
        let mut src = RgbaImage::new(90, 30);
        for (x, _, px) in src.enumerate_pixels_mut() {
            *px = if (30..60).contains(&x) {
                Rgba([0, 255, 0, 255])
            } else {
                Rgba([255, 0, 0, 255])
            };
        }
        src.save(&path).expect("write png");

        let out = load_app_background(&path, RectF::from_size(10.0, 10.0)).expect("load");
        assert_eq!(out.dim(), (10, 10, 4));
        assert_eq!(out[[5, 5, 1]], 255);
        assert_eq!(out[[5, 5, 0]], 0);
    }

    #[test]
    fn test_missing_texture_is_none() {
        assert!(load_texture("/nonexistent/texture.png").is_none());
    }

    #[test]
    fn test_ensure_dir_nested() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("a/b/c");
        assert!(ensure_dir(&nested));
        assert!(nested.is_dir());
    }
}
