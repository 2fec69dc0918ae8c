//! Rectangles and the aspect-preserving center crop.

use serde::{Deserialize, Serialize};

/// Rectangle in (possibly fractional) device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width over height; `None` for an empty rectangle.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.width / self.height)
    }

    /// Round each coordinate to the nearest pixel; negative values clamp to 0.
    pub fn to_pixel_rect(&self) -> PixelRect {
        let round = |v: f64| v.round().max(0.0) as u32;
        PixelRect {
            x: round(self.x),
            y: round(self.y),
            width: round(self.width),
            height: round(self.height),
        }
    }
}

/// Rectangle in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clip to an image of `width` x `height`.
    pub fn clamp_to(&self, width: u32, height: u32) -> PixelRect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        PixelRect {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }
}

/// Largest centered region of a `source_width` x `source_height` image that
/// has the aspect ratio of `target`.
///
/// Wider sources lose columns on both sides, taller sources lose rows. An
/// empty source or target keeps the whole image.
pub fn center_crop_rect(source_width: u32, source_height: u32, target: RectF) -> PixelRect {
    let full = PixelRect::new(0, 0, source_width, source_height);
    let target_aspect = match target.aspect_ratio() {
        Some(aspect) if source_width > 0 && source_height > 0 => aspect,
        _ => return full,
    };
    let source_aspect = source_width as f64 / source_height as f64;

    if source_aspect > target_aspect {
        let clip_width = ((source_height as f64 * target_aspect) as u32).min(source_width);
        let x_offset = (source_width - clip_width) / 2;
        PixelRect::new(x_offset, 0, clip_width, source_height)
    } else {
        let clip_height = ((source_width as f64 / target_aspect) as u32).min(source_height);
        let y_offset = (source_height - clip_height) / 2;
        PixelRect::new(0, y_offset, source_width, clip_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_source_square_target() {
        let rect = center_crop_rect(1000, 500, RectF::from_size(300.0, 300.0));
        assert_eq!(rect, PixelRect::new(250, 0, 500, 500));
    }

    #[test]
    fn test_tall_source_square_target() {
        let rect = center_crop_rect(500, 1000, RectF::from_size(64.0, 64.0));
        assert_eq!(rect, PixelRect::new(0, 250, 500, 500));
    }

    #[test]
    fn test_portrait_target() {
        // 16:9 landscape photo cropped for a 9:16 phone screen
        let rect = center_crop_rect(1920, 1080, RectF::from_size(540.0, 960.0));
        assert_eq!(rect, PixelRect::new(656, 0, 607, 1080));
    }

    #[test]
    fn test_matching_aspect_keeps_everything() {
        let rect = center_crop_rect(800, 600, RectF::from_size(400.0, 300.0));
        assert_eq!(rect, PixelRect::new(0, 0, 800, 600));
    }

    #[test]
    fn test_empty_inputs_keep_source() {
        assert_eq!(
            center_crop_rect(10, 20, RectF::from_size(0.0, 5.0)),
            PixelRect::new(0, 0, 10, 20)
        );
        assert_eq!(
            center_crop_rect(0, 0, RectF::from_size(5.0, 5.0)),
            PixelRect::new(0, 0, 0, 0)
        );
    }

    #[test]
    fn test_to_pixel_rect_rounds() {
        let rect = RectF::new(0.4, 1.6, 99.5, -3.0).to_pixel_rect();
        assert_eq!(rect, PixelRect::new(0, 2, 100, 0));
        assert!(rect.is_empty());
    }

    #[test]
    fn test_clamp_to_bounds() {
        let rect = PixelRect::new(8, 2, 10, 10).clamp_to(12, 6);
        assert_eq!(rect, PixelRect::new(8, 2, 4, 4));
        assert!(PixelRect::new(20, 0, 5, 5).clamp_to(12, 6).is_empty());
    }
}
