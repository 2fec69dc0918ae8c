//! HSV color model shared by the tone curve, saturation and palette filters.
//!
//! Integer HSV in the ranges used by common toolkit color classes:
//! - hue: 0-359 degrees, `None` for achromatic pixels (r == g == b)
//! - saturation: 0-255
//! - value: 0-255 (the largest RGB component)

use ndarray::ArrayView3;

/// A color in integer HSV form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub hue: Option<u16>,
    pub saturation: u8,
    pub value: u8,
}

impl Hsv {
    /// Chromatic color. Hue wraps into 0-359.
    pub fn new(hue: u16, saturation: u8, value: u8) -> Self {
        Self {
            hue: Some(hue % 360),
            saturation,
            value,
        }
    }

    /// Gray with the given value.
    pub fn achromatic(value: u8) -> Self {
        Self {
            hue: None,
            saturation: 0,
            value,
        }
    }

    #[inline]
    pub fn is_achromatic(&self) -> bool {
        self.hue.is_none()
    }

    #[inline]
    pub fn with_saturation(self, saturation: u8) -> Self {
        Self { saturation, ..self }
    }

    #[inline]
    pub fn with_value(self, value: u8) -> Self {
        Self { value, ..self }
    }

    #[inline]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        rgb_to_hsv(r, g, b)
    }

    #[inline]
    pub fn to_rgb(self) -> (u8, u8, u8) {
        hsv_to_rgb(self)
    }
}

/// Convert RGB to HSV.
#[inline]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    if max == min {
        return Hsv::achromatic(max);
    }

    let delta = (max - min) as f64;
    let saturation = (255.0 * delta / max as f64).round() as u8;

    let (rf, gf, bf) = (r as f64, g as f64, b as f64);
    let sector = if max == r {
        (gf - bf) / delta
    } else if max == g {
        (bf - rf) / delta + 2.0
    } else {
        (rf - gf) / delta + 4.0
    };

    let hue = (sector * 60.0).rem_euclid(360.0).round() as u16 % 360;

    Hsv {
        hue: Some(hue),
        saturation,
        value: max,
    }
}

/// Convert HSV to RGB.
#[inline]
pub fn hsv_to_rgb(hsv: Hsv) -> (u8, u8, u8) {
    let v = hsv.value;
    let hue = match hsv.hue {
        Some(hue) if hsv.saturation > 0 => hue % 360,
        _ => return (v, v, v),
    };

    let s = hsv.saturation as f64 / 255.0;
    let vf = v as f64;
    let h = hue as f64 / 60.0;
    let sector = h.floor();
    let f = h - sector;

    let p = vf * (1.0 - s);
    let q = vf * (1.0 - s * f);
    let t = vf * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u32 {
        0 => (vf, t, p),
        1 => (q, vf, p),
        2 => (p, vf, t),
        3 => (p, q, vf),
        4 => (t, p, vf),
        _ => (vf, p, q),
    };

    (to_channel(r), to_channel(g), to_channel(b))
}

#[inline]
fn to_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

// ============================================================================
// Channel layout
// ============================================================================

/// Number of leading color channels for a buffer with `channels` channels.
///
/// Gray+alpha (2) has one color channel, RGBA (4) has three.
#[inline]
pub fn color_channels(channels: usize) -> usize {
    match channels {
        2 => 1,
        4 => 3,
        n => n.min(3),
    }
}

/// Index of the alpha channel, present for gray+alpha and RGBA.
#[inline]
pub fn alpha_channel(channels: usize) -> Option<usize> {
    matches!(channels, 2 | 4).then(|| channels - 1)
}

/// Read the pixel at (y, x) as HSV.
///
/// One- and two-channel images are treated as gray.
#[inline]
pub fn pixel_hsv(image: &ArrayView3<u8>, y: usize, x: usize) -> Hsv {
    if image.dim().2 < 3 {
        return Hsv::achromatic(image[[y, x, 0]]);
    }
    rgb_to_hsv(image[[y, x, 0]], image[[y, x, 1]], image[[y, x, 2]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors() {
        assert_eq!(rgb_to_hsv(255, 0, 0), Hsv::new(0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), Hsv::new(120, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), Hsv::new(240, 255, 255));
    }

    #[test]
    fn test_gray_is_achromatic() {
        let hsv = rgb_to_hsv(90, 90, 90);
        assert!(hsv.is_achromatic());
        assert_eq!(hsv.saturation, 0);
        assert_eq!(hsv.value, 90);
        assert_eq!(hsv_to_rgb(hsv), (90, 90, 90));
    }

    #[test]
    fn test_round_trip_close() {
        for &(r, g, b) in &[(200u8, 40u8, 90u8), (12, 180, 77), (250, 250, 10), (33, 66, 99)] {
            let (nr, ng, nb) = hsv_to_rgb(rgb_to_hsv(r, g, b));
            assert!((nr as i32 - r as i32).abs() <= 2);
            assert!((ng as i32 - g as i32).abs() <= 2);
            assert!((nb as i32 - b as i32).abs() <= 2);
        }
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(Hsv::new(370, 10, 10).hue, Some(10));
        // Magenta-ish red sits just below 360
        let hsv = rgb_to_hsv(255, 0, 10);
        assert!(hsv.hue.unwrap() > 350);
    }

    #[test]
    fn test_zero_saturation_ignores_hue() {
        assert_eq!(hsv_to_rgb(Hsv::new(200, 0, 77)), (77, 77, 77));
    }

    #[test]
    fn test_channel_layout() {
        assert_eq!(color_channels(1), 1);
        assert_eq!(color_channels(2), 1);
        assert_eq!(color_channels(3), 3);
        assert_eq!(color_channels(4), 3);
        assert_eq!(alpha_channel(1), None);
        assert_eq!(alpha_channel(2), Some(1));
        assert_eq!(alpha_channel(3), None);
        assert_eq!(alpha_channel(4), Some(3));
    }
}
