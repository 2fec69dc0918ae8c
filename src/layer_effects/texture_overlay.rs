//! Texture overlay layer effect.
//!
//! Tiles a texture over the whole canvas from the origin and blends it on
//! top with Porter-Duff "over" at a fixed opacity.

use ndarray::{ArrayView3, ArrayViewMut3};

/// Opacity used for the background shader texture.
pub const TEXTURE_OPACITY: f32 = 0.1;

/// Sample a texture pixel with tiling (modulo wrapping).
#[inline]
fn sample_tiled(texture: &ArrayView3<u8>, x: usize, y: usize) -> ([u8; 3], u8) {
    let (texture_h, texture_w, channels) = texture.dim();
    let tx = x % texture_w;
    let ty = y % texture_h;

    if channels < 3 {
        let v = texture[[ty, tx, 0]];
        let a = if channels == 2 { texture[[ty, tx, 1]] } else { 255 };
        return ([v, v, v], a);
    }

    let a = if channels > 3 { texture[[ty, tx, 3]] } else { 255 };
    ([texture[[ty, tx, 0]], texture[[ty, tx, 1]], texture[[ty, tx, 2]]], a)
}

/// Blend a color onto an RGBA pixel with Porter-Duff "over".
#[inline]
fn blend_over(dst: &mut [u8; 4], src: [u8; 3], src_a: f32) {
    if src_a <= 0.0 {
        return;
    }
    if src_a >= 1.0 {
        dst[0] = src[0];
        dst[1] = src[1];
        dst[2] = src[2];
        dst[3] = 255;
        return;
    }

    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    if out_a > 0.0 {
        for c in 0..3 {
            let v = (src[c] as f32 * src_a + dst[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
            dst[c] = v.clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// Composite a tiled texture over an image in place.
///
/// # Arguments
/// * `image` - RGB or RGBA image (3-channel images are treated as opaque)
/// * `texture` - Texture with 1-4 channels, tiled from (0, 0)
/// * `opacity` - Effect opacity (0.0-1.0), multiplied with texture alpha
pub fn overlay_texture(mut image: ArrayViewMut3<u8>, texture: ArrayView3<u8>, opacity: f32) {
    let (height, width, channels) = image.dim();
    if texture.is_empty() || channels < 3 {
        return;
    }
    let opacity = opacity.clamp(0.0, 1.0);

    for y in 0..height {
        for x in 0..width {
            let (color, alpha) = sample_tiled(&texture, x, y);
            let src_a = alpha as f32 / 255.0 * opacity;

            let mut dst = [
                image[[y, x, 0]],
                image[[y, x, 1]],
                image[[y, x, 2]],
                if channels == 4 { image[[y, x, 3]] } else { 255 },
            ];
            blend_over(&mut dst, color, src_a);

            image[[y, x, 0]] = dst[0];
            image[[y, x, 1]] = dst[1];
            image[[y, x, 2]] = dst[2];
            if channels == 4 {
                image[[y, x, 3]] = dst[3];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_zero_opacity_noop() {
        let mut img = Array3::<u8>::from_elem((3, 3, 4), 100);
        let tex = Array3::<u8>::from_elem((2, 2, 4), 255);
        overlay_texture(img.view_mut(), tex.view(), 0.0);
        assert!(img.iter().all(|&v| v == 100));
    }

    #[test]
    fn test_full_opacity_tiles() {
        let mut img = Array3::<u8>::zeros((3, 3, 3));
        let mut tex = Array3::<u8>::zeros((2, 2, 3));
        tex[[0, 0, 0]] = 200;
        tex[[1, 1, 2]] = 50;

        overlay_texture(img.view_mut(), tex.view(), 1.0);

        assert_eq!(img[[0, 0, 0]], 200);
        assert_eq!(img[[0, 2, 0]], 200); // wraps horizontally
        assert_eq!(img[[2, 2, 0]], 200); // wraps both ways
        assert_eq!(img[[1, 1, 2]], 50);
        assert_eq!(img[[0, 1, 0]], 0);
    }

    #[test]
    fn test_low_opacity_mixes() {
        let mut img = Array3::<u8>::from_shape_fn((2, 2, 4), |(_, _, c)| if c == 3 { 255 } else { 0 });
        let tex = Array3::<u8>::from_elem((1, 1, 4), 255);

        overlay_texture(img.view_mut(), tex.view(), TEXTURE_OPACITY);

        for v in img.slice(ndarray::s![.., .., 0..3]).iter() {
            assert!((25..=26).contains(v));
        }
        assert!(img.slice(ndarray::s![.., .., 3]).iter().all(|&a| a == 255));
    }

    #[test]
    fn test_transparent_texture_pixels_skip() {
        let mut img = Array3::<u8>::from_elem((1, 2, 4), 100);
        let mut tex = Array3::<u8>::from_elem((1, 2, 4), 255);
        tex[[0, 1, 3]] = 0;

        overlay_texture(img.view_mut(), tex.view(), 1.0);
        assert_eq!(img[[0, 0, 0]], 255);
        assert_eq!(img[[0, 1, 0]], 100);
    }

    #[test]
    fn test_empty_texture_noop() {
        let mut img = Array3::<u8>::from_elem((2, 2, 4), 9);
        let tex = Array3::<u8>::zeros((0, 0, 4));
        overlay_texture(img.view_mut(), tex.view(), 1.0);
        assert!(img.iter().all(|&v| v == 9));
    }
}
