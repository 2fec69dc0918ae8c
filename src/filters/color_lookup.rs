//! Hue-indexed palette remapping.
//!
//! A palette is a list of control colors sorted by hue. Remapping a color
//! keeps its hue and replaces saturation and value with the linear blend of
//! the two control colors whose hues bracket it. The hue circle is closed by
//! padding the table: entry 0 repeats the last control color (one turn
//! below) and the final entry repeats the first one (one turn above), so
//! every hue has a bracket.
//!
//! An invalid palette (achromatic control color, hues out of order) yields an
//! inert table whose `remap` returns its input.

use ndarray::{ArrayView3, ArrayViewMut3};
use tracing::warn;

use super::color::{hsv_to_rgb, rgb_to_hsv, Hsv};

/// Why a palette was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaletteError {
    #[error("color remap table has achromatic color at index {0}")]
    Achromatic(usize),

    #[error("color remap table is not sorted according to hue at index {0}")]
    Unsorted(usize),

    #[error("color remap table image must be RGB or RGBA with at least one row")]
    InvalidImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ControlPoint {
    hue: u16,
    saturation: u8,
    value: u8,
}

/// Padded hue -> (saturation, value) table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorLookupTable {
    entries: Vec<ControlPoint>,
}

impl ColorLookupTable {
    /// Build a table, degrading to an inert one on invalid input.
    ///
    /// The rejection reason is logged as a warning.
    pub fn new(colors: &[Hsv]) -> Self {
        match Self::try_new(colors) {
            Ok(table) => table,
            Err(err) => {
                warn!("{err}");
                Self::default()
            }
        }
    }

    /// Build a table, reporting why a palette is rejected.
    ///
    /// An empty palette gives an inert table.
    pub fn try_new(colors: &[Hsv]) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Ok(Self::default());
        }

        let mut entries = Vec::with_capacity(colors.len() + 2);
        // Slot for the wraparound copy of the last color
        entries.push(ControlPoint {
            hue: 0,
            saturation: 0,
            value: 0,
        });

        let mut last_hue = 0;
        for (index, color) in colors.iter().enumerate() {
            let hue = color.hue.ok_or(PaletteError::Achromatic(index))? % 360;
            if hue < last_hue {
                return Err(PaletteError::Unsorted(index));
            }
            last_hue = hue;
            entries.push(ControlPoint {
                hue,
                saturation: color.saturation,
                value: color.value,
            });
        }

        entries[0] = entries[entries.len() - 1];
        entries.push(entries[1]);

        Ok(Self { entries })
    }

    /// Build a table from the first row of an RGB(A) lookup image.
    pub fn from_image(image: ArrayView3<u8>) -> Self {
        let (height, width, channels) = image.dim();
        if height == 0 || channels < 3 {
            warn!("{}", PaletteError::InvalidImage);
            return Self::default();
        }

        let colors: Vec<Hsv> = (0..width)
            .map(|x| rgb_to_hsv(image[[0, x, 0]], image[[0, x, 1]], image[[0, x, 2]]))
            .collect();

        Self::new(&colors)
    }

    /// `true` when the table remaps nothing.
    pub fn is_inert(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of control colors (excluding the wraparound padding).
    pub fn len(&self) -> usize {
        self.entries.len().saturating_sub(2)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retarget saturation and value of `color` along the palette.
    ///
    /// Achromatic colors and inert tables return `color` unchanged.
    /// Interpolated channels are rounded to nearest.
    pub fn remap(&self, color: Hsv) -> Hsv {
        let hue = match color.hue {
            Some(hue) if !self.entries.is_empty() => hue % 360,
            _ => return color,
        };

        let last = self.entries.len() - 1;
        let mut index = 1;
        while index < last && hue > self.entries[index].hue {
            index += 1;
        }

        let left = self.entries[index - 1];
        let right = self.entries[index];

        let mut h1 = left.hue as f64;
        let mut h2 = right.hue as f64;
        if index == 1 {
            // Leading pad is the last color, one turn back
            h1 -= 360.0;
        }
        if index == last {
            // Trailing pad is the first color, one turn ahead
            h2 += 360.0;
        }

        let t = (hue as f64 - h1) / (h2 - h1);

        Hsv {
            hue: Some(hue),
            saturation: lerp(left.saturation, right.saturation, t),
            value: lerp(left.value, right.value, t),
        }
    }

    /// Remap every pixel of an RGB(A) image in place.
    pub fn remap_image(&self, mut image: ArrayViewMut3<u8>) {
        let (height, width, channels) = image.dim();
        if self.is_inert() || channels < 3 {
            return;
        }

        for y in 0..height {
            for x in 0..width {
                let hsv = rgb_to_hsv(image[[y, x, 0]], image[[y, x, 1]], image[[y, x, 2]]);
                if hsv.is_achromatic() {
                    continue;
                }
                let (r, g, b) = hsv_to_rgb(self.remap(hsv));
                image[[y, x, 0]] = r;
                image[[y, x, 1]] = g;
                image[[y, x, 2]] = b;
            }
        }
    }
}

#[inline]
fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 * (1.0 - t) + b as f64 * t).round().clamp(0.0, 255.0) as u8
}
