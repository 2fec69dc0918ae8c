//! Sine-shaped brightness curve.
//!
//! The curve maps a value channel entry `i` to
//! `255 * (level / (sin(1.5) / 1.5)) * sin(1.5 * i / 255) / 1.5`, truncated
//! and clamped to 0-255. A white level of 1.0 sends 255 to (almost) 255 and
//! lifts the midtones; smaller levels dim the whole range.

/// Number of entries in a tone curve lookup table.
pub const CURVE_SIZE: usize = 256;

/// Compute the tone curve lookup table for a white level.
pub fn tone_curve(white_level: f64) -> [u8; CURVE_SIZE] {
    let multiplier = white_level / (1.5f64.sin() / 1.5);

    let mut lut = [0u8; CURVE_SIZE];
    for (i, entry) in lut.iter_mut().enumerate() {
        let value = 255.0 * multiplier * (1.5 * i as f64 / 255.0).sin() / 1.5;
        *entry = (value as i64).clamp(0, 255) as u8;
    }
    lut
}

/// Tone curve lookup table memoized on its white level.
///
/// Setting the same white level again keeps the current table.
#[derive(Debug, Clone)]
pub struct ToneCurveTable {
    white_level: Option<f64>,
    table: [u8; CURVE_SIZE],
    recomputations: usize,
}

impl Default for ToneCurveTable {
    fn default() -> Self {
        let mut table = [0u8; CURVE_SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = i as u8;
        }
        Self {
            white_level: None,
            table,
            recomputations: 0,
        }
    }
}

impl ToneCurveTable {
    /// Identity table; no white level set yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_white_level(white_level: f64) -> Self {
        let mut curve = Self::default();
        curve.set_white_level(white_level);
        curve
    }

    /// Recompute the table for `white_level`.
    ///
    /// Returns `false` without touching the table when the level is
    /// unchanged.
    pub fn set_white_level(&mut self, white_level: f64) -> bool {
        if self.white_level == Some(white_level) {
            return false;
        }
        self.white_level = Some(white_level);
        self.table = tone_curve(white_level);
        self.recomputations += 1;
        true
    }

    pub fn white_level(&self) -> Option<f64> {
        self.white_level
    }

    pub fn table(&self) -> &[u8; CURVE_SIZE] {
        &self.table
    }

    /// How many times the table has been rebuilt.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    #[inline]
    pub fn map(&self, value: u8) -> u8 {
        self.table[value as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_entries() {
        let lut = tone_curve(1.0);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[128], 174);
        assert!(lut[255] >= 254);

        let dim = tone_curve(0.4);
        assert_eq!(dim[128], 69);
        assert_eq!(dim[255], 102);
    }

    #[test]
    fn test_monotonic() {
        for &level in &[0.1, 0.4, 0.7, 1.0, 1.5, 3.0] {
            let lut = tone_curve(level);
            for pair in lut.windows(2) {
                assert!(pair[0] <= pair[1], "level {level} not monotonic");
            }
        }
    }

    #[test]
    fn test_clamps_high_levels() {
        let lut = tone_curve(5.0);
        assert_eq!(lut[255], 255);
        assert_eq!(lut[0], 0);
    }

    #[test]
    fn test_same_level_is_not_recomputed() {
        let mut curve = ToneCurveTable::new();
        assert!(curve.set_white_level(0.7));
        let first = *curve.table();
        assert!(!curve.set_white_level(0.7));
        assert_eq!(curve.recomputations(), 1);
        assert_eq!(*curve.table(), first);

        assert!(curve.set_white_level(1.0));
        assert_eq!(curve.recomputations(), 2);
        assert_eq!(curve.white_level(), Some(1.0));
    }

    #[test]
    fn test_default_is_identity() {
        let curve = ToneCurveTable::default();
        assert_eq!(curve.map(0), 0);
        assert_eq!(curve.map(200), 200);
        assert_eq!(curve.white_level(), None);
    }
}
