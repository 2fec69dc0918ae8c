//! Tunables for background generation.
//!
//! Keys mirror the `silica-background` configuration group. Missing keys fall
//! back to their defaults, so an empty JSON object is a valid config.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::BackgroundResult;

/// Initial compositor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Full blur rounds (two transposing passes each).
    pub blur_rounds: usize,
    /// Gaussian kernel radius, center tap included.
    pub blur_radius: usize,
    /// Gaussian standard deviation.
    pub blur_sigma: f64,
    /// Initial tone curve white level.
    pub white_level: f64,
    /// Device pixel ratio; the app scale factor is `round(pixel_ratio * 4)`.
    pub pixel_ratio: f64,
    /// Seed for the grain; `None` seeds from the clock.
    pub noise_seed: Option<u64>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            blur_rounds: 5,
            blur_radius: 4,
            blur_sigma: 1.2,
            white_level: 0.7,
            pixel_ratio: 1.0,
            noise_seed: None,
        }
    }
}

impl BackgroundConfig {
    pub fn from_json_str(json: &str) -> BackgroundResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> BackgroundResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> BackgroundResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackgroundError;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = BackgroundConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, BackgroundConfig::default());
    }

    #[test]
    fn test_partial_config_overrides_named_keys() {
        let config =
            BackgroundConfig::from_json_str(r#"{ "blur_rounds": 2, "pixel_ratio": 1.5 }"#)
                .expect("parse");
        assert_eq!(config.blur_rounds, 2);
        assert_eq!(config.pixel_ratio, 1.5);
        assert_eq!(config.blur_radius, 4);
        assert_eq!(config.white_level, 0.7);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let file = NamedTempFile::new().expect("tempfile");
        let config = BackgroundConfig {
            blur_radius: 6,
            noise_seed: Some(11),
            ..BackgroundConfig::default()
        };
        config.save(file.path()).expect("save");
        let loaded = BackgroundConfig::load(file.path()).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = BackgroundConfig::from_json_str("{ blur_rounds: ").unwrap_err();
        assert!(matches!(err, BackgroundError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BackgroundConfig::load("/nonexistent/silica/config.json").unwrap_err();
        assert!(matches!(err, BackgroundError::Io(_)));
    }
}
