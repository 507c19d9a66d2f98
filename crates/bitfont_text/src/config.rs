//! Font system configuration
//!
//! Loaded from TOML, for example:
//!
//! ```toml
//! cache_dir = "/var/cache/bitfont"
//! caching = true
//! measurement_unit = 1.0
//! kerning = true
//!
//! [default_font]
//! facename = "Verdana"
//! scale = 16.0
//! weight = 400
//! ```

use crate::params::FontParams;
use crate::{Result, TextError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a [`FontSystem`](crate::FontSystem)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSystemConfig {
    /// Directory for generated font files
    pub cache_dir: Option<PathBuf>,
    /// Write generated fonts to `cache_dir` and reuse them later
    pub caching: bool,
    /// Pixels per unit of `FontParams::scale`
    pub measurement_unit: f32,
    /// Apply pixel-fitted kerning to new fonts
    pub kerning: bool,
    /// Font created when the system starts
    pub default_font: Option<FontParams>,
}

impl FontSystemConfig {
    /// Disk caching on, one pixel per unit, kerning on
    pub fn standard() -> Self {
        Self {
            cache_dir: None,
            caching: true,
            measurement_unit: 1.0,
            kerning: true,
            default_font: None,
        }
    }

    /// Everything in memory; nothing is read from or written to disk
    pub fn headless() -> Self {
        Self {
            caching: false,
            ..Self::standard()
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_measurement_unit(mut self, unit: f32) -> Self {
        self.measurement_unit = unit;
        self
    }

    pub fn with_default_font(mut self, params: FontParams) -> Self {
        self.default_font = Some(params);
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| TextError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
            .map_err(|e| TextError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TextError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.measurement_unit.is_finite() && self.measurement_unit > 0.0) {
            return Err(TextError::Config(format!(
                "measurement_unit must be positive, got {}",
                self.measurement_unit
            )));
        }
        Ok(())
    }
}

impl Default for FontSystemConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let standard = FontSystemConfig::standard();
        assert!(standard.caching && standard.kerning);
        assert_eq!(standard.measurement_unit, 1.0);
        assert!(!FontSystemConfig::headless().caching);
    }

    #[test]
    fn test_parse_toml() {
        let config = FontSystemConfig::from_toml_str(
            r#"
            cache_dir = "/tmp/fonts"
            kerning = false

            [default_font]
            facename = "Verdana"
            scale = 16.0
            italic = true
            "#,
        )
        .unwrap();

        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/fonts")));
        assert!(config.caching);
        assert!(!config.kerning);
        let font = config.default_font.unwrap();
        assert_eq!(font.facename, "Verdana");
        assert_eq!(font.weight, 400);
        assert_eq!(font.tracking, 1);
        assert!(font.italic);
    }

    #[test]
    fn test_invalid_unit_is_rejected() {
        let result = FontSystemConfig::from_toml_str("measurement_unit = 0.0");
        assert!(matches!(result, Err(TextError::Config(_))));
        assert!(FontSystemConfig::from_toml_str("caching = \"yes\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = FontSystemConfig::headless()
            .with_cache_dir("/tmp/x")
            .with_default_font(FontParams::new("Arial", 12.0, 700));
        let text = config.to_toml_string().unwrap();
        assert_eq!(FontSystemConfig::from_toml_str(&text).unwrap(), config);
    }
}
