//! Sketchpad configuration.

use crate::color::{ColorError, Rgb};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid color in config: {0}")]
    Color(#[from] ColorError),
    #[error("Surface size must be non-zero, got {width}x{height}")]
    EmptySurface { width: u32, height: u32 },
    #[error("Surface size {width}x{height} exceeds the {max}px limit")]
    SurfaceTooLarge { width: u32, height: u32, max: u32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Largest accepted surface width or height, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// Initial brush settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub size: i64,
    pub opacity: f64,
    /// `#rgb` or `#rrggbb`.
    pub color: String,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: 10,
            opacity: 1.0,
            color: "#000000".to_string(),
        }
    }
}

/// Sketchpad settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchpadConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Frame interval for hosts that pace frames themselves.
    pub frame_interval_ms: u64,
    /// Background fill for software surfaces; transparent when absent.
    pub background: Option<String>,
    pub brush: BrushConfig,
}

impl Default for SketchpadConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            frame_interval_ms: 16,
            background: None,
            brush: BrushConfig::default(),
        }
    }
}

impl SketchpadConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read and validate a config file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parsed background color, if one is configured.
    pub fn background_color(&self) -> Result<Option<Rgb>, ColorError> {
        self.background.as_deref().map(Rgb::from_hex).transpose()
    }

    /// Reject empty or oversized surfaces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptySurface {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(ConfigError::SurfaceTooLarge {
                width: self.width,
                height: self.height,
                max: MAX_DIMENSION,
            });
        }
        Rgb::from_hex(&self.brush.color)?;
        self.background_color()?;
        Ok(())
    }
}
