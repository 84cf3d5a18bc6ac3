//! Brush configuration consumed by the stroke renderer.

use crate::color::{ColorError, Rgb};
use crate::config::BrushConfig;
use peniko::Color;

/// Read-only view of the current brush.
///
/// The renderer only ever reads from its brush; the host owns the controls
/// that change it.
pub trait BrushSource {
    /// Brush diameter in pixels (always at least 1).
    fn size(&self) -> u32;

    /// Half the brush size, rounded.
    fn half_size(&self) -> u32;

    /// Opacity in `0.0..=1.0`.
    fn opacity(&self) -> f64;

    /// Brush color without opacity.
    fn color(&self) -> Rgb;

    /// Paint color for strokes (color combined with opacity).
    fn stroke_color(&self) -> Color {
        self.color().with_opacity(self.opacity())
    }

    /// The brush color as a CSS `rgba(r, g, b, a)` string.
    fn rgba_string(&self) -> String {
        let Rgb { r, g, b } = self.color();
        format!("rgba({}, {}, {}, {})", r, g, b, self.opacity())
    }
}

/// Brush settings with clamping setters.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    size: u32,
    half_size: u32,
    opacity: f64,
    color: Rgb,
}

impl Default for Brush {
    fn default() -> Self {
        Self::from_parts(1, 1.0, Rgb::BLACK)
    }
}

impl Brush {
    /// Create a brush with the default settings (1px, opaque black).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a brush from raw values, clamping each of them.
    pub fn from_parts(size: i64, opacity: f64, color: Rgb) -> Self {
        let mut brush = Self {
            size: 1,
            half_size: 1,
            opacity: 1.0,
            color,
        };
        brush.set_size(size);
        brush.set_opacity(opacity);
        brush
    }

    /// Create a brush from configuration.
    pub fn from_config(config: &BrushConfig) -> Result<Self, ColorError> {
        let color = Rgb::from_hex(&config.color)?;
        Ok(Self::from_parts(config.size, config.opacity, color))
    }

    /// Set the brush size; anything below 1 becomes 1.
    pub fn set_size(&mut self, size: i64) {
        self.size = size.clamp(1, i64::from(u32::MAX)) as u32;
        self.half_size = (f64::from(self.size) / 2.0).round() as u32;
    }

    /// Set the opacity, clamped to `0.0..=1.0`; NaN resets it to 1.0.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Set the brush color.
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Set the brush color from `#rgb` / `#rrggbb` notation.
    ///
    /// The current color is kept when parsing fails.
    pub fn set_color_hex(&mut self, hex: &str) -> Result<(), ColorError> {
        self.color = Rgb::from_hex(hex)?;
        Ok(())
    }
}

impl BrushSource for Brush {
    fn size(&self) -> u32 {
        self.size
    }

    fn half_size(&self) -> u32 {
        self.half_size
    }

    fn opacity(&self) -> f64 {
        self.opacity
    }

    fn color(&self) -> Rgb {
        self.color
    }
}
