//! RGB brush colors and their hex notation.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hex color parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Hex color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("Hex color must be #rgb or #rrggbb: {0:?}")]
    InvalidLength(String),
    #[error("Invalid hex digit in color: {0:?}")]
    InvalidDigit(String),
}

/// An opaque RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Create a color from 8-bit channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from arbitrary numeric channels.
    ///
    /// Each channel is rounded and clamped to `0..=255`; NaN becomes 0.
    pub fn from_channels(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: normalize_channel(r),
            g: normalize_channel(g),
            b: normalize_channel(b),
        }
    }

    /// Parse `#rgb` or `#rrggbb` notation.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(hex.to_string()))?;

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(hex.to_string()));
        }

        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| ColorError::InvalidDigit(hex.to_string()))
        };

        match digits.len() {
            3 => {
                let short = |i: usize| channel(&digits[i..=i].repeat(2));
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(ColorError::InvalidLength(hex.to_string())),
        }
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Combine with an opacity into a paint color.
    pub fn with_opacity(self, opacity: f64) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, 255).with_alpha(opacity as f32)
    }
}

fn normalize_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hex_doubles_digits() {
        assert_eq!(Rgb::from_hex("#fff"), Ok(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::from_hex("#1a0"), Ok(Rgb::new(0x11, 0xaa, 0x00)));
    }

    #[test]
    fn test_long_hex() {
        assert_eq!(Rgb::from_hex("#336699"), Ok(Rgb::new(51, 102, 153)));
        assert_eq!(Rgb::from_hex("#FF8000"), Ok(Rgb::new(255, 128, 0)));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(Rgb::from_hex("336699"), Err(ColorError::MissingHash(_))));
        assert!(matches!(Rgb::from_hex("#12345"), Err(ColorError::InvalidLength(_))));
        assert!(matches!(Rgb::from_hex("#ggg"), Err(ColorError::InvalidDigit(_))));
        assert!(matches!(Rgb::from_hex("#+ff"), Err(ColorError::InvalidDigit(_))));
        assert!(matches!(Rgb::from_hex("#é12"), Err(ColorError::InvalidDigit(_))));
    }

    #[test]
    fn test_to_hex_pads_channels() {
        assert_eq!(Rgb::new(1, 2, 3).to_hex(), "#010203");
        assert_eq!(Rgb::new(51, 102, 153).to_string(), "#336699");
    }

    #[test]
    fn test_from_str_trims() {
        let color: Rgb = " #000 ".parse().unwrap();
        assert_eq!(color, Rgb::BLACK);
    }

    #[test]
    fn test_channels_are_rounded_and_clamped() {
        assert_eq!(Rgb::from_channels(-20.0, 300.0, 127.6), Rgb::new(0, 255, 128));
        assert_eq!(Rgb::from_channels(f64::NAN, 0.4, 254.5), Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_with_opacity() {
        let color = Rgb::new(10, 20, 30).with_opacity(0.5);
        let rgba = color.to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b), (10, 20, 30));
        assert!((color.components[3] - 0.5).abs() < f32::EPSILON);
    }
}
