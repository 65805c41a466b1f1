//! sRGB color type used by themes and the rasterizer.
//!
//! Components are `f64` in [0, 1]. User-supplied colors arrive as
//! `"#rrggbb"` strings, which quantizes to 8 bits per channel.

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    pub const BLACK: Srgb = Srgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Srgb = Srgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Parses `"#ff00aa"` or `"ff00aa"` (case insensitive).
    ///
    /// Returns `EngineError::InvalidColor` for anything but six hex digits.
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Self::from_rgb8(
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
        ))
    }

    /// Formats as `"#rrggbb"`, clamping and rounding each channel.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Channels quantized to 8 bits.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Straight linear interpolation in sRGB space; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Srgb, t: f64) -> Srgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Srgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Scales brightness; used for twinkling stars.
    pub fn scale(self, factor: f64) -> Srgb {
        Srgb::new(self.r * factor, self.g * factor, self.b * factor)
    }
}
