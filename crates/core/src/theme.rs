//! Named color schemes and drawing styles.
//!
//! A [`Theme`] decides how a frame looks: background, particle colors and
//! shape, attractor markers, and whether glow, trails and the star field are
//! drawn. The simulation never reads it.

use serde_json::Value;

use crate::color::Srgb;
use crate::error::EngineError;
use crate::params::param_string;

/// Names accepted by [`Theme::from_name`].
const THEME_NAMES: &[&str] = &["mono", "matrix", "nebula"];

/// Params keys that replace a theme color with a `"#rrggbb"` string.
pub const COLOR_KEYS: &[&str] = &["background", "particle_color", "attractor_color"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
}

/// Colors of the control panel chrome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromeColors {
    pub background: Srgb,
    pub border: Srgb,
    pub slider_active: Srgb,
    pub button_hover: Srgb,
    /// Alpha of the translucent bar behind the widgets.
    pub bar_alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub background: Srgb,
    /// Particles pick one entry by their spawn tint.
    pub particle_colors: Vec<Srgb>,
    pub particle_shape: Shape,
    pub attractor_color: Srgb,
    pub attractor_shape: Shape,
    /// Marker radius (half side length for squares).
    pub attractor_size: f64,
    /// Pulsing markers with a white outline and a soft halo.
    pub attractor_pulse: bool,
    /// Translucent halo of three times the radius around each particle.
    pub particle_glow: bool,
    pub draw_trails: bool,
    /// Background star count; zero disables the star field.
    pub stars: usize,
    pub chrome: ChromeColors,
}

impl Theme {
    /// Resolves a theme by name.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "mono" => Ok(Self::mono()),
            "matrix" => Ok(Self::matrix()),
            "nebula" => Ok(Self::nebula()),
            other => Err(EngineError::UnknownTheme(other.to_owned())),
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        THEME_NAMES
    }

    /// White dots on black with green attractor circles.
    pub fn mono() -> Self {
        Self {
            name: "mono".into(),
            background: Srgb::BLACK,
            particle_colors: vec![Srgb::WHITE],
            particle_shape: Shape::Circle,
            attractor_color: Srgb::from_rgb8(0, 255, 100),
            attractor_shape: Shape::Circle,
            attractor_size: 4.0,
            attractor_pulse: false,
            particle_glow: false,
            draw_trails: false,
            stars: 0,
            chrome: default_chrome(),
        }
    }

    /// Green pixels on black with white attractor squares.
    pub fn matrix() -> Self {
        Self {
            name: "matrix".into(),
            background: Srgb::BLACK,
            particle_colors: vec![Srgb::from_rgb8(0, 255, 100)],
            particle_shape: Shape::Square,
            attractor_color: Srgb::WHITE,
            attractor_shape: Shape::Square,
            attractor_size: 2.0,
            attractor_pulse: false,
            particle_glow: false,
            draw_trails: false,
            stars: 0,
            chrome: default_chrome(),
        }
    }

    /// Pastel glowing particles with trails over a dark starry sky.
    pub fn nebula() -> Self {
        Self {
            name: "nebula".into(),
            background: Srgb::from_rgb8(8, 12, 20),
            particle_colors: vec![
                Srgb::from_rgb8(100, 200, 255),
                Srgb::from_rgb8(255, 150, 100),
                Srgb::from_rgb8(150, 255, 150),
                Srgb::from_rgb8(255, 200, 150),
                Srgb::from_rgb8(200, 150, 255),
            ],
            particle_shape: Shape::Circle,
            attractor_color: Srgb::from_rgb8(255, 100, 100),
            attractor_shape: Shape::Circle,
            attractor_size: 8.0,
            attractor_pulse: true,
            particle_glow: true,
            draw_trails: true,
            stars: 200,
            chrome: default_chrome(),
        }
    }

    /// Applies the [`COLOR_KEYS`] present in `params`. `particle_color`
    /// replaces the whole particle palette with one color.
    ///
    /// Returns `EngineError::InvalidColor` for a malformed hex string.
    pub fn with_overrides(mut self, params: &Value) -> Result<Self, EngineError> {
        if let Some(c) = color_override(params, "background")? {
            self.background = c;
        }
        if let Some(c) = color_override(params, "particle_color")? {
            self.particle_colors = vec![c];
        }
        if let Some(c) = color_override(params, "attractor_color")? {
            self.attractor_color = c;
        }
        Ok(self)
    }

    /// Color for a particle spawned with `tint` in [0, 1).
    pub fn particle_color(&self, tint: f64) -> Srgb {
        match self.particle_colors.len() {
            0 => Srgb::WHITE,
            n => {
                let t = if tint.is_nan() { 0.0 } else { tint.clamp(0.0, 1.0) };
                self.particle_colors[((t * n as f64) as usize).min(n - 1)]
            }
        }
    }
}

fn color_override(params: &Value, name: &str) -> Result<Option<Srgb>, EngineError> {
    if params.get(name).map_or(true, Value::is_null) {
        return Ok(None);
    }
    let text = param_string(params, name, "")?;
    Srgb::from_hex(&text).map(Some).map_err(|e| match e {
        EngineError::InvalidColor(msg) => EngineError::InvalidColor(format!("{name}: {msg}")),
        other => other,
    })
}

fn default_chrome() -> ChromeColors {
    ChromeColors {
        background: Srgb::from_rgb8(20, 25, 35),
        border: Srgb::from_rgb8(60, 70, 85),
        slider_active: Srgb::from_rgb8(100, 150, 255),
        button_hover: Srgb::from_rgb8(80, 90, 110),
        bar_alpha: 180.0 / 255.0,
    }
}
