#![deny(unsafe_code)]
//! Variant registry: maps variant names to preset constants, startup
//! patterns, themes and chrome, and provides CPU-side frame rendering.
//!
//! This crate sits between `gravity-points-core` (which owns the simulation)
//! and the CLI, so that name-based dispatch lives in one place.

pub mod raster;

#[cfg(feature = "png")]
pub mod snapshot;

use gravity_points_core::error::EngineError;
use gravity_points_core::params::param_string;
use gravity_points_core::{
    GravityParams, GravitySim, PatternSpec, Scene, Srgb, Theme, Vector2,
};
use serde_json::Value;
use tracing::debug;

/// All available variant names.
const VARIANT_NAMES: &[&str] = &["classic", "tidal", "enhanced"];

/// The three stock demos. They share one simulation and differ only in
/// constants, startup attractors and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Strong inverse-square pull with damping; a row of attractors.
    Classic,
    /// Steep inverse-cube pull, undamped; sine, spiral and line at startup.
    Tidal,
    /// Soft falloff with trails, glow, stars and the control panel.
    Enhanced,
}

impl Variant {
    /// Resolves a variant by name.
    ///
    /// Returns `EngineError::UnknownVariant` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "classic" => Ok(Variant::Classic),
            "tidal" => Ok(Variant::Tidal),
            "enhanced" => Ok(Variant::Enhanced),
            _ => Err(EngineError::UnknownVariant(name.to_string())),
        }
    }

    /// Returns a slice of all recognized variant names.
    pub fn list_variants() -> &'static [&'static str] {
        VARIANT_NAMES
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Tidal => "tidal",
            Variant::Enhanced => "enhanced",
        }
    }

    /// Window title of the demo.
    pub fn title(self) -> &'static str {
        match self {
            Variant::Classic => "Extreme Gravity Patterns",
            Variant::Tidal => "Gravity Points",
            Variant::Enhanced => "Premium Gravity Simulation",
        }
    }

    /// Default screen size in pixels.
    pub fn default_size(self) -> (usize, usize) {
        match self {
            Variant::Tidal => (1920, 1080),
            Variant::Classic | Variant::Enhanced => (2560, 1080),
        }
    }

    pub fn preset(self) -> GravityParams {
        match self {
            Variant::Classic => GravityParams::classic(),
            Variant::Tidal => GravityParams::tidal(),
            Variant::Enhanced => GravityParams::enhanced(),
        }
    }

    pub fn default_theme(self) -> &'static str {
        match self {
            Variant::Classic => "mono",
            Variant::Tidal => "matrix",
            Variant::Enhanced => "nebula",
        }
    }

    /// Attractors placed before the first frame.
    pub fn startup_patterns(self) -> Vec<PatternSpec> {
        let row = PatternSpec::Line {
            start: Vector2::new(500.0, 200.0),
            end: Vector2::new(2000.0, 200.0),
            count: 30,
        };
        match self {
            Variant::Classic => vec![row],
            Variant::Tidal => vec![
                PatternSpec::sine_wave(50),
                PatternSpec::centered_spiral(10, 20),
                row,
            ],
            Variant::Enhanced => Vec::new(),
        }
    }

    pub fn has_control_panel(self) -> bool {
        matches!(self, Variant::Enhanced)
    }

    /// Theme selected by `params["theme"]`, falling back to the variant's
    /// own, with any color overrides from `params` applied.
    pub fn theme(self, params: &Value) -> Result<Theme, EngineError> {
        let name = param_string(params, "theme", self.default_theme())?;
        Theme::from_name(&name)?.with_overrides(params)
    }

    /// Constructs a simulation with the variant's preset layered under
    /// `params`, then places `patterns` (or the variant's startup patterns
    /// when `None`).
    pub fn build(
        self,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
        patterns: Option<&[PatternSpec]>,
    ) -> Result<GravitySim, EngineError> {
        let defaults;
        let patterns = match patterns {
            Some(p) => p,
            None => {
                defaults = self.startup_patterns();
                &defaults
            }
        };
        for pattern in patterns {
            pattern.validate()?;
        }

        let mut sim = GravitySim::from_json(width, height, seed, self.preset(), params)?;
        if self.has_control_panel() {
            sim = sim.with_control_panel();
        }
        for pattern in patterns {
            sim.extend_attractors(pattern.generate(sim.width(), sim.height()));
        }
        debug!(
            variant = self.name(),
            particles = sim.particles().len(),
            attractors = sim.attractors().len(),
            "simulation built"
        );
        Ok(sim)
    }

    /// The preset's parameter schema plus the theme keys.
    pub fn param_schema(self) -> Value {
        let mut schema = self.preset().param_schema();
        if let Value::Object(map) = &mut schema {
            if let Ok(theme) = Theme::from_name(self.default_theme()) {
                let first = theme.particle_colors.first().copied().unwrap_or(Srgb::WHITE);
                for (key, color) in [
                    ("background", theme.background),
                    ("particle_color", first),
                    ("attractor_color", theme.attractor_color),
                ] {
                    map.insert(
                        key.into(),
                        serde_json::json!({
                            "type": "string",
                            "default": color.to_hex(),
                            "description": "Color override as #rrggbb"
                        }),
                    );
                }
            }
            map.insert(
                "theme".into(),
                serde_json::json!({
                    "type": "string",
                    "default": self.default_theme(),
                    "options": Theme::list_names(),
                    "description": "Color scheme and drawing style"
                }),
            );
        }
        schema
    }
}

/// Resolves and builds everything a scene describes except the scripted
/// events, which the caller feeds frame by frame.
pub fn build_scene(scene: &Scene) -> Result<(Variant, GravitySim, Theme), EngineError> {
    scene.validate()?;
    let variant = Variant::from_name(&scene.variant)?;
    let theme = variant.theme(&scene.params)?;
    let sim = variant.build(
        scene.width,
        scene.height,
        scene.seed,
        &scene.params,
        scene.patterns.as_deref(),
    )?;
    Ok((variant, sim, theme))
}
