//! Tunable simulation constants and their JSON representation.
//!
//! [`GravityParams`] bundles the force law, the integrator constants, the
//! spawn profile, and the initial particle count. Three presets reproduce
//! the stock demos; any field can be overridden from a flat JSON object
//! whose keys match [`GravityParams::params`].

use serde_json::{json, Value};

use crate::error::EngineError;
use crate::force::ForceLaw;
use crate::params::{param_f64, param_usize};
use crate::particle::{Motion, SpawnProfile};

/// Upper bound accepted for `particle_count` and the slider target.
pub const MAX_PARTICLES: usize = 100_000;

/// Upper bound on the points a single startup pattern may generate.
pub const MAX_ATTRACTORS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityParams {
    pub law: ForceLaw,
    pub motion: Motion,
    pub spawn: SpawnProfile,
    /// Particles spawned at startup.
    pub particle_count: usize,
}

impl Default for GravityParams {
    fn default() -> Self {
        Self::classic()
    }
}

impl GravityParams {
    /// Inverse-square pull, strong damping, white dots.
    pub fn classic() -> Self {
        Self {
            law: ForceLaw::new(500.0, 2.0, 10.0),
            motion: Motion {
                timestep_scale: 1.0,
                damping: 0.97,
            },
            spawn: SpawnProfile {
                min_speed: 1.0,
                max_speed: 2.0,
                min_radius: 2.0,
                max_radius: 2.0,
                trail_length: 0,
            },
            particle_count: 1500,
        }
    }

    /// Inverse-cube pull with no damping; particles slingshot through dense
    /// attractor fields.
    pub fn tidal() -> Self {
        Self {
            law: ForceLaw::new(600.0, 3.0, 10.0),
            motion: Motion {
                timestep_scale: 1.0,
                damping: 1.0,
            },
            spawn: SpawnProfile {
                min_speed: 1.0,
                max_speed: 2.0,
                min_radius: 1.0,
                max_radius: 1.0,
                trail_length: 0,
            },
            particle_count: 1500,
        }
    }

    /// Softer `p = 1.5` falloff scaled by a 1/60 s timestep, with trails.
    pub fn enhanced() -> Self {
        Self {
            law: ForceLaw::new(800.0, 1.5, 15.0),
            motion: Motion {
                timestep_scale: 0.016,
                damping: 0.985,
            },
            spawn: SpawnProfile {
                min_speed: 0.5,
                max_speed: 2.0,
                min_radius: 1.5,
                max_radius: 3.0,
                trail_length: 15,
            },
            particle_count: 500,
        }
    }

    /// Overlays any keys present in `params` onto `base`, then validates.
    pub fn from_json(base: GravityParams, params: &Value) -> Result<Self, EngineError> {
        let out = Self {
            law: ForceLaw {
                strength: param_f64(params, "strength", base.law.strength)?,
                exponent: param_f64(params, "exponent", base.law.exponent)?,
                distance_floor: param_f64(params, "distance_floor", base.law.distance_floor)?,
            },
            motion: Motion {
                timestep_scale: param_f64(params, "timestep_scale", base.motion.timestep_scale)?,
                damping: param_f64(params, "damping", base.motion.damping)?,
            },
            spawn: SpawnProfile {
                min_speed: param_f64(params, "min_speed", base.spawn.min_speed)?,
                max_speed: param_f64(params, "max_speed", base.spawn.max_speed)?,
                min_radius: param_f64(params, "min_radius", base.spawn.min_radius)?,
                max_radius: param_f64(params, "max_radius", base.spawn.max_radius)?,
                trail_length: param_usize(params, "trail_length", base.spawn.trail_length)?,
            },
            particle_count: param_usize(params, "particle_count", base.particle_count)?,
        };
        out.validate()?;
        Ok(out)
    }

    /// Rejects values that would make the force law or spawning ill-defined.
    pub fn validate(&self) -> Result<(), EngineError> {
        let finite = [
            ("strength", self.law.strength),
            ("exponent", self.law.exponent),
            ("distance_floor", self.law.distance_floor),
            ("timestep_scale", self.motion.timestep_scale),
            ("damping", self.motion.damping),
            ("min_speed", self.spawn.min_speed),
            ("max_speed", self.spawn.max_speed),
            ("min_radius", self.spawn.min_radius),
            ("max_radius", self.spawn.max_radius),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::invalid_param(name, "must be finite"));
        }
        if self.law.exponent <= 0.0 {
            return Err(EngineError::invalid_param("exponent", "must be positive"));
        }
        if self.law.distance_floor <= 0.0 {
            return Err(EngineError::invalid_param(
                "distance_floor",
                "must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.motion.damping) {
            return Err(EngineError::invalid_param(
                "damping",
                "must lie in [0, 1]",
            ));
        }
        if self.spawn.min_speed < 0.0 || self.spawn.min_speed > self.spawn.max_speed {
            return Err(EngineError::invalid_param(
                "min_speed",
                "must satisfy 0 <= min_speed <= max_speed",
            ));
        }
        if self.spawn.min_radius < 0.0 || self.spawn.min_radius > self.spawn.max_radius {
            return Err(EngineError::invalid_param(
                "min_radius",
                "must satisfy 0 <= min_radius <= max_radius",
            ));
        }
        if self.particle_count > MAX_PARTICLES {
            return Err(EngineError::invalid_param(
                "particle_count",
                format!("must not exceed {MAX_PARTICLES}"),
            ));
        }
        Ok(())
    }

    /// Current values as a flat JSON object.
    pub fn params(&self) -> Value {
        json!({
            "strength": self.law.strength,
            "exponent": self.law.exponent,
            "distance_floor": self.law.distance_floor,
            "timestep_scale": self.motion.timestep_scale,
            "damping": self.motion.damping,
            "min_speed": self.spawn.min_speed,
            "max_speed": self.spawn.max_speed,
            "min_radius": self.spawn.min_radius,
            "max_radius": self.spawn.max_radius,
            "trail_length": self.spawn.trail_length,
            "particle_count": self.particle_count,
        })
    }

    /// Schema describing every parameter, using `self` for the defaults.
    pub fn param_schema(&self) -> Value {
        json!({
            "strength": {
                "type": "number",
                "default": self.law.strength,
                "min": 0.0,
                "description": "Force numerator K in K / dist^p"
            },
            "exponent": {
                "type": "number",
                "default": self.law.exponent,
                "min": 0.0,
                "description": "Falloff exponent p"
            },
            "distance_floor": {
                "type": "number",
                "default": self.law.distance_floor,
                "min": 0.0,
                "description": "Minimum distance used in the force law"
            },
            "timestep_scale": {
                "type": "number",
                "default": self.motion.timestep_scale,
                "description": "Multiplier on force before it is added to velocity"
            },
            "damping": {
                "type": "number",
                "default": self.motion.damping,
                "min": 0.0,
                "max": 1.0,
                "description": "Per-frame velocity multiplier; 1.0 disables damping"
            },
            "min_speed": {
                "type": "number",
                "default": self.spawn.min_speed,
                "min": 0.0,
                "description": "Lower bound of the spawn speed"
            },
            "max_speed": {
                "type": "number",
                "default": self.spawn.max_speed,
                "min": 0.0,
                "description": "Upper bound of the spawn speed"
            },
            "min_radius": {
                "type": "number",
                "default": self.spawn.min_radius,
                "min": 0.0,
                "description": "Smallest drawn particle radius"
            },
            "max_radius": {
                "type": "number",
                "default": self.spawn.max_radius,
                "min": 0.0,
                "description": "Largest drawn particle radius"
            },
            "trail_length": {
                "type": "integer",
                "default": self.spawn.trail_length,
                "min": 0,
                "description": "Positions kept per particle trail; 0 disables trails"
            },
            "particle_count": {
                "type": "integer",
                "default": self.particle_count,
                "min": 0,
                "max": MAX_PARTICLES,
                "description": "Particles spawned at startup"
            }
        })
    }
}
