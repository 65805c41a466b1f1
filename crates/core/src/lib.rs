#![deny(unsafe_code)]
//! Core types for the gravity-points particle simulation.
//!
//! Provides the inverse-power `ForceLaw`, `Particle`/`Trail` integration with
//! toroidal wrapping, startup attractor patterns, the `GravitySim` frame
//! loop with its `ControlPanel`, `Theme`/`Srgb` colors, `Scene` replay files,
//! the `Xorshift64` PRNG, and parameter helpers.

pub mod attractor;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod force;
pub mod input;
pub mod params;
pub mod particle;
pub mod pattern;
pub mod prng;
pub mod scene;
pub mod sim;
pub mod theme;
pub mod ui;

/// 2-D vector used for every position, velocity and acceleration.
pub use glam::DVec2 as Vector2;

pub use attractor::Attractor;
pub use clock::FrameClock;
pub use color::Srgb;
pub use config::{GravityParams, MAX_ATTRACTORS, MAX_PARTICLES};
pub use error::EngineError;
pub use force::ForceLaw;
pub use input::{InputEvent, ScriptedEvent};
pub use particle::{Motion, Particle, SpawnProfile, Trail};
pub use pattern::PatternSpec;
pub use prng::Xorshift64;
pub use scene::Scene;
pub use sim::{GravitySim, LoopState};
pub use theme::{Shape, Theme};
pub use ui::{ControlPanel, PanelAction, PANEL_HEIGHT};
