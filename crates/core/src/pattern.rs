//! Attractor pattern generators.
//!
//! Each generator is a pure function producing an ordered list of attractor
//! positions. [`PatternSpec`] is the serializable form used by scene files
//! and variant presets to describe one generator call.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::MAX_ATTRACTORS;
use crate::error::EngineError;

/// `count` points evenly interpolated from `start` to `end`, both inclusive.
///
/// With `count <= 1` there is no spacing to divide by, so the result is
/// exactly `[start]`.
pub fn line(start: DVec2, end: DVec2, count: usize) -> Vec<DVec2> {
    if count <= 1 {
        return vec![start];
    }
    let last = (count - 1) as f64;
    (0..count)
        .map(|i| start.lerp(end, i as f64 / last))
        .collect()
}

/// `count` samples spaced `width / count` apart starting at x = 0, each
/// displaced from `baseline_y` by `amplitude * sin(frequency * x)`.
pub fn sine_wave(
    width: f64,
    baseline_y: f64,
    count: usize,
    amplitude: f64,
    frequency: f64,
) -> Vec<DVec2> {
    if count == 0 {
        return Vec::new();
    }
    let spacing = width / count as f64;
    (0..count)
        .map(|i| {
            let x = i as f64 * spacing;
            DVec2::new(x, baseline_y + amplitude * (frequency * x).sin())
        })
        .collect()
}

/// `rings` concentric rings of `points_per_ring` points around `center`.
///
/// Rings are numbered from 1, so the innermost ring sits at radius
/// `spacing` rather than collapsing onto the center.
pub fn spiral(center: DVec2, rings: usize, points_per_ring: usize, spacing: f64) -> Vec<DVec2> {
    if points_per_ring == 0 {
        return Vec::new();
    }
    (1..=rings)
        .flat_map(|ring| {
            let radius = spacing * ring as f64;
            (0..points_per_ring).map(move |i| {
                let angle = TAU * i as f64 / points_per_ring as f64;
                center + DVec2::from_angle(angle) * radius
            })
        })
        .collect()
}

/// One generator call, with screen-relative defaults for placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternSpec {
    Line {
        start: DVec2,
        end: DVec2,
        count: usize,
    },
    SineWave {
        count: usize,
        #[serde(default = "default_amplitude")]
        amplitude: f64,
        #[serde(default = "default_frequency")]
        frequency: f64,
        /// Defaults to half the screen height.
        #[serde(default)]
        baseline_y: Option<f64>,
    },
    Spiral {
        /// Defaults to the screen center.
        #[serde(default)]
        center: Option<DVec2>,
        rings: usize,
        points_per_ring: usize,
        #[serde(default = "default_spacing")]
        spacing: f64,
    },
}

fn default_amplitude() -> f64 {
    100.0
}

fn default_frequency() -> f64 {
    0.01
}

fn default_spacing() -> f64 {
    30.0
}

impl PatternSpec {
    /// A sine wave with the stock amplitude (100) and frequency (0.01).
    pub fn sine_wave(count: usize) -> Self {
        PatternSpec::SineWave {
            count,
            amplitude: default_amplitude(),
            frequency: default_frequency(),
            baseline_y: None,
        }
    }

    /// A centered spiral with the stock ring spacing (30).
    pub fn centered_spiral(rings: usize, points_per_ring: usize) -> Self {
        PatternSpec::Spiral {
            center: None,
            rings,
            points_per_ring,
            spacing: default_spacing(),
        }
    }

    /// Number of points [`PatternSpec::generate`] yields, or `None` if it
    /// overflows `usize`.
    pub fn point_count(&self) -> Option<usize> {
        match *self {
            PatternSpec::Line { count, .. } => Some(count.max(1)),
            PatternSpec::SineWave { count, .. } => Some(count),
            PatternSpec::Spiral {
                rings,
                points_per_ring,
                ..
            } => rings.checked_mul(points_per_ring),
        }
    }

    /// Rejects patterns that would generate more than [`MAX_ATTRACTORS`]
    /// points.
    pub fn validate(&self) -> Result<(), EngineError> {
        match self.point_count() {
            Some(n) if n <= MAX_ATTRACTORS => Ok(()),
            _ => Err(EngineError::invalid_param(
                "patterns",
                format!("a pattern may generate at most {MAX_ATTRACTORS} points"),
            )),
        }
    }

    /// Runs the generator for a `width` × `height` screen.
    pub fn generate(&self, width: f64, height: f64) -> Vec<DVec2> {
        match *self {
            PatternSpec::Line { start, end, count } => line(start, end, count),
            PatternSpec::SineWave {
                count,
                amplitude,
                frequency,
                baseline_y,
            } => sine_wave(
                width,
                baseline_y.unwrap_or(height / 2.0),
                count,
                amplitude,
                frequency,
            ),
            PatternSpec::Spiral {
                center,
                rings,
                points_per_ring,
                spacing,
            } => spiral(
                center.unwrap_or(DVec2::new(width / 2.0, height / 2.0)),
                rings,
                points_per_ring,
                spacing,
            ),
        }
    }
}
