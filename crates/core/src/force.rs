//! Inverse-power-law force field toward a set of fixed attractor points.
//!
//! Each attractor pulls with magnitude `K / dist^p`, where `dist` is never
//! allowed below a distance floor. Contributions are summed, so the net
//! acceleration for an empty attractor set is exactly zero.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::attractor::Attractor;

/// Strength, exponent and distance floor of the attraction law.
///
/// The variants disagree on all three (p = 2, 3 and 1.5 with floors of 10
/// and 15), so they are configuration rather than a single physical model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceLaw {
    /// Numerator `K` of `K / dist^p`.
    pub strength: f64,
    /// Falloff exponent `p`.
    pub exponent: f64,
    /// Minimum distance substituted for anything closer.
    pub distance_floor: f64,
}

impl ForceLaw {
    pub fn new(strength: f64, exponent: f64, distance_floor: f64) -> Self {
        Self {
            strength,
            exponent,
            distance_floor,
        }
    }

    /// Force magnitude at `distance` from a single attractor.
    ///
    /// Distances below the floor (including zero and negative inputs) are
    /// clamped up to it, so the result is always finite for a positive floor.
    pub fn magnitude(&self, distance: f64) -> f64 {
        let dist = distance.max(self.distance_floor);
        self.strength / dist.powf(self.exponent)
    }

    /// Pull exerted on `position` by a single attractor at `target`.
    ///
    /// A particle sitting exactly on the attractor has no direction to be
    /// pulled in and receives zero.
    pub fn pull(&self, position: DVec2, target: DVec2) -> DVec2 {
        let direction = target - position;
        direction.normalize_or_zero() * self.magnitude(direction.length())
    }

    /// Net acceleration on `position` from every attractor.
    pub fn acceleration(&self, position: DVec2, attractors: &[Attractor]) -> DVec2 {
        attractors
            .iter()
            .fold(DVec2::ZERO, |acc, a| acc + self.pull(position, a.position))
    }
}
