//! Particles, their bounded motion trails, and the fixed-step integrator.
//!
//! A particle is advanced once per frame: the net force is scaled into the
//! velocity, the velocity is damped, the position moves by the velocity, the
//! pre-wrap position is appended to the trail, and finally both axes are
//! wrapped back into the screen independently.

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::prng::Xorshift64;

/// Fixed-capacity FIFO of recent particle positions.
///
/// Once full, each push evicts the oldest entry. A capacity of zero keeps
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    points: VecDeque<DVec2>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends `point`, evicting from the front until within capacity.
    pub fn push(&mut self, point: DVec2) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &DVec2> + '_ {
        self.points.iter()
    }
}

/// Per-frame integration constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Multiplier applied to the net force before it is added to velocity.
    pub timestep_scale: f64,
    /// Velocity multiplier applied every frame; 1.0 disables damping.
    pub damping: f64,
}

/// How freshly spawned particles are initialised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnProfile {
    pub min_speed: f64,
    pub max_speed: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Trail capacity; zero disables trails entirely.
    pub trail_length: usize,
}

/// A simulated point mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    pub trail: Option<Trail>,
    /// Palette coordinate in [0, 1) chosen at spawn.
    pub tint: f64,
    /// Drawn radius in pixels.
    pub radius: f64,
}

impl Particle {
    /// A particle at rest with no trail, unit radius and zero tint.
    pub fn at_rest(position: DVec2) -> Self {
        Self {
            position,
            velocity: DVec2::ZERO,
            trail: None,
            tint: 0.0,
            radius: 1.0,
        }
    }

    /// Spawns a particle at a uniformly random on-screen position with a
    /// random heading.
    pub fn spawn(rng: &mut Xorshift64, bounds: DVec2, profile: &SpawnProfile) -> Self {
        let position = rng.next_point(bounds.x, bounds.y);
        let velocity = rng.next_heading(profile.min_speed, profile.max_speed);
        let tint = rng.next_f64();
        let radius = rng.next_range(profile.min_radius, profile.max_radius);
        let trail = (profile.trail_length > 0).then(|| Trail::new(profile.trail_length));
        Self {
            position,
            velocity,
            trail,
            tint,
            radius,
        }
    }

    /// Advances one frame under `acceleration`, wrapping into `bounds`.
    pub fn integrate(&mut self, acceleration: DVec2, motion: &Motion, bounds: DVec2) {
        self.velocity += acceleration * motion.timestep_scale;
        self.velocity *= motion.damping;
        if !self.velocity.is_finite() {
            self.velocity = DVec2::ZERO;
        }
        self.position += self.velocity;

        if let Some(trail) = self.trail.as_mut() {
            if self.position.is_finite() {
                trail.push(self.position);
            }
        }

        self.position = wrap_point(self.position, bounds);
    }
}

/// Wraps `value` into [0, extent). Non-finite input maps to 0.
///
/// `rem_euclid` can round up to exactly `extent` for tiny negative inputs,
/// which is folded back to 0.
pub fn wrap_coord(value: f64, extent: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// Wraps each axis of `point` independently into `bounds`.
pub fn wrap_point(point: DVec2, bounds: DVec2) -> DVec2 {
    DVec2::new(wrap_coord(point.x, bounds.x), wrap_coord(point.y, bounds.y))
}
