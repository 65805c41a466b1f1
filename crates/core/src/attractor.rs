//! Fixed gravity points that particles are pulled toward.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A fixed position exerting inverse-power-law attraction.
///
/// Attractors are created by clicks or by pattern generators and are never
/// moved afterwards; the only way to get rid of one is to clear the set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    pub position: DVec2,
}

impl Attractor {
    pub fn new(position: DVec2) -> Self {
        Self { position }
    }
}

impl From<DVec2> for Attractor {
    fn from(position: DVec2) -> Self {
        Self::new(position)
    }
}
