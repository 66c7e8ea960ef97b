//! Capsule-shaped world probes.

use glam::Vec3;

use freerun_physics::{CapsuleDimensions, GeometryQuery, QueryFilter, SweepHit};

/// A capsule shape plus the filter it queries with.
///
/// Stateless; every call is a pure function of the world geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleProbe {
    pub radius: f32,
    pub half_height: f32,
    pub filter: QueryFilter,
}

impl CapsuleProbe {
    pub fn new(radius: f32, half_height: f32, filter: QueryFilter) -> Self {
        Self {
            radius,
            half_height: half_height.max(radius),
            filter,
        }
    }

    /// Probe with the world-space size of `capsule`.
    pub fn from_capsule(capsule: CapsuleDimensions, filter: QueryFilter) -> Self {
        Self::new(capsule.scaled_radius(), capsule.scaled_half_height(), filter)
    }

    /// Sweep from `start` to `end` (capsule centers).
    pub fn sweep(&self, world: &dyn GeometryQuery, start: Vec3, end: Vec3) -> SweepHit {
        world.sweep_capsule(start, end, self.radius, self.half_height, &self.filter)
    }

    /// Whether the capsule centered at `center` overlaps blocking geometry.
    pub fn overlaps(&self, world: &dyn GeometryQuery, center: Vec3) -> bool {
        world.overlap_capsule(center, self.radius, self.half_height, &self.filter)
    }
}
