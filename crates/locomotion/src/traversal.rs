//! Vault and mantle detection.
//!
//! Detection is two probes:
//!
//! 1. Sweep the body's own capsule forward. Nothing in the way means there
//!    is nothing to traverse.
//! 2. Step a little past the front face and sweep a small capsule down from
//!    above head height to the feet. Where it lands is the top of the
//!    obstacle.
//!
//! The obstacle height (top minus feet) picks vault or mantle. A downward
//! probe that misses or starts inside geometry means the obstacle is too tall
//! to look over, so nothing is found.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use freerun_physics::{CapsuleDimensions, GeometryQuery, QueryFilter};

use crate::config::TraversalConfig;
use crate::probe::CapsuleProbe;
use crate::tags::LocomotionAction;

/// Kind of traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalType {
    #[default]
    None,
    Vault,
    Mantle,
}

impl TraversalType {
    /// Action that runs while this traversal plays.
    pub fn action(self) -> Option<LocomotionAction> {
        match self {
            TraversalType::None => None,
            TraversalType::Vault => Some(LocomotionAction::Vaulting),
            TraversalType::Mantle => Some(LocomotionAction::Mantling),
        }
    }
}

/// Outcome of one detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraversalResult {
    pub found: bool,
    pub traversal_type: TraversalType,
    /// Where the downward probe met the top of the obstacle.
    pub upper_impact: Vec3,
    /// Near edge of the obstacle's top: the forward contact raised to the
    /// height of the upper impact.
    pub front_edge: Vec3,
    /// Normal of the obstacle's face.
    pub front_edge_normal: Vec3,
    /// Where the body should come down.
    pub landing_point: Vec3,
    /// Obstacle height above the feet.
    pub height: f32,
}

impl Default for TraversalResult {
    fn default() -> Self {
        Self::not_found()
    }
}

impl TraversalResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            traversal_type: TraversalType::None,
            upper_impact: Vec3::ZERO,
            front_edge: Vec3::ZERO,
            front_edge_normal: Vec3::ZERO,
            landing_point: Vec3::ZERO,
            height: 0.0,
        }
    }
}

/// Classify an obstacle height. Both thresholds are inclusive.
pub fn classify(height: f32, config: &TraversalConfig) -> TraversalType {
    if height <= config.max_vault_height {
        TraversalType::Vault
    } else if height <= config.max_mantle_height {
        TraversalType::Mantle
    } else {
        TraversalType::None
    }
}

/// Looks for vaultable or mantleable obstacles ahead of a body.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalDetector {
    config: TraversalConfig,
}

impl TraversalDetector {
    pub fn new(config: TraversalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Probe for an obstacle ahead of a capsule centered at `origin`.
    ///
    /// `forward` is the horizontal facing, `up` points against gravity and
    /// `filter` must exclude the body itself.
    pub fn detect(
        &self,
        world: &dyn GeometryQuery,
        origin: Vec3,
        forward: Vec3,
        up: Vec3,
        capsule: CapsuleDimensions,
        filter: QueryFilter,
    ) -> TraversalResult {
        debug_assert!(forward.is_normalized() && up.is_normalized(), "probe axes must be unit length");

        let body = CapsuleProbe::from_capsule(capsule, filter);
        let forward_hit = body.sweep(world, origin, origin + forward * self.config.check_distance.forward);
        if !forward_hit.blocking || forward_hit.started_in_solid {
            log::trace!("traversal: nothing ahead of {origin:?}");
            return TraversalResult::not_found();
        }

        let feet = origin - up * body.half_height;
        let feet_height = up.dot(feet);

        // Column just past the front face, flattened onto the feet plane
        let inward = forward_hit.point - forward_hit.normal * self.config.inward_offset;
        let column = inward - up * up.dot(inward);
        let top = column + up * (feet_height + 2.0 * body.half_height + self.config.check_distance.upward);
        let bottom = column + up * feet_height;

        let probe = CapsuleProbe::new(self.config.probe_radius, self.config.probe_half_height, filter);
        let down_hit = probe.sweep(world, top, bottom);
        if !down_hit.blocking || down_hit.started_in_solid {
            log::trace!("traversal: no top found above {:?}", forward_hit.point);
            return TraversalResult::not_found();
        }

        let top_height = up.dot(down_hit.point);
        let height = (top_height - feet_height).abs();
        let traversal_type = classify(height, &self.config);
        if traversal_type == TraversalType::None {
            log::debug!("traversal: obstacle too tall ({height:.1})");
            return TraversalResult::not_found();
        }

        let front_edge = forward_hit.point + up * (top_height - up.dot(forward_hit.point));

        log::debug!("traversal: {traversal_type:?} over {height:.1} high obstacle");
        TraversalResult {
            found: true,
            traversal_type,
            upper_impact: down_hit.point,
            front_edge,
            front_edge_normal: forward_hit.normal,
            landing_point: feet + forward * self.config.landing_distance,
            height,
        }
    }
}
