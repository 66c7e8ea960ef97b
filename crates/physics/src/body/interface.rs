//! The surface a parkour layer drives a body through.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::{ContentFlags, GeometryQuery, QueryFilter};

use super::mode::{MovementMode, NetRole};
use super::params::{CapsuleDimensions, MovementParams};

/// A base-mode transition observed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeChange {
    /// Mode before the transition.
    pub previous: MovementMode,
    /// Mode after the transition.
    pub current: MovementMode,
}

/// Notifications produced by one simulation tick.
///
/// The owner forwards these to whatever layer listens for engine callbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyEvents {
    /// Mode transitions, in the order they happened.
    pub mode_changes: Vec<ModeChange>,
    /// Whether the body touched down on a walkable floor this tick.
    pub landed: bool,
}

impl BodyEvents {
    /// Whether nothing happened.
    pub fn is_empty(&self) -> bool {
        self.mode_changes.is_empty() && !self.landed
    }
}

/// A walking/falling/flying capsule simulation.
///
/// Positions are capsule centers. `set_movement_mode` does not produce a
/// [`ModeChange`]; callers that switch modes themselves handle the
/// transition directly.
pub trait LocomotionBody {
    // ========================================================================
    // Kinematics
    // ========================================================================

    /// Capsule center in world space.
    fn location(&self) -> Vec3;

    /// Teleport the capsule center.
    fn set_location(&mut self, location: Vec3);

    /// Facing rotation.
    fn rotation(&self) -> Quat;

    /// Horizontal facing direction.
    fn forward_vector(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Horizontal direction to the body's right.
    fn right_vector(&self) -> Vec3 {
        self.forward_vector().cross(-self.gravity_direction()).normalize_or_zero()
    }

    /// Current velocity.
    fn velocity(&self) -> Vec3;

    /// Velocity at the end of the last simulation tick.
    fn last_update_velocity(&self) -> Vec3;

    /// World-space movement input consumed by the last tick.
    fn last_input_vector(&self) -> Vec3;

    /// Unit vector gravity pulls along.
    fn gravity_direction(&self) -> Vec3 {
        Vec3::NEG_Y
    }

    /// Bottom of the capsule.
    fn feet_location(&self) -> Vec3 {
        self.location() + self.gravity_direction() * self.capsule().scaled_half_height()
    }

    // ========================================================================
    // Mode
    // ========================================================================

    /// Current base movement mode.
    fn movement_mode(&self) -> MovementMode;

    /// Switch the base movement mode, returning the previous one.
    fn set_movement_mode(&mut self, mode: MovementMode) -> MovementMode;

    /// Airborne under gravity.
    fn is_falling(&self) -> bool {
        self.movement_mode().is_falling()
    }

    /// Walking on a floor.
    fn is_moving_on_ground(&self) -> bool {
        self.movement_mode().is_grounded()
    }

    // ========================================================================
    // Capsule
    // ========================================================================

    /// Current capsule.
    fn capsule(&self) -> CapsuleDimensions;

    /// Capsule the body was created with.
    fn default_capsule(&self) -> CapsuleDimensions;

    /// Configured unscaled crouched half-height.
    fn crouched_half_height(&self) -> f32;

    /// Resize the capsule (unscaled values).
    fn set_capsule_size(&mut self, radius: f32, half_height: f32);

    /// Whether the body considers itself crouched.
    fn is_crouched(&self) -> bool;

    /// Set the crouched flag.
    fn set_crouched(&mut self, crouched: bool);

    /// Whether crouch resizing keeps the capsule bottom in place.
    fn crouch_maintains_base(&self) -> bool {
        self.is_moving_on_ground()
    }

    /// Gap between the capsule bottom and the floor while walking.
    fn floor_distance(&self) -> Option<f32>;

    /// Crouch resize finished; adjustments are relative to the default capsule.
    fn on_start_crouch(&mut self, _half_height_adjust: f32, _scaled_half_height_adjust: f32) {}

    /// Uncrouch resize finished.
    fn on_end_crouch(&mut self, _half_height_adjust: f32, _scaled_half_height_adjust: f32) {}

    /// Brush id of the body's own collision proxy, if it has one.
    fn self_brush(&self) -> Option<u32> {
        None
    }

    /// Filter for capsule movement and encroachment tests.
    fn collision_filter(&self) -> QueryFilter {
        self.filter_for(ContentFlags::MASK_PLAYER_SOLID)
    }

    /// Filter for parkour probes.
    fn probe_filter(&self) -> QueryFilter {
        self.filter_for(ContentFlags::MASK_VISIBILITY)
    }

    /// A filter on `mask` that skips the body itself.
    fn filter_for(&self, mask: ContentFlags) -> QueryFilter {
        let filter = QueryFilter::new(mask);
        match self.self_brush() {
            Some(id) => filter.ignoring(id),
            None => filter,
        }
    }

    // ========================================================================
    // Forces
    // ========================================================================

    /// Launch the body; overridden axes replace velocity instead of adding to it.
    fn launch(&mut self, velocity: Vec3, override_horizontal: bool, override_vertical: bool);

    /// Queue an impulse; `velocity_change` ignores mass.
    fn add_impulse(&mut self, impulse: Vec3, velocity_change: bool);

    /// Ordinary jump. Returns whether it happened.
    fn jump(&mut self) -> bool;

    /// Whether the capsule collides with the world.
    fn collision_enabled(&self) -> bool;

    /// Enable or disable capsule collision.
    fn set_collision_enabled(&mut self, enabled: bool);

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Current tunable parameters.
    fn movement_params(&self) -> MovementParams;

    /// Replace the tunable parameters in one write.
    fn set_movement_params(&mut self, params: MovementParams);

    // ========================================================================
    // Network
    // ========================================================================

    /// Network role.
    fn net_role(&self) -> NetRole {
        NetRole::Standalone
    }

    /// Whether the body is replaying moves for a server correction.
    fn is_replaying(&self) -> bool {
        false
    }

    /// Offset applied to the visual mesh relative to the capsule.
    fn mesh_translation_offset(&self) -> Vec3;

    /// Set the visual mesh offset.
    fn set_mesh_translation_offset(&mut self, offset: Vec3);

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Advance the simulation.
    fn tick(&mut self, delta_time: f32, world: &dyn GeometryQuery) -> BodyEvents;
}
