//! Character body configuration.
//!
//! All values use centimetres and seconds, with Y up.

use serde::{Deserialize, Serialize};

/// Tunable movement parameters that parkour moves temporarily override.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementParams {
    /// Multiplier on world gravity.
    pub gravity_scale: f32,
    /// Maximum ground speed while standing (cm/s).
    pub max_walk_speed: f32,
    /// Maximum ground speed while crouched (cm/s).
    pub max_walk_speed_crouched: f32,
    /// Friction while walking; also limits how fast direction changes.
    pub ground_friction: f32,
    /// Constant deceleration applied when walking without input (cm/s²).
    pub braking_deceleration_walking: f32,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            gravity_scale: 1.0,
            max_walk_speed: 600.0,
            max_walk_speed_crouched: 300.0,
            ground_friction: 8.0,
            braking_deceleration_walking: 2048.0,
        }
    }
}

/// Capsule size of a body.
///
/// `radius` and `half_height` are unscaled; multiply by `scale` for world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleDimensions {
    /// Radius of the cylinder and caps.
    pub radius: f32,
    /// Distance from the center to either tip.
    pub half_height: f32,
    /// Uniform shape scale.
    pub scale: f32,
}

impl Default for CapsuleDimensions {
    fn default() -> Self {
        Self {
            radius: 34.0,
            half_height: 88.0,
            scale: 1.0,
        }
    }
}

impl CapsuleDimensions {
    /// Create unscaled dimensions.
    pub fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius,
            half_height,
            scale: 1.0,
        }
    }

    /// Same capsule with a different unscaled half-height.
    pub fn with_half_height(self, half_height: f32) -> Self {
        Self { half_height, ..self }
    }

    /// Radius in world units.
    #[inline]
    pub fn scaled_radius(&self) -> f32 {
        self.radius * self.scale
    }

    /// Half-height in world units.
    #[inline]
    pub fn scaled_half_height(&self) -> f32 {
        self.half_height * self.scale
    }
}

/// Full configuration of a [`CharacterBody`](super::CharacterBody).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    // ========================================================================
    // Shape
    // ========================================================================
    /// Standing capsule; also the size uncrouching restores.
    pub capsule: CapsuleDimensions,

    /// Unscaled half-height while crouched.
    pub crouched_half_height: f32,

    // ========================================================================
    // Movement
    // ========================================================================
    /// Parameters captured as defaults by the parkour layer.
    pub params: MovementParams,

    /// Input acceleration (cm/s²).
    pub max_acceleration: f32,

    /// Fraction of input acceleration available while falling.
    pub air_control: f32,

    /// Maximum speed while flying (cm/s).
    pub max_fly_speed: f32,

    /// Deceleration while flying without input (cm/s²).
    pub braking_deceleration_flying: f32,

    /// Initial upward speed of a jump (cm/s).
    pub jump_z_velocity: f32,

    /// World gravity magnitude (cm/s²).
    pub gravity: f32,

    /// Mass used to convert impulses into velocity changes (kg).
    pub mass: f32,

    // ========================================================================
    // Floor
    // ========================================================================
    /// Tallest ledge the body steps onto while walking.
    pub max_step_height: f32,

    /// Minimum floor normal Y to count as walkable (cos of max slope).
    pub walkable_floor_y: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            capsule: CapsuleDimensions::default(),
            crouched_half_height: 40.0,

            params: MovementParams::default(),
            max_acceleration: 2048.0,
            air_control: 0.35,
            max_fly_speed: 600.0,
            braking_deceleration_flying: 0.0,
            jump_z_velocity: 420.0,
            gravity: 980.0,
            mass: 100.0,

            max_step_height: 45.0,
            walkable_floor_y: 0.71,
        }
    }
}
