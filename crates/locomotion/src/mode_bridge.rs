//! Base movement mode to locomotion mode mapping.

use freerun_physics::MovementMode;

use crate::state::LocomotionState;
use crate::tags::LocomotionMode;

/// Keeps the locomotion Mode label in step with the base simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementModeBridge;

impl MovementModeBridge {
    /// Locomotion mode for a base mode; modes without one map to `None`.
    pub fn map(mode: MovementMode) -> Option<LocomotionMode> {
        match mode {
            MovementMode::Walking | MovementMode::NavWalking => Some(LocomotionMode::Grounded),
            MovementMode::Falling => Some(LocomotionMode::InAir),
            MovementMode::None | MovementMode::Swimming | MovementMode::Flying => None,
        }
    }

    /// Update `state` for the body's current base mode. Returns whether the
    /// label changed.
    pub fn apply(mode: MovementMode, state: &mut LocomotionState) -> bool {
        let mapped = Self::map(mode);
        let changed = state.set_mode(mapped);
        if changed {
            log::trace!("locomotion mode follows {mode}");
        }
        changed
    }
}
