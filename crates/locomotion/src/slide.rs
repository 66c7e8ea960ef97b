//! Sliding.
//!
//! A slide starts from crouch input while grounded and moving: a downward
//! probe confirms the floor, friction, braking and crouched max speed are
//! overridden, and a velocity change pushes the body down the floor slope.
//! The slide ends by itself once speed falls to `cancel_speed`, or when the
//! crouch is released. Ending always restores the three parameters from the
//! defaults captured at bind time in a single write.
//!
//! Crouch input while airborne queues a slide for landing instead.

use freerun_physics::{GeometryQuery, LocomotionBody, MovementParams};

use crate::config::SlideConfig;
use crate::state::LocomotionState;
use crate::tags::LocomotionAction;

/// Starts, watches and cancels slides.
#[derive(Debug, Clone)]
pub struct SlideController {
    config: SlideConfig,
    slide_on_land: bool,
}

impl SlideController {
    pub fn new(config: SlideConfig) -> Self {
        Self {
            config,
            slide_on_land: false,
        }
    }

    pub fn config(&self) -> &SlideConfig {
        &self.config
    }

    /// Whether a slide is queued for the next landing.
    pub fn slide_on_land_pending(&self) -> bool {
        self.slide_on_land
    }

    /// Consume the queued landing slide.
    pub fn take_slide_on_land(&mut self) -> bool {
        std::mem::take(&mut self.slide_on_land)
    }

    /// Forget any queued landing slide.
    pub fn clear_slide_on_land(&mut self) {
        self.slide_on_land = false;
    }

    /// Try to start a slide. Returns whether one started.
    ///
    /// Airborne bodies queue a slide for landing instead. Another running
    /// action blocks the slide.
    pub fn try_slide<B>(&mut self, body: &mut B, world: &dyn GeometryQuery, state: &mut LocomotionState) -> bool
    where
        B: LocomotionBody + ?Sized,
    {
        if state.is_sliding() {
            return false;
        }

        let grounded = !body.is_falling();
        self.slide_on_land = !grounded && self.config.slide_on_land;

        let moving = body.last_update_velocity().length() > 0.0;
        if !grounded || !moving || state.action().is_some() {
            return false;
        }

        let start = body.location();
        let end = start + body.gravity_direction() * self.config.distance_check;
        let hit = world.line_trace(start, end, &body.probe_filter());
        if !hit.blocking {
            log::trace!("slide: no floor within {}", self.config.distance_check);
            return false;
        }

        let mut params = body.movement_params();
        params.ground_friction = self.config.ground_friction;
        params.braking_deceleration_walking = self.config.braking_deceleration;
        params.max_walk_speed_crouched = self.config.max_walk_speed_crouched;
        body.set_movement_params(params);

        // Forward along the floor, tilted with the slope
        let slope_direction = hit.normal.cross(body.right_vector()).normalize_or_zero();
        body.add_impulse(slope_direction * self.config.force, true);

        state.set_action(Some(LocomotionAction::Sliding));
        log::debug!("slide started along {slope_direction:?}");
        true
    }

    /// Whether a running slide has slowed enough to end.
    pub fn should_cancel<B>(&self, body: &B, state: &LocomotionState) -> bool
    where
        B: LocomotionBody + ?Sized,
    {
        state.is_sliding() && body.last_update_velocity().length() <= self.config.cancel_speed
    }

    /// End the slide: restore the overridden parameters from `defaults`,
    /// clear the Sliding action and drop any queued landing slide.
    pub fn cancel<B>(&mut self, body: &mut B, state: &mut LocomotionState, defaults: &MovementParams)
    where
        B: LocomotionBody + ?Sized,
    {
        self.slide_on_land = false;

        let mut params = body.movement_params();
        params.ground_friction = defaults.ground_friction;
        params.braking_deceleration_walking = defaults.braking_deceleration_walking;
        params.max_walk_speed_crouched = defaults.max_walk_speed_crouched;
        body.set_movement_params(params);

        if state.is_sliding() {
            state.set_action(None);
            log::debug!("slide ended at {:.1}", body.last_update_velocity().length());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use freerun_physics::{BodyConfig, CharacterBody, CollisionWorld, ContentFlags};
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn floor_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_block(Vec3::new(0.0, -100.0, 0.0), 5000.0, 5000.0, 100.0, ContentFlags::SOLID);
        world
    }

    fn running(world: &CollisionWorld) -> CharacterBody {
        let mut body = CharacterBody::new(BodyConfig::default(), Vec3::ZERO);
        body.spawn_at(Vec3::new(0.0, 90.0, 0.0), world);
        body.set_velocity(Vec3::new(600.0, 0.0, 0.0));
        body
    }

    #[test]
    fn test_slide_overrides_and_pushes() {
        let world = floor_world();
        let mut body = running(&world);
        let mut state = LocomotionState::new();
        let mut slide = SlideController::new(SlideConfig::default());

        assert!(slide.try_slide(&mut body, &world, &mut state));
        assert_eq!(state.action(), Some(LocomotionAction::Sliding));

        let params = body.movement_params();
        assert_eq!(params.ground_friction, 0.0);
        assert_eq!(params.braking_deceleration_walking, 1000.0);
        assert_eq!(params.max_walk_speed_crouched, 0.0);
        assert_eq!(params.max_walk_speed, 600.0);

        body.tick(DT, &world);
        // 600 + 800, minus one tick of braking
        assert_relative_eq!(body.velocity().x, 1400.0 - 1000.0 * DT, epsilon = 1.0);
    }

    #[test]
    fn test_already_sliding_is_noop() {
        let world = floor_world();
        let mut body = running(&world);
        let mut state = LocomotionState::new();
        let mut slide = SlideController::new(SlideConfig::default());

        assert!(slide.try_slide(&mut body, &world, &mut state));
        assert!(!slide.try_slide(&mut body, &world, &mut state));

        body.tick(DT, &world);
        assert!(body.velocity().x < 1400.0);
    }

    #[test]
    fn test_standing_still_does_not_slide() {
        let world = floor_world();
        let mut body = running(&world);
        body.set_velocity(Vec3::ZERO);
        let mut state = LocomotionState::new();
        let mut slide = SlideController::new(SlideConfig::default());

        assert!(!slide.try_slide(&mut body, &world, &mut state));
        assert_eq!(state.action(), None);
        assert_eq!(body.movement_params(), MovementParams::default());
    }

    #[test]
    fn test_airborne_queues_landing_slide() {
        let world = CollisionWorld::new();
        let mut body = CharacterBody::new(BodyConfig::default(), Vec3::new(0.0, 500.0, 0.0));
        body.set_velocity(Vec3::new(600.0, 0.0, 0.0));
        let mut state = LocomotionState::new();
        let mut slide = SlideController::new(SlideConfig::default());

        assert!(!slide.try_slide(&mut body, &world, &mut state));
        assert!(slide.slide_on_land_pending());
        assert!(slide.take_slide_on_land());
        assert!(!slide.slide_on_land_pending());
    }

    #[test]
    fn test_other_action_blocks_slide() {
        let world = floor_world();
        let mut body = running(&world);
        let mut state = LocomotionState::new();
        state.set_action(Some(LocomotionAction::Vaulting));
        let mut slide = SlideController::new(SlideConfig::default());

        assert!(!slide.try_slide(&mut body, &world, &mut state));
        assert_eq!(state.action(), Some(LocomotionAction::Vaulting));
    }

    #[test]
    fn test_cancel_restores_defaults() {
        let world = floor_world();
        let mut body = running(&world);
        let defaults = body.movement_params();
        let mut state = LocomotionState::new();
        let mut slide = SlideController::new(SlideConfig::default());

        slide.try_slide(&mut body, &world, &mut state);
        body.set_velocity(Vec3::new(500.0, 0.0, 0.0));
        assert!(slide.should_cancel(&body, &state));

        slide.cancel(&mut body, &mut state, &defaults);
        assert_eq!(body.movement_params(), defaults);
        assert_eq!(state.action(), None);
        assert!(!slide.should_cancel(&body, &state));
    }

    #[test]
    fn test_cancel_keeps_other_actions() {
        let world = floor_world();
        let mut body = running(&world);
        let defaults = body.movement_params();
        let mut state = LocomotionState::new();
        state.set_action(Some(LocomotionAction::WallrunningLeft));
        let mut slide = SlideController::new(SlideConfig::default());

        slide.cancel(&mut body, &mut state, &defaults);
        assert_eq!(state.action(), Some(LocomotionAction::WallrunningLeft));
    }
}
