//! Wall-running.
//!
//! While airborne and pushing forward, a line probe reaches out to the left
//! and then to the right, angled slightly backward. The first wall found
//! launches the body along the wall at walking speed, overriding both
//! horizontal and vertical velocity, and the launch repeats every tick the
//! wall is still there. Landing or wall-jumping ends the run and disarms the
//! checks for `reset_time`.
//!
//! The re-arm timer callback holds only a weak flag, so a controller that is
//! dropped before it fires turns the callback into a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use glam::Vec3;

use freerun_physics::{GeometryQuery, LocomotionBody};

use crate::config::WallrunConfig;
use crate::state::LocomotionState;
use crate::tags::LocomotionAction;
use crate::timer::{TimerHandle, TimerService};

/// Sides in probe order with their lateral sign.
const SIDES: [(LocomotionAction, f32); 2] = [
    (LocomotionAction::WallrunningLeft, -1.0),
    (LocomotionAction::WallrunningRight, 1.0),
];

#[derive(Debug)]
struct PendingRearm {
    handle: TimerHandle,
    due: Arc<AtomicBool>,
}

/// Detects, sustains and ends wallruns, and tracks camera roll.
#[derive(Debug)]
pub struct WallrunController {
    config: WallrunConfig,
    can_check: bool,
    wall_normal: Option<Vec3>,
    rearm: Option<PendingRearm>,
    camera_roll: f32,
}

impl WallrunController {
    pub fn new(config: WallrunConfig) -> Self {
        Self {
            config,
            can_check: false,
            wall_normal: None,
            rearm: None,
            camera_roll: 0.0,
        }
    }

    pub fn config(&self) -> &WallrunConfig {
        &self.config
    }

    /// Whether wall checks run this tick.
    pub fn can_check(&self) -> bool {
        self.can_check
    }

    /// Whether the post-wallrun cooldown is still running.
    pub fn is_cooling_down(&self) -> bool {
        self.rearm.is_some()
    }

    /// Normal of the wall last run along.
    pub fn wall_normal(&self) -> Option<Vec3> {
        self.wall_normal
    }

    /// Current camera roll in degrees; positive while running a left wall.
    pub fn camera_roll(&self) -> f32 {
        self.camera_roll
    }

    /// Enable wall checks, unless the cooldown is running.
    pub fn arm(&mut self) {
        if self.rearm.is_none() {
            self.can_check = true;
        }
    }

    /// Apply a re-arm whose timer has fired. Checks come back only if no
    /// action is running at that point.
    pub fn poll_rearm(&mut self, state: &LocomotionState) {
        let fired = self
            .rearm
            .as_ref()
            .is_some_and(|rearm| rearm.due.load(Ordering::Acquire));
        if !fired {
            return;
        }

        self.rearm = None;
        if state.action().is_none() {
            log::debug!("wallrun re-armed");
            self.can_check = true;
        }
    }

    /// Probe for a wall and start or continue a wallrun. Returns whether the
    /// body is running a wall this tick.
    ///
    /// `launch_speed` is the body's default walking speed.
    pub fn update<B>(
        &mut self,
        body: &mut B,
        world: &dyn GeometryQuery,
        state: &mut LocomotionState,
        launch_speed: f32,
    ) -> bool
    where
        B: LocomotionBody + ?Sized,
    {
        if !self.can_check || !body.is_falling() {
            return false;
        }
        if state.action().is_some() && !state.is_wallrunning() {
            return false;
        }

        let forward = body.forward_vector();
        if body.last_input_vector().dot(forward) <= 0.0 {
            return false;
        }

        let right = body.right_vector();
        let up = -body.gravity_direction();
        let start = body.location();
        let filter = body.probe_filter();

        for (action, side) in SIDES {
            let end = start + right * (self.config.check_distance * side) - forward * self.config.check_angle;
            let hit = world.line_trace(start, end, &filter);
            if !hit.blocking {
                continue;
            }

            let along = along_wall(hit.normal, up, side);
            body.launch(along * launch_speed, true, true);
            self.wall_normal = Some(hit.normal);
            if state.set_action(Some(action)) {
                log::debug!("wallrun started on {action} against {:?}", hit.normal);
            }
            return true;
        }

        log::trace!("wallrun: no wall beside {start:?}");
        false
    }

    /// Jump off the wall being run. Returns whether a wall-jump happened.
    pub fn wall_jump<B>(&mut self, body: &mut B, state: &mut LocomotionState, timers: &mut dyn TimerService) -> bool
    where
        B: LocomotionBody + ?Sized,
    {
        let Some(action) = state.action().filter(|action| action.is_wallrun()) else {
            return false;
        };
        let Some(normal) = self.wall_normal else {
            return false;
        };

        self.end(state, timers);

        let side = side_sign(action);
        let up = -body.gravity_direction();
        let launch = self.config.wall_jump_launch(normal, along_wall(normal, up, side), up);
        body.launch(launch, false, true);
        log::debug!("wall-jump off {action}: {launch:?}");
        true
    }

    /// End a running wallrun: clear the action and start the cooldown.
    /// Does nothing when not wallrunning.
    pub fn end(&mut self, state: &mut LocomotionState, timers: &mut dyn TimerService) {
        if !state.is_wallrunning() {
            return;
        }

        self.can_check = false;
        state.set_action(None);
        self.schedule_rearm(timers);
        log::debug!("wallrun ended, re-arm in {:.2}s", self.config.reset_time);
    }

    /// Ease the camera roll toward the tilt for the current action.
    pub fn update_camera_tilt(&mut self, delta_time: f32, state: &LocomotionState) -> f32 {
        let target = match state.action() {
            Some(LocomotionAction::WallrunningLeft) => self.config.camera_tilt_angle,
            Some(LocomotionAction::WallrunningRight) => -self.config.camera_tilt_angle,
            _ => 0.0,
        };
        self.camera_roll = interp_to(self.camera_roll, target, delta_time, self.config.camera_interp_speed);
        self.camera_roll
    }

    /// Cancel a pending re-arm.
    pub fn teardown(&mut self, timers: &mut dyn TimerService) {
        if let Some(rearm) = self.rearm.take() {
            timers.cancel(rearm.handle);
        }
    }

    fn schedule_rearm(&mut self, timers: &mut dyn TimerService) {
        self.teardown(timers);

        let due = Arc::new(AtomicBool::new(false));
        let weak: Weak<AtomicBool> = Arc::downgrade(&due);
        let handle = timers.schedule(
            self.config.reset_time,
            Box::new(move || {
                if let Some(due) = weak.upgrade() {
                    due.store(true, Ordering::Release);
                }
            }),
        );
        self.rearm = Some(PendingRearm { handle, due });
    }
}

fn side_sign(action: LocomotionAction) -> f32 {
    match action {
        LocomotionAction::WallrunningLeft => -1.0,
        _ => 1.0,
    }
}

/// Running direction along a wall on the given side.
fn along_wall(normal: Vec3, up: Vec3, side: f32) -> Vec3 {
    normal.cross(up).normalize_or_zero() * side
}

/// Exponential approach used for camera smoothing.
fn interp_to(current: f32, target: f32, delta_time: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let distance = target - current;
    if distance * distance < 1e-8 {
        return target;
    }
    current + distance * (delta_time * speed).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerManager;
    use approx::assert_relative_eq;
    use freerun_physics::{BodyConfig, CharacterBody, CollisionWorld, ContentFlags};

    const DT: f32 = 1.0 / 60.0;

    /// A wall along X whose face is at z = 60 (to the right of a body facing +X).
    fn right_wall() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(0.0, 500.0, 110.0), Vec3::new(2000.0, 500.0, 50.0), ContentFlags::SOLID);
        world
    }

    fn left_wall() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(0.0, 500.0, -110.0), Vec3::new(2000.0, 500.0, 50.0), ContentFlags::SOLID);
        world
    }

    /// Airborne body pushing forward (+X).
    fn airborne(world: &CollisionWorld) -> CharacterBody {
        let mut body = CharacterBody::new(BodyConfig::default(), Vec3::new(0.0, 400.0, 0.0));
        body.set_input(Vec3::X);
        body.tick(DT, world);
        body
    }

    #[test]
    fn test_right_wall_starts_wallrun() {
        let world = right_wall();
        let mut body = airborne(&world);
        let mut state = LocomotionState::new();
        let mut wallrun = WallrunController::new(WallrunConfig::default());
        wallrun.arm();

        assert!(wallrun.update(&mut body, &world, &mut state, 600.0));
        assert_eq!(state.action(), Some(LocomotionAction::WallrunningRight));
        let normal = wallrun.wall_normal().expect("wall normal");
        assert_relative_eq!(normal.z, -1.0, epsilon = 1e-4);

        body.tick(DT, &world);
        assert_relative_eq!(body.velocity().x, 600.0, epsilon = 1.0);
        assert_relative_eq!(body.velocity().z, 0.0, epsilon = 1.0);
        // Vertical velocity restarts from zero on every launch
        assert!(body.velocity().y > -20.0);
    }

    #[test]
    fn test_left_wall_runs_forward_too() {
        let world = left_wall();
        let mut body = airborne(&world);
        let mut state = LocomotionState::new();
        let mut wallrun = WallrunController::new(WallrunConfig::default());
        wallrun.arm();

        assert!(wallrun.update(&mut body, &world, &mut state, 600.0));
        assert_eq!(state.action(), Some(LocomotionAction::WallrunningLeft));

        body.tick(DT, &world);
        assert_relative_eq!(body.velocity().x, 600.0, epsilon = 1.0);
    }

    #[test]
    fn test_requires_arming_and_forward_input() {
        let world = right_wall();
        let mut body = airborne(&world);
        let mut state = LocomotionState::new();
        let mut wallrun = WallrunController::new(WallrunConfig::default());

        assert!(!wallrun.update(&mut body, &world, &mut state, 600.0));

        wallrun.arm();
        body.set_input(Vec3::NEG_X);
        body.tick(DT, &world);
        assert!(!wallrun.update(&mut body, &world, &mut state, 600.0));
        assert_eq!(state.action(), None);
    }

    #[test]
    fn test_no_wall_no_wallrun() {
        let world = CollisionWorld::new();
        let mut body = airborne(&world);
        let mut state = LocomotionState::new();
        let mut wallrun = WallrunController::new(WallrunConfig::default());
        wallrun.arm();

        assert!(!wallrun.update(&mut body, &world, &mut state, 600.0));
        assert_eq!(wallrun.wall_normal(), None);
    }

    #[test]
    fn test_wall_jump_and_cooldown() {
        let world = right_wall();
        let mut body = airborne(&world);
        let mut state = LocomotionState::new();
        let mut timers = TimerManager::new();
        let mut wallrun = WallrunController::new(WallrunConfig::default());
        wallrun.arm();
        wallrun.update(&mut body, &world, &mut state, 600.0);

        assert!(wallrun.wall_jump(&mut body, &mut state, &mut timers));
        assert_eq!(state.action(), None);
        assert!(wallrun.is_cooling_down());
        assert!(!wallrun.can_check());

        body.tick(DT, &world);
        // Away from the wall (-Z), along it (+X) and up
        assert!(body.velocity().z < -900.0);
        assert!(body.velocity().x > 900.0);
        assert!(body.velocity().y > 700.0);

        // Arming during the cooldown is ignored
        wallrun.arm();
        assert!(!wallrun.can_check());

        timers.advance(0.2);
        wallrun.poll_rearm(&state);
        assert!(!wallrun.can_check());

        timers.advance(0.2);
        wallrun.poll_rearm(&state);
        assert!(wallrun.can_check());
        assert!(!wallrun.is_cooling_down());
    }

    #[test]
    fn test_rearm_skipped_while_action_runs() {
        let world = right_wall();
        let mut body = airborne(&world);
        let mut state = LocomotionState::new();
        let mut timers = TimerManager::new();
        let mut wallrun = WallrunController::new(WallrunConfig::default());
        wallrun.arm();
        wallrun.update(&mut body, &world, &mut state, 600.0);
        wallrun.end(&mut state, &mut timers);

        state.set_action(Some(LocomotionAction::Sliding));
        timers.advance(1.0);
        wallrun.poll_rearm(&state);
        assert!(!wallrun.can_check());
        assert!(!wallrun.is_cooling_down());
    }

    #[test]
    fn test_dropped_controller_makes_timer_noop() {
        let world = right_wall();
        let mut body = airborne(&world);
        let mut state = LocomotionState::new();
        let mut timers = TimerManager::new();
        let mut wallrun = WallrunController::new(WallrunConfig::default());
        wallrun.arm();
        wallrun.update(&mut body, &world, &mut state, 600.0);
        wallrun.end(&mut state, &mut timers);
        drop(wallrun);

        assert_eq!(timers.advance(1.0), 1);
    }

    #[test]
    fn test_teardown_cancels_rearm() {
        let world = right_wall();
        let mut body = airborne(&world);
        let mut state = LocomotionState::new();
        let mut timers = TimerManager::new();
        let mut wallrun = WallrunController::new(WallrunConfig::default());
        wallrun.arm();
        wallrun.update(&mut body, &world, &mut state, 600.0);
        wallrun.end(&mut state, &mut timers);

        wallrun.teardown(&mut timers);
        assert_eq!(timers.pending_count(), 0);
        assert!(!wallrun.is_cooling_down());
    }

    #[test]
    fn test_camera_tilt() {
        let mut wallrun = WallrunController::new(WallrunConfig::default());
        let mut state = LocomotionState::new();

        state.set_action(Some(LocomotionAction::WallrunningLeft));
        let roll = wallrun.update_camera_tilt(0.05, &state);
        assert_relative_eq!(roll, 7.5);
        for _ in 0..60 {
            wallrun.update_camera_tilt(DT, &state);
        }
        assert_relative_eq!(wallrun.camera_roll(), 15.0, epsilon = 0.01);

        state.set_action(Some(LocomotionAction::WallrunningRight));
        for _ in 0..120 {
            wallrun.update_camera_tilt(DT, &state);
        }
        assert_relative_eq!(wallrun.camera_roll(), -15.0, epsilon = 0.01);

        state.set_action(None);
        for _ in 0..120 {
            wallrun.update_camera_tilt(DT, &state);
        }
        assert_relative_eq!(wallrun.camera_roll(), 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_interp_to() {
        assert_eq!(interp_to(0.0, 10.0, 0.1, 0.0), 10.0);
        assert_relative_eq!(interp_to(0.0, 10.0, 0.05, 10.0), 5.0);
        assert_eq!(interp_to(0.0, 10.0, 1.0, 10.0), 10.0);
    }
}
