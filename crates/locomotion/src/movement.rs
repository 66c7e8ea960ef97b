//! Parkour movement coordinator.
//!
//! [`ParkourMovement`] owns a body and the parkour controllers around it.
//! The surrounding system drives it with explicit calls:
//!
//! - [`tick`](ParkourMovement::tick) once per frame; it ticks the body and
//!   forwards the body's mode-change and landing events itself
//! - [`do_jump`](ParkourMovement::do_jump) for jump input
//! - [`handle_crouch_input`](ParkourMovement::handle_crouch_input) for
//!   crouch press and release
//! - [`reset_traversal`](ParkourMovement::reset_traversal) when a traversal
//!   clip finishes
//!
//! Per tick, after the body moves: mode label sync, landing handling,
//! wallrun, camera tilt, then the slide cancel check.
//!
//! Label changes queue up until the owner calls
//! [`take_changes`](ParkourMovement::take_changes); nothing here drains them.
//! Drain once per frame: past
//! [`MAX_PENDING_CHANGES`](crate::state::MAX_PENDING_CHANGES) the oldest are
//! dropped.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use freerun_physics::{GeometryQuery, LocomotionBody, MovementMode, MovementParams};

use crate::anim::{AnimationPlayer, MontageHandle};
use crate::config::ParkourConfig;
use crate::crouch::CrouchController;
use crate::mode_bridge::MovementModeBridge;
use crate::slide::SlideController;
use crate::state::{LocomotionChange, LocomotionState};
use crate::tags::{Gait, LocomotionAction, LocomotionMode, Stance};
use crate::timer::TimerService;
use crate::traversal::{TraversalDetector, TraversalResult, TraversalType};
use crate::wallrun::WallrunController;
use crate::warp::{TraversalAnimWarpBinder, WarpTargetSink};

/// Services a parkour operation may call into.
pub struct MovementContext<'a> {
    pub world: &'a dyn GeometryQuery,
    pub animation: &'a mut dyn AnimationPlayer,
    pub warp_targets: &'a mut dyn WarpTargetSink,
    pub timers: &'a mut dyn TimerService,
}

impl<'a> MovementContext<'a> {
    pub fn new(
        world: &'a dyn GeometryQuery,
        animation: &'a mut dyn AnimationPlayer,
        warp_targets: &'a mut dyn WarpTargetSink,
        timers: &'a mut dyn TimerService,
    ) -> Self {
        Self {
            world,
            animation,
            warp_targets,
            timers,
        }
    }
}

/// What a jump request turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpOutcome {
    /// An obstacle was found; the traversal clip is playing.
    Traversal(TraversalType),
    /// Jumped off the wall being run.
    WallJump,
    /// Ordinary jump.
    Jumped,
    /// Nothing happened.
    Rejected,
}

/// A body with vault, mantle, wallrun, slide and crouch handling.
#[derive(Debug)]
pub struct ParkourMovement<B: LocomotionBody> {
    body: B,
    config: ParkourConfig,
    defaults: MovementParams,
    state: LocomotionState,

    detector: TraversalDetector,
    warp_binder: TraversalAnimWarpBinder,
    crouch: CrouchController,
    wallrun: WallrunController,
    slide: SlideController,

    active_montage: Option<MontageHandle>,
}

impl<B: LocomotionBody> ParkourMovement<B> {
    /// Take control of `body`. Its current movement parameters become the
    /// defaults every temporary override restores.
    pub fn bind(body: B, config: ParkourConfig) -> Self {
        let defaults = body.movement_params();
        let mut state = LocomotionState::new();
        MovementModeBridge::apply(body.movement_mode(), &mut state);
        state.take_changes();

        Self {
            detector: TraversalDetector::new(config.traversal.clone()),
            warp_binder: TraversalAnimWarpBinder::from_config(&config.traversal),
            crouch: CrouchController::new(config.crouch.client_simulation),
            wallrun: WallrunController::new(config.wallrun.clone()),
            slide: SlideController::new(config.slide.clone()),
            body,
            config,
            defaults,
            state,
            active_montage: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    /// Give the body back.
    pub fn into_body(self) -> B {
        self.body
    }

    pub fn config(&self) -> &ParkourConfig {
        &self.config
    }

    /// Movement parameters captured at bind time.
    pub fn default_params(&self) -> &MovementParams {
        &self.defaults
    }

    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    pub fn locomotion_mode(&self) -> Option<LocomotionMode> {
        self.state.mode()
    }

    pub fn stance(&self) -> Stance {
        self.state.stance()
    }

    pub fn gait(&self) -> Gait {
        self.state.gait()
    }

    pub fn action(&self) -> Option<LocomotionAction> {
        self.state.action()
    }

    pub fn is_wallrunning(&self) -> bool {
        self.state.is_wallrunning()
    }

    pub fn is_sliding(&self) -> bool {
        self.state.is_sliding()
    }

    pub fn is_traversing(&self) -> bool {
        self.state.is_traversing()
    }

    /// Camera roll from wallrunning, in degrees.
    pub fn camera_roll(&self) -> f32 {
        self.wallrun.camera_roll()
    }

    /// Whether wallrun checks are armed.
    pub fn can_wallrun(&self) -> bool {
        self.wallrun.can_check()
    }

    /// Normal of the wall last run along.
    pub fn wall_normal(&self) -> Option<Vec3> {
        self.wallrun.wall_normal()
    }

    /// Whether a slide is queued for the next landing.
    pub fn slide_on_land_pending(&self) -> bool {
        self.slide.slide_on_land_pending()
    }

    /// Clip playing for the current traversal.
    pub fn active_montage(&self) -> Option<MontageHandle> {
        self.active_montage
    }

    /// Drain label change events.
    pub fn take_changes(&mut self) -> Vec<LocomotionChange> {
        self.state.take_changes()
    }

    // ========================================================================
    // Label setters
    // ========================================================================

    pub fn set_locomotion_mode(&mut self, mode: Option<LocomotionMode>) -> bool {
        self.state.set_mode(mode)
    }

    pub fn set_locomotion_stance(&mut self, stance: Stance) -> bool {
        self.state.set_stance(stance)
    }

    pub fn set_locomotion_gait(&mut self, gait: Gait) -> bool {
        self.state.set_gait(gait)
    }

    pub fn set_locomotion_action(&mut self, action: Option<LocomotionAction>) -> bool {
        self.state.set_action(action)
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Advance the body one frame and run the per-tick parkour checks.
    pub fn tick(&mut self, delta_time: f32, ctx: &mut MovementContext<'_>) {
        let events = self.body.tick(delta_time, ctx.world);
        if !events.mode_changes.is_empty() {
            self.on_movement_mode_changed();
        }
        if events.landed {
            self.on_player_landed(ctx);
        }

        self.wallrun.poll_rearm(&self.state);
        self.wallrun
            .update(&mut self.body, ctx.world, &mut self.state, self.defaults.max_walk_speed);
        self.wallrun.update_camera_tilt(delta_time, &self.state);

        if self.slide.should_cancel(&self.body, &self.state) {
            self.crouch.uncrouch(&mut self.body, ctx.world, &mut self.state);
            self.slide.cancel(&mut self.body, &mut self.state, &self.defaults);
        }
    }

    /// Sync the Mode label with the body's base mode. Returns whether it changed.
    pub fn on_movement_mode_changed(&mut self) -> bool {
        MovementModeBridge::apply(self.body.movement_mode(), &mut self.state)
    }

    // ========================================================================
    // Jumping and traversal
    // ========================================================================

    /// Handle jump input: traverse an obstacle ahead, jump off a wall, or jump.
    pub fn do_jump(&mut self, ctx: &mut MovementContext<'_>) -> JumpOutcome {
        if self.state.is_traversing() || self.body.is_crouched() {
            return JumpOutcome::Rejected;
        }

        if !self.state.is_wallrunning() {
            let result = self.check_for_traversal(ctx.world);
            if result.found {
                self.start_traversal(&result, ctx);
                return JumpOutcome::Traversal(result.traversal_type);
            }
        }

        if self.on_player_jumped(ctx) {
            return JumpOutcome::WallJump;
        }

        if self.body.jump() {
            self.on_movement_mode_changed();
            JumpOutcome::Jumped
        } else {
            JumpOutcome::Rejected
        }
    }

    /// Probe for an obstacle ahead of the body.
    pub fn check_for_traversal(&self, world: &dyn GeometryQuery) -> TraversalResult {
        self.detector.detect(
            world,
            self.body.location(),
            self.body.forward_vector(),
            -self.body.gravity_direction(),
            self.body.capsule(),
            self.body.probe_filter(),
        )
    }

    fn start_traversal(&mut self, result: &TraversalResult, ctx: &mut MovementContext<'_>) {
        let Some(action) = result.traversal_type.action() else {
            return;
        };

        // Clip root motion carries the body, so gravity and collision go away
        self.body.set_movement_mode(MovementMode::Flying);
        self.on_movement_mode_changed();
        self.body.set_collision_enabled(false);

        self.warp_binder.bind(
            ctx.warp_targets,
            result,
            self.body.feet_location(),
            -self.body.gravity_direction(),
            self.body.rotation(),
        );

        let clip = match result.traversal_type {
            TraversalType::Mantle => &self.config.traversal.mantle_clip,
            _ => &self.config.traversal.vault_clip,
        };
        self.active_montage = Some(ctx.animation.play(clip));
        self.state.set_action(Some(action));
    }

    /// Finish a traversal: collision back on, falling, action cleared.
    /// Returns `false` when no traversal is running.
    pub fn reset_traversal(&mut self, ctx: &mut MovementContext<'_>) -> bool {
        if !self.state.is_traversing() {
            return false;
        }

        // Early resets cut the clip short
        if let Some(handle) = self.active_montage.take() {
            ctx.animation.stop(handle);
        }

        self.body.set_collision_enabled(true);
        self.body.set_movement_mode(MovementMode::Falling);
        self.on_movement_mode_changed();
        self.state.set_action(None);
        log::debug!("traversal finished at {:?}", self.body.location());
        true
    }

    /// Jump bookkeeping: a ground jump arms wallrun checks, a jump while
    /// wallrunning becomes a wall-jump. Returns whether a wall-jump happened.
    pub fn on_player_jumped(&mut self, ctx: &mut MovementContext<'_>) -> bool {
        self.slide.clear_slide_on_land();

        if self.state.action().is_none() {
            if !self.body.is_falling() {
                self.wallrun.arm();
            }
            false
        } else {
            self.wallrun.wall_jump(&mut self.body, &mut self.state, ctx.timers)
        }
    }

    /// Landing: end any wallrun and run a queued landing slide.
    pub fn on_player_landed(&mut self, ctx: &mut MovementContext<'_>) {
        self.wallrun.end(&mut self.state, ctx.timers);

        if self.slide.take_slide_on_land() {
            self.crouch.crouch(&mut self.body, ctx.world, &mut self.state);
            if self.body.last_update_velocity().length() > 0.0 {
                self.slide.try_slide(&mut self.body, ctx.world, &mut self.state);
            }
            self.slide.clear_slide_on_land();
        }
    }

    // ========================================================================
    // Crouch and slide
    // ========================================================================

    /// Crouch pressed (`true`) or released (`false`).
    ///
    /// Pressing crouches a grounded body and tries to slide; pressing in the
    /// air queues a slide for landing. Releasing stands up if there is room
    /// and ends any slide.
    pub fn handle_crouch_input(&mut self, wants_to_crouch: bool, ctx: &mut MovementContext<'_>) {
        if wants_to_crouch {
            if !self.body.is_falling() {
                self.crouch.crouch(&mut self.body, ctx.world, &mut self.state);
            }
            self.slide.try_slide(&mut self.body, ctx.world, &mut self.state);
        } else {
            self.crouch.uncrouch(&mut self.body, ctx.world, &mut self.state);
            self.slide.cancel(&mut self.body, &mut self.state, &self.defaults);
        }
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Cancel deferred work before the controller goes away.
    pub fn teardown(&mut self, ctx: &mut MovementContext<'_>) {
        self.wallrun.teardown(ctx.timers);
        if let Some(handle) = self.active_montage.take() {
            ctx.animation.stop(handle);
        }
    }
}
