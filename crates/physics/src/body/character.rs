//! Walking/falling/flying capsule simulation.
//!
//! [`CharacterBody`] is the base locomotion simulation the parkour layer
//! wraps. Each tick it applies pending launches and impulses, integrates
//! velocity for the current [`MovementMode`], resolves collisions with slide
//! moves and keeps walking bodies hovering a small gap above the floor.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::GeometryQuery;

use super::interface::{BodyEvents, LocomotionBody, ModeChange};
use super::mode::{MovementMode, NetRole};
use super::params::{BodyConfig, CapsuleDimensions, MovementParams};
use super::slide_move::CapsuleMover;

/// Target gap between capsule bottom and floor while walking.
pub const FLOOR_GAP: f32 = 2.15;

/// Floor search reach below the walking gap.
const MAX_FLOOR_DIST: f32 = 2.4;

/// Floor sweeps use a narrower capsule so walls the body leans on are not
/// mistaken for floor.
const FLOOR_SWEEP_RADIUS_SCALE: f32 = 0.9;

/// Speeds below this snap to zero while braking.
const BRAKE_TO_STOP_VELOCITY: f32 = 10.0;

/// Braking is integrated in steps no longer than this.
const BRAKING_SUB_STEP: f32 = 1.0 / 33.0;

/// Multiplier applied to friction while braking.
const BRAKING_FRICTION_FACTOR: f32 = 2.0;

/// How far `spawn_at` searches for a floor.
const SPAWN_FLOOR_SEARCH: f32 = 10_000.0;

/// Floor under a walking body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorHit {
    /// Gap between capsule bottom and floor.
    pub distance: f32,
    /// Floor surface normal.
    pub normal: Vec3,
}

/// A capsule character moving through a [`GeometryQuery`] world.
#[derive(Debug, Clone)]
pub struct CharacterBody {
    config: BodyConfig,

    position: Vec3,
    velocity: Vec3,
    last_update_velocity: Vec3,
    yaw: f32,

    /// Requested movement direction for upcoming ticks.
    input: Vec3,
    /// Input consumed by the last tick.
    last_input: Vec3,

    mode: MovementMode,
    floor: Option<FloorHit>,

    capsule: CapsuleDimensions,
    params: MovementParams,
    crouched: bool,
    crouch_offset: f32,
    collision_enabled: bool,

    pending_launch: Option<Vec3>,
    pending_impulse: Vec3,

    net_role: NetRole,
    replaying: bool,
    mesh_translation_offset: Vec3,
    self_brush: Option<u32>,
}

impl CharacterBody {
    /// Create a body at `location` (capsule center), falling until it finds a floor.
    pub fn new(config: BodyConfig, location: Vec3) -> Self {
        Self {
            capsule: config.capsule,
            params: config.params,
            config,
            position: location,
            velocity: Vec3::ZERO,
            last_update_velocity: Vec3::ZERO,
            yaw: 0.0,
            input: Vec3::ZERO,
            last_input: Vec3::ZERO,
            mode: MovementMode::Falling,
            floor: None,
            crouched: false,
            crouch_offset: 0.0,
            collision_enabled: true,
            pending_launch: None,
            pending_impulse: Vec3::ZERO,
            net_role: NetRole::Standalone,
            replaying: false,
            mesh_translation_offset: Vec3::ZERO,
            self_brush: None,
        }
    }

    /// Place the body on the floor below `location`.
    ///
    /// The body starts walking if a walkable floor is found and falling
    /// otherwise.
    pub fn spawn_at(&mut self, location: Vec3, world: &dyn GeometryQuery) {
        self.position = location;
        self.velocity = Vec3::ZERO;
        self.last_update_velocity = Vec3::ZERO;

        match self.find_floor(world, SPAWN_FLOOR_SEARCH) {
            Some(floor) => {
                self.snap_to_floor(floor);
                self.enter_mode(MovementMode::Walking);
            }
            None => {
                self.floor = None;
                self.enter_mode(MovementMode::Falling);
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Body configuration.
    pub fn config(&self) -> &BodyConfig {
        &self.config
    }

    /// Facing yaw in radians; 0 faces +X, positive turns toward +Z.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Set the facing yaw.
    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    /// Request movement along a world-space direction (length ≤ 1).
    pub fn set_input(&mut self, input: Vec3) {
        self.input = Vec3::new(input.x, 0.0, input.z).clamp_length_max(1.0);
    }

    /// Set velocity immediately, as if the last tick ended with it.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.last_update_velocity = velocity;
    }

    /// Floor under the body while walking.
    pub fn floor(&self) -> Option<FloorHit> {
        self.floor
    }

    /// Scaled half-height removed by the current crouch.
    pub fn crouch_offset(&self) -> f32 {
        self.crouch_offset
    }

    /// Set the network role.
    pub fn set_net_role(&mut self, role: NetRole) {
        self.net_role = role;
    }

    /// Mark the body as replaying moves for a correction.
    pub fn set_replaying(&mut self, replaying: bool) {
        self.replaying = replaying;
    }

    /// Register the brush that represents this body in the world.
    pub fn set_self_brush(&mut self, brush: Option<u32>) {
        self.self_brush = brush;
    }

    // ========================================================================
    // Mode transitions
    // ========================================================================

    fn enter_mode(&mut self, mode: MovementMode) -> MovementMode {
        let previous = self.mode;
        if previous == mode {
            return previous;
        }

        self.mode = mode;
        if mode.is_grounded() {
            self.velocity.y = 0.0;
        } else {
            self.floor = None;
        }

        log::trace!("movement mode {previous} -> {mode}");
        previous
    }

    fn change_mode(&mut self, mode: MovementMode, events: &mut BodyEvents) {
        let previous = self.enter_mode(mode);
        if previous != mode {
            events.mode_changes.push(ModeChange {
                previous,
                current: mode,
            });
        }
    }

    // ========================================================================
    // Forces
    // ========================================================================

    fn apply_pending_forces(&mut self, events: &mut BodyEvents) {
        let impulse = std::mem::take(&mut self.pending_impulse);
        if impulse != Vec3::ZERO {
            self.velocity += impulse;
            if self.mode.is_grounded() && impulse.y > 1e-4 {
                self.change_mode(MovementMode::Falling, events);
            }
        }

        if let Some(launch) = self.pending_launch.take() {
            self.velocity = launch;
            self.change_mode(MovementMode::Falling, events);
        }
    }

    fn max_speed(&self) -> f32 {
        match self.mode {
            MovementMode::Walking | MovementMode::NavWalking if self.crouched => {
                self.params.max_walk_speed_crouched
            }
            MovementMode::Walking | MovementMode::NavWalking | MovementMode::Falling => {
                self.params.max_walk_speed
            }
            MovementMode::Flying | MovementMode::Swimming => self.config.max_fly_speed,
            MovementMode::None => 0.0,
        }
    }

    fn input_acceleration(&self, scale: f32) -> Vec3 {
        self.input * self.config.max_acceleration * scale
    }

    /// Integrate friction, braking and input acceleration.
    fn calc_velocity(&mut self, delta_time: f32, friction: f32, braking: f32, max_speed: f32, acceleration: Vec3) {
        let max_speed = max_speed.max(0.0);
        let zero_acceleration = acceleration.length_squared() < 1e-8;
        let over_max = is_exceeding(self.velocity, max_speed);

        if zero_acceleration || over_max {
            let old_velocity = self.velocity;
            self.apply_braking(delta_time, friction, braking);

            // Braking never drops below max speed while input pushes forward
            if over_max
                && self.velocity.length_squared() < max_speed * max_speed
                && acceleration.dot(old_velocity) > 0.0
            {
                self.velocity = old_velocity.normalize_or_zero() * max_speed;
            }
        } else {
            // Friction limits how fast direction changes
            let direction = acceleration.normalize();
            let speed = self.velocity.length();
            self.velocity -= (self.velocity - direction * speed) * (delta_time * friction).min(1.0);
        }

        if !zero_acceleration {
            let limit = if is_exceeding(self.velocity, max_speed) {
                self.velocity.length()
            } else {
                max_speed
            };
            self.velocity = (self.velocity + acceleration * delta_time).clamp_length_max(limit);
        }
    }

    fn apply_braking(&mut self, delta_time: f32, friction: f32, braking: f32) {
        if self.velocity.length_squared() < 1e-8 || delta_time < 1e-6 {
            return;
        }

        let friction = (friction * BRAKING_FRICTION_FACTOR).max(0.0);
        let braking = braking.max(0.0);
        let zero_friction = friction == 0.0;
        let zero_braking = braking == 0.0;
        if zero_friction && zero_braking {
            return;
        }

        let old_velocity = self.velocity;
        let reverse_accel = if zero_braking {
            Vec3::ZERO
        } else {
            -old_velocity.normalize() * braking
        };

        let mut remaining = delta_time;
        while remaining >= 1e-6 {
            let step = if remaining > BRAKING_SUB_STEP && !zero_friction {
                BRAKING_SUB_STEP.min(remaining * 0.5)
            } else {
                remaining
            };
            remaining -= step;

            self.velocity += (-friction * self.velocity + reverse_accel) * step;

            // Braking never reverses direction
            if self.velocity.dot(old_velocity) <= 0.0 {
                self.velocity = Vec3::ZERO;
                return;
            }
        }

        let speed_sq = self.velocity.length_squared();
        if speed_sq <= 1e-8 || (!zero_braking && speed_sq <= BRAKE_TO_STOP_VELOCITY * BRAKE_TO_STOP_VELOCITY) {
            self.velocity = Vec3::ZERO;
        }
    }

    // ========================================================================
    // Floor
    // ========================================================================

    fn mover<'w>(&self, world: &'w dyn GeometryQuery) -> CapsuleMover<'w> {
        CapsuleMover::new(world, self.capsule, self.collision_filter())
    }

    fn find_floor(&self, world: &dyn GeometryQuery, reach: f32) -> Option<FloorHit> {
        let filter = self.collision_filter();
        let hit = world.sweep_capsule(
            self.position,
            self.position - Vec3::Y * reach,
            self.capsule.scaled_radius() * FLOOR_SWEEP_RADIUS_SCALE,
            self.capsule.scaled_half_height(),
            &filter,
        );

        if !hit.blocking {
            return None;
        }

        if hit.started_in_solid && hit.fraction < 0.001 {
            return Some(FloorHit {
                distance: 0.0,
                normal: Vec3::Y,
            });
        }

        if hit.normal.y < self.config.walkable_floor_y {
            return None;
        }

        Some(FloorHit {
            distance: self.position.y - hit.location.y,
            normal: hit.normal,
        })
    }

    fn snap_to_floor(&mut self, floor: FloorHit) {
        self.position.y += FLOOR_GAP - floor.distance;
        self.floor = Some(FloorHit {
            distance: FLOOR_GAP,
            normal: floor.normal,
        });
    }

    // ========================================================================
    // Physics per mode
    // ========================================================================

    fn phys_walking(&mut self, delta_time: f32, world: &dyn GeometryQuery, events: &mut BodyEvents) {
        self.velocity.y = 0.0;

        let acceleration = self.input_acceleration(1.0);
        let max_speed = self.max_speed();
        self.calc_velocity(
            delta_time,
            self.params.ground_friction,
            self.params.braking_deceleration_walking,
            max_speed,
            acceleration,
        );

        if !self.collision_enabled {
            self.position += self.velocity * delta_time;
            return;
        }

        let moved = self.mover(world).step_slide(
            self.position,
            self.velocity,
            delta_time,
            self.config.max_step_height,
            self.config.walkable_floor_y,
        );
        self.position = moved.position;
        self.velocity = Vec3::new(moved.velocity.x, 0.0, moved.velocity.z);

        match self.find_floor(world, self.config.max_step_height + MAX_FLOOR_DIST) {
            Some(floor) => self.snap_to_floor(floor),
            None => {
                log::trace!("walked off ledge at {:?}", self.position);
                self.change_mode(MovementMode::Falling, events);
            }
        }
    }

    fn phys_falling(&mut self, delta_time: f32, world: &dyn GeometryQuery, events: &mut BodyEvents) {
        let gravity = self.gravity_direction() * self.config.gravity * self.params.gravity_scale;
        let acceleration = self.input_acceleration(self.config.air_control);

        let mut lateral = Vec3::new(self.velocity.x, 0.0, self.velocity.z);
        if acceleration.length_squared() > 1e-8 {
            let limit = self.params.max_walk_speed.max(lateral.length());
            lateral = (lateral + acceleration * delta_time).clamp_length_max(limit);
        }
        self.velocity = Vec3::new(lateral.x, self.velocity.y, lateral.z) + gravity * delta_time;

        if !self.collision_enabled {
            self.position += self.velocity * delta_time;
            return;
        }

        // Clipping against the floor leaves a tiny upward component, so decide before moving
        let descending = self.velocity.y <= 0.0;

        let moved = self.mover(world).slide(self.position, self.velocity, delta_time);
        self.position = moved.position;
        self.velocity = moved.velocity;

        if descending {
            if let Some(floor) = self.find_floor(world, MAX_FLOOR_DIST + 1.0) {
                self.snap_to_floor(floor);
                self.change_mode(MovementMode::Walking, events);
                events.landed = true;
                log::trace!("landed at {:?}", self.position);
            }
        }
    }

    fn phys_flying(&mut self, delta_time: f32, world: &dyn GeometryQuery) {
        let acceleration = self.input_acceleration(1.0);
        let max_speed = self.max_speed();
        self.calc_velocity(
            delta_time,
            0.0,
            self.config.braking_deceleration_flying,
            max_speed,
            acceleration,
        );

        if !self.collision_enabled {
            self.position += self.velocity * delta_time;
            return;
        }

        let moved = self.mover(world).slide(self.position, self.velocity, delta_time);
        self.position = moved.position;
        self.velocity = moved.velocity;
    }
}

#[inline]
fn is_exceeding(velocity: Vec3, max_speed: f32) -> bool {
    velocity.length_squared() > max_speed * max_speed * 1.01
}

impl LocomotionBody for CharacterBody {
    fn location(&self) -> Vec3 {
        self.position
    }

    fn set_location(&mut self, location: Vec3) {
        self.position = location;
    }

    fn rotation(&self) -> Quat {
        // Quat::from_rotation_y turns +X toward -Z, so negate the yaw
        Quat::from_rotation_y(-self.yaw)
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn last_update_velocity(&self) -> Vec3 {
        self.last_update_velocity
    }

    fn last_input_vector(&self) -> Vec3 {
        self.last_input
    }

    fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    fn set_movement_mode(&mut self, mode: MovementMode) -> MovementMode {
        self.enter_mode(mode)
    }

    fn capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    fn default_capsule(&self) -> CapsuleDimensions {
        self.config.capsule
    }

    fn crouched_half_height(&self) -> f32 {
        self.config.crouched_half_height
    }

    fn set_capsule_size(&mut self, radius: f32, half_height: f32) {
        self.capsule.radius = radius;
        self.capsule.half_height = half_height.max(radius);
    }

    fn is_crouched(&self) -> bool {
        self.crouched
    }

    fn set_crouched(&mut self, crouched: bool) {
        self.crouched = crouched;
    }

    fn floor_distance(&self) -> Option<f32> {
        self.floor.map(|floor| floor.distance)
    }

    fn on_start_crouch(&mut self, _half_height_adjust: f32, scaled_half_height_adjust: f32) {
        self.crouch_offset = scaled_half_height_adjust;
    }

    fn on_end_crouch(&mut self, _half_height_adjust: f32, _scaled_half_height_adjust: f32) {
        self.crouch_offset = 0.0;
    }

    fn self_brush(&self) -> Option<u32> {
        self.self_brush
    }

    fn launch(&mut self, velocity: Vec3, override_horizontal: bool, override_vertical: bool) {
        let mut launch = velocity;
        if !override_horizontal {
            launch.x += self.velocity.x;
            launch.z += self.velocity.z;
        }
        if !override_vertical {
            launch.y += self.velocity.y;
        }
        self.pending_launch = Some(launch);
    }

    fn add_impulse(&mut self, impulse: Vec3, velocity_change: bool) {
        if velocity_change {
            self.pending_impulse += impulse;
        } else if self.config.mass > 0.0 {
            self.pending_impulse += impulse / self.config.mass;
        }
    }

    fn jump(&mut self) -> bool {
        if !self.mode.is_grounded() || self.crouched {
            return false;
        }

        self.velocity.y = self.velocity.y.max(self.config.jump_z_velocity);
        self.enter_mode(MovementMode::Falling);
        true
    }

    fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision_enabled = enabled;
    }

    fn movement_params(&self) -> MovementParams {
        self.params
    }

    fn set_movement_params(&mut self, params: MovementParams) {
        self.params = params;
    }

    fn net_role(&self) -> NetRole {
        self.net_role
    }

    fn is_replaying(&self) -> bool {
        self.replaying
    }

    fn mesh_translation_offset(&self) -> Vec3 {
        self.mesh_translation_offset
    }

    fn set_mesh_translation_offset(&mut self, offset: Vec3) {
        self.mesh_translation_offset = offset;
    }

    fn tick(&mut self, delta_time: f32, world: &dyn GeometryQuery) -> BodyEvents {
        let mut events = BodyEvents::default();
        self.last_input = self.input;

        if self.mode != MovementMode::None && delta_time > 0.0 {
            self.apply_pending_forces(&mut events);

            match self.mode {
                MovementMode::Walking | MovementMode::NavWalking => {
                    self.phys_walking(delta_time, world, &mut events)
                }
                MovementMode::Falling => self.phys_falling(delta_time, world, &mut events),
                MovementMode::Flying | MovementMode::Swimming => self.phys_flying(delta_time, world),
                MovementMode::None => {}
            }
        }

        self.last_update_velocity = self.velocity;
        events
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionWorld, ContentFlags};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        // Floor with its top at y=0, spanning x/z in [-2000, 2000]
        world.add_block(Vec3::new(0.0, -100.0, 0.0), 2000.0, 2000.0, 100.0, ContentFlags::SOLID);
        world
    }

    fn spawned(world: &CollisionWorld) -> CharacterBody {
        let mut body = CharacterBody::new(BodyConfig::default(), Vec3::ZERO);
        body.spawn_at(Vec3::new(0.0, 100.0, 0.0), world);
        body
    }

    #[test]
    fn test_spawn_at_finds_ground() {
        let world = create_test_world();
        let body = spawned(&world);

        assert_eq!(body.movement_mode(), MovementMode::Walking);
        assert_relative_eq!(body.feet_location().y, FLOOR_GAP, epsilon = 0.05);
        assert_relative_eq!(body.floor_distance().expect("floor"), FLOOR_GAP);
    }

    #[test]
    fn test_spawn_at_no_ground() {
        let world = CollisionWorld::new();
        let mut body = CharacterBody::new(BodyConfig::default(), Vec3::ZERO);
        body.spawn_at(Vec3::new(0.0, 500.0, 0.0), &world);

        assert_eq!(body.movement_mode(), MovementMode::Falling);
        assert_eq!(body.location(), Vec3::new(0.0, 500.0, 0.0));
    }

    #[test]
    fn test_gravity() {
        let world = CollisionWorld::new();
        let mut body = CharacterBody::new(BodyConfig::default(), Vec3::new(0.0, 500.0, 0.0));

        body.tick(0.1, &world);

        assert!(body.velocity().y < 0.0, "Should be falling");
        assert!(body.location().y < 500.0);
    }

    #[test]
    fn test_forward_movement_reaches_walk_speed() {
        let world = create_test_world();
        let mut body = spawned(&world);
        body.set_input(Vec3::X);

        for _ in 0..120 {
            body.tick(DT, &world);
        }

        assert_eq!(body.movement_mode(), MovementMode::Walking);
        assert_relative_eq!(body.velocity().length(), 600.0, epsilon = 1.0);
        assert!(body.location().x > 500.0);
        assert_relative_eq!(body.feet_location().y, FLOOR_GAP, epsilon = 0.05);
    }

    #[test]
    fn test_braking_stops_body() {
        let world = create_test_world();
        let mut body = spawned(&world);
        body.set_velocity(Vec3::new(600.0, 0.0, 0.0));

        for _ in 0..60 {
            body.tick(DT, &world);
        }

        assert_eq!(body.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_braking_without_friction_is_linear() {
        let world = create_test_world();
        let mut body = spawned(&world);
        body.set_crouched(true);
        body.set_movement_params(MovementParams {
            ground_friction: 0.0,
            braking_deceleration_walking: 1000.0,
            max_walk_speed_crouched: 0.0,
            ..MovementParams::default()
        });
        body.set_velocity(Vec3::new(1400.0, 0.0, 0.0));

        body.tick(0.1, &world);

        assert_relative_eq!(body.last_update_velocity().x, 1300.0, epsilon = 0.01);
    }

    #[test]
    fn test_walking_off_ledge_starts_falling() {
        let world = create_test_world();
        let mut body = spawned(&world);
        body.set_location(Vec3::new(1990.0, body.location().y, 0.0));
        body.set_velocity(Vec3::new(600.0, 0.0, 0.0));
        body.set_input(Vec3::X);

        let mut changes = Vec::new();
        for _ in 0..30 {
            changes.extend(body.tick(DT, &world).mode_changes);
        }

        assert_eq!(body.movement_mode(), MovementMode::Falling);
        assert_eq!(
            changes.first(),
            Some(&ModeChange {
                previous: MovementMode::Walking,
                current: MovementMode::Falling
            })
        );
    }

    #[test]
    fn test_jump_and_land() {
        let world = create_test_world();
        let mut body = spawned(&world);

        assert!(body.jump());
        assert_eq!(body.movement_mode(), MovementMode::Falling);
        assert_eq!(body.velocity().y, 420.0);
        assert!(!body.jump(), "no jumping while airborne");

        let mut landed = false;
        let mut changes = Vec::new();
        for _ in 0..120 {
            let events = body.tick(DT, &world);
            landed |= events.landed;
            changes.extend(events.mode_changes);
        }

        assert!(landed);
        assert_eq!(body.movement_mode(), MovementMode::Walking);
        assert_eq!(
            changes,
            vec![ModeChange {
                previous: MovementMode::Falling,
                current: MovementMode::Walking
            }]
        );
        assert_relative_eq!(body.feet_location().y, FLOOR_GAP, epsilon = 0.05);
    }

    #[test]
    fn test_walking_into_wall_stays_grounded() {
        let mut world = create_test_world();
        // Wall face at x=300
        world.add_block(Vec3::new(400.0, 0.0, 0.0), 100.0, 500.0, 300.0, ContentFlags::SOLID);
        let mut body = spawned(&world);
        body.set_input(Vec3::X);

        let mut changes = Vec::new();
        let mut landed = false;
        for _ in 0..120 {
            let events = body.tick(DT, &world);
            changes.extend(events.mode_changes);
            landed |= events.landed;
        }

        assert!(changes.is_empty(), "mode changes: {changes:?}");
        assert!(!landed);
        assert_eq!(body.movement_mode(), MovementMode::Walking);
        assert_relative_eq!(body.feet_location().y, FLOOR_GAP, epsilon = 0.05);
        assert_relative_eq!(body.location().x, 300.0 - 34.0, epsilon = 0.5);
        assert!(body.location().z.abs() < 0.5, "drifted to z = {}", body.location().z);
        assert!(body.jump());
    }

    #[test]
    fn test_crouched_body_cannot_jump() {
        let world = create_test_world();
        let mut body = spawned(&world);
        body.set_crouched(true);
        assert!(!body.jump());
        assert_eq!(body.movement_mode(), MovementMode::Walking);
    }

    #[test]
    fn test_launch_overrides_only_requested_axes() {
        let world = create_test_world();
        let mut body = spawned(&world);
        body.set_velocity(Vec3::new(600.0, 0.0, 0.0));

        body.launch(Vec3::new(0.0, 500.0, 0.0), false, true);
        let events = body.tick(DT, &world);

        assert_eq!(body.movement_mode(), MovementMode::Falling);
        assert_eq!(events.mode_changes.len(), 1);
        assert_relative_eq!(body.velocity().x, 600.0, epsilon = 0.01);
        assert_relative_eq!(body.velocity().y, 500.0 - 980.0 * DT, epsilon = 0.01);
    }

    #[test]
    fn test_impulse_velocity_change() {
        let world = create_test_world();
        let mut body = spawned(&world);
        body.set_crouched(true);
        body.set_movement_params(MovementParams {
            ground_friction: 0.0,
            braking_deceleration_walking: 0.0,
            ..MovementParams::default()
        });

        body.add_impulse(Vec3::new(800.0, 0.0, 0.0), true);
        body.tick(DT, &world);

        assert_eq!(body.movement_mode(), MovementMode::Walking);
        assert_relative_eq!(body.velocity().x, 800.0, epsilon = 0.01);
    }

    #[test]
    fn test_collision_disabled_passes_through_walls() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(100.0, 0.0, 0.0), Vec3::new(10.0, 500.0, 500.0), ContentFlags::SOLID);

        let mut body = CharacterBody::new(BodyConfig::default(), Vec3::ZERO);
        body.set_movement_mode(MovementMode::Flying);
        body.set_collision_enabled(false);
        body.set_velocity(Vec3::new(600.0, 0.0, 0.0));

        for _ in 0..30 {
            body.tick(DT, &world);
        }

        assert!(body.location().x > 200.0);
    }

    #[test]
    fn test_facing_vectors() {
        let mut body = CharacterBody::new(BodyConfig::default(), Vec3::ZERO);
        assert!(body.forward_vector().abs_diff_eq(Vec3::X, 1e-5));
        assert!(body.right_vector().abs_diff_eq(Vec3::Z, 1e-5));

        body.set_yaw(std::f32::consts::FRAC_PI_2);
        assert!(body.forward_vector().abs_diff_eq(Vec3::Z, 1e-5));
        assert!(body.right_vector().abs_diff_eq(-Vec3::X, 1e-5));
    }

    #[test]
    fn test_crouch_hooks_track_offset() {
        let mut body = CharacterBody::new(BodyConfig::default(), Vec3::ZERO);
        body.on_start_crouch(48.0, 48.0);
        assert_eq!(body.crouch_offset(), 48.0);
        body.on_end_crouch(48.0, 48.0);
        assert_eq!(body.crouch_offset(), 0.0);
    }
}
