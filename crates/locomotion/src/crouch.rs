//! Crouch-aware capsule resizing.
//!
//! Crouching shrinks the capsule's half-height (never its radius) and
//! uncrouching grows it back to the body's default size. Growing is only
//! committed when the larger capsule fits; otherwise the capsule, the body's
//! crouched flag and the stance label are all left untouched.
//!
//! Adjustments handed to the body's crouch hooks are measured against the
//! default capsule, not the current one.

use glam::Vec3;

use freerun_physics::{GeometryQuery, LocomotionBody, NetRole};

use crate::probe::CapsuleProbe;
use crate::state::LocomotionState;
use crate::tags::Stance;

/// Extra height added to the standing capsule when testing whether it fits.
const SWEEP_INFLATION: f32 = 0.001;

/// Gap kept under a capsule that stands up from a swept base.
const MIN_FLOOR_DIST: f32 = 1.9;

/// Closest an uncrouch may nudge a grounded capsule toward its floor.
const MIN_NUDGE_FLOOR_DIST: f32 = 0.001;

/// Resizes a body between its standing and crouched capsules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrouchController {
    client_simulation: bool,
}

impl CrouchController {
    /// `client_simulation` mirrors a remote body's replicated crouch: the
    /// capsule resizes but no fit tests run and the crouched flag is left
    /// to replication.
    pub fn new(client_simulation: bool) -> Self {
        Self { client_simulation }
    }

    pub fn client_simulation(&self) -> bool {
        self.client_simulation
    }

    /// Shrink to the crouched capsule. Returns whether the body is now crouched.
    pub fn crouch<B>(&self, body: &mut B, world: &dyn GeometryQuery, state: &mut LocomotionState) -> bool
    where
        B: LocomotionBody + ?Sized,
    {
        if !self.client_simulation && !(body.is_falling() || body.is_moving_on_ground()) {
            return false;
        }

        let crouched_half_height = body.crouched_half_height();
        if body.capsule().half_height == crouched_half_height {
            if !self.client_simulation {
                body.set_crouched(true);
            }
            body.on_start_crouch(0.0, 0.0);
            state.set_stance(Stance::Crouching);
            return true;
        }

        let default_capsule = body.default_capsule();
        if self.client_simulation && body.net_role() == NetRole::SimulatedProxy {
            // Proxies may hold a shrunken capsule; resize from the default one
            body.set_capsule_size(default_capsule.radius, default_capsule.half_height);
        }

        let capsule = body.capsule();
        let old_half_height = capsule.half_height;
        let old_radius = capsule.radius;
        let clamped_half_height = crouched_half_height.max(old_radius).max(0.0);
        body.set_capsule_size(old_radius, clamped_half_height);

        let scaled_adjust = (old_half_height - clamped_half_height) * capsule.scale;
        let down = body.gravity_direction();

        if !self.client_simulation {
            let probe = CapsuleProbe::from_capsule(body.capsule(), body.collision_filter());

            // Crouch height can be configured larger than standing
            if clamped_half_height > old_half_height
                && probe.overlaps(world, body.location() + down * scaled_adjust)
            {
                body.set_capsule_size(old_radius, old_half_height);
                log::debug!("crouch blocked: no room for a {clamped_half_height:.1} capsule");
                return false;
            }

            if body.crouch_maintains_base() {
                let start = body.location();
                let hit = probe.sweep(world, start, start + down * scaled_adjust);
                body.set_location(hit.location);
            }

            body.set_crouched(true);
        }

        let mesh_adjust = scaled_adjust;
        let half_height_adjust = default_capsule.half_height - clamped_half_height;
        body.on_start_crouch(half_height_adjust, half_height_adjust * capsule.scale);
        state.set_stance(Stance::Crouching);

        if self.adjusts_mesh(body) {
            let offset = body.mesh_translation_offset() - (-down) * mesh_adjust;
            body.set_mesh_translation_offset(offset);
        }

        true
    }

    /// Grow back to the default capsule. Returns whether the body is now
    /// standing; `false` means something overhead blocked it and nothing
    /// changed.
    pub fn uncrouch<B>(&self, body: &mut B, world: &dyn GeometryQuery, state: &mut LocomotionState) -> bool
    where
        B: LocomotionBody + ?Sized,
    {
        let default_capsule = body.default_capsule();
        let capsule = body.capsule();

        if capsule.half_height == default_capsule.half_height {
            if !self.client_simulation {
                body.set_crouched(false);
            }
            body.on_end_crouch(0.0, 0.0);
            state.set_stance(Stance::Standing);
            return true;
        }

        let current_half_height = capsule.scaled_half_height();
        let half_height_adjust = default_capsule.half_height - capsule.half_height;
        let scaled_adjust = half_height_adjust * capsule.scale;
        let location = body.location();
        let up = -body.gravity_direction();

        if !self.client_simulation {
            let filter = body.collision_filter();
            let standing = CapsuleProbe::new(
                capsule.scaled_radius(),
                current_half_height + SWEEP_INFLATION + scaled_adjust,
                filter,
            );

            let target = if body.crouch_maintains_base() {
                self.stand_keeping_base(body, world, &standing, location, up, current_half_height)
            } else {
                self.stand_in_place(world, &standing, location, up, capsule.scaled_radius(), current_half_height, scaled_adjust)
            };

            let Some(target) = target else {
                log::debug!("uncrouch blocked at {location:?}");
                return false;
            };

            body.set_location(target);
            body.set_crouched(false);
        }

        body.set_capsule_size(default_capsule.radius, default_capsule.half_height);
        body.on_end_crouch(half_height_adjust, scaled_adjust);
        state.set_stance(Stance::Standing);

        if self.adjusts_mesh(body) {
            let offset = body.mesh_translation_offset() + up * scaled_adjust;
            body.set_mesh_translation_offset(offset);
        }

        true
    }

    /// Grow around the current center, or stand up from just above whatever
    /// is underneath.
    #[allow(clippy::too_many_arguments)]
    fn stand_in_place(
        &self,
        world: &dyn GeometryQuery,
        standing: &CapsuleProbe,
        location: Vec3,
        up: Vec3,
        radius: f32,
        half_height: f32,
        scaled_adjust: f32,
    ) -> Option<Vec3> {
        if !standing.overlaps(world, location) {
            return Some(location);
        }
        if scaled_adjust <= 0.0 {
            return None;
        }

        let shrink = half_height - radius;
        let trace_distance = half_height - shrink;
        let short = CapsuleProbe::new(radius, half_height - shrink, standing.filter);
        let hit = short.sweep(world, location, location - up * trace_distance);
        if hit.started_in_solid {
            return None;
        }

        let distance_to_base = hit.fraction * trace_distance + short.half_height;
        let raised = location
            + up * (-distance_to_base + standing.half_height + SWEEP_INFLATION + MIN_FLOOR_DIST / 2.0);
        (!standing.overlaps(world, raised)).then_some(raised)
    }

    /// Grow upward from the current capsule bottom, nudging down toward the
    /// floor if something is just overhead.
    fn stand_keeping_base<B>(
        &self,
        body: &B,
        world: &dyn GeometryQuery,
        standing: &CapsuleProbe,
        location: Vec3,
        up: Vec3,
        half_height: f32,
    ) -> Option<Vec3>
    where
        B: LocomotionBody + ?Sized,
    {
        let mut standing_location = location + up * (standing.half_height - half_height);
        if !standing.overlaps(world, standing_location) {
            return Some(standing_location);
        }

        if !body.is_moving_on_ground() {
            return None;
        }
        let floor_distance = body.floor_distance().filter(|distance| *distance > MIN_NUDGE_FLOOR_DIST)?;
        standing_location -= up * (floor_distance - MIN_NUDGE_FLOOR_DIST);
        (!standing.overlaps(world, standing_location)).then_some(standing_location)
    }

    /// Mesh offsets snap instead of smoothing on proxies that resize locally
    /// and on listen servers hosting a remote player. Correction replays
    /// leave the offset alone.
    fn adjusts_mesh<B>(&self, body: &B) -> bool
    where
        B: LocomotionBody + ?Sized,
    {
        body.net_role().adjusts_mesh_offset(self.client_simulation) && !body.is_replaying()
    }
}
