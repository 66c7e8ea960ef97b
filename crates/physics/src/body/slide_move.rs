//! Collision response for a moving capsule.
//!
//! A move sweeps the capsule along its velocity; on contact the velocity is
//! clipped against every plane touched so far and the rest of the time step
//! continues along what is left. Walking moves may also step up low ledges.

use glam::Vec3;

use crate::collision::{GeometryQuery, QueryFilter, SweepHit};

use super::params::CapsuleDimensions;

/// Planes remembered within one move; also the sweep budget.
const MAX_CLIP_PLANES: usize = 5;

/// Clipping pushes slightly past the plane so the next sweep does not
/// start touching it.
const OVERBOUNCE: f32 = 1.001;

/// Blocked moves stop this far short of the contact along their path.
const CONTACT_SKIN: f32 = 0.03;

/// Remove the part of `velocity` heading into a plane with `normal`.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let into = velocity.dot(normal);
    let scaled = if into < 0.0 { into * overbounce } else { into / overbounce };
    velocity - normal * scaled
}

/// Where a move ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Whether anything got in the way.
    pub blocked: bool,
}

impl MoveResult {
    fn stopped(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            blocked: true,
        }
    }
}

/// Moves one capsule through a world.
pub struct CapsuleMover<'a> {
    world: &'a dyn GeometryQuery,
    radius: f32,
    half_height: f32,
    filter: QueryFilter,
}

impl<'a> CapsuleMover<'a> {
    pub fn new(world: &'a dyn GeometryQuery, capsule: CapsuleDimensions, filter: QueryFilter) -> Self {
        Self {
            world,
            radius: capsule.scaled_radius(),
            half_height: capsule.scaled_half_height(),
            filter,
        }
    }

    fn sweep(&self, start: Vec3, end: Vec3) -> SweepHit {
        self.world.sweep_capsule(start, end, self.radius, self.half_height, &self.filter)
    }

    /// Move for `delta_time`, sliding along whatever is hit.
    pub fn slide(&self, position: Vec3, velocity: Vec3, delta_time: f32) -> MoveResult {
        let original_velocity = velocity;
        let mut position = position;
        let mut velocity = velocity;
        let mut remaining = delta_time;
        let mut planes: Vec<Vec3> = Vec::with_capacity(MAX_CLIP_PLANES);

        while planes.len() < MAX_CLIP_PLANES {
            if velocity.length_squared() < 0.0001 || remaining <= 0.0 {
                break;
            }

            let hit = self.sweep(position, position + velocity * remaining);
            if !hit.blocking {
                return MoveResult {
                    position: hit.location,
                    velocity,
                    blocked: !planes.is_empty(),
                };
            }
            if hit.started_in_solid && hit.fraction < 0.001 {
                return MoveResult::stopped(position);
            }

            if hit.fraction > 0.0 {
                position = back_off(position, hit.location);
            }
            remaining *= 1.0 - hit.fraction;
            planes.push(hit.normal);

            match clip_against(velocity, original_velocity, &planes) {
                Some(clipped) => velocity = clipped,
                None => return MoveResult::stopped(position),
            }
        }

        MoveResult {
            position,
            velocity,
            blocked: true,
        }
    }

    /// Slide, and if blocked try again from `step_height` higher, then drop
    /// back down. The stepped move wins only when it went further and ended
    /// on a floor whose normal `y` reaches `walkable_floor_y`.
    pub fn step_slide(
        &self,
        position: Vec3,
        velocity: Vec3,
        delta_time: f32,
        step_height: f32,
        walkable_floor_y: f32,
    ) -> MoveResult {
        let flat = self.slide(position, velocity, delta_time);
        if !flat.blocked {
            return flat;
        }

        let up_hit = self.sweep(position, position + Vec3::Y * step_height);
        if up_hit.started_in_solid && up_hit.fraction < 0.001 {
            return flat;
        }

        let raised = self.slide(up_hit.location, velocity, delta_time);
        let drop = raised.position.y - position.y + 0.01;
        let down_hit = self.sweep(raised.position, raised.position - Vec3::Y * drop);
        let landed = if down_hit.started_in_solid && down_hit.fraction < 0.001 {
            raised.position
        } else {
            down_hit.location
        };

        let on_floor = down_hit.blocking && down_hit.normal.y >= walkable_floor_y;
        let further = horizontal(landed - position).length_squared() > horizontal(flat.position - position).length_squared();
        if !(on_floor && further) {
            return flat;
        }

        log::trace!("stepped up {:.1}", landed.y - position.y);
        MoveResult {
            position: landed,
            velocity: raised.velocity,
            blocked: false,
        }
    }
}

/// Velocity that respects every plane, or `None` when boxed in.
fn clip_against(velocity: Vec3, original_velocity: Vec3, planes: &[Vec3]) -> Option<Vec3> {
    let respects_others = |candidate: Vec3, skip: usize| {
        planes
            .iter()
            .enumerate()
            .all(|(index, plane)| index == skip || candidate.dot(*plane) >= -0.01)
    };

    let single = planes
        .iter()
        .enumerate()
        .map(|(index, plane)| (index, clip_velocity(velocity, *plane, OVERBOUNCE)))
        .find(|&(index, clipped)| respects_others(clipped, index));
    if let Some((_, clipped)) = single {
        return Some(clipped);
    }

    // Two planes: run along their crease
    let [first, second, ..] = planes else {
        return None;
    };
    let crease = first.cross(*second).normalize_or_zero();
    let along = crease * original_velocity.dot(crease);
    (along.dot(*first) >= -0.01 && along.dot(*second) >= -0.01).then_some(along)
}

/// `stop`, pulled back toward `start` by up to [`CONTACT_SKIN`].
fn back_off(start: Vec3, stop: Vec3) -> Vec3 {
    let travelled = stop - start;
    let length = travelled.length();
    if length <= CONTACT_SKIN {
        return start;
    }
    stop - travelled * (CONTACT_SKIN / length)
}

#[inline]
fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
