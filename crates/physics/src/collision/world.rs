//! Static brush geometry and the queries run against it.
//!
//! Brushes are parry3d shapes tagged with content flags. Sweeps are sampled
//! along the path and refined by bisection; rays go straight to parry.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{contact, Contact, Ray};
use parry3d::shape::SharedShape;

use super::flags::ContentFlags;
use super::query::QueryFilter;
use super::trace::{TraceResult, TraceShape};

/// Bisection steps after the sampling pass.
const REFINE_ITERATIONS: usize = 12;

/// Most samples one sweep takes before refining.
const MAX_COARSE_STEPS: usize = 256;

/// Contacts whose normal opposes the sweep by less than this are grazes.
const FACING_EPSILON: f32 = 0.01;

/// Sweeps shorter than this only test the start pose.
const MIN_SWEEP_DISTANCE: f32 = 0.0001;

/// One static collision shape.
#[derive(Debug, Clone)]
pub struct CollisionBrush {
    pub id: u32,
    pub shape: SharedShape,
    pub transform: Isometry<Real>,
    pub contents: ContentFlags,
}

/// Static level geometry.
///
/// Queries borrow the world immutably, so one world can serve bodies
/// updated on different threads.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    brushes: Vec<CollisionBrush>,
    next_id: u32,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis-aligned box centered at `center`. Returns its brush id.
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, contents: ContentFlags) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.brushes.push(CollisionBrush {
            id,
            shape: SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
            transform: isometry_at(center),
            contents,
        });
        id
    }

    /// Add a box standing on `footprint_center`, `height` tall.
    ///
    /// Courses describe ledges, walls and vault boxes by footprint and height.
    pub fn add_block(
        &mut self,
        footprint_center: Vec3,
        half_width_x: f32,
        half_width_z: f32,
        height: f32,
        contents: ContentFlags,
    ) -> u32 {
        let half_height = height * 0.5;
        self.add_box(
            footprint_center + Vec3::Y * half_height,
            Vec3::new(half_width_x, half_height, half_width_z),
            contents,
        )
    }

    /// Remove a brush. Returns whether it existed.
    pub fn remove_brush(&mut self, id: u32) -> bool {
        let before = self.brushes.len();
        self.brushes.retain(|brush| brush.id != id);
        self.brushes.len() != before
    }

    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Sweep `shape` from `start` to `end` and report the first blocking pose.
    pub fn trace(&self, start: Vec3, end: Vec3, shape: TraceShape, filter: &QueryFilter) -> TraceResult {
        let delta = end - start;
        let distance = delta.length();
        let started_in_solid = self.overlaps(start, shape, filter);

        if distance < MIN_SWEEP_DISTANCE {
            if !started_in_solid {
                return TraceResult::no_hit(start);
            }
            let mut result = self.blocked_result(0.0, start, start, shape, filter, delta);
            result.started_in_solid = true;
            result.all_solid = true;
            return result;
        }

        // Never step further than the shape is wide, or thin brushes slip through
        let step_length = shape.radius().max(1.0);
        let steps = ((distance / step_length).ceil() as usize).clamp(1, MAX_COARSE_STEPS);

        let mut clear_until = 0.0_f32;
        let first_blocked = (1..=steps).map(|i| i as f32 / steps as f32).find(|&t| {
            let blocked = self.overlaps(start + delta * t, shape, filter);
            if !blocked {
                clear_until = t;
            }
            blocked
        });

        let Some(mut blocked_at) = first_blocked else {
            let mut result = TraceResult::no_hit(end);
            result.started_in_solid = started_in_solid;
            return result;
        };

        for _ in 0..REFINE_ITERATIONS {
            let mid = (clear_until + blocked_at) * 0.5;
            if self.overlaps(start + delta * mid, shape, filter) {
                blocked_at = mid;
            } else {
                clear_until = mid;
            }
        }

        let mut result = self.blocked_result(
            clear_until,
            start + delta * clear_until,
            start + delta * blocked_at,
            shape,
            filter,
            delta,
        );
        result.started_in_solid = started_in_solid;
        result.all_solid = started_in_solid && clear_until < 0.001;
        result
    }

    /// Cast a ray up to `max_distance` along `direction`.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, filter: &QueryFilter) -> TraceResult {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return TraceResult::no_hit(origin);
        }

        let ray = Ray::new(Point::new(origin.x, origin.y, origin.z), Vector::new(dir.x, dir.y, dir.z));
        let nearest = self
            .candidates(filter)
            .filter_map(|brush| {
                brush
                    .shape
                    .cast_ray(&brush.transform, &ray, max_distance, true)
                    .map(|distance| (distance, brush))
            })
            .filter(|&(distance, _)| distance < max_distance)
            .min_by(|(a, _), (b, _)| a.total_cmp(b));

        let Some((distance, brush)) = nearest else {
            return TraceResult::no_hit(origin + dir * max_distance);
        };

        let point = origin + dir * distance;
        let normal = brush
            .shape
            .cast_ray_and_get_normal(&brush.transform, &ray, distance + 0.01, true)
            .and_then(|hit| to_vec3(hit.normal).try_normalize())
            .unwrap_or(-dir);
        TraceResult {
            fraction: distance / max_distance,
            end_position: point,
            impact_point: Some(point),
            hit_normal: Some(normal),
            hit_contents: brush.contents,
            started_in_solid: distance <= 0.0,
            all_solid: false,
            hit_brush: Some(brush.id),
        }
    }

    /// Whether `shape` centered at `position` touches any accepted brush.
    pub fn overlaps(&self, position: Vec3, shape: TraceShape, filter: &QueryFilter) -> bool {
        let probe = parry_shape(shape);
        let pose = isometry_at(position);
        self.candidates(filter)
            .any(|brush| contact_with(brush, &pose, &probe).is_some())
    }

    fn candidates<'a>(&'a self, filter: &'a QueryFilter) -> impl Iterator<Item = &'a CollisionBrush> + 'a {
        self.brushes.iter().filter(move |brush| filter.accepts(brush.id, brush.contents))
    }

    /// Trace result for a sweep first blocked at `contact_position`.
    ///
    /// The deepest contact facing the sweep supplies the point and normal.
    /// Surfaces the shape only grazes sideways are used only when nothing
    /// faces it.
    fn blocked_result(
        &self,
        fraction: f32,
        end_position: Vec3,
        contact_position: Vec3,
        shape: TraceShape,
        filter: &QueryFilter,
        direction: Vec3,
    ) -> TraceResult {
        let probe = parry_shape(shape);
        let pose = isometry_at(contact_position);

        let heading = direction.normalize_or_zero();
        let contacts: Vec<(Contact, &CollisionBrush)> = self
            .candidates(filter)
            .filter_map(|brush| contact_with(brush, &pose, &probe).map(|found| (found, brush)))
            .collect();
        let deepest = |facing_only: bool| {
            contacts
                .iter()
                .filter(|(found, _)| !facing_only || to_vec3(found.normal2.into_inner()).dot(heading) < -FACING_EPSILON)
                .min_by(|(a, _), (b, _)| a.dist.total_cmp(&b.dist))
                .copied()
        };

        match deepest(true).or_else(|| deepest(false)) {
            Some((found, brush)) => TraceResult {
                hit_contents: brush.contents,
                hit_brush: Some(brush.id),
                ..TraceResult::hit(fraction, end_position, to_vec3(found.point2.coords), to_vec3(found.normal2.into_inner()))
            },
            None => {
                let normal = (-direction).try_normalize().unwrap_or(Vec3::Y);
                TraceResult::hit(fraction, end_position, contact_position, normal)
            }
        }
    }
}

fn isometry_at(position: Vec3) -> Isometry<Real> {
    Isometry::translation(position.x, position.y, position.z)
}

fn to_vec3(v: Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Contact between `probe` at `pose` and a brush; `point2` and `normal2`
/// are on the brush side.
fn contact_with(brush: &CollisionBrush, pose: &Isometry<Real>, probe: &SharedShape) -> Option<Contact> {
    contact(pose, probe.as_ref(), &brush.transform, brush.shape.as_ref(), 0.0)
        .ok()
        .flatten()
}

fn parry_shape(shape: TraceShape) -> SharedShape {
    match shape {
        // parry measures capsules by the inner segment
        TraceShape::Capsule { radius, half_height } => {
            SharedShape::capsule_y((half_height - radius).max(0.0), radius)
        }
        TraceShape::Box { half_extents } => SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
        TraceShape::Point => SharedShape::ball(0.001),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solid() -> QueryFilter {
        QueryFilter::new(ContentFlags::MASK_PLAYER_SOLID)
    }

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor with its top face at y=0
        world.add_box(
            Vec3::new(0.0, -50.0, 0.0),
            Vec3::new(5000.0, 50.0, 5000.0),
            ContentFlags::SOLID,
        );

        // Wall whose near face is at x=1000
        world.add_box(
            Vec3::new(1050.0, 250.0, 0.0),
            Vec3::new(50.0, 250.0, 1000.0),
            ContentFlags::SOLID,
        );

        world
    }

    #[test]
    fn test_raycast_hit() {
        let world = create_test_world();

        let result = world.raycast(Vec3::new(0.0, 100.0, 0.0), Vec3::X, 5000.0, &solid());

        assert!(result.hit_something());
        assert!((result.end_position.x - 1000.0).abs() < 1.0);
        let normal = result.hit_normal.expect("normal");
        assert_relative_eq!(normal.x, -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_raycast_miss() {
        let world = create_test_world();

        let result = world.raycast(Vec3::new(0.0, 100.0, 0.0), -Vec3::X, 500.0, &solid());

        assert!(!result.hit_something());
        assert_eq!(result.fraction, 1.0);
    }

    #[test]
    fn test_trace_capsule_stops_before_wall() {
        let world = create_test_world();
        let shape = TraceShape::capsule(34.0, 88.0);

        let result = world.trace(
            Vec3::new(0.0, 90.0, 0.0),
            Vec3::new(1500.0, 90.0, 0.0),
            shape,
            &solid(),
        );

        assert!(result.hit_something());
        assert!(!result.started_in_solid);
        assert!(result.end_position.x < 1000.0 - 33.0);
        let impact = result.impact_point.expect("impact point");
        assert!((impact.x - 1000.0).abs() < 1.0, "impact x = {}", impact.x);
        let normal = result.hit_normal.expect("normal");
        assert!(normal.x < -0.9, "normal = {normal:?}");
    }

    #[test]
    fn test_trace_thin_brush_is_not_skipped() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(500.0, 0.0, 0.0), Vec3::new(1.0, 100.0, 100.0), ContentFlags::SOLID);

        let result = world.trace(
            Vec3::ZERO,
            Vec3::new(1000.0, 0.0, 0.0),
            TraceShape::capsule(10.0, 20.0),
            &solid(),
        );

        assert!(result.hit_something());
        assert!(result.end_position.x < 490.0);
    }

    #[test]
    fn test_overlaps() {
        let world = create_test_world();
        let shape = TraceShape::Point;

        assert!(world.overlaps(Vec3::new(0.0, -25.0, 0.0), shape, &solid()));
        assert!(!world.overlaps(Vec3::new(0.0, 100.0, 0.0), shape, &solid()));
    }

    #[test]
    fn test_filter_ignores_own_brush() {
        let mut world = CollisionWorld::new();
        let own = world.add_box(Vec3::ZERO, Vec3::splat(40.0), ContentFlags::PLAYER_BODY);

        let shape = TraceShape::capsule(10.0, 20.0);
        assert!(world.overlaps(Vec3::ZERO, shape, &solid()));
        assert!(!world.overlaps(Vec3::ZERO, shape, &solid().ignoring(own)));
    }

    #[test]
    fn test_content_mask_filtering() {
        let mut world = CollisionWorld::new();

        world.add_box(Vec3::new(500.0, 100.0, 0.0), Vec3::new(50.0, 100.0, 500.0), ContentFlags::SOLID);
        world.add_box(Vec3::new(300.0, 100.0, 0.0), Vec3::new(50.0, 100.0, 500.0), ContentFlags::TRIGGER);

        let result = world.raycast(Vec3::new(0.0, 100.0, 0.0), Vec3::X, 5000.0, &solid());

        assert!(result.hit_something());
        // Hits the wall at x=450, not the trigger at x=250
        assert!((result.end_position.x - 450.0).abs() < 1.0);
    }

    #[test]
    fn test_blocked_sweep_prefers_surface_it_moves_into() {
        let mut world = create_test_world();
        // Face at x=40: the capsule below sinks 1 into the floor and 4 into this wall
        world.add_box(Vec3::new(90.0, 250.0, 0.0), Vec3::new(50.0, 250.0, 500.0), ContentFlags::SOLID);
        let shape = TraceShape::capsule(34.0, 88.0);
        let pose = Vec3::new(10.0, 87.0, 0.0);

        let falling = world.blocked_result(0.5, pose, pose, shape, &solid(), Vec3::NEG_Y);
        let normal = falling.hit_normal.expect("normal");
        assert_relative_eq!(normal.y, 1.0, epsilon = 1e-3);

        let pushing = world.blocked_result(0.5, pose, pose, shape, &solid(), Vec3::X);
        let normal = pushing.hit_normal.expect("normal");
        assert_relative_eq!(normal.x, -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_add_block_and_remove() {
        let mut world = CollisionWorld::new();
        let id = world.add_block(Vec3::ZERO, 50.0, 50.0, 80.0, ContentFlags::SOLID);
        assert_eq!(world.brush_count(), 1);
        assert!(world.overlaps(Vec3::new(0.0, 79.0, 0.0), TraceShape::Point, &solid()));
        assert!(!world.overlaps(Vec3::new(0.0, 81.0, 0.0), TraceShape::Point, &solid()));

        assert!(world.remove_brush(id));
        assert!(!world.remove_brush(id));
        assert_eq!(world.brush_count(), 0);
    }
}
