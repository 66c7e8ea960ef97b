//! Geometry query service consumed by the parkour layer.
//!
//! [`GeometryQuery`] is the narrow surface probes talk to: capsule sweeps,
//! capsule overlaps and line traces. [`CollisionWorld`] implements it; tests
//! and embedders may substitute their own world representation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::ContentFlags;
use super::trace::{TraceResult, TraceShape};
use super::world::CollisionWorld;

/// Which brushes may block a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Content mask; a brush blocks only if its contents intersect this.
    pub mask: ContentFlags,
    /// Brush to skip, normally the querying body's own capsule.
    pub ignored_brush: Option<u32>,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self::new(ContentFlags::MASK_PLAYER_SOLID)
    }
}

impl QueryFilter {
    /// Filter on a content mask, ignoring nothing.
    pub fn new(mask: ContentFlags) -> Self {
        Self {
            mask,
            ignored_brush: None,
        }
    }

    /// Same filter, additionally skipping `brush`.
    pub fn ignoring(mut self, brush: u32) -> Self {
        self.ignored_brush = Some(brush);
        self
    }

    /// Whether a brush with this id and contents can block the query.
    #[inline]
    pub fn accepts(&self, brush: u32, contents: ContentFlags) -> bool {
        self.ignored_brush != Some(brush) && contents.intersects(self.mask)
    }
}

/// Outcome of a sweep or line trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepHit {
    /// Whether something blocked the sweep.
    pub blocking: bool,
    /// Whether the shape already overlapped geometry at the start.
    pub started_in_solid: bool,
    /// Fraction of the path travelled (1.0 when clear).
    pub fraction: f32,
    /// Shape center where the sweep stopped.
    pub location: Vec3,
    /// Contact point on the blocking surface (equals `location` when clear).
    pub point: Vec3,
    /// Surface normal at `point`, pointing away from the surface.
    pub normal: Vec3,
}

impl SweepHit {
    /// A sweep that reached `end` without touching anything.
    pub fn clear(end: Vec3) -> Self {
        Self {
            blocking: false,
            started_in_solid: false,
            fraction: 1.0,
            location: end,
            point: end,
            normal: Vec3::ZERO,
        }
    }
}

impl From<TraceResult> for SweepHit {
    fn from(trace: TraceResult) -> Self {
        if !trace.hit_something() {
            let mut clear = Self::clear(trace.end_position);
            clear.started_in_solid = trace.started_in_solid;
            return clear;
        }

        Self {
            blocking: true,
            started_in_solid: trace.started_in_solid,
            fraction: trace.fraction,
            location: trace.end_position,
            point: trace.impact_point.unwrap_or(trace.end_position),
            normal: trace.normal_or_up(),
        }
    }
}

/// Synchronous world queries used by parkour probes.
pub trait GeometryQuery {
    /// Sweep a vertical capsule (center to center) from `start` to `end`.
    fn sweep_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        filter: &QueryFilter,
    ) -> SweepHit;

    /// Whether a capsule centered at `center` overlaps blocking geometry.
    fn overlap_capsule(&self, center: Vec3, radius: f32, half_height: f32, filter: &QueryFilter) -> bool;

    /// Trace a line segment from `start` to `end`.
    fn line_trace(&self, start: Vec3, end: Vec3, filter: &QueryFilter) -> SweepHit;
}

impl GeometryQuery for CollisionWorld {
    fn sweep_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        filter: &QueryFilter,
    ) -> SweepHit {
        self.trace(start, end, TraceShape::capsule(radius, half_height), filter).into()
    }

    fn overlap_capsule(&self, center: Vec3, radius: f32, half_height: f32, filter: &QueryFilter) -> bool {
        self.overlaps(center, TraceShape::capsule(radius, half_height), filter)
    }

    fn line_trace(&self, start: Vec3, end: Vec3, filter: &QueryFilter) -> SweepHit {
        let delta = end - start;
        let length = delta.length();
        if length < 0.0001 {
            return SweepHit::clear(end);
        }

        let trace = self.raycast(start, delta, length, filter);
        if trace.hit_something() {
            trace.into()
        } else {
            SweepHit::clear(end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_wall() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        // Wall face at x=200
        world.add_box(Vec3::new(250.0, 100.0, 0.0), Vec3::new(50.0, 100.0, 500.0), ContentFlags::SOLID);
        world
    }

    #[test]
    fn test_filter_accepts() {
        let filter = QueryFilter::new(ContentFlags::MASK_VISIBILITY).ignoring(3);
        assert!(filter.accepts(1, ContentFlags::SOLID));
        assert!(!filter.accepts(3, ContentFlags::SOLID));
        assert!(!filter.accepts(1, ContentFlags::NO_TRAVERSAL));
    }

    #[test]
    fn test_sweep_capsule_reports_point_and_normal() {
        let world = world_with_wall();
        let hit = world.sweep_capsule(
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::new(400.0, 100.0, 0.0),
            34.0,
            88.0,
            &QueryFilter::default(),
        );

        assert!(hit.blocking);
        assert!((hit.point.x - 200.0).abs() < 1.0);
        assert!(hit.normal.x < -0.9);
        assert!(hit.location.x < 167.0);
    }

    #[test]
    fn test_line_trace_clear_reaches_end() {
        let world = world_with_wall();
        let end = Vec3::new(0.0, 100.0, 150.0);
        let hit = world.line_trace(Vec3::new(0.0, 100.0, 0.0), end, &QueryFilter::default());

        assert!(!hit.blocking);
        assert_eq!(hit.location, end);
        assert_eq!(hit.fraction, 1.0);
    }

    #[test]
    fn test_line_trace_hits_wall() {
        let world = world_with_wall();
        let hit = world.line_trace(
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::new(300.0, 100.0, 0.0),
            &QueryFilter::default(),
        );

        assert!(hit.blocking);
        assert!((hit.point.x - 200.0).abs() < 0.5);
        assert!((hit.fraction - 2.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_overlap_capsule() {
        let world = world_with_wall();
        let filter = QueryFilter::default();
        assert!(world.overlap_capsule(Vec3::new(180.0, 100.0, 0.0), 34.0, 88.0, &filter));
        assert!(!world.overlap_capsule(Vec3::new(100.0, 100.0, 0.0), 34.0, 88.0, &filter));
    }
}
