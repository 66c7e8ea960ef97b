//! Swept-shape queries and their results.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::ContentFlags;

/// Outcome of sweeping a shape center from `start` to `end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceResult {
    /// Portion of the path covered: `1.0` when nothing blocked it.
    pub fraction: f32,

    /// Where the shape center stopped, backed off slightly from any contact.
    pub end_position: Vec3,

    /// Contact point on the blocking brush.
    pub impact_point: Option<Vec3>,

    /// Blocking surface normal, facing the swept shape.
    pub hit_normal: Option<Vec3>,

    /// Contents of the blocking brush; empty when unblocked.
    pub hit_contents: ContentFlags,

    /// The shape already overlapped something at `start`.
    pub started_in_solid: bool,

    /// The shape never left solid geometry.
    pub all_solid: bool,

    /// Id of the blocking brush.
    pub hit_brush: Option<u32>,
}

impl Default for TraceResult {
    fn default() -> Self {
        Self::no_hit(Vec3::ZERO)
    }
}

impl TraceResult {
    /// Unblocked sweep ending at `end_position`.
    pub fn no_hit(end_position: Vec3) -> Self {
        Self {
            fraction: 1.0,
            end_position,
            impact_point: None,
            hit_normal: None,
            hit_contents: ContentFlags::EMPTY,
            started_in_solid: false,
            all_solid: false,
            hit_brush: None,
        }
    }

    /// Sweep blocked at `fraction` by solid geometry.
    pub fn hit(fraction: f32, end_position: Vec3, impact_point: Vec3, normal: Vec3) -> Self {
        Self {
            fraction,
            impact_point: Some(impact_point),
            hit_normal: Some(normal),
            hit_contents: ContentFlags::SOLID,
            ..Self::no_hit(end_position)
        }
    }

    #[inline]
    pub fn hit_something(&self) -> bool {
        self.fraction < 1.0
    }

    /// Blocking normal, or world up for an unblocked sweep.
    #[inline]
    pub fn normal_or_up(&self) -> Vec3 {
        self.hit_normal.unwrap_or(Vec3::Y)
    }
}

/// Shape swept by a trace, centered on the trace position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TraceShape {
    /// Upright capsule; `half_height` runs from the center to a cap tip.
    Capsule { radius: f32, half_height: f32 },

    /// Axis-aligned box.
    Box { half_extents: Vec3 },

    /// Ray.
    Point,
}

impl TraceShape {
    /// Capsule whose half-height is at least its radius.
    pub fn capsule(radius: f32, half_height: f32) -> Self {
        Self::Capsule {
            radius,
            half_height: half_height.max(radius),
        }
    }

    /// Horizontal reach from the center.
    pub fn radius(&self) -> f32 {
        match *self {
            Self::Capsule { radius, .. } => radius,
            Self::Box { half_extents } => half_extents.x.max(half_extents.z),
            Self::Point => 0.0,
        }
    }
}
