//! Static level collision.
//!
//! [`CollisionWorld`] holds box brushes tagged with [`ContentFlags`] and
//! answers sweeps, overlaps and rays. Bodies and parkour probes go through
//! the [`GeometryQuery`] trait, whose sweeps report a [`SweepHit`]: blocked
//! or not, where the shape stopped, and the contact point and normal.

mod flags;
mod query;
mod trace;
mod world;

pub use flags::ContentFlags;
pub use query::{GeometryQuery, QueryFilter, SweepHit};
pub use trace::{TraceResult, TraceShape};
pub use world::{CollisionBrush, CollisionWorld};
