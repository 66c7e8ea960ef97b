//! Freerun Physics
//!
//! Capsule collision and a base character simulation for parkour movement.
//!
//! # Architecture
//!
//! The crate is split into two main systems:
//!
//! - **Collision**: Sweeps capsules/boxes through the world, returns hit information
//! - **Body**: Uses collision sweeps to walk, fall and fly a capsule character
//!
//! # Conventions
//!
//! 1. **Y up**: gravity pulls along -Y
//! 2. **Centimetres**: distances in cm, speeds in cm/s
//! 3. **Centers**: shape and body positions are capsule centers

pub mod body;
pub mod collision;

// Re-export commonly used types
pub use body::{
    BodyConfig, BodyEvents, CapsuleDimensions, CharacterBody, LocomotionBody, ModeChange,
    MovementMode, MovementParams, NetRole,
};
pub use collision::{
    CollisionWorld, ContentFlags, GeometryQuery, QueryFilter, SweepHit, TraceResult, TraceShape,
};
