//! Base locomotion simulation.
//!
//! This module implements a walking/falling/flying capsule body with:
//!
//! - Ground movement with friction and braking
//! - Falling with gravity and limited air control
//! - Launches, impulses and jumps
//! - Multi-plane collision sliding and stair stepping
//!
//! # Design
//!
//! The parkour layer talks to a body only through [`LocomotionBody`];
//! [`CharacterBody`] is the implementation shipped with the crate. A tick
//! returns [`BodyEvents`] (mode changes, landings) that the owner forwards
//! to whatever listens for them.

mod character;
mod interface;
mod mode;
mod params;
mod slide_move;

pub use character::{CharacterBody, FloorHit, FLOOR_GAP};
pub use interface::{BodyEvents, LocomotionBody, ModeChange};
pub use mode::{MovementMode, NetRole};
pub use params::{BodyConfig, CapsuleDimensions, MovementParams};
pub use slide_move::{clip_velocity, CapsuleMover, MoveResult};
