//! Freerun Locomotion
//!
//! Parkour moves layered on a [`LocomotionBody`](freerun_physics::LocomotionBody).
//!
//! # Architecture
//!
//! - **Labels**: [`LocomotionState`] holds the Mode, Stance, Gait and Action
//!   labels and records every change
//! - **Controllers**: traversal detection, crouch resizing, wallrun and slide,
//!   each a small struct driven with the body and the collision world
//! - **Coordinator**: [`ParkourMovement`] owns the body, wires the
//!   controllers to input and body events, and talks to animation, warp
//!   targets and timers through [`MovementContext`]
//!
//! # Conventions
//!
//! 1. **Y up**: gravity pulls along -Y
//! 2. **Centimetres**: distances in cm, speeds in cm/s, angles in degrees
//! 3. **One action**: at most one of vault, mantle, wallrun or slide runs at a time

pub mod anim;
pub mod config;
pub mod crouch;
pub mod mode_bridge;
pub mod movement;
pub mod probe;
pub mod services;
pub mod slide;
pub mod state;
pub mod tags;
pub mod timer;
pub mod traversal;
pub mod wallrun;
pub mod warp;

// Re-export commonly used types
pub use anim::{AnimationPlayer, FinishedMontage, MontageHandle, MontagePlayer};
pub use config::{
    CheckDistance, ConfigError, CrouchConfig, ParkourConfig, SlideConfig, TraversalConfig,
    WallJumpVelocity, WallrunConfig,
};
pub use crouch::CrouchController;
pub use mode_bridge::MovementModeBridge;
pub use movement::{JumpOutcome, MovementContext, ParkourMovement};
pub use probe::CapsuleProbe;
pub use services::LocalServices;
pub use slide::SlideController;
pub use state::{LocomotionChange, LocomotionState, MAX_PENDING_CHANGES};
pub use tags::{Gait, LocomotionAction, LocomotionMode, Stance, UnknownLabel};
pub use timer::{TimerCallback, TimerHandle, TimerManager, TimerService};
pub use traversal::{TraversalDetector, TraversalResult, TraversalType};
pub use wallrun::WallrunController;
pub use warp::{TraversalAnimWarpBinder, WarpTarget, WarpTargetRegistry, WarpTargetSink};
