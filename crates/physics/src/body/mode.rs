//! Base movement modes and network roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Movement mode of the base simulation.
///
/// Each mode carries a dotted label (`Movement.Mode.Walking`, ...) so tools
/// and logs can refer to it the same way as locomotion labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// Not simulating.
    #[default]
    None,
    /// Walking on a floor.
    Walking,
    /// Walking on navigation data; treated as walking by the simulation.
    NavWalking,
    /// Airborne under gravity.
    Falling,
    /// Moving through a fluid volume.
    Swimming,
    /// Free flight without gravity (root motion, scripted moves).
    Flying,
}

impl MovementMode {
    /// All modes, in declaration order.
    pub const ALL: [MovementMode; 6] = [
        MovementMode::None,
        MovementMode::Walking,
        MovementMode::NavWalking,
        MovementMode::Falling,
        MovementMode::Swimming,
        MovementMode::Flying,
    ];

    /// Dotted label for this mode.
    pub fn tag_name(self) -> &'static str {
        match self {
            MovementMode::None => "Movement.Mode.None",
            MovementMode::Walking => "Movement.Mode.Walking",
            MovementMode::NavWalking => "Movement.Mode.NavWalking",
            MovementMode::Falling => "Movement.Mode.Falling",
            MovementMode::Swimming => "Movement.Mode.Swimming",
            MovementMode::Flying => "Movement.Mode.Flying",
        }
    }

    /// Look a mode up by its dotted label.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.tag_name() == name)
    }

    /// Walking or nav-walking.
    #[inline]
    pub fn is_grounded(self) -> bool {
        matches!(self, MovementMode::Walking | MovementMode::NavWalking)
    }

    /// Falling under gravity.
    #[inline]
    pub fn is_falling(self) -> bool {
        self == MovementMode::Falling
    }
}

impl fmt::Display for MovementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// Network role of a simulated body.
///
/// Only crouch resizing cares about it: mesh offset corrections are applied
/// for simulated proxies and for listen servers hosting a remote player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetRole {
    /// Single-player, nothing replicated.
    #[default]
    Standalone,
    /// Authoritative listen server.
    ListenServer {
        /// Whether the body is driven by a remote autonomous client.
        remote_autonomous: bool,
    },
    /// Locally controlled client predicting its own moves.
    AutonomousProxy,
    /// Remote body whose moves are replayed from the server.
    SimulatedProxy,
}

impl NetRole {
    /// Whether crouch resizing should shift the mesh translation offset.
    ///
    /// True for client-simulated crouches on simulated proxies, and for a
    /// listen server hosting a remote autonomous player.
    pub fn adjusts_mesh_offset(self, client_simulation: bool) -> bool {
        match self {
            NetRole::SimulatedProxy => client_simulation,
            NetRole::ListenServer { remote_autonomous } => remote_autonomous,
            _ => false,
        }
    }
}
