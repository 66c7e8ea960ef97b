//! Locomotion labels.
//!
//! Each label family is a closed enum with a dotted name
//! (`Locomotion.Action.Sliding`, ...) for tooling and logs. Names parse back
//! with [`FromStr`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A label name that matches no variant of the requested family.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {family} label: {name:?}")]
pub struct UnknownLabel {
    /// Label family that was parsed.
    pub family: &'static str,
    /// The rejected name.
    pub name: String,
}

/// Defines a label enum with its dotted names and parsing.
macro_rules! locomotion_label {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Dotted label name.
            pub fn tag_name(self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.tag_name())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|label| label.tag_name() == s)
                    .ok_or_else(|| UnknownLabel {
                        family: stringify!($name),
                        name: s.to_owned(),
                    })
            }
        }
    };
}

locomotion_label! {
    /// Coarse locomotion mode derived from the base movement mode.
    pub enum LocomotionMode {
        /// Walking on a floor.
        Grounded => "Locomotion.Mode.Grounded",
        /// Airborne.
        InAir => "Locomotion.Mode.InAir",
    }
}

locomotion_label! {
    /// Body posture.
    pub enum Stance {
        /// Full-height capsule.
        Standing => "Locomotion.Stance.Standing",
        /// Crouched capsule.
        Crouching => "Locomotion.Stance.Crouching",
    }
}

locomotion_label! {
    /// Movement pace.
    pub enum Gait {
        /// Walking pace.
        Walking => "Locomotion.Gait.Walking",
        /// Running pace.
        Running => "Locomotion.Gait.Running",
        /// Sprinting pace.
        Sprinting => "Locomotion.Gait.Sprinting",
    }
}

locomotion_label! {
    /// Transient parkour action; at most one is active.
    pub enum LocomotionAction {
        /// Vaulting over a low obstacle.
        Vaulting => "Locomotion.Action.Vaulting",
        /// Climbing onto a tall obstacle.
        Mantling => "Locomotion.Action.Mantling",
        /// Running along a wall on the left.
        WallrunningLeft => "Locomotion.Action.WallrunningLeft",
        /// Running along a wall on the right.
        WallrunningRight => "Locomotion.Action.WallrunningRight",
        /// Sliding along the floor.
        Sliding => "Locomotion.Action.Sliding",
    }
}

impl LocomotionAction {
    /// Either wallrun side.
    #[inline]
    pub fn is_wallrun(self) -> bool {
        matches!(self, Self::WallrunningLeft | Self::WallrunningRight)
    }

    /// Vault or mantle.
    #[inline]
    pub fn is_traversal(self) -> bool {
        matches!(self, Self::Vaulting | Self::Mantling)
    }
}
