//! Content flags for collision filtering.
//!
//! Every brush in the world carries a set of content flags. Queries pass a
//! mask and only brushes whose contents intersect the mask can block them.

use serde::{Deserialize, Serialize};

/// Content flags describe what type of volume something is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    /// Empty space - nothing here.
    pub const EMPTY: Self = Self(0);

    /// Solid world geometry - walls, floors, ledges.
    pub const SOLID: Self = Self(1 << 0);

    /// Blocks character capsules but not visibility probes.
    pub const PLAYER_CLIP: Self = Self(1 << 1);

    /// Another character's capsule.
    pub const PLAYER_BODY: Self = Self(1 << 2);

    /// Trigger volume - never blocks movement or probes.
    pub const TRIGGER: Self = Self(1 << 3);

    /// Geometry that parkour probes must not climb or run along
    /// (glass panes, fences marked as no-traversal).
    pub const NO_TRAVERSAL: Self = Self(1 << 4);

    /// Mask for moving a character capsule.
    pub const MASK_PLAYER_SOLID: Self = Self(
        Self::SOLID.0 | Self::PLAYER_CLIP.0 | Self::PLAYER_BODY.0 | Self::NO_TRAVERSAL.0,
    );

    /// Mask for parkour probes (traversal, wallrun, slide).
    pub const MASK_VISIBILITY: Self = Self(Self::SOLID.0 | Self::PLAYER_BODY.0);

    /// Check if these flags contain a specific flag.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the given flags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ContentFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks() {
        let moving = ContentFlags::MASK_PLAYER_SOLID;
        assert!(moving.contains(ContentFlags::SOLID));
        assert!(moving.contains(ContentFlags::NO_TRAVERSAL));
        assert!(!moving.intersects(ContentFlags::TRIGGER));

        let probes = ContentFlags::MASK_VISIBILITY;
        assert!(probes.contains(ContentFlags::SOLID));
        assert!(!probes.intersects(ContentFlags::NO_TRAVERSAL));
        assert!(!probes.intersects(ContentFlags::PLAYER_CLIP));
    }

    #[test]
    fn test_bitor() {
        let combined = ContentFlags::SOLID | ContentFlags::TRIGGER;
        assert!(combined.contains(ContentFlags::SOLID));
        assert!(combined.contains(ContentFlags::TRIGGER));
        assert!(!combined.contains(ContentFlags::PLAYER_BODY));
    }
}
