//! Warp targets for traversal clips.
//!
//! Traversal clips are authored in place; the animation layer bends them
//! toward named world-space targets. [`TraversalAnimWarpBinder`] publishes
//! those targets for a detected obstacle.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::TraversalConfig;
use crate::traversal::{TraversalResult, TraversalType};

/// A named world-space pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpTarget {
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
}

/// Receives warp targets.
pub trait WarpTargetSink {
    /// Create or replace the target called `name`.
    fn set_target(&mut self, name: &str, position: Vec3, rotation: Quat);
}

/// In-memory name to target map.
#[derive(Debug, Clone, Default)]
pub struct WarpTargetRegistry {
    targets: HashMap<String, WarpTarget>,
}

impl WarpTargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target called `name`, if published.
    pub fn get(&self, name: &str) -> Option<&WarpTarget> {
        self.targets.get(name)
    }

    /// Remove a target. Returns it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<WarpTarget> {
        self.targets.remove(name)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }
}

impl WarpTargetSink for WarpTargetRegistry {
    fn set_target(&mut self, name: &str, position: Vec3, rotation: Quat) {
        log::trace!("warp target {name} at {position:?}");
        self.targets.insert(
            name.to_owned(),
            WarpTarget {
                name: name.to_owned(),
                position,
                rotation,
            },
        );
    }
}

/// Publishes start and end targets for a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalAnimWarpBinder {
    start_name: String,
    end_name: String,
}

impl TraversalAnimWarpBinder {
    pub fn new(start_name: impl Into<String>, end_name: impl Into<String>) -> Self {
        Self {
            start_name: start_name.into(),
            end_name: end_name.into(),
        }
    }

    /// Binder using the target names from `config`.
    pub fn from_config(config: &TraversalConfig) -> Self {
        Self::new(config.start_warp_target.clone(), config.end_warp_target.clone())
    }

    pub fn start_name(&self) -> &str {
        &self.start_name
    }

    pub fn end_name(&self) -> &str {
        &self.end_name
    }

    /// Publish targets for `result`. Does nothing when nothing was found.
    ///
    /// The start target sits on the obstacle's upper edge. A mantle climbs
    /// straight up, so its start keeps the feet column and takes only the
    /// obstacle height. The end target is the landing point.
    pub fn bind(
        &self,
        sink: &mut dyn WarpTargetSink,
        result: &TraversalResult,
        feet: Vec3,
        up: Vec3,
        rotation: Quat,
    ) {
        if !result.found {
            return;
        }

        let start = match result.traversal_type {
            TraversalType::Mantle => feet - up * up.dot(feet) + up * up.dot(result.upper_impact),
            _ => result.upper_impact,
        };

        sink.set_target(&self.start_name, start, rotation);
        sink.set_target(&self.end_name, result.landing_point, rotation);
    }
}
