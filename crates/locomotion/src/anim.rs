//! Animation playback seam.
//!
//! Traversals play a clip and wait for the animation layer to report that it
//! finished. [`MontagePlayer`] is an in-memory player with fixed clip
//! lengths; the driver calls [`ParkourMovement::reset_traversal`] for each
//! finished clip it reports.
//!
//! [`ParkourMovement::reset_traversal`]: crate::movement::ParkourMovement::reset_traversal

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identifies one playback of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MontageHandle(u64);

/// Plays named clips.
pub trait AnimationPlayer {
    /// Start `clip`, replacing whatever was playing.
    fn play(&mut self, clip: &str) -> MontageHandle;

    /// Stop a playback early. Returns whether it was playing.
    fn stop(&mut self, handle: MontageHandle) -> bool;
}

/// A clip that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedMontage {
    pub handle: MontageHandle,
    pub clip: String,
}

#[derive(Debug, Clone)]
struct ActiveMontage {
    handle: MontageHandle,
    clip: String,
    remaining: f32,
}

/// Single-slot clip player with configured clip lengths.
#[derive(Debug, Clone)]
pub struct MontagePlayer {
    durations: HashMap<String, f32>,
    default_duration: f32,
    active: Option<ActiveMontage>,
    next_id: u64,
}

impl Default for MontagePlayer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl MontagePlayer {
    /// Player where unknown clips last `default_duration` seconds.
    pub fn new(default_duration: f32) -> Self {
        Self {
            durations: HashMap::new(),
            default_duration: default_duration.max(0.0),
            active: None,
            next_id: 0,
        }
    }

    /// Set the length of `clip`.
    pub fn with_clip(mut self, clip: impl Into<String>, duration: f32) -> Self {
        self.durations.insert(clip.into(), duration.max(0.0));
        self
    }

    /// Length `clip` plays for.
    pub fn duration(&self, clip: &str) -> f32 {
        self.durations.get(clip).copied().unwrap_or(self.default_duration)
    }

    /// Name of the clip currently playing.
    pub fn current_clip(&self) -> Option<&str> {
        self.active.as_ref().map(|montage| montage.clip.as_str())
    }

    /// Whether `handle` is still playing.
    pub fn is_playing(&self, handle: MontageHandle) -> bool {
        self.active.as_ref().is_some_and(|montage| montage.handle == handle)
    }

    /// Fraction of the current clip played, in `[0, 1]`.
    pub fn progress(&self) -> Option<f32> {
        self.active.as_ref().map(|montage| {
            let duration = self.duration(&montage.clip);
            if duration <= 0.0 {
                1.0
            } else {
                (1.0 - montage.remaining / duration).clamp(0.0, 1.0)
            }
        })
    }

    /// Advance playback; returns the clip that finished, if any.
    pub fn advance(&mut self, delta_time: f32) -> Option<FinishedMontage> {
        let montage = self.active.as_mut()?;
        montage.remaining -= delta_time;
        if montage.remaining > 0.0 {
            return None;
        }

        let finished = self.active.take()?;
        log::trace!("montage {} finished", finished.clip);
        Some(FinishedMontage {
            handle: finished.handle,
            clip: finished.clip,
        })
    }
}

impl AnimationPlayer for MontagePlayer {
    fn play(&mut self, clip: &str) -> MontageHandle {
        let handle = MontageHandle(self.next_id);
        self.next_id += 1;
        self.active = Some(ActiveMontage {
            handle,
            clip: clip.to_owned(),
            remaining: self.duration(clip),
        });
        log::debug!("playing montage {clip}");
        handle
    }

    fn stop(&mut self, handle: MontageHandle) -> bool {
        if self.is_playing(handle) {
            self.active = None;
            true
        } else {
            false
        }
    }
}
