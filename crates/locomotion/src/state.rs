//! Locomotion state bookkeeping.
//!
//! Four independent labels describe what the character is doing. Setters are
//! idempotent: writing the current value does nothing and records nothing.
//! Real changes are queued as [`LocomotionChange`] events for whoever mirrors
//! the state (animation, replication, logs). The queue keeps only the newest
//! [`MAX_PENDING_CHANGES`] events, so an owner that never drains it loses
//! history but not memory.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::tags::{Gait, LocomotionAction, LocomotionMode, Stance};

/// Most change events kept between drains.
pub const MAX_PENDING_CHANGES: usize = 256;

/// A label transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocomotionChange {
    /// Mode changed.
    Mode {
        from: Option<LocomotionMode>,
        to: Option<LocomotionMode>,
    },
    /// Stance changed.
    Stance { from: Stance, to: Stance },
    /// Gait changed.
    Gait { from: Gait, to: Gait },
    /// Action started, ended or switched.
    Action {
        from: Option<LocomotionAction>,
        to: Option<LocomotionAction>,
    },
}

/// Current locomotion labels.
///
/// Mode, stance and gait are steady-state and serialize; the action is
/// transient and is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocomotionState {
    mode: Option<LocomotionMode>,
    stance: Stance,
    gait: Gait,
    #[serde(skip)]
    action: Option<LocomotionAction>,
    #[serde(skip)]
    changes: VecDeque<LocomotionChange>,
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self {
            mode: Some(LocomotionMode::Grounded),
            stance: Stance::Standing,
            gait: Gait::Walking,
            action: None,
            changes: VecDeque::new(),
        }
    }
}

impl LocomotionState {
    /// Fresh state: grounded, standing, walking, no action.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode, if the base simulation maps to one.
    pub fn mode(&self) -> Option<LocomotionMode> {
        self.mode
    }

    /// Current stance.
    pub fn stance(&self) -> Stance {
        self.stance
    }

    /// Current gait.
    pub fn gait(&self) -> Gait {
        self.gait
    }

    /// Active action, if any.
    pub fn action(&self) -> Option<LocomotionAction> {
        self.action
    }

    /// Set the mode. Returns whether it changed.
    pub fn set_mode(&mut self, mode: Option<LocomotionMode>) -> bool {
        if self.mode == mode {
            return false;
        }
        self.record(LocomotionChange::Mode {
            from: self.mode,
            to: mode,
        });
        self.mode = mode;
        true
    }

    /// Set the stance. Returns whether it changed.
    pub fn set_stance(&mut self, stance: Stance) -> bool {
        if self.stance == stance {
            return false;
        }
        self.record(LocomotionChange::Stance {
            from: self.stance,
            to: stance,
        });
        self.stance = stance;
        true
    }

    /// Set the gait. Returns whether it changed.
    pub fn set_gait(&mut self, gait: Gait) -> bool {
        if self.gait == gait {
            return false;
        }
        self.record(LocomotionChange::Gait {
            from: self.gait,
            to: gait,
        });
        self.gait = gait;
        true
    }

    /// Set or clear the action. Returns whether it changed.
    ///
    /// There is a single action slot, so starting one replaces any other.
    pub fn set_action(&mut self, action: Option<LocomotionAction>) -> bool {
        if self.action == action {
            return false;
        }
        log::debug!(
            "action {} -> {}",
            self.action.map_or("none", LocomotionAction::tag_name),
            action.map_or("none", LocomotionAction::tag_name)
        );
        self.record(LocomotionChange::Action {
            from: self.action,
            to: action,
        });
        self.action = action;
        true
    }

    /// Whether the active action is `action`.
    #[inline]
    pub fn is_action(&self, action: LocomotionAction) -> bool {
        self.action == Some(action)
    }

    /// Wallrunning on either side.
    pub fn is_wallrunning(&self) -> bool {
        self.action.is_some_and(LocomotionAction::is_wallrun)
    }

    /// Sliding.
    pub fn is_sliding(&self) -> bool {
        self.is_action(LocomotionAction::Sliding)
    }

    /// Vaulting or mantling.
    pub fn is_traversing(&self) -> bool {
        self.action.is_some_and(LocomotionAction::is_traversal)
    }

    /// Pending change events, oldest first.
    pub fn changes(&self) -> &VecDeque<LocomotionChange> {
        &self.changes
    }

    /// Drain pending change events.
    pub fn take_changes(&mut self) -> Vec<LocomotionChange> {
        self.changes.drain(..).collect()
    }

    fn record(&mut self, change: LocomotionChange) {
        if self.changes.len() == MAX_PENDING_CHANGES {
            self.changes.pop_front();
        }
        self.changes.push_back(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = LocomotionState::new();
        assert_eq!(state.mode(), Some(LocomotionMode::Grounded));
        assert_eq!(state.stance(), Stance::Standing);
        assert_eq!(state.gait(), Gait::Walking);
        assert_eq!(state.action(), None);
        assert!(state.changes().is_empty());
    }

    #[test]
    fn test_setters_are_idempotent() {
        let mut state = LocomotionState::new();

        assert!(!state.set_mode(Some(LocomotionMode::Grounded)));
        assert!(state.set_mode(Some(LocomotionMode::InAir)));
        assert!(!state.set_mode(Some(LocomotionMode::InAir)));
        assert!(!state.set_stance(Stance::Standing));
        assert!(state.set_gait(Gait::Sprinting));
        assert!(!state.set_gait(Gait::Sprinting));
        assert!(state.set_action(Some(LocomotionAction::Sliding)));
        assert!(!state.set_action(Some(LocomotionAction::Sliding)));

        assert_eq!(
            state.take_changes(),
            vec![
                LocomotionChange::Mode {
                    from: Some(LocomotionMode::Grounded),
                    to: Some(LocomotionMode::InAir)
                },
                LocomotionChange::Gait {
                    from: Gait::Walking,
                    to: Gait::Sprinting
                },
                LocomotionChange::Action {
                    from: None,
                    to: Some(LocomotionAction::Sliding)
                },
            ]
        );
        assert!(state.take_changes().is_empty());
    }

    #[test]
    fn test_single_action_slot() {
        let mut state = LocomotionState::new();
        state.set_action(Some(LocomotionAction::WallrunningLeft));
        assert!(state.is_wallrunning());

        state.set_action(Some(LocomotionAction::Vaulting));
        assert!(!state.is_wallrunning());
        assert!(state.is_traversing());
        assert!(!state.is_sliding());

        state.set_action(None);
        assert_eq!(state.action(), None);
        assert!(!state.is_traversing());
    }

    #[test]
    fn test_undrained_changes_keep_newest() {
        let mut state = LocomotionState::new();
        for _ in 0..1000 {
            state.set_action(Some(LocomotionAction::Sliding));
            state.set_action(None);
        }

        assert_eq!(state.changes().len(), MAX_PENDING_CHANGES);
        assert_eq!(
            state.changes().back(),
            Some(&LocomotionChange::Action {
                from: Some(LocomotionAction::Sliding),
                to: None
            })
        );
        assert_eq!(state.take_changes().len(), MAX_PENDING_CHANGES);
        assert!(state.changes().is_empty());
    }

    #[test]
    fn test_action_is_not_persisted() {
        let mut state = LocomotionState::new();
        state.set_mode(Some(LocomotionMode::InAir));
        state.set_stance(Stance::Crouching);
        state.set_action(Some(LocomotionAction::Sliding));

        let json = serde_json::to_string(&state).expect("serialize");
        let restored: LocomotionState = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored.mode(), Some(LocomotionMode::InAir));
        assert_eq!(restored.stance(), Stance::Crouching);
        assert_eq!(restored.action(), None);
        assert!(restored.changes().is_empty());
    }
}
