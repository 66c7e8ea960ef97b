//! In-process implementations of the movement services.

use freerun_physics::GeometryQuery;

use crate::anim::{FinishedMontage, MontagePlayer};
use crate::movement::MovementContext;
use crate::timer::TimerManager;
use crate::warp::WarpTargetRegistry;

/// Animation, warp targets and timers for a standalone simulation.
#[derive(Debug, Default)]
pub struct LocalServices {
    pub animation: MontagePlayer,
    pub warp_targets: WarpTargetRegistry,
    pub timers: TimerManager,
}

impl LocalServices {
    pub fn new(animation: MontagePlayer) -> Self {
        Self {
            animation,
            ..Default::default()
        }
    }

    /// Borrow everything as a [`MovementContext`] over `world`.
    pub fn context<'a>(&'a mut self, world: &'a dyn GeometryQuery) -> MovementContext<'a> {
        MovementContext::new(world, &mut self.animation, &mut self.warp_targets, &mut self.timers)
    }

    /// Advance timers and animation. Returns the clip that finished, if any.
    pub fn advance(&mut self, delta_time: f32) -> Option<FinishedMontage> {
        self.timers.advance(delta_time);
        self.animation.advance(delta_time)
    }
}
