//! Scheduled callbacks.
//!
//! The parkour layer schedules exactly one kind of deferred work, the wallrun
//! re-arm. [`TimerService`] is the seam; [`TimerManager`] is a frame-driven
//! implementation that fires due callbacks from [`TimerManager::advance`].

use serde::{Deserialize, Serialize};

/// Identifies a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw id.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A fire-once callback.
pub type TimerCallback = Box<dyn FnOnce() + Send>;

/// Fire-once, cancelable delayed callbacks.
pub trait TimerService {
    /// Run `callback` once after `delay` seconds.
    fn schedule(&mut self, delay: f32, callback: TimerCallback) -> TimerHandle;

    /// Drop a pending callback. Returns whether it was still pending.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Whether the callback has neither fired nor been canceled.
    fn is_pending(&self, handle: TimerHandle) -> bool;
}

struct PendingTimer {
    handle: TimerHandle,
    due: f64,
    callback: TimerCallback,
}

/// Timers driven by explicit time steps.
#[derive(Default)]
pub struct TimerManager {
    now: f64,
    next_id: u64,
    pending: Vec<PendingTimer>,
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("now", &self.now)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds advanced so far.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of callbacks waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock and fire every callback that became due, earliest
    /// first. Returns how many fired.
    pub fn advance(&mut self, delta_time: f32) -> usize {
        self.now += f64::from(delta_time.max(0.0));

        let now = self.now;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|timer| timer.due <= now);
        self.pending = waiting;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.cmp(&b.handle)));
        let fired = due.len();
        for timer in due {
            log::trace!("timer {} fired", timer.handle.id());
            (timer.callback)();
        }
        fired
    }
}

impl TimerService for TimerManager {
    fn schedule(&mut self, delay: f32, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingTimer {
            handle,
            due: self.now + f64::from(delay.max(0.0)),
            callback,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        self.pending.len() != before
    }

    fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, TimerCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, Box::new(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn test_fires_once_when_due() {
        let mut timers = TimerManager::new();
        let (count, callback) = counter();
        let handle = timers.schedule(0.35, callback);

        assert_eq!(timers.advance(0.2), 0);
        assert!(timers.is_pending(handle));
        assert_eq!(timers.advance(0.2), 1);
        assert!(!timers.is_pending(handle));
        assert_eq!(timers.advance(1.0), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerManager::new();
        let (count, callback) = counter();
        let handle = timers.schedule(0.1, callback);

        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        timers.advance(1.0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut timers = TimerManager::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        for (delay, tag) in [(0.3, 'b'), (0.1, 'a'), (0.5, 'c')] {
            let order = Arc::clone(&order);
            timers.schedule(delay, Box::new(move || order.lock().expect("lock").push(tag)));
        }

        assert_eq!(timers.advance(1.0), 3);
        assert_eq!(*order.lock().expect("lock"), vec!['a', 'b', 'c']);
    }
}
