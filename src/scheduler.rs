//! Frame scheduling between a surface and its host.
//!
//! A surface never blocks and never owns a timer. It asks its
//! [`FrameScheduler`] for "call me back in about one frame" and for a repaint;
//! the host decides how those requests are served. [`ManualScheduler`] serves
//! them by hand with a virtual clock, and `driver::LoopScheduler` serves them
//! from a calloop event loop.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Delay between animation frames (60 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(1000 / 60);

/// What a surface needs from its host's render loop.
pub trait FrameScheduler {
    /// Current time on the render thread's clock.
    fn now(&self) -> Instant;

    /// Arrange for the surface's `on_frame` to run after `delay`.
    ///
    /// A surface has at most one pending frame; scheduling again replaces it.
    fn schedule_frame(&self, delay: Duration);

    /// Drop the pending frame, if any. Must take effect immediately.
    fn cancel_frame(&self);

    /// Ask the host to repaint the element.
    fn request_redraw(&self);
}

/// A scheduler with a virtual clock, advanced explicitly.
///
/// Hosts with their own loop can poll [`ManualScheduler::take_due`]; tests
/// use [`ManualScheduler::run_for`] to replay time deterministically.
#[derive(Debug)]
pub struct ManualScheduler {
    now: Cell<Instant>,
    due: Cell<Option<Instant>>,
    redraws: Cell<usize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            now: Cell::new(now),
            due: Cell::new(None),
            redraws: Cell::new(0),
        }
    }

    /// Move the clock forward without firing anything.
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// When the pending frame is due.
    pub fn pending_frame(&self) -> Option<Instant> {
        self.due.get()
    }

    /// Clear and report the pending frame if it is due now.
    pub fn take_due(&self) -> bool {
        match self.due.get() {
            Some(due) if due <= self.now.get() => {
                self.due.set(None);
                true
            }
            _ => false,
        }
    }

    /// Advance the clock by `duration`, calling `on_frame` at each frame that
    /// falls due along the way.
    pub fn run_for(&self, duration: Duration, mut on_frame: impl FnMut()) {
        let end = self.now.get() + duration;
        while let Some(due) = self.due.get().filter(|due| *due <= end) {
            if due > self.now.get() {
                self.now.set(due);
            }
            self.due.set(None);
            on_frame();
        }
        self.now.set(end);
    }

    /// Redraw requests since the last call.
    pub fn take_redraws(&self) -> usize {
        self.redraws.replace(0)
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn schedule_frame(&self, delay: Duration) {
        self.due.set(Some(self.now.get() + delay));
    }

    fn cancel_frame(&self) {
        self.due.set(None);
    }

    fn request_redraw(&self) {
        self.redraws.set(self.redraws.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval_is_sixty_fps() {
        assert_eq!(FRAME_INTERVAL, Duration::from_millis(16));
    }

    #[test]
    fn test_take_due_waits_for_clock() {
        let scheduler = ManualScheduler::new();
        scheduler.schedule_frame(FRAME_INTERVAL);
        assert!(!scheduler.take_due());
        scheduler.advance(FRAME_INTERVAL);
        assert!(scheduler.take_due());
        assert!(!scheduler.take_due());
    }

    #[test]
    fn test_run_for_fires_rescheduled_frames() {
        let scheduler = ManualScheduler::new();
        let start = scheduler.now();
        scheduler.schedule_frame(FRAME_INTERVAL);

        let mut fired = 0;
        scheduler.run_for(Duration::from_millis(100), || {
            fired += 1;
            scheduler.schedule_frame(FRAME_INTERVAL);
        });

        assert_eq!(fired, 6);
        assert_eq!(scheduler.now() - start, Duration::from_millis(100));
        assert!(scheduler.pending_frame().is_some());
    }

    #[test]
    fn test_cancel_and_redraw_counting() {
        let scheduler = ManualScheduler::new();
        scheduler.schedule_frame(FRAME_INTERVAL);
        scheduler.cancel_frame();
        assert_eq!(scheduler.pending_frame(), None);

        scheduler.request_redraw();
        scheduler.request_redraw();
        assert_eq!(scheduler.take_redraws(), 2);
        assert_eq!(scheduler.take_redraws(), 0);
    }
}
