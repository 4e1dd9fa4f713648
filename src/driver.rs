//! A [`FrameScheduler`] backed by a calloop event loop.
//!
//! Each scheduled frame is a one-shot [`Timer`] source on the loop. When it
//! fires, the callback given to [`LoopScheduler::new`] runs with the loop's
//! shared data, which is where the host keeps its surfaces.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};

use crate::scheduler::FrameScheduler;

type FrameCallback<D> = Rc<dyn Fn(&mut D)>;

/// Schedules frame ticks as calloop timers.
pub struct LoopScheduler<D: 'static> {
    handle: LoopHandle<'static, D>,
    on_frame: FrameCallback<D>,
    pending: Rc<RefCell<Option<RegistrationToken>>>,
    redraw: Cell<bool>,
}

impl<D: 'static> LoopScheduler<D> {
    pub fn new(handle: LoopHandle<'static, D>, on_frame: impl Fn(&mut D) + 'static) -> Self {
        Self {
            handle,
            on_frame: Rc::new(on_frame),
            pending: Rc::new(RefCell::new(None)),
            redraw: Cell::new(false),
        }
    }

    /// Whether a redraw was requested since the last call.
    pub fn take_redraw(&self) -> bool {
        self.redraw.replace(false)
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

impl<D: 'static> FrameScheduler for LoopScheduler<D> {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn schedule_frame(&self, delay: Duration) {
        self.cancel_frame();

        let pending = self.pending.clone();
        let on_frame = self.on_frame.clone();
        let inserted = self.handle.insert_source(
            Timer::from_duration(delay),
            move |_deadline, _: &mut (), data: &mut D| {
                // The source is dropped on return; forget its token before
                // the callback can schedule the next frame.
                pending.borrow_mut().take();
                on_frame(data);
                TimeoutAction::Drop
            },
        );

        match inserted {
            Ok(token) => *self.pending.borrow_mut() = Some(token),
            Err(err) => log::error!("Failed to schedule ripple frame: {}", err.error),
        }
    }

    fn cancel_frame(&self) {
        if let Some(token) = self.pending.borrow_mut().take() {
            self.handle.remove(token);
        }
    }

    fn request_redraw(&self) {
        self.redraw.set(true);
    }
}

impl<D: 'static> Drop for LoopScheduler<D> {
    fn drop(&mut self) {
        self.cancel_frame();
    }
}
