//! Frame loop driver
//!
//! Exactly one frame is ever pending per driver. Starting again cancels the
//! pending frame before scheduling a new one, and a callback for a frame that
//! is no longer pending is ignored, so a game can never be stepped twice per
//! refresh.

use std::collections::VecDeque;

use crate::engine::Runtime;
use crate::renderer::Surface;

/// Token identifying one scheduled frame
pub type FrameHandle = u32;

/// Source of display-refresh callbacks
pub trait FrameScheduler {
    /// Ask for one callback on the next refresh
    fn request(&mut self) -> FrameHandle;
    /// Withdraw a request that has not fired yet
    fn cancel(&mut self, handle: FrameHandle);
}

/// Runs a game once per refresh
#[derive(Debug)]
pub struct LoopDriver<S: FrameScheduler> {
    scheduler: S,
    pending: Option<FrameHandle>,
    /// Frames stepped and presented
    pub frames: u64,
    /// Frames skipped for lack of a surface
    pub skipped: u64,
}

impl<S: FrameScheduler> LoopDriver<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
            frames: 0,
            skipped: 0,
        }
    }

    /// Begin (or restart) the loop
    pub fn start(&mut self) {
        if let Some(handle) = self.pending.take() {
            log::debug!("loop restarted, cancelling frame {handle}");
            self.scheduler.cancel(handle);
        }
        self.pending = Some(self.scheduler.request());
    }

    /// Cancel the pending frame. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Refresh callback. Steps the game for the pending frame and schedules
    /// the next one; stale or cancelled handles do nothing. Returns whether
    /// the callback was accepted.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        runtime: &mut dyn Runtime,
        surface: Option<&mut dyn Surface>,
    ) -> bool {
        if self.pending != Some(handle) {
            log::trace!("ignoring stale frame {handle}");
            return false;
        }
        self.pending = None;

        if runtime.frame(surface) {
            self.frames += 1;
        } else {
            self.skipped += 1;
        }

        self.pending = Some(self.scheduler.request());
        true
    }
}

/// Scheduler driven by hand, for tests and headless runs
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: FrameHandle,
    queued: VecDeque<FrameHandle>,
    /// Number of `cancel` calls seen
    pub cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet fired or cancelled
    pub fn outstanding(&self) -> usize {
        self.queued.len()
    }

    /// Pop the oldest outstanding request, as if the display refreshed
    pub fn fire(&mut self) -> Option<FrameHandle> {
        self.queued.pop_front()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request(&mut self) -> FrameHandle {
        self.next = self.next.wrapping_add(1);
        self.queued.push_back(self.next);
        self.next
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.cancelled += 1;
        self.queued.retain(|h| *h != handle);
    }
}
