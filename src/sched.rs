//! Frame scheduling seam.
//!
//! The controller never owns an animation clock. It asks a
//! [`FrameScheduler`] for "one frame, soon"; the host runs its own loop
//! (requestAnimationFrame, a poll timeout, a test harness) and calls
//! `SyncController::on_frame()` when that frame fires. Cancellation by
//! handle keeps a torn-down controller from being touched by a stray
//! callback.

/// Opaque handle for one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub u64);

/// Host-supplied frame scheduling primitive.
pub trait FrameScheduler {
    /// Request that the host call `on_frame()` once, soon. Returns a
    /// handle usable for cancellation.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a previously requested frame. Cancelling an already-fired
    /// handle is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Single-slot scheduler for hosts with their own event loop.
///
/// `request_frame` sets a pending flag the host polls each loop iteration
/// (the demo viewer folds it into its frame-budget timeout, tests drain it
/// explicitly). Deterministic: no clock, no threads.
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a requested frame has not yet been taken.
    pub fn frame_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending request, if any. The host calls `on_frame()` once
    /// per taken request.
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_then_take() {
        let mut sched = QueuedScheduler::new();
        assert!(!sched.frame_pending());
        let h = sched.request_frame();
        assert!(sched.frame_pending());
        assert_eq!(sched.take_frame(), Some(h));
        assert!(!sched.frame_pending());
    }

    #[test]
    fn cancel_clears_pending() {
        let mut sched = QueuedScheduler::new();
        let h = sched.request_frame();
        sched.cancel_frame(h);
        assert_eq!(sched.take_frame(), None);
    }

    #[test]
    fn cancel_of_stale_handle_is_noop() {
        let mut sched = QueuedScheduler::new();
        let old = sched.request_frame();
        sched.take_frame();
        let new = sched.request_frame();
        sched.cancel_frame(old);
        assert_eq!(sched.take_frame(), Some(new));
    }

    #[test]
    fn handles_are_distinct() {
        let mut sched = QueuedScheduler::new();
        let a = sched.request_frame();
        sched.take_frame();
        let b = sched.request_frame();
        assert_ne!(a, b);
    }
}
