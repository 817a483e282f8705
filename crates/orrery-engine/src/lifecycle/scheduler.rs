use std::collections::VecDeque;

/// Identifies one requested frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Cancellable frame requests.
///
/// Each request yields a fresh handle. When the frame fires, the host passes
/// that handle back to `RendererLifecycle::run_frame`; a handle that was
/// cancelled in the meantime is ignored there.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Bookkeeping for pending frame requests, fired in request order.
///
/// Hosts without an event loop (tests, headless tools) use it directly as a
/// scheduler; the window runtime wraps it and adds a redraw request.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requested frames that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Removes and returns the oldest pending frame.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.pop_front()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = FrameHandle(self.next_id);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
    }
}
