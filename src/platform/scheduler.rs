//! Frame scheduling abstraction
//!
//! The game loop never talks to a display callback directly. It asks a
//! [`FrameScheduler`] for the current time and for "one more frame", so a
//! browser host can back it with `requestAnimationFrame` while tests and the
//! headless runner drive a [`ManualScheduler`] deterministically.

/// Opaque id of a requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Clock plus "request next frame" capability supplied by the host
pub trait FrameScheduler {
    /// Current time in milliseconds (monotonic within a session)
    fn now(&self) -> f64;
    /// Ask the host to deliver one more frame
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a request; unknown or already-delivered handles are ignored
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Manually advanced clock for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    now: f64,
    next_handle: u64,
    pending: Vec<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at an arbitrary timestamp
    pub fn starting_at(now: f64) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// Move the clock forward and return the new time
    pub fn advance(&mut self, ms: f64) -> f64 {
        self.now += ms;
        self.now
    }

    /// Set the clock to an absolute time (may go backwards in tests)
    pub fn set_now(&mut self, now: f64) {
        self.now = now;
    }

    /// Number of outstanding frame requests
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending_frame(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Deliver the oldest outstanding request, as a display callback would
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.now
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
    }
}
