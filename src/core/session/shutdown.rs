use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const RUNNING: u8 = 0;
const STOP_REQUESTED: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle of one session as seen by both loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    StopRequested,
    Stopped,
}

/// Tri-state stop signal shared by the input relay and the receive loop.
///
/// The relay moves it to `StopRequested`, the receive loop moves it to
/// `Stopped` on exit. It never goes back to `Running`.
#[derive(Clone, Default)]
pub struct ShutdownFlag {
    state: Arc<AtomicU8>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ShutdownState {
        match self.state.load(Ordering::Acquire) {
            RUNNING => ShutdownState::Running,
            STOP_REQUESTED => ShutdownState::StopRequested,
            _ => ShutdownState::Stopped,
        }
    }

    /// Returns `true` if this call made the transition
    pub fn request_stop(&self) -> bool {
        self.state
            .compare_exchange(RUNNING, STOP_REQUESTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn mark_stopped(&self) {
        self.state.store(STOPPED, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state() != ShutdownState::Running
    }
}

impl fmt::Debug for ShutdownFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShutdownFlag").field(&self.state()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let flag = ShutdownFlag::new();
        assert_eq!(flag.state(), ShutdownState::Running);
        assert!(!flag.is_stop_requested());

        assert!(flag.request_stop());
        assert_eq!(flag.state(), ShutdownState::StopRequested);
        assert!(!flag.request_stop());

        flag.mark_stopped();
        assert_eq!(flag.state(), ShutdownState::Stopped);
        assert!(flag.is_stop_requested());
    }

    #[test]
    fn test_stopped_is_never_reset() {
        let flag = ShutdownFlag::new();
        flag.mark_stopped();
        assert!(!flag.request_stop());
        assert_eq!(flag.state(), ShutdownState::Stopped);
    }

    #[test]
    fn test_clones_share_state() {
        let flag = ShutdownFlag::new();
        let other = flag.clone();
        let handle = std::thread::spawn(move || other.request_stop());
        assert!(handle.join().unwrap());
        assert_eq!(flag.state(), ShutdownState::StopRequested);
    }
}
