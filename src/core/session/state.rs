use crate::domain::error::TermError;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a session ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// Operator pressed a quit key
    OperatorQuit,
    /// The device stopped answering reads
    ChannelFailed(TermError),
    /// Forwarding a keystroke to the device failed
    WriteFailed(TermError),
    /// The keyboard could not be read
    InputFailed(TermError),
}

impl SessionOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, SessionOutcome::OperatorQuit)
    }

    pub fn error(&self) -> Option<&TermError> {
        match self {
            SessionOutcome::OperatorQuit => None,
            SessionOutcome::ChannelFailed(e)
            | SessionOutcome::WriteFailed(e)
            | SessionOutcome::InputFailed(e) => Some(e),
        }
    }

    pub fn into_error(self) -> Option<TermError> {
        match self {
            SessionOutcome::OperatorQuit => None,
            SessionOutcome::ChannelFailed(e)
            | SessionOutcome::WriteFailed(e)
            | SessionOutcome::InputFailed(e) => Some(e),
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::OperatorQuit => write!(f, "terminated by operator"),
            SessionOutcome::ChannelFailed(e) => write!(f, "device channel failed: {}", e),
            SessionOutcome::WriteFailed(e) => write!(f, "sending keystroke failed: {}", e),
            SessionOutcome::InputFailed(e) => write!(f, "keyboard input failed: {}", e),
        }
    }
}

/// Traffic counters updated by both loops
#[derive(Debug, Default)]
pub struct SessionStatistics {
    bytes_received: AtomicU64,
    batches_received: AtomicU64,
    bytes_sent: AtomicU64,
}

impl SessionStatistics {
    pub fn record_batch(&self, bytes: usize) {
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sent(&self, bytes: usize) {
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            batches_received: self.batches_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SessionStatistics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub bytes_received: u64,
    pub batches_received: u64,
    pub bytes_sent: u64,
}

/// Result of [`run_session`](super::run_session)
#[derive(Debug)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    /// Relay error that came in while the channel was already failing
    pub relay_failure: Option<TermError>,
    pub statistics: StatisticsSnapshot,
}
