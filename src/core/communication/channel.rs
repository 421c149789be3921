use crate::domain::error::{TermError, TermResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Longest single wait handed to a device backend.
///
/// Bounded reads are cut into polls of this length so an interrupt is
/// noticed without waiting out the caller's full timeout.
pub const POLL_SLICE: Duration = Duration::from_millis(50);

/// Read half of a device connection
pub trait DeviceReader: Send {
    /// Reads whatever arrives within `timeout` into `buf`.
    ///
    /// Returns `Ok(0)` when nothing arrived; a timeout is not an error.
    fn read_within(&mut self, buf: &mut [u8], timeout: Duration) -> TermResult<usize>;
}

/// Write half of a device connection
pub trait DeviceWriter: Send {
    /// Sends all of `bytes` or fails once `timeout` has passed
    fn write_within(&mut self, bytes: &[u8], timeout: Duration) -> TermResult<usize>;
}

/// Latching wake-up for in-flight reads. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct ReadInterrupt(Arc<AtomicBool>);

impl ReadInterrupt {
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

type SharedWriter = Arc<Mutex<Option<Box<dyn DeviceWriter>>>>;

/// Open duplex connection to the device.
///
/// The handle itself is the read side and belongs to the receive loop; the
/// input relay gets a [`WriteSide`]. Reads and writes therefore never share
/// a lock.
pub struct ChannelHandle {
    name: String,
    reader: Option<Box<dyn DeviceReader>>,
    writer: SharedWriter,
    interrupt: ReadInterrupt,
}

impl ChannelHandle {
    pub fn new(
        name: impl Into<String>,
        reader: Box<dyn DeviceReader>,
        writer: Box<dyn DeviceWriter>,
    ) -> Self {
        Self {
            name: name.into(),
            reader: Some(reader),
            writer: Arc::new(Mutex::new(Some(writer))),
            interrupt: ReadInterrupt::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle for the writing thread
    pub fn write_side(&self) -> WriteSide {
        WriteSide {
            writer: Arc::clone(&self.writer),
            interrupt: self.interrupt.clone(),
        }
    }

    /// Reads whatever is available, returning no later than `timeout`.
    ///
    /// Zero bytes means the wait ran out or reads were interrupted. Data the
    /// backend already holds is still returned after an interrupt.
    pub fn read_available(&mut self, buf: &mut [u8], timeout: Duration) -> TermResult<usize> {
        let reader = self.reader.as_mut().ok_or(TermError::ChannelClosed)?;
        let deadline = Instant::now() + timeout;

        loop {
            let slice = deadline.saturating_duration_since(Instant::now()).min(POLL_SLICE);
            let read = reader.read_within(buf, slice)?;
            if read > 0 {
                return Ok(read);
            }
            if self.interrupt.is_triggered() || Instant::now() >= deadline {
                return Ok(0);
            }
        }
    }

    pub fn interrupt_reads(&self) {
        self.interrupt.trigger();
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Releases both halves of the device. A second call does nothing.
    pub fn close(&mut self) {
        let reader = self.reader.take();
        let writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if reader.is_some() || writer.is_some() {
            info!("Closed channel '{}'", self.name);
        } else {
            debug!("Channel '{}' already closed", self.name);
        }
    }
}

/// Write access to a [`ChannelHandle`] for the input relay
#[derive(Clone)]
pub struct WriteSide {
    writer: SharedWriter,
    interrupt: ReadInterrupt,
}

impl WriteSide {
    pub fn write(&self, bytes: &[u8], timeout: Duration) -> TermResult<usize> {
        let mut guard = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let writer = guard.as_mut().ok_or(TermError::ChannelClosed)?;
        writer.write_within(bytes, timeout)
    }

    /// Wakes the reading thread early; used only when shutting down
    pub fn interrupt_reads(&self) {
        debug!("Interrupting pending device reads");
        self.interrupt.trigger();
    }
}
