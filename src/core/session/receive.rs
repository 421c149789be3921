use super::shutdown::ShutdownFlag;
use super::state::SessionStatistics;
use crate::core::communication::{formatter::render_token, ChannelHandle, Sink};
use crate::domain::{config::SessionSettings, error::{TermError, TermResult}};
use std::time::Duration;
use tracing::{debug, error, info};

/// Bytes taken from the device in one poll
pub const READ_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveState {
    Waiting,
    Draining,
    Stopped,
}

/// Why the receive loop stopped
#[derive(Debug)]
pub enum ReceiveExit {
    StopRequested,
    ChannelFailed(TermError),
}

/// Device to console pump.
///
/// Waits in bounded reads so the shutdown flag is looked at least once per
/// `wait_timeout`, and renders every batch in full before looking again.
/// Draining also checks the flag, so a device that never goes quiet cannot
/// hold the loop open after a quit.
pub struct ReceiveLoop<'a> {
    settings: &'a SessionSettings,
    channel: &'a mut ChannelHandle,
    sink: &'a Sink,
    shutdown: &'a ShutdownFlag,
    stats: &'a SessionStatistics,
    failure: Option<TermError>,
}

impl<'a> ReceiveLoop<'a> {
    pub fn new(
        settings: &'a SessionSettings,
        channel: &'a mut ChannelHandle,
        sink: &'a Sink,
        shutdown: &'a ShutdownFlag,
        stats: &'a SessionStatistics,
    ) -> Self {
        Self {
            settings,
            channel,
            sink,
            shutdown,
            stats,
            failure: None,
        }
    }

    /// Runs until a stop is requested or the channel fails.
    ///
    /// Marks the shutdown flag `Stopped` before returning.
    pub fn run(mut self) -> ReceiveExit {
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let mut state = ReceiveState::Waiting;

        while state != ReceiveState::Stopped {
            let next = match state {
                ReceiveState::Waiting => self.wait(&mut buf),
                ReceiveState::Draining => self.drain(&mut buf),
                ReceiveState::Stopped => ReceiveState::Stopped,
            };
            if next != state {
                debug!("Receive loop {:?} -> {:?}", state, next);
            }
            state = next;
        }

        self.shutdown.mark_stopped();
        match self.failure.take() {
            Some(e) => ReceiveExit::ChannelFailed(e),
            None => {
                info!("Receive loop stopped on request");
                ReceiveExit::StopRequested
            }
        }
    }

    fn wait(&mut self, buf: &mut [u8]) -> ReceiveState {
        match self.channel.read_available(buf, self.settings.wait_timeout) {
            Ok(0) if self.shutdown.is_stop_requested() => self.sweep(buf),
            Ok(0) => ReceiveState::Waiting,
            Ok(read) => self.render(&buf[..read]),
            Err(e) => self.fail(e),
        }
    }

    // One last zero-wait read so bytes that landed just before the stop
    // request are still rendered. Never loops.
    fn sweep(&mut self, buf: &mut [u8]) -> ReceiveState {
        match self.channel.read_available(buf, Duration::ZERO) {
            Ok(0) => ReceiveState::Stopped,
            Ok(read) => match self.render(&buf[..read]) {
                ReceiveState::Draining => ReceiveState::Stopped,
                failed => failed,
            },
            Err(e) => self.fail(e),
        }
    }

    fn drain(&mut self, buf: &mut [u8]) -> ReceiveState {
        if self.shutdown.is_stop_requested() {
            return self.sweep(buf);
        }
        match self.channel.read_available(buf, self.settings.drain_timeout) {
            Ok(0) => ReceiveState::Waiting,
            Ok(read) => self.render(&buf[..read]),
            Err(e) => self.fail(e),
        }
    }

    fn render(&mut self, batch: &[u8]) -> ReceiveState {
        self.stats.record_batch(batch.len());
        match self.emit_batch(batch) {
            Ok(()) => ReceiveState::Draining,
            Err(e) => self.fail(e),
        }
    }

    fn emit_batch(&self, batch: &[u8]) -> TermResult<()> {
        for &byte in batch {
            self.sink.emit(&render_token(byte, self.settings.mode, self.settings.separator))?;
        }
        self.sink.flush()
    }

    fn fail(&mut self, e: TermError) -> ReceiveState {
        error!("Receive loop failed on '{}': {}", self.channel.name(), e);
        self.failure = Some(e);
        ReceiveState::Stopped
    }
}
