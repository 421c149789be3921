use super::shutdown::ShutdownFlag;
use super::state::SessionStatistics;
use crate::core::communication::{Sink, WriteSide};
use crate::domain::{config::SessionSettings, error::{TermError, TermResult}};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Escape ends the session
pub const ESCAPE: u8 = 0x1b;
/// Ctrl+C ends the session
pub const INTERRUPT: u8 = 0x03;
/// Function keys held back for baud rate switching (F2, F5)
pub const RESERVED_FUNCTION_KEYS: [u8; 2] = [2, 5];

/// Backend-neutral key identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Byte(u8),
    Function(u8),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

/// One keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: Key,
    pub action: KeyAction,
}

impl KeyStroke {
    pub fn press(byte: u8) -> Self {
        Self { key: Key::Byte(byte), action: KeyAction::Press }
    }

    pub fn release(byte: u8) -> Self {
        Self { key: Key::Byte(byte), action: KeyAction::Release }
    }

    pub fn function(number: u8, action: KeyAction) -> Self {
        Self { key: Key::Function(number), action }
    }
}

/// Source of operator key events
pub trait KeySource: Send {
    /// Blocks until the next key event
    fn next_key(&mut self) -> TermResult<KeyStroke>;
}

/// What the relay does with a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    Quit,
    Forward(u8),
    /// Placeholder for baud rate hot switching; does nothing
    Reserved(u8),
    Ignore,
}

pub fn classify(stroke: &KeyStroke) -> KeyDecision {
    match (stroke.key, stroke.action) {
        (Key::Function(n), KeyAction::Release) if RESERVED_FUNCTION_KEYS.contains(&n) => {
            KeyDecision::Reserved(n)
        }
        (Key::Byte(ESCAPE | INTERRUPT), _) => KeyDecision::Quit,
        (Key::Byte(byte), KeyAction::Press) if byte != 0 => KeyDecision::Forward(byte),
        _ => KeyDecision::Ignore,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Listening,
    Forwarding(u8),
    Quitting,
}

/// Why the input relay ended
#[derive(Debug)]
pub enum RelayExit {
    QuitKey,
    WriteFailed(TermError),
    InputFailed(TermError),
}

/// Operator to device pump; the only party that starts a shutdown
pub struct InputRelay {
    settings: Arc<SessionSettings>,
    writer: WriteSide,
    keys: Box<dyn KeySource>,
    sink: Arc<Sink>,
    shutdown: ShutdownFlag,
    stats: Arc<SessionStatistics>,
}

impl InputRelay {
    pub fn new(
        settings: Arc<SessionSettings>,
        writer: WriteSide,
        keys: Box<dyn KeySource>,
        sink: Arc<Sink>,
        shutdown: ShutdownFlag,
        stats: Arc<SessionStatistics>,
    ) -> Self {
        Self {
            settings,
            writer,
            keys,
            sink,
            shutdown,
            stats,
        }
    }

    pub fn run(mut self) -> RelayExit {
        let mut state = RelayState::Listening;
        let mut exit = RelayExit::QuitKey;

        loop {
            state = match state {
                RelayState::Listening => match self.keys.next_key() {
                    Ok(stroke) => self.listen(stroke),
                    Err(e) => {
                        error!("Reading keyboard failed: {}", e);
                        exit = RelayExit::InputFailed(e);
                        RelayState::Quitting
                    }
                },
                RelayState::Forwarding(byte) => match self.forward(byte) {
                    Ok(()) => RelayState::Listening,
                    Err(e) => {
                        error!("Sending 0x{:02x} to device failed: {}", byte, e);
                        exit = RelayExit::WriteFailed(e);
                        RelayState::Quitting
                    }
                },
                RelayState::Quitting => break,
            };
        }

        self.quit();
        exit
    }

    fn listen(&self, stroke: KeyStroke) -> RelayState {
        match classify(&stroke) {
            KeyDecision::Forward(byte) => RelayState::Forwarding(byte),
            KeyDecision::Quit => {
                info!("Quit key pressed");
                RelayState::Quitting
            }
            KeyDecision::Reserved(n) => {
                debug!("F{} released; baud rate switching is not available", n);
                RelayState::Listening
            }
            KeyDecision::Ignore => RelayState::Listening,
        }
    }

    fn forward(&self, byte: u8) -> TermResult<()> {
        let written = self.writer.write(&[byte], self.settings.write_timeout)?;
        self.stats.record_sent(written);

        if self.settings.echo {
            if let Err(e) = self.sink.echo(byte) {
                warn!("Local echo failed: {}", e);
            }
        }
        Ok(())
    }

    fn quit(&self) {
        if self.shutdown.request_stop() {
            debug!("Shutdown requested");
        }
        self.writer.interrupt_reads();
    }
}
