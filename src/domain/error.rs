use std::path::PathBuf;
use thiserror::Error;

/// serialterm unified error type
#[derive(Error, Debug)]
pub enum TermError {
    #[error("Failed to open port {port}: {source}")]
    OpenFailed {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Read from device failed: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Write to device failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Write to device timed out ({written} of {expected} bytes sent)")]
    WriteTimedOut { written: usize, expected: usize },

    #[error("Device channel is closed")]
    ChannelClosed,

    #[error("Configuration error: {message}")]
    ConfigInvalid { message: String },

    #[error("Console error: {0}")]
    Console(#[from] std::io::Error),

    #[error("Failed to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Keyboard input error: {0}")]
    Input(String),
}

impl TermError {
    /// Whether the error ends a running session (as opposed to start-up problems)
    pub fn is_channel_failure(&self) -> bool {
        matches!(
            self,
            TermError::ReadFailed(_)
                | TermError::WriteFailed(_)
                | TermError::WriteTimedOut { .. }
                | TermError::ChannelClosed
        )
    }
}

pub type TermResult<T> = Result<T, TermError>;
