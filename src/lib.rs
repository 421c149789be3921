//! serialterm Library
//!
//! Interactive serial terminal: an input relay forwards keystrokes to the
//! device while a receive loop renders incoming bytes as hex, ascii or
//! decimal to the console and an optional log file.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use domain::error::{TermError, TermResult};
pub use domain::config::{DisplayMode, SessionSettings, Separator, TermConfig};
pub use crate::core::communication::{ChannelHandle, DeviceReader, DeviceWriter, Sink};
pub use crate::core::session::{run_session, KeySource, KeyStroke, SessionOutcome, SessionReport};
