// Serial module - serial port backend
pub mod client;
pub mod discovery;

pub use client::{open_channel, SerialReader, SerialWriter};
pub use discovery::{available_ports, PortSummary};
