// Communication module - device channel, byte rendering and output sink
pub mod channel;
pub mod formatter;
pub mod sink;

pub use channel::{ChannelHandle, DeviceReader, DeviceWriter, ReadInterrupt, WriteSide, POLL_SLICE};
pub use formatter::{format_byte, render_batch, render_token};
pub use sink::Sink;
