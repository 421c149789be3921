use crate::core::communication::{ChannelHandle, DeviceReader, DeviceWriter, POLL_SLICE};
use crate::domain::config::{Framing, ParityConfig};
use crate::domain::error::{TermError, TermResult};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Opens `port` with the given speed and framing and splits it into a
/// [`ChannelHandle`].
///
/// Flow control is off and DTR/RTS are asserted. Any failure along the way,
/// including the DTR/RTS writes and the handle clone, is `OpenFailed`.
pub fn open_channel(port: &str, baud_rate: u32, framing: &Framing) -> TermResult<ChannelHandle> {
    let open_failed = |source: serialport::Error| TermError::OpenFailed {
        port: port.to_string(),
        source,
    };

    let mut builder = serialport::new(port, baud_rate);

    builder = builder.data_bits(match framing.data_bits {
        5 => serialport::DataBits::Five,
        6 => serialport::DataBits::Six,
        7 => serialport::DataBits::Seven,
        8 => serialport::DataBits::Eight,
        other => return Err(open_failed(invalid_input(format!("Invalid data bits: {}", other)))),
    });

    builder = builder.stop_bits(match framing.stop_bits {
        1 => serialport::StopBits::One,
        2 => serialport::StopBits::Two,
        other => return Err(open_failed(invalid_input(format!("Invalid stop bits: {}", other)))),
    });

    builder = builder.parity(match framing.parity {
        ParityConfig::None => serialport::Parity::None,
        ParityConfig::Even => serialport::Parity::Even,
        ParityConfig::Odd => serialport::Parity::Odd,
    });

    builder = builder
        .flow_control(serialport::FlowControl::None)
        .timeout(POLL_SLICE);

    let mut read_port = builder.open().map_err(open_failed)?;
    read_port.write_data_terminal_ready(true).map_err(open_failed)?;
    read_port.write_request_to_send(true).map_err(open_failed)?;
    let write_port = read_port.try_clone().map_err(open_failed)?;

    info!("Opened {} at {} baud {}", port, baud_rate, framing);

    Ok(ChannelHandle::new(
        port,
        Box::new(SerialReader::new(read_port)),
        Box::new(SerialWriter::new(write_port)),
    ))
}

fn invalid_input(description: String) -> serialport::Error {
    serialport::Error::new(serialport::ErrorKind::InvalidInput, description)
}

/// Read half backed by a serial port
pub struct SerialReader {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl SerialReader {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        let timeout = port.timeout();
        Self { port, timeout }
    }
}

impl DeviceReader for SerialReader {
    fn read_within(&mut self, buf: &mut [u8], timeout: Duration) -> TermResult<usize> {
        if self.timeout != timeout {
            self.port
                .set_timeout(timeout)
                .map_err(|e| TermError::ReadFailed(e.into()))?;
            self.timeout = timeout;
        }

        match self.port.read(buf) {
            Ok(read) => Ok(read),
            Err(e) if is_transient(e.kind()) => Ok(0),
            Err(e) => Err(TermError::ReadFailed(e)),
        }
    }
}

/// Write half backed by a clone of the same serial port
pub struct SerialWriter {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl SerialWriter {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        let timeout = port.timeout();
        Self { port, timeout }
    }
}

impl DeviceWriter for SerialWriter {
    fn write_within(&mut self, bytes: &[u8], timeout: Duration) -> TermResult<usize> {
        if self.timeout != timeout {
            self.port
                .set_timeout(timeout)
                .map_err(|e| TermError::WriteFailed(e.into()))?;
            self.timeout = timeout;
        }

        let deadline = Instant::now() + timeout;
        let mut written = 0;
        while written < bytes.len() {
            match self.port.write(&bytes[written..]) {
                Ok(0) => return Err(TermError::WriteFailed(ErrorKind::WriteZero.into())),
                Ok(n) => written += n,
                Err(e) if is_transient(e.kind()) => {}
                Err(e) => return Err(TermError::WriteFailed(e)),
            }
            if written < bytes.len() && Instant::now() >= deadline {
                return Err(TermError::WriteTimedOut {
                    written,
                    expected: bytes.len(),
                });
            }
        }

        self.port.flush().map_err(TermError::WriteFailed)?;
        debug!("Sent {} bytes over serial", written);
        Ok(written)
    }
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_port_fails() {
        let result = open_channel("/dev/serialterm-no-such-port", 9600, &Framing::default());
        match result {
            Err(TermError::OpenFailed { port, .. }) => assert_eq!(port, "/dev/serialterm-no-such-port"),
            other => panic!("expected OpenFailed, got {:?}", other.map(|c| c.name().to_string())),
        }
    }

    #[test]
    fn test_invalid_framing_is_open_failure() {
        let framing = Framing {
            data_bits: 9,
            ..Framing::default()
        };
        let result = open_channel("/dev/null", 9600, &framing);
        assert!(matches!(result, Err(TermError::OpenFailed { .. })));

        let framing = Framing {
            stop_bits: 3,
            ..Framing::default()
        };
        let result = open_channel("/dev/null", 9600, &framing);
        assert!(matches!(result, Err(TermError::OpenFailed { .. })));
    }

    #[test]
    fn test_open_failure_message_has_os_text() {
        let err = open_channel("/dev/serialterm-no-such-port", 9600, &Framing::default())
            .err()
            .unwrap();
        let text = err.to_string();
        assert!(text.starts_with("Failed to open port /dev/serialterm-no-such-port: "));
        assert!(text.len() > "Failed to open port /dev/serialterm-no-such-port: ".len());
    }
}
