use crate::domain::error::{TermError, TermResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

type Writer = Box<dyn Write + Send>;

struct SinkInner {
    console: Writer,
    log: Option<Writer>,
}

/// Console output plus optional session log.
///
/// Both session threads write here. Every call holds the lock for the whole
/// token, so a rendered byte and its separator are never split by an echo.
pub struct Sink {
    inner: Mutex<SinkInner>,
}

impl Sink {
    pub fn new(console: Writer) -> Self {
        Self {
            inner: Mutex::new(SinkInner { console, log: None }),
        }
    }

    pub fn with_log(console: Writer, log: Writer) -> Self {
        Self {
            inner: Mutex::new(SinkInner {
                console,
                log: Some(log),
            }),
        }
    }

    /// Creates the sink, truncating `log_path` when logging is requested
    pub fn open(console: Writer, log_path: Option<&Path>) -> TermResult<Self> {
        match log_path {
            Some(path) => {
                let file = File::create(path).map_err(|source| TermError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!("Logging session to {}", path.display());
                Ok(Self::with_log(console, Box::new(BufWriter::new(file))))
            }
            None => Ok(Self::new(console)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkInner> {
        // A panicked writer thread leaves the writers usable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Writes a rendered token to the console and, when enabled, the log
    pub fn emit(&self, token: &[u8]) -> TermResult<()> {
        let mut inner = self.lock();
        inner.console.write_all(token)?;
        if let Some(log) = inner.log.as_mut() {
            log.write_all(token)?;
        }
        Ok(())
    }

    /// Local echo of an operator keystroke, console only
    pub fn echo(&self, byte: u8) -> TermResult<()> {
        let mut inner = self.lock();
        inner.console.write_all(&[byte])?;
        inner.console.flush()?;
        Ok(())
    }

    /// Status text for the operator, never logged
    pub fn notice(&self, text: &str) -> TermResult<()> {
        let mut inner = self.lock();
        inner.console.write_all(text.as_bytes())?;
        inner.console.flush()?;
        Ok(())
    }

    pub fn flush(&self) -> TermResult<()> {
        let mut inner = self.lock();
        inner.console.flush()?;
        if let Some(log) = inner.log.as_mut() {
            log.flush()?;
        }
        Ok(())
    }

    /// Flushes everything and closes the log stream. Safe to call twice.
    pub fn close(&self) -> TermResult<()> {
        let mut inner = self.lock();
        if let Err(e) = inner.console.flush() {
            warn!("Failed to flush console: {}", e);
        }
        if let Some(mut log) = inner.log.take() {
            log.flush()?;
            debug!("Session log closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_emit_goes_to_console_and_log() {
        let console = SharedBuffer::default();
        let log = SharedBuffer::default();
        let sink = Sink::with_log(Box::new(console.clone()), Box::new(log.clone()));

        sink.emit(b"0x41 ").unwrap();
        sink.emit(b"0xa ").unwrap();

        assert_eq!(console.text(), "0x41 0xa ");
        assert_eq!(log.text(), "0x41 0xa ");
    }

    #[test]
    fn test_echo_and_notice_skip_log() {
        let console = SharedBuffer::default();
        let log = SharedBuffer::default();
        let sink = Sink::with_log(Box::new(console.clone()), Box::new(log.clone()));

        sink.notice("press Esc\n").unwrap();
        sink.echo(b'A').unwrap();

        assert_eq!(console.text(), "press Esc\nA");
        assert_eq!(log.text(), "");
    }

    #[test]
    fn test_close_twice() {
        let console = SharedBuffer::default();
        let log = SharedBuffer::default();
        let sink = Sink::with_log(Box::new(console.clone()), Box::new(log.clone()));
        sink.close().unwrap();
        sink.close().unwrap();

        // after close only the console is written
        sink.emit(b"late").unwrap();
        assert_eq!(console.text(), "late");
        assert_eq!(log.text(), "");
    }

    #[test]
    fn test_high_bytes_pass_through() {
        let console = SharedBuffer::default();
        let log = SharedBuffer::default();
        let sink = Sink::with_log(Box::new(console.clone()), Box::new(log.clone()));

        sink.emit(&[0xe9]).unwrap();

        assert_eq!(*console.0.lock().unwrap(), vec![0xe9]);
        assert_eq!(*log.0.lock().unwrap(), vec![0xe9]);
    }

    #[test]
    fn test_open_truncates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        std::fs::write(&path, "stale content").unwrap();

        let sink = Sink::open(Box::new(SharedBuffer::default()), Some(&path)).unwrap();
        sink.emit(b"A").unwrap();
        sink.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A");
    }

    #[test]
    fn test_open_reports_bad_log_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("session.log");

        let result = Sink::open(Box::new(SharedBuffer::default()), Some(&path));
        assert!(matches!(result, Err(TermError::LogFile { .. })));
    }
}
