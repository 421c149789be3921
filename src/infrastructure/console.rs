// Console module - crossterm keyboard and screen backend
use crate::core::session::{Key, KeyAction, KeySource, KeyStroke};
use crate::domain::error::{TermError, TermResult};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType};
use std::io::{self, Stdout, Write};
use tracing::{debug, warn};

/// Keeps the terminal in raw mode while alive
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> TermResult<Self> {
        terminal::enable_raw_mode()?;
        debug!("Raw mode enabled");
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// Clears the screen and homes the cursor
pub fn clear_screen(out: &mut impl Write) -> TermResult<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

/// Blocks until any key is pressed
pub fn wait_for_key() -> TermResult<()> {
    let _raw = RawModeGuard::enable()?;
    loop {
        if let Event::Key(_) = event::read()? {
            return Ok(());
        }
    }
}

/// Console writer for raw mode.
///
/// Raw mode turns off output post-processing, so `\n` is expanded to
/// `\r\n` here to keep newline separated output in the left column.
pub struct TerminalWriter<W: Write> {
    out: W,
}

impl TerminalWriter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Write for TerminalWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        for (i, &byte) in buf.iter().enumerate() {
            if byte == b'\n' {
                self.out.write_all(&buf[start..i])?;
                self.out.write_all(b"\r\n")?;
                start = i + 1;
            }
        }
        self.out.write_all(&buf[start..])?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Key events from the terminal via crossterm
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn next_key(&mut self) -> TermResult<KeyStroke> {
        let event = event::read().map_err(|e| TermError::Input(e.to_string()))?;
        Ok(key_stroke(&event))
    }
}

/// Maps a crossterm event onto the relay's key model
pub fn key_stroke(event: &Event) -> KeyStroke {
    match event {
        Event::Key(key) => KeyStroke {
            key: key_identity(key),
            action: match key.kind {
                KeyEventKind::Release => KeyAction::Release,
                KeyEventKind::Press | KeyEventKind::Repeat => KeyAction::Press,
            },
        },
        _ => KeyStroke {
            key: Key::Other,
            action: KeyAction::Press,
        },
    }
}

fn key_identity(key: &KeyEvent) -> Key {
    match key.code {
        KeyCode::Char(c) if c.is_ascii() => {
            let byte = c as u8;
            if key.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() {
                Key::Byte(byte.to_ascii_lowercase() & 0x1f)
            } else {
                Key::Byte(byte)
            }
        }
        KeyCode::Enter => Key::Byte(0x0d),
        KeyCode::Tab => Key::Byte(0x09),
        KeyCode::Backspace => Key::Byte(0x08),
        KeyCode::Esc => Key::Byte(0x1b),
        KeyCode::F(n) => Key::Function(n),
        _ => Key::Other,
    }
}
