//! Rendering of received bytes into display tokens.
//!
//! A token is the text of one byte followed by the separator text. The two
//! mappings are independent and applied to every byte the same way, so a
//! stream of `n` bytes always renders as `n` joined tokens with no special
//! handling at the start or end. Tokens are raw bytes: ascii mode passes the
//! device byte through untouched, whatever its value.

use crate::domain::config::{DisplayMode, Separator};

/// Marker placed in front of every hex rendering
pub const HEX_MARKER: &str = "0x";

/// Bytes shown for a single device byte in the given display mode
pub fn format_byte(byte: u8, mode: DisplayMode) -> Vec<u8> {
    match mode {
        DisplayMode::Hex => format!("{}{:x}", HEX_MARKER, byte).into_bytes(),
        // Control and high bytes are emitted unescaped
        DisplayMode::Ascii => vec![byte],
        DisplayMode::Decimal => byte.to_string().into_bytes(),
    }
}

impl Separator {
    /// Text written after every rendered byte
    pub fn token(&self) -> &'static str {
        match self {
            Separator::Space => " ",
            Separator::Newline => "\n",
            Separator::Tab => "\t",
            Separator::Empty => "",
        }
    }
}

/// Byte rendering plus separator
pub fn render_token(byte: u8, mode: DisplayMode, separator: Separator) -> Vec<u8> {
    let mut token = format_byte(byte, mode);
    token.extend_from_slice(separator.token().as_bytes());
    token
}

/// Renders a whole batch in arrival order
pub fn render_batch(bytes: &[u8], mode: DisplayMode, separator: Separator) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&b| render_token(b, mode, separator))
        .collect()
}
