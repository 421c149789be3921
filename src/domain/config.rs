use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Baud rates listed in the usage text
pub const STANDARD_SPEEDS: &[u32] = &[300, 1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200, 230400];

/// serialterm configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TermConfig {
    /// Defaults for the positional arguments
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Line framing
    #[serde(default)]
    pub framing: Framing,
    /// Loop timeouts
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Defaults used when a positional argument is absent or unrecognised
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    #[serde(default = "default_speed")]
    pub speed: u32,
    #[serde(default)]
    pub mode: DisplayMode,
    #[serde(default)]
    pub separator: Separator,
    #[serde(default)]
    pub echo: bool,
}

/// Character framing on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Framing {
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default)]
    pub parity: ParityConfig,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    #[default]
    None,
    Odd,
    Even,
}

/// Bounded waits used by the two session loops
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_ms: u64,
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,
}

/// How a received byte is rendered
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Hex,
    #[default]
    Ascii,
    Decimal,
}

/// Text placed after every rendered byte
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    Space,
    Newline,
    Tab,
    #[default]
    #[serde(alias = "none")]
    Empty,
}

/// Immutable settings of one terminal session, shared read-only by both loops
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub port: String,
    pub speed: u32,
    pub framing: Framing,
    pub mode: DisplayMode,
    pub separator: Separator,
    pub echo: bool,
    pub log_path: Option<PathBuf>,
    pub wait_timeout: Duration,
    pub drain_timeout: Duration,
    pub write_timeout: Duration,
}

impl SessionSettings {
    /// Settings for `port` using built-in defaults everywhere else
    pub fn new(port: impl Into<String>) -> Self {
        Self::from_config(port, &TermConfig::default())
    }

    /// Settings for `port` taking every default from `config`
    pub fn from_config(port: impl Into<String>, config: &TermConfig) -> Self {
        Self {
            port: port.into(),
            speed: config.defaults.speed,
            framing: config.framing.clone(),
            mode: config.defaults.mode,
            separator: config.defaults.separator,
            echo: config.defaults.echo,
            log_path: None,
            wait_timeout: Duration::from_millis(config.timing.wait_timeout_ms),
            drain_timeout: Duration::from_millis(config.timing.drain_timeout_ms),
            write_timeout: Duration::from_millis(config.timing.write_timeout_ms),
        }
    }

    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }
}

impl DisplayMode {
    /// Recognises `hex`, `ascii`, `decimal` by leading letter
    pub fn from_arg(arg: &str) -> Option<Self> {
        match leading_letter(arg)? {
            'h' => Some(DisplayMode::Hex),
            'a' => Some(DisplayMode::Ascii),
            'd' => Some(DisplayMode::Decimal),
            _ => None,
        }
    }
}

impl Separator {
    /// Recognises `space`, `newline`, `tab`, `empty` by leading letter
    pub fn from_arg(arg: &str) -> Option<Self> {
        match leading_letter(arg)? {
            's' => Some(Separator::Space),
            'n' => Some(Separator::Newline),
            't' => Some(Separator::Tab),
            'e' => Some(Separator::Empty),
            _ => None,
        }
    }
}

/// Recognises `yes` / `no` by leading letter
pub fn echo_from_arg(arg: &str) -> Option<bool> {
    match leading_letter(arg)? {
        'y' => Some(true),
        'n' => Some(false),
        _ => None,
    }
}

/// Positive integer speeds only
pub fn speed_from_arg(arg: &str) -> Option<u32> {
    arg.trim().parse::<u32>().ok().filter(|&speed| speed > 0)
}

fn leading_letter(arg: &str) -> Option<char> {
    arg.trim().chars().next().map(|c| c.to_ascii_lowercase())
}

// Default value functions
fn default_speed() -> u32 {
    19200
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_wait_timeout() -> u64 {
    5000
}

fn default_drain_timeout() -> u64 {
    10
}

fn default_write_timeout() -> u64 {
    5000
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            mode: DisplayMode::default(),
            separator: Separator::default(),
            echo: false,
        }
    }
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            data_bits: default_data_bits(),
            parity: ParityConfig::None,
            stop_bits: default_stop_bits(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: default_wait_timeout(),
            drain_timeout_ms: default_drain_timeout(),
            write_timeout_ms: default_write_timeout(),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Hex => write!(f, "hex"),
            DisplayMode::Ascii => write!(f, "ascii"),
            DisplayMode::Decimal => write!(f, "decimal"),
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separator::Space => write!(f, "space"),
            Separator::Newline => write!(f, "newline"),
            Separator::Tab => write!(f, "tab"),
            Separator::Empty => write!(f, "empty"),
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parity = match self.parity {
            ParityConfig::None => 'N',
            ParityConfig::Odd => 'O',
            ParityConfig::Even => 'E',
        };
        write!(f, "{}{}{}", self.data_bits, parity, self.stop_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = TermConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: TermConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TermConfig = toml::from_str("[defaults]\nmode = \"hex\"\n").unwrap();

        assert_eq!(config.defaults.mode, DisplayMode::Hex);
        assert_eq!(config.defaults.speed, 19200);
        assert_eq!(config.defaults.separator, Separator::Empty);
        assert_eq!(config.framing, Framing::default());
        assert_eq!(config.timing.wait_timeout_ms, 5000);
    }

    #[test]
    fn test_separator_accepts_none_alias() {
        let config: TermConfig = toml::from_str("[defaults]\nseparator = \"none\"\n").unwrap();
        assert_eq!(config.defaults.separator, Separator::Empty);
    }

    #[test]
    fn test_lenient_argument_parsing() {
        assert_eq!(DisplayMode::from_arg("hex"), Some(DisplayMode::Hex));
        assert_eq!(DisplayMode::from_arg("HEXADECIMAL"), Some(DisplayMode::Hex));
        assert_eq!(DisplayMode::from_arg("d"), Some(DisplayMode::Decimal));
        assert_eq!(DisplayMode::from_arg("binary"), None);
        assert_eq!(DisplayMode::from_arg(""), None);

        assert_eq!(Separator::from_arg("newline"), Some(Separator::Newline));
        assert_eq!(Separator::from_arg("Tab"), Some(Separator::Tab));
        assert_eq!(Separator::from_arg("empty"), Some(Separator::Empty));
        assert_eq!(Separator::from_arg("comma"), None);

        assert_eq!(echo_from_arg("yes"), Some(true));
        assert_eq!(echo_from_arg("No"), Some(false));
        assert_eq!(echo_from_arg("maybe"), None);

        assert_eq!(speed_from_arg("115200"), Some(115200));
        assert_eq!(speed_from_arg("0"), None);
        assert_eq!(speed_from_arg("fast"), None);
    }

    #[test]
    fn test_session_settings_defaults() {
        let settings = SessionSettings::new("/dev/ttyUSB0");

        assert_eq!(settings.speed, 19200);
        assert_eq!(settings.mode, DisplayMode::Ascii);
        assert_eq!(settings.separator, Separator::Empty);
        assert!(!settings.echo);
        assert!(settings.log_path.is_none());
        assert_eq!(settings.wait_timeout, Duration::from_secs(5));
        assert_eq!(settings.framing.to_string(), "8N1");
    }
}
