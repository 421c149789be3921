use crate::domain::config::{
    echo_from_arg, speed_from_arg, DisplayMode, SessionSettings, Separator, TermConfig,
    STANDARD_SPEEDS,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// Command line arguments for serialterm.
///
/// The positional values are kept as plain strings: anything unrecognised
/// falls back to the configured default instead of being rejected.
#[derive(Parser, Debug, Default)]
#[command(
    name = "serialterm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Command line serial terminal",
    long_about = "Interactive terminal for serial devices. Incoming bytes are shown as hex, ascii or decimal, optionally separated and logged to a file. Press Esc or Ctrl+C to quit."
)]
pub struct Args {
    /// Serial port (com1, /dev/ttyUSB0, ...)
    pub port: Option<String>,

    /// Baud rate [default: 19200]
    pub speed: Option<String>,

    /// Display mode: ascii | hex | decimal [default: ascii]
    pub mode: Option<String>,

    /// Separator: empty | space | newline | tab [default: empty]
    pub separator: Option<String>,

    /// Local echo: no | yes [default: no]
    pub echo: Option<String>,

    /// Log received data to this file
    pub logfile: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List available serial ports and exit
    #[arg(short, long)]
    pub list: bool,

    /// Write the effective defaults as a configuration file and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,
}

impl Args {
    /// Merges the positional arguments over the configured defaults
    pub fn session_settings(&self, port: &str, config: &TermConfig) -> SessionSettings {
        let mut settings = SessionSettings::from_config(port, config);

        if let Some(arg) = &self.speed {
            match speed_from_arg(arg) {
                Some(speed) => {
                    if !STANDARD_SPEEDS.contains(&speed) {
                        warn!("Non-standard speed {} requested", speed);
                    }
                    settings.speed = speed;
                }
                None => warn!("Unrecognised speed '{}', using {}", arg, settings.speed),
            }
        }

        if let Some(arg) = &self.mode {
            match DisplayMode::from_arg(arg) {
                Some(mode) => settings.mode = mode,
                None => warn!("Unrecognised display mode '{}', using {}", arg, settings.mode),
            }
        }

        if let Some(arg) = &self.separator {
            match Separator::from_arg(arg) {
                Some(separator) => settings.separator = separator,
                None => warn!("Unrecognised separator '{}', using {}", arg, settings.separator),
            }
        }

        if let Some(arg) = &self.echo {
            match echo_from_arg(arg) {
                Some(echo) => settings.echo = echo,
                None => warn!("Unrecognised echo setting '{}', using {}", arg, settings.echo),
            }
        }

        settings.log_path = self.logfile.clone();
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::parse_from(["serialterm", "com1", "115200", "hex", "space", "no", "log.txt"]);
        let settings = args.session_settings(args.port.as_deref().unwrap(), &TermConfig::default());

        assert_eq!(settings.port, "com1");
        assert_eq!(settings.speed, 115200);
        assert_eq!(settings.mode, DisplayMode::Hex);
        assert_eq!(settings.separator, Separator::Space);
        assert!(!settings.echo);
        assert_eq!(settings.log_path, Some(PathBuf::from("log.txt")));
    }

    #[test]
    fn test_defaults_when_absent() {
        let args = Args::parse_from(["serialterm", "/dev/ttyUSB0"]);
        let settings = args.session_settings("/dev/ttyUSB0", &TermConfig::default());

        assert_eq!(settings.speed, 19200);
        assert_eq!(settings.mode, DisplayMode::Ascii);
        assert_eq!(settings.separator, Separator::Empty);
        assert!(!settings.echo);
        assert!(settings.log_path.is_none());
    }

    #[test]
    fn test_unrecognised_values_fall_back_to_config() {
        let mut config = TermConfig::default();
        config.defaults.mode = DisplayMode::Decimal;
        config.defaults.speed = 9600;

        let args = Args::parse_from(["serialterm", "com2", "fast", "octal", "comma", "perhaps"]);
        let settings = args.session_settings("com2", &config);

        assert_eq!(settings.speed, 9600);
        assert_eq!(settings.mode, DisplayMode::Decimal);
        assert_eq!(settings.separator, Separator::Empty);
        assert!(!settings.echo);
    }

    #[test]
    fn test_options() {
        let args = Args::parse_from(["serialterm", "--list", "-v", "-c", "my.toml"]);
        assert!(args.list);
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("my.toml")));
        assert!(args.port.is_none());
    }
}
