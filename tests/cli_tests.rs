use clap::{CommandFactory, Parser};
use serialterm::cli::output::usage;
use serialterm::cli::Args;

/// CLI interface tests
#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_help() {
        let help = Args::command().render_long_help().to_string();

        assert!(help.contains("Usage:"));
        assert!(help.contains("[PORT]"));
        assert!(help.contains("--list"));
        assert!(help.contains("--config"));
        assert!(help.contains("Esc or Ctrl+C"));
    }

    #[test]
    fn test_no_arguments_is_not_an_error() {
        let args = Args::try_parse_from(["serialterm"]).unwrap();
        assert!(args.port.is_none());
        assert!(!args.list);
    }

    #[test]
    fn test_all_positionals() {
        let args = Args::try_parse_from(["serialterm", "com2", "19200", "decimal", "tab", "yes", "log.txt"]).unwrap();

        assert_eq!(args.port.as_deref(), Some("com2"));
        assert_eq!(args.speed.as_deref(), Some("19200"));
        assert_eq!(args.mode.as_deref(), Some("decimal"));
        assert_eq!(args.separator.as_deref(), Some("tab"));
        assert_eq!(args.echo.as_deref(), Some("yes"));
        assert_eq!(args.logfile.as_deref(), Some(std::path::Path::new("log.txt")));
    }

    #[test]
    fn test_too_many_positionals_rejected() {
        let result = Args::try_parse_from(["serialterm", "com1", "9600", "hex", "space", "no", "a.log", "extra"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_usage_text() {
        let text = usage("serialterm");
        assert!(text.contains("speed::= 300"));
        assert!(text.contains("Echo::= no | yes"));
        assert!(text.contains("logfilename::="));
    }
}
