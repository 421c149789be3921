use crate::cli::args::Args;
use crate::cli::output::{ports_table, write_usage, BANNER};
use crate::core::communication::Sink;
use crate::core::session::run_session;
use crate::domain::error::TermResult;
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::console::{clear_screen, wait_for_key, CrosstermKeys, RawModeGuard, TerminalWriter};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::serial::{available_ports, open_channel};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, warn};

/// Process result of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

const EXE_NAME: &str = "serialterm";

/// Execute CLI command
pub fn execute_command(args: Args) -> TermResult<RunStatus> {
    if let Err(e) = init_logging(args.verbose) {
        eprintln!("{}", e);
    }

    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    let config = config_manager.load_or_default();

    if args.list {
        println!("{}", ports_table(&available_ports()?));
        return Ok(RunStatus::Success);
    }

    if let Some(path) = &args.write_config {
        config_manager.save_config_to_path(path, &config)?;
        println!("Configuration written to {}", path.display());
        return Ok(RunStatus::Success);
    }

    let mut stdout = io::stdout();

    let Some(port) = args.port.as_deref() else {
        writeln!(stdout, "{}", BANNER)?;
        write_usage(&mut stdout, EXE_NAME)?;
        wait_for_key()?;
        return Ok(RunStatus::Success);
    };

    let settings = Arc::new(args.session_settings(port, &config));

    let mut channel = match open_channel(&settings.port, settings.speed, &settings.framing) {
        Ok(channel) => channel,
        Err(e) => {
            error!("{}", e);
            writeln!(stdout, "{}\n", e)?;
            write_usage(&mut stdout, EXE_NAME)?;
            return Ok(RunStatus::Failure);
        }
    };

    let sink = match Sink::open(Box::new(TerminalWriter::stdout()), settings.log_path.as_deref()) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            channel.close();
            writeln!(stdout, "{}", e)?;
            return Ok(RunStatus::Failure);
        }
    };

    clear_screen(&mut stdout)?;
    let raw_mode = match RawModeGuard::enable() {
        Ok(guard) => guard,
        Err(e) => {
            channel.close();
            sink.close()?;
            return Err(e);
        }
    };
    sink.notice("press Esc or Ctrl+C to terminate\n")?;

    let report = run_session(Arc::clone(&settings), channel, Box::new(CrosstermKeys), sink);
    drop(raw_mode);
    let report = report?;

    if let Some(e) = &report.relay_failure {
        writeln!(stdout, "\n{}", e)?;
    }

    match report.outcome.error() {
        Some(e) if e.is_channel_failure() => {
            writeln!(stdout, "\nConnection to {} lost: {}", settings.port, e)?;
            Ok(RunStatus::Failure)
        }
        Some(e) => {
            writeln!(stdout, "\n{}", e)?;
            Ok(RunStatus::Failure)
        }
        None => {
            if report.statistics.bytes_received == 0 && report.statistics.bytes_sent == 0 {
                warn!("Session on {} saw no traffic", settings.port);
            }
            writeln!(stdout)?;
            Ok(RunStatus::Success)
        }
    }
}
