use super::receive::{ReceiveExit, ReceiveLoop};
use super::relay::{InputRelay, KeySource, RelayExit};
use super::shutdown::ShutdownFlag;
use super::state::{SessionOutcome, SessionReport, SessionStatistics};
use crate::core::communication::{ChannelHandle, Sink};
use crate::domain::{config::SessionSettings, error::{TermError, TermResult}};
use std::sync::Arc;
use std::thread;
use tracing::{info, info_span, warn};

/// Runs one terminal session to completion.
///
/// The input relay gets its own thread and the receive loop runs on the
/// calling thread. Once the receive loop has stopped the channel and the log
/// are closed, each exactly once. The relay is always joined when it started
/// the shutdown. After a channel failure it is joined only if it has already
/// finished; otherwise it may still be parked in the keyboard wait and is
/// left behind.
pub fn run_session(
    settings: Arc<SessionSettings>,
    mut channel: ChannelHandle,
    keys: Box<dyn KeySource>,
    sink: Arc<Sink>,
) -> TermResult<SessionReport> {
    let session_id = uuid::Uuid::new_v4().simple().to_string();
    let span = info_span!("session", id = %session_id, port = %channel.name());
    let _enter = span.enter();

    info!(
        "Session started: {} baud {}, mode {}, separator {}, echo {}",
        settings.speed,
        settings.framing,
        settings.mode,
        settings.separator,
        if settings.echo { "on" } else { "off" }
    );

    let shutdown = ShutdownFlag::new();
    let stats = Arc::new(SessionStatistics::default());

    let relay = InputRelay::new(
        Arc::clone(&settings),
        channel.write_side(),
        keys,
        Arc::clone(&sink),
        shutdown.clone(),
        Arc::clone(&stats),
    );
    let relay_span = span.clone();
    let relay_handle = thread::Builder::new()
        .name("input-relay".to_string())
        .spawn(move || {
            let _enter = relay_span.enter();
            relay.run()
        });
    let relay_handle = match relay_handle {
        Ok(handle) => handle,
        Err(e) => {
            channel.close();
            sink.close()?;
            return Err(e.into());
        }
    };

    let receive_exit = ReceiveLoop::new(&settings, &mut channel, &sink, &shutdown, &stats).run();

    channel.close();
    if let Err(e) = sink.close() {
        warn!("Closing session log failed: {}", e);
    }

    let mut relay_failure = None;
    let outcome = match receive_exit {
        ReceiveExit::ChannelFailed(e) => {
            if relay_handle.is_finished() {
                // ChannelClosed only means the relay noticed the teardown
                relay_failure = relay_outcome(relay_handle.join())
                    .into_error()
                    .filter(|relay_error| !matches!(relay_error, TermError::ChannelClosed));
                if let Some(relay_error) = &relay_failure {
                    warn!("Input relay also failed: {}", relay_error);
                }
            }
            SessionOutcome::ChannelFailed(e)
        }
        ReceiveExit::StopRequested => relay_outcome(relay_handle.join()),
    };

    let statistics = stats.snapshot();
    info!(
        "Session ended ({}): {} bytes received in {} batches, {} bytes sent",
        outcome, statistics.bytes_received, statistics.batches_received, statistics.bytes_sent
    );

    Ok(SessionReport {
        outcome,
        relay_failure,
        statistics,
    })
}

fn relay_outcome(joined: thread::Result<RelayExit>) -> SessionOutcome {
    match joined {
        Ok(RelayExit::QuitKey) => SessionOutcome::OperatorQuit,
        Ok(RelayExit::WriteFailed(e)) => SessionOutcome::WriteFailed(e),
        Ok(RelayExit::InputFailed(e)) => SessionOutcome::InputFailed(e),
        Err(_) => SessionOutcome::InputFailed(TermError::Input(
            "input relay thread panicked".to_string(),
        )),
    }
}
