// serialterm - command line serial terminal
use anyhow::Context;
use clap::Parser;
use serialterm::cli::{execute_command, Args, RunStatus};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let status = execute_command(args).context("serialterm failed")?;
    Ok(match status {
        RunStatus::Success => ExitCode::SUCCESS,
        RunStatus::Failure => ExitCode::FAILURE,
    })
}
