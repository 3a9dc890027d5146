//! Foreground monitoring with an interactive history reader

use anyhow::{Context, Result};
use cli_lib::repl::{self, Command, HELP};
use cli_lib::util;
use ff_core::verify_config;
use journal::HistoryLog;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use watcher::Monitor;

pub async fn run(
    hot: Option<PathBuf>,
    backup: Option<PathBuf>,
    config: &Path,
    log_dir: &Path,
) -> Result<()> {
    let target = verify_config(hot.as_deref(), backup.as_deref(), config)
        .context("Invalid configuration")?;
    let history = Arc::new(HistoryLog::open(log_dir)?);
    debug!("History log at {}", history.path().display());

    let handle = Monitor::start(&target, history.clone()).context("Failed to start monitoring")?;
    util::print_banner(&target);

    let outcome = command_loop(&history).await;

    handle.stop().await;
    println!("Exiting.");
    outcome
}

/// Serve interactive commands until `exit` or a termination signal
///
/// A closed stdin stops the reader but not the monitor; only a signal ends
/// it then.
async fn command_loop(history: &HistoryLog) -> Result<()> {
    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal?;
                info!("Termination signal received");
                return Ok(());
            }
            line = lines.recv(), if stdin_open => match line {
                Some(line) => {
                    if !execute(history, repl::parse(&line)) {
                        return Ok(());
                    }
                }
                None => {
                    debug!("Stdin closed; waiting for a termination signal");
                    stdin_open = false;
                }
            },
        }
    }
}

/// Read stdin lines on a detached thread
///
/// A blocking stdin read cannot be cancelled, so it must not live on the
/// runtime or shutdown would wait for the next line.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    util::print_error(format!("failed to read input: {e}"));
                    break;
                }
            }
        }
    });
    rx
}

/// Run one command; returns false when the user asked to exit
fn execute(history: &HistoryLog, command: Command) -> bool {
    match command {
        Command::Exit => return false,
        Command::Help => println!("{HELP}"),
        Command::Empty => {}
        Command::Log(query) => match query.run(history) {
            Ok(output) => util::print_framed(&output),
            Err(e) => util::print_error(format!("{e:#}")),
        },
        Command::Invalid(reason) => {
            util::print_error(format!("{reason} (type 'help' for commands)"))
        }
    }
    true
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl-C"),
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")
}
