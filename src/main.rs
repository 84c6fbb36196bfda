//! Application entry point and runtime initialization.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;

mod app;
mod config;
mod consulta;
mod events;
mod fiscal;
mod form;
mod input;
mod layout;
mod shortcuts;
mod submit;
mod ui;
mod wizard;
mod worker;

/// Initialize file logging and keep the async guard alive.
fn init_logging() -> Result<WorkerGuard> {
    let log_file = "solicitacao_tui.log";
    // The TUI owns stdout, so logs go straight to a file.
    let file_appender = tracing_appender::rolling::never(".", log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    tracing::info!("logging to {}", log_file);
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_logging()?;
    tracing::info!("app starting");
    // The guard restores the terminal even when run_app errors out.
    let (mut terminal, _term_guard) = ui::init_terminal()?;
    let res = app::run_app(&mut terminal).await;
    if let Err(ref e) = res {
        tracing::error!("app error: {e}");
    }
    tracing::info!("app exiting");
    res
}
