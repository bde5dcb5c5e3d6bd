//! Process lifecycle: logging, panic hook, graceful shutdown.

use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::{http_server, Config, State};

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Run the service: initialize logging, build state, serve HTTP until a
/// shutdown signal arrives.
pub async fn spawn_service(config: &Config) {
    let _guards = init_logging(config);
    register_panic_logger();

    let state = match State::from_config(config).await {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("error creating server state: {err}");
            std::process::exit(3);
        }
    };

    let (graceful_waiter, _shutdown_tx, shutdown_rx) = graceful_shutdown_blocker();

    let http_config = http_server::Config::new(config.listen_addr, config.log_level);
    let server_handle = tokio::spawn(async move {
        if let Err(err) = http_server::run(http_config, state, shutdown_rx).await {
            tracing::error!("HTTP server error: {err}");
        }
    });

    let _ = graceful_waiter.await;

    if timeout(FINAL_SHUTDOWN_TIMEOUT, server_handle).await.is_err() {
        tracing::error!(
            "failed to shut down within {} seconds",
            FINAL_SHUTDOWN_TIMEOUT.as_secs()
        );
        std::process::exit(4);
    }
}

/// Initialize tracing with a non-blocking stdout layer and, when a log
/// directory is configured, a daily-rolling file layer.
///
/// Returns guards that must be kept alive for the duration of the program.
fn init_logging(config: &Config) -> Vec<tracing_appender::non_blocking::WorkerGuard> {
    let mut guards = Vec::new();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let stdout_env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(stdout_env_filter);

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = std::fs::create_dir_all(log_dir) {
            eprintln!("Warning: failed to create log directory {log_dir:?}: {err}");
        }

        let file_appender = tracing_appender::rolling::daily(log_dir, "shelf.log");
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);

        let file_env_filter = EnvFilter::builder()
            .with_default_directive(config.log_level.into())
            .from_env_lossy();

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_filter(file_env_filter);

        tracing_subscriber::registry()
            .with(stdout_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry().with(stdout_layer).init();
    }

    guards
}

/// Spawns a task that listens for SIGINT and SIGTERM and sends a shutdown
/// signal via a watch channel.
///
/// Returns the join handle, the sender (for programmatic shutdown), and the
/// receiver passed into the server loop.
fn graceful_shutdown_blocker() -> (JoinHandle<()>, watch::Sender<()>, watch::Receiver<()>) {
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    let (tx, rx) = watch::channel(());
    let signal_tx = tx.clone();

    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::debug!("shutting down immediately on SIGINT");
            }
            _ = sigterm.recv() => {
                // Give in-flight requests a moment before signaling.
                tokio::time::sleep(REQUEST_GRACE_PERIOD).await;
                tracing::debug!("initiating graceful shutdown on SIGTERM");
            }
        }

        let _ = signal_tx.send(());
    });

    (handle, tx, rx)
}

/// Registers a panic hook that logs panics using the `tracing` crate.
fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}
