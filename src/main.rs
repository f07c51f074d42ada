//! hostupd binary entrypoint: logging setup and command dispatch.

mod args;

use std::fmt;
use std::process::ExitCode;
use std::sync::OnceLock;

use clap::Parser;
use hostupd::config::{Settings, logs_dir};

/// Log timestamp in local time.
struct HostupdTimer;

impl tracing_subscriber::fmt::time::FormatTime for HostupdTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        w.write_str(&chrono::Local::now().format("%Y-%m-%d-T %H:%M:%S").to_string())
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Initialise tracing to `<config>/logs/hostupd.log`, falling back to stderr.
///
/// Inputs:
/// - `level`: Default filter when `RUST_LOG` is unset.
fn init_logging(level: &str) {
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };
    let log_path = logs_dir().join("hostupd.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(HostupdTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            // Fallback: stderr logger
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(HostupdTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = args::Args::parse();

    let mut settings = Settings::load();
    if let Some(server) = &args.server {
        settings.server_url.clone_from(server);
    }
    if let Some(ms) = args.step_delay_ms {
        settings.step_delay_ms = ms;
    }
    let level = args::determine_log_level(
        args.verbose,
        args.log_level.as_deref(),
        &settings.log_level,
    );
    init_logging(&level);

    tracing::info!(server = %settings.server_url, command = ?args.command, "hostupd starting");
    let code = match args::dispatch(&args, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("hostupd: {err}");
            ExitCode::FAILURE
        }
    };
    tracing::info!("hostupd exited");
    code
}
