//! Tracing initialization: env filter with an `info`/`warn` fallback,
//! optional log file under the platform data dir. A CLI run is free to
//! log straight to stderr.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global tracing subscriber. Call once, at process start.
///
/// Logs to stderr unless `REDTEAM_LOG_FILE` is set, in which case logs are
/// appended there instead (plain text, no ANSI codes, for easy grepping).
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    match std::env::var_os("REDTEAM_LOG_FILE").map(PathBuf::from) {
        Some(path) => match open_log_file(&path) {
            Ok(file) => {
                tracing_subscriber::registry()
                    .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                    .with(env_filter)
                    .init();
                tracing::info!(path = %path.display(), "logging to file");
            }
            Err(e) => {
                tracing_subscriber::registry()
                    .with(fmt::layer())
                    .with(env_filter)
                    .init();
                tracing::warn!(path = %path.display(), error = %e, "failed to open log file, logging to stderr");
            }
        },
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(env_filter)
                .init();
        }
    }
}

fn open_log_file(path: &PathBuf) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
