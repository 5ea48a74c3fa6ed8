//! Logging initialization.
//!
//! Every Librarium binary is a log producer: it calls [`init_logging`] once
//! at startup and uses standard `tracing` macros throughout. Structured
//! JSONL goes to a single central file (`~/.librarium/logs/dev.jsonl`) so
//! `tail -f ~/.librarium/logs/dev.jsonl | jq` works across invocations;
//! stderr output is opt-in for foreground use.

use crate::Paths;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "cli"). Included in every log line.
    pub service_name: String,
    /// Default log level filter. Can be overridden by `RUST_LOG`.
    pub default_level: String,
    /// Optional custom log file path. Defaults to `~/.librarium/logs/dev.jsonl`.
    pub log_path: Option<PathBuf>,
    /// Also emit logs to stderr for immediate feedback.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "librarium".to_string(),
            default_level: "info".to_string(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize the logging system.
///
/// Sets up tracing with a JSONL file layer and an optional stderr layer.
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_logging(config: LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.clone()));

    let log_path = config.log_path.clone().or_else(|| {
        let paths = Paths::new().ok()?;
        paths.ensure_dirs().ok()?;
        Some(paths.log_file())
    });

    let file_layer = log_path.and_then(|path| {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Arc::new(file))
                .with_target(true)
                .boxed(),
        )
    });

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    });

    // try_init so tests and repeated calls don't panic on the global default
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    tracing::debug!(service = %config.service_name, "logging initialized");
}
