// src/log.rs
// Debug log in `.store/debug.log` plus warnings on stderr.
// RUST_LOG overrides the file filter; `-v` raises both sinks to debug.

use std::fs;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::consts::{LOG_FILE, STORE_DIR};

fn file_appender() -> Option<RollingFileAppender> {
    fs::create_dir_all(STORE_DIR).ok()?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(STORE_DIR)
        .ok()
}

/// Install the global subscriber. A second call is a no-op.
/// If the store directory is not writable the file sink is skipped.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let stderr_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };

    let file_layer = file_appender().map(|appender| {
        fmt::layer()
            .with_writer(appender)
            .with_ansi(false)
            .with_filter(file_filter)
    });
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_level);

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
}
