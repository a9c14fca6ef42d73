//! Subwright Core Library
//!
//! AI-assisted subtitle authoring and dubbing engine. This library
//! contains the cue data model, edit history, playback synchronization,
//! the speech batch pipeline, export encoders, and local persistence -
//! all the business logic behind the authoring app.

pub mod core;

use std::path::Path;
use std::sync::OnceLock;

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes logging with a stdout layer plus a daily-rolling file
/// layer under `log_dir`. Safe to call more than once; later calls are
/// no-ops.
pub fn init_logging(log_dir: &Path) {
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, "subwright.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(cfg!(debug_assertions));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);

    // Avoid panics if already initialized (tests, repeated CLI calls).
    let _ = tracing::subscriber::set_global_default(subscriber);
}
