//! Log sinks for the catalog enricher
//!
//! Logs go to stderr and are appended to a log file. The level comes from
//! `RUST_LOG` and defaults to `info`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Opens `path` for appending, creating its parent directory first
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber, returning whether this call installed it
///
/// If the log file cannot be opened, logging continues on stderr only and a
/// warning is emitted once the subscriber is up. If a subscriber is already
/// installed it is kept and the refusal is logged through it at debug level.
pub fn init(log_file: &Path) -> bool {
    let console = fmt::layer().with_writer(io::stderr).with_target(false);

    match open_log_file(log_file) {
        Ok(file) => {
            let file_layer = fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false);
            let result = tracing_subscriber::registry()
                .with(env_filter())
                .with(console)
                .with(file_layer)
                .try_init();
            installed(result)
        }
        Err(e) => {
            let result = tracing_subscriber::registry()
                .with(env_filter())
                .with(console)
                .try_init();
            warn!(path = %log_file.display(), error = %e, "Could not open log file, logging to console only");
            installed(result)
        }
    }
}

fn installed(result: Result<(), TryInitError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "Global subscriber already set, keeping it");
            false
        }
    }
}

/// Routes logs through the test harness so they show up for failing tests
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
