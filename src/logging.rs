//! File-based diagnostics. Stdout belongs to the status line and stderr is
//! shown by some hosts, so logs only ever go to a file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{self, StatuslineConfig};

/// Environment variable holding a log filter directive.
pub const LOG_ENV: &str = "CC_STATUSLINE_LOG";

/// Resolve the log file: config override, else the state directory.
pub fn log_path(config: &StatuslineConfig) -> Option<PathBuf> {
    match &config.log_file {
        Some(path) => Some(PathBuf::from(path)),
        None => config::state_dir().map(|d| d.join("app.log")),
    }
}

/// Install the global subscriber. Returns `false` when logging is disabled
/// because the file could not be opened or a subscriber already exists.
pub fn init(config: &StatuslineConfig) -> bool {
    let Some(path) = log_path(config) else {
        return false;
    };

    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .is_ok()
}
