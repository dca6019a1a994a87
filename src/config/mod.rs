pub mod schema;

use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::StatuslineConfig;

/// Environment variable pointing at an alternate config file.
pub const CONFIG_ENV: &str = "CC_STATUSLINE_CONFIG";

/// Where the config file is looked up: `CC_STATUSLINE_CONFIG` first, then
/// `~/.config/cc-statusline/config.toml` (platform-appropriate).
pub fn config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| config_dir().map(|d| d.join("config.toml")))
}

/// Return the platform-specific config directory (~/.config/cc-statusline on Linux).
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cc-statusline"))
}

/// Return the platform-specific state directory (~/.local/state/cc-statusline on Linux).
pub fn state_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("state")))
        .map(|d| d.join("cc-statusline"))
}

/// Parse the config at `path`.
pub fn load_from(path: &std::path::Path) -> Result<StatuslineConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Load the statusline config, falling back to defaults.
///
/// A missing file is silent. An unreadable or invalid file also yields the
/// defaults, and the error is returned alongside so it can be logged once
/// logging is up.
pub fn load() -> (StatuslineConfig, Option<anyhow::Error>) {
    match config_path() {
        Some(path) if path.exists() => match load_from(&path) {
            Ok(config) => (config, None),
            Err(e) => (StatuslineConfig::default(), Some(e)),
        },
        _ => (StatuslineConfig::default(), None),
    }
}
