use serde::Deserialize;

/// User-configurable statusline settings.
/// Missing file is not an error -- all fields have defaults.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatuslineConfig {
    /// Theme command to render with instead of the built-in theme.
    pub theme: Option<String>,

    /// Exit 1 with empty stdout on malformed input instead of printing a
    /// placeholder. Default: false
    pub strict: bool,

    /// Budget for the git inspection, in milliseconds. Default: 500
    pub git_timeout_ms: u64,

    /// Budget for a theme command, in milliseconds. Default: 1000
    pub theme_timeout_ms: u64,

    /// Use emoji/Unicode glyphs. Default: true
    pub unicode: bool,

    /// Log filter directive, overridden by `CC_STATUSLINE_LOG`. Default: "info"
    pub log_level: String,

    /// Log file path. Default: `<state dir>/cc-statusline/app.log`
    pub log_file: Option<String>,
}

impl Default for StatuslineConfig {
    fn default() -> Self {
        Self {
            theme: None,
            strict: false,
            git_timeout_ms: 500,
            theme_timeout_ms: 1000,
            unicode: true,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}
