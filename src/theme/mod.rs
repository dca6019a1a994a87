pub mod command;
pub mod default;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;

use crate::status::StatusDocument;

pub use command::CommandTheme;
pub use default::DefaultTheme;

/// Something that turns a validated status document into the status line.
pub trait Theme {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn render(&self, doc: &StatusDocument) -> Result<String>;
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("theme not found: {0}")]
    NotFound(String),

    #[error("theme is not executable: {}", .0.display())]
    NotExecutable(PathBuf),

    #[error("cannot expand {0}: home directory unknown")]
    NoHome(String),
}

/// Settings shared by the built-in and external themes.
#[derive(Debug, Clone)]
pub struct ThemeOptions {
    pub use_unicode: bool,
    pub git_timeout: Duration,
    pub theme_timeout: Duration,
}

/// Resolve the theme to use. `None` selects the built-in theme.
///
/// A user theme is wrapped so that any render failure falls back to the
/// built-in output instead of printing nothing.
pub fn resolve(spec: Option<&str>, options: &ThemeOptions) -> Result<Box<dyn Theme>, ThemeError> {
    let default = DefaultTheme::new(options.use_unicode, options.git_timeout);

    let Some(spec) = spec else {
        return Ok(Box::new(default));
    };

    let theme = CommandTheme::resolve(spec, options.theme_timeout)?;
    tracing::info!(path = %theme.path().display(), "using theme command");

    Ok(Box::new(FallbackTheme {
        primary: Box::new(theme),
        fallback: default,
    }))
}

/// Like [`resolve`], but a theme that cannot be found degrades to the
/// built-in theme.
pub fn resolve_or_default(spec: Option<&str>, options: &ThemeOptions) -> Box<dyn Theme> {
    resolve(spec, options).unwrap_or_else(|e| {
        tracing::warn!("{}; using default theme", e);
        Box::new(DefaultTheme::new(options.use_unicode, options.git_timeout))
    })
}

struct FallbackTheme {
    primary: Box<dyn Theme>,
    fallback: DefaultTheme,
}

impl Theme for FallbackTheme {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn render(&self, doc: &StatusDocument) -> Result<String> {
        match self.primary.render(doc) {
            Ok(line) => Ok(line),
            Err(e) => {
                tracing::warn!(theme = self.primary.name(), "theme failed: {:#}", e);
                self.fallback.render(doc)
            }
        }
    }
}
