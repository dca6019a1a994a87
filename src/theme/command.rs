//! User-supplied themes: an external executable that reads the status
//! document as JSON on stdin and prints the status line on stdout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::process::Command;

use super::{Theme, ThemeError};
use crate::exec;
use crate::status::StatusDocument;

pub struct CommandTheme {
    path: PathBuf,
    timeout: Duration,
}

impl CommandTheme {
    /// Locate the theme executable named by `spec`.
    ///
    /// `~` expands to the home directory, relative paths are taken from the
    /// current directory, and a bare name is looked up on `PATH`.
    pub fn resolve(spec: &str, timeout: Duration) -> Result<Self, ThemeError> {
        let path = resolve_path(spec)?;
        Ok(Self { path, timeout })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Theme for CommandTheme {
    fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("command")
    }

    fn render(&self, doc: &StatusDocument) -> Result<String> {
        let input = serde_json::to_vec(doc).context("failed to serialize status document")?;

        let output = exec::block_on_with_timeout(
            self.timeout,
            exec::output(Command::new(&self.path), Some(input.as_slice())),
        )
        .with_context(|| format!("theme {} did not finish", self.path.display()))?
        .with_context(|| format!("failed to run theme {}", self.path.display()))?;

        if !output.status.success() {
            bail!(
                "theme {} exited with {}: {}",
                self.path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let text = text.trim_end_matches(['\n', '\r']);
        if text.trim().is_empty() {
            bail!("theme {} produced no output", self.path.display());
        }

        Ok(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

fn resolve_path(spec: &str) -> Result<PathBuf, ThemeError> {
    let is_bare_name = !spec.contains('/') && !spec.contains(std::path::MAIN_SEPARATOR);
    if is_bare_name && spec != "~" {
        return which::which(spec).map_err(|_| ThemeError::NotFound(spec.to_string()));
    }

    let expanded = expand_tilde(spec)?;
    let path = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    };

    if !path.is_file() {
        return Err(ThemeError::NotFound(path.display().to_string()));
    }
    if !is_executable(&path) {
        return Err(ThemeError::NotExecutable(path));
    }

    Ok(path)
}

/// Expand a leading `~` or `~/` to the home directory.
pub fn expand_tilde(spec: &str) -> Result<PathBuf, ThemeError> {
    let rest = match spec.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(spec)),
    };

    let home = dirs::home_dir().ok_or_else(|| ThemeError::NoHome(spec.to_string()))?;
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
