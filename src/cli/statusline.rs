use std::io::{ErrorKind, IsTerminal, Read, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;

use crate::config::{self, StatuslineConfig};
use crate::logging;
use crate::status::{self, StatusInput, MALFORMED_STATUS, NO_STATUS};
use crate::theme::{self, ThemeOptions};

/// Stdin is read eagerly up to this many bytes.
const MAX_INPUT_BYTES: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// Clap Args
// ---------------------------------------------------------------------------

/// Arguments for rendering the status line (the default mode).
#[derive(ClapArgs, Debug, Default)]
pub struct Args {
    /// Render with a theme command (path, ~/path, or a name on PATH)
    #[arg(long, short = 't', value_name = "PATH")]
    pub theme: Option<String>,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long)]
    pub no_color: bool,

    /// Use ASCII-only glyphs (no emoji)
    #[arg(long)]
    pub no_unicode: bool,

    /// Exit 1 with no output when the status document is malformed
    #[arg(long)]
    pub strict: bool,

    /// Time budget for inspecting the git repository, in milliseconds
    #[arg(long, value_name = "MS")]
    pub git_timeout_ms: Option<u64>,
}

/// Effective settings after merging CLI args over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub theme: Option<String>,
    pub strict: bool,
    pub options: ThemeOptions,
}

impl Settings {
    /// CLI args win; the config fills in everything else.
    pub fn merge(args: &Args, config: &StatuslineConfig) -> Self {
        Self {
            theme: args.theme.clone().or_else(|| config.theme.clone()),
            strict: args.strict || config.strict,
            options: ThemeOptions {
                use_unicode: !args.no_unicode && config.unicode,
                git_timeout: Duration::from_millis(
                    args.git_timeout_ms.unwrap_or(config.git_timeout_ms),
                ),
                theme_timeout: Duration::from_millis(config.theme_timeout_ms),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Render the status line for the document on stdin.
///
/// Lenient mode always prints something and exits 0; failures inside the
/// pipeline, including panics, degrade to the `[no status]` placeholder.
/// Strict mode propagates malformed input as an error (exit 1, empty stdout).
pub fn run(args: Args) -> Result<()> {
    let (config, config_err) = config::load();
    logging::init(&config);
    if let Some(e) = config_err {
        tracing::warn!("ignoring config: {:#}", e);
    }

    // Claude Code pipes stdout (not a TTY), so colored would normally
    // disable colors. Force them on unless --no-color or NO_COLOR is set.
    if args.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    } else {
        colored::control::set_override(true);
    }

    let settings = Settings::merge(&args, &config);

    if settings.strict {
        let line = render_stdin(&settings)?;
        return emit(&mut std::io::stdout().lock(), &line);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| render_stdin(&settings)));
    let line = match result {
        Ok(Ok(line)) => line,
        Ok(Err(e)) => {
            tracing::error!("render failed: {:#}", e);
            NO_STATUS.to_string()
        }
        Err(_) => {
            tracing::error!("render panicked");
            NO_STATUS.to_string()
        }
    };

    emit(&mut std::io::stdout().lock(), &line)
}

/// Write the status line. A host that stops reading early is not an error.
fn emit(out: &mut impl Write, line: &str) -> Result<()> {
    match writeln!(out, "{}", line).and_then(|_| out.flush()) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            tracing::debug!("stdout closed before the status line was written");
            Ok(())
        }
        other => other.context("failed to write status line"),
    }
}

fn render_stdin(settings: &Settings) -> Result<String> {
    let buf = read_stdin()?;
    render(&buf, settings)
}

/// Read all of stdin, up to [`MAX_INPUT_BYTES`]. An interactive terminal
/// counts as no input rather than blocking for it.
fn read_stdin() -> Result<Vec<u8>> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }

    let mut buf = Vec::with_capacity(8192);
    stdin
        .lock()
        .take(MAX_INPUT_BYTES)
        .read_to_end(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

/// Turn raw input bytes into the status line. Side-effect free apart from
/// the git inspection and theme command, so it is also the entry point for
/// anything embedding the renderer.
pub fn render(input: &[u8], settings: &Settings) -> Result<String> {
    let raw = match StatusInput::from_bytes(input) {
        StatusInput::Absent => {
            tracing::debug!("no input");
            return Ok(NO_STATUS.to_string());
        }
        StatusInput::Malformed(e) => {
            tracing::error!("failed to parse input: {}", e);
            if settings.strict {
                bail!("status input is not valid JSON: {}", e);
            }
            return Ok(MALFORMED_STATUS.to_string());
        }
        StatusInput::Document(raw) => raw,
    };

    tracing::debug!(input = %raw, "input");

    let doc = match status::validate(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::error!(
                issues = e.issues().len(),
                tree = %e.tree_json(),
                "failed to validate input"
            );
            if settings.strict {
                return Err(e.into());
            }
            return Ok(MALFORMED_STATUS.to_string());
        }
    };

    let theme = if settings.strict {
        theme::resolve(settings.theme.as_deref(), &settings.options)?
    } else {
        theme::resolve_or_default(settings.theme.as_deref(), &settings.options)
    };

    theme.render(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ValidationError;
    use crate::theme::ThemeError;

    fn settings(strict: bool) -> Settings {
        Settings {
            theme: None,
            strict,
            options: ThemeOptions {
                use_unicode: false,
                git_timeout: Duration::from_secs(5),
                theme_timeout: Duration::from_secs(5),
            },
        }
    }

    const VALID: &str = r#"{
        "session_id": "c0ffee",
        "model": {"id": "claude-opus-4.5", "display_name": "Opus"},
        "workspace": {"current_dir": "/nonexistent/work/project", "project_dir": "/nonexistent/work/project"}
    }"#;

    // --- Settings ---

    #[test]
    fn test_cli_args_override_config() {
        let config = StatuslineConfig {
            theme: Some("from-config".to_string()),
            git_timeout_ms: 300,
            ..Default::default()
        };
        let args = Args {
            theme: Some("from-cli".to_string()),
            no_unicode: true,
            git_timeout_ms: Some(50),
            ..Default::default()
        };
        let s = Settings::merge(&args, &config);
        assert_eq!(s.theme.as_deref(), Some("from-cli"));
        assert!(!s.options.use_unicode);
        assert_eq!(s.options.git_timeout, Duration::from_millis(50));
        assert!(!s.strict);
    }

    #[test]
    fn test_config_fills_missing_args() {
        let config = StatuslineConfig {
            theme: Some("from-config".to_string()),
            strict: true,
            ..Default::default()
        };
        let s = Settings::merge(&Args::default(), &config);
        assert_eq!(s.theme.as_deref(), Some("from-config"));
        assert!(s.strict);
        assert!(s.options.use_unicode);
        assert_eq!(s.options.git_timeout, Duration::from_millis(500));
    }

    // --- Placeholders ---

    #[test]
    fn test_absent_input_renders_no_status() {
        assert_eq!(render(b"", &settings(false)).unwrap(), NO_STATUS);
        assert_eq!(render(b"null", &settings(false)).unwrap(), NO_STATUS);
    }

    #[test]
    fn test_absent_input_is_not_an_error_when_strict() {
        assert_eq!(render(b"", &settings(true)).unwrap(), NO_STATUS);
    }

    #[test]
    fn test_invalid_input_renders_malformed() {
        let inputs: [&[u8]; 4] = [b"{}", b"{ invalid: \"data\" }", br#"{"session_id":"x"}"#, b"[]"];
        for input in inputs {
            assert_eq!(
                render(input, &settings(false)).unwrap(),
                MALFORMED_STATUS,
                "input: {}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_strict_validation_failure_is_error() {
        let err = render(b"{}", &settings(true)).unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[test]
    fn test_strict_garbage_is_error() {
        assert!(render(b"not json", &settings(true)).is_err());
    }

    // --- Rendering ---

    #[test]
    fn test_valid_input_renders_two_lines() {
        colored::control::set_override(false);
        let out = render(VALID.as_bytes(), &settings(false)).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2, "got: {:?}", out);
        assert!(lines[0].starts_with("dir /n/w/project | "));
        assert_eq!(lines[1], "model opus-4.5 | session c0ffee");
    }

    #[test]
    fn test_missing_theme_falls_back_when_lenient() {
        colored::control::set_override(false);
        let mut s = settings(false);
        s.theme = Some("/nonexistent/cc-statusline/theme.sh".to_string());
        let out = render(VALID.as_bytes(), &s).unwrap();
        assert!(out.contains("model opus-4.5"));
    }

    #[test]
    fn test_missing_theme_is_error_when_strict() {
        let mut s = settings(true);
        s.theme = Some("/nonexistent/cc-statusline/theme.sh".to_string());
        let err = render(VALID.as_bytes(), &s).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThemeError>(),
            Some(ThemeError::NotFound(_))
        ));
    }

    // --- Output ---

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct Full;

    impl Write for Full {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_emit_appends_newline() {
        let mut out = Vec::new();
        emit(&mut out, "line one\nline two").unwrap();
        assert_eq!(out, b"line one\nline two\n");
    }

    #[test]
    fn test_emit_ignores_closed_stdout() {
        assert!(emit(&mut ClosedPipe, NO_STATUS).is_ok());
    }

    #[test]
    fn test_emit_reports_other_write_errors() {
        let err = emit(&mut Full, NO_STATUS).unwrap_err();
        assert!(format!("{:#}", err).contains("disk full"));
    }
}
