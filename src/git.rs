//! Repository state for the status line, read through the `git` CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::process::Command;

use crate::exec;

/// Default budget for the whole inspection.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// What HEAD looks like in the inspected directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitState {
    NotRepository,
    Branch { name: String },
    Detached { short_hash: String },
    Error { message: String },
}

/// Captured result of one git invocation, with trimmed output.
struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Classify the repository state of `dir` (or the current directory).
///
/// Never fails: every problem, including running out of `timeout`, is
/// folded into [`GitState::Error`].
pub fn inspect(dir: Option<&Path>, timeout: Duration) -> GitState {
    inspect_with(Path::new("git"), dir, timeout)
}

/// [`inspect`] using `program` as the git executable.
fn inspect_with(program: &Path, dir: Option<&Path>, timeout: Duration) -> GitState {
    let dir: PathBuf = match dir {
        Some(d) => d.to_path_buf(),
        None => match std::env::current_dir() {
            Ok(d) => d,
            Err(e) => {
                return GitState::Error {
                    message: format!("cannot resolve current directory: {}", e),
                }
            }
        },
    };

    let state = match exec::block_on_with_timeout(timeout, classify(program, &dir)) {
        Ok(Ok(state)) => state,
        Ok(Err(e)) => GitState::Error {
            message: format!("{:#}", e),
        },
        Err(e) => GitState::Error {
            message: e.to_string(),
        },
    };

    match &state {
        GitState::Error { message } => {
            tracing::warn!(dir = %dir.display(), "git inspection failed: {}", message)
        }
        other => tracing::debug!(dir = %dir.display(), "git state: {:?}", other),
    }

    state
}

async fn classify(program: &Path, dir: &Path) -> Result<GitState> {
    let inside = git(program, dir, &["rev-parse", "--is-inside-work-tree"]).await?;
    if !inside.success {
        if inside.stderr.contains("not a git repository") {
            return Ok(GitState::NotRepository);
        }
        bail!("git rev-parse failed: {}", inside.stderr);
    }
    // Inside `.git/` itself git answers "false".
    if inside.stdout != "true" {
        return Ok(GitState::NotRepository);
    }

    let branch = git(program, dir, &["branch", "--show-current"]).await?;
    if !branch.success {
        bail!("git branch failed: {}", branch.stderr);
    }
    if !branch.stdout.is_empty() {
        return Ok(GitState::Branch {
            name: branch.stdout,
        });
    }

    // No current branch: either detached, or an unborn branch.
    let head = git(program, dir, &["rev-parse", "--short=7", "HEAD"]).await?;
    if head.success && !head.stdout.is_empty() {
        return Ok(GitState::Detached {
            short_hash: head.stdout,
        });
    }

    let symbolic = git(program, dir, &["symbolic-ref", "--short", "HEAD"]).await?;
    if symbolic.success && !symbolic.stdout.is_empty() {
        return Ok(GitState::Branch {
            name: symbolic.stdout,
        });
    }

    bail!("could not resolve HEAD: {}", symbolic.stderr)
}

async fn git(program: &Path, dir: &Path, args: &[&str]) -> Result<GitOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(dir)
        .env("GIT_OPTIONAL_LOCKS", "0")
        .env("LC_ALL", "C");

    let output = exec::output(cmd, None)
        .await
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;

    Ok(GitOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}
