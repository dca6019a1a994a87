use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use super::Theme;
use crate::git::{self, GitState};
use crate::status::abbrev::{abbreviate_path, normalize_model_id};
use crate::status::StatusDocument;

// ---------------------------------------------------------------------------
// Glyphs
// ---------------------------------------------------------------------------

/// Markers placed in front of each field.
#[derive(Debug)]
pub struct Glyphs {
    pub directory: &'static str,
    pub dir_mismatch: &'static str,
    pub branch: &'static str,
    pub detached: &'static str,
    pub not_repository: &'static str,
    pub git_error: &'static str,
    pub model: &'static str,
    pub session: &'static str,
    pub separator: &'static str,
}

impl Glyphs {
    pub const UNICODE: Glyphs = Glyphs {
        directory: "\u{1F5C2}\u{FE0F}", // card index dividers
        dir_mismatch: " \u{21B3} ",
        branch: "\u{1F33F}",         // herb
        detached: "\u{1FABE}",       // leafless tree
        not_repository: "\u{1F4BE}", // floppy disk
        git_error: "\u{1F4A5}",      // collision
        model: "\u{23E3}",
        session: "\u{1F4DD}", // memo
        separator: " \u{22EE} ",
    };

    pub const ASCII: Glyphs = Glyphs {
        directory: "dir",
        dir_mismatch: " > ",
        branch: "on",
        detached: "at",
        not_repository: "-",
        git_error: "!",
        model: "model",
        session: "session",
        separator: " | ",
    };

    pub fn select(use_unicode: bool) -> &'static Glyphs {
        if use_unicode {
            &Self::UNICODE
        } else {
            &Self::ASCII
        }
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// The built-in two-line theme.
pub struct DefaultTheme {
    glyphs: &'static Glyphs,
    git_timeout: Duration,
}

impl DefaultTheme {
    pub fn new(use_unicode: bool, git_timeout: Duration) -> Self {
        Self {
            glyphs: Glyphs::select(use_unicode),
            git_timeout,
        }
    }
}

impl Theme for DefaultTheme {
    fn name(&self) -> &str {
        "default"
    }

    fn render(&self, doc: &StatusDocument) -> Result<String> {
        let dir = inspection_dir(doc);
        let git = git::inspect(dir.as_deref(), self.git_timeout);
        Ok(render_status(doc, &git, self.glyphs))
    }
}

/// Inspect the session's working directory when it exists locally,
/// otherwise fall back to the process's own directory.
fn inspection_dir(doc: &StatusDocument) -> Option<PathBuf> {
    let dir = Path::new(&doc.workspace.current_dir);
    dir.is_dir().then(|| dir.to_path_buf())
}

// ---------------------------------------------------------------------------
// Segment renderers
// ---------------------------------------------------------------------------

fn dir_status(doc: &StatusDocument, glyphs: &Glyphs) -> String {
    let project = abbreviate_path(&doc.workspace.project_dir);
    let current = abbreviate_path(&doc.workspace.current_dir);

    if project == current {
        format!("{} {}", glyphs.directory, project)
    } else {
        format!(
            "{} {}{}{}",
            glyphs.directory, project, glyphs.dir_mismatch, current
        )
    }
}

fn git_status(git: &GitState, glyphs: &Glyphs) -> String {
    match git {
        GitState::Branch { name } => format!("{} {}", glyphs.branch, name),
        GitState::Detached { short_hash } => format!("{} {}", glyphs.detached, short_hash),
        GitState::NotRepository => format!("{} no repo", glyphs.not_repository),
        GitState::Error { .. } => format!("{} git error", glyphs.git_error),
    }
}

fn model_status(doc: &StatusDocument, glyphs: &Glyphs) -> String {
    format!("{} {}", glyphs.model, normalize_model_id(&doc.model.id))
}

fn session_status(doc: &StatusDocument, glyphs: &Glyphs) -> String {
    let id = if doc.session_id.contains('/') {
        abbreviate_path(&doc.session_id)
    } else {
        doc.session_id.clone()
    };
    format!("{} {}", glyphs.session, id)
}

/// Compose the two status lines: directory and git, then model and session.
///
/// Colour follows `colored`'s global override, so with colour disabled the
/// output is the same text without escape sequences.
pub fn render_status(doc: &StatusDocument, git: &GitState, glyphs: &Glyphs) -> String {
    let sep = glyphs.separator.bright_black().bold().to_string();

    let first = format!(
        "{}{}{}",
        dir_status(doc, glyphs).blue(),
        sep,
        git_status(git, glyphs).green()
    );
    let second = format!(
        "{}{}{}",
        model_status(doc, glyphs).magenta(),
        sep,
        session_status(doc, glyphs).blue()
    );

    format!("{}\n{}", first, second)
}
