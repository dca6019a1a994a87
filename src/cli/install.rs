use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;

use crate::cli::output;

/// File name Claude Code is pointed at.
pub const BINARY_NAME: &str = "statusline";

#[derive(ClapArgs)]
pub struct Args {
    /// Overwrite the installed binary if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// Install the running binary to `~/.claude/statusline`.
pub fn run(args: Args) -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory — is $HOME set?")?;
    let source = std::env::current_exe().context("could not locate the running executable")?;

    let target = install_binary(&source, &home.join(".claude"), args.overwrite)?;

    output::success(&format!("Installed statusline to {}", target.display()));
    output::info("Point Claude Code at it in ~/.claude/settings.json:");
    eprintln!(
        r#"  "statusLine": {{ "type": "command", "command": "{}" }}"#,
        target.display()
    );
    Ok(())
}

/// Copy `source` into `claude_dir`, creating the directory if needed.
///
/// An existing binary is only replaced when `overwrite` is set.
pub fn install_binary(source: &Path, claude_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(claude_dir)
        .with_context(|| format!("failed to create {}", claude_dir.display()))?;

    let target = claude_dir.join(BINARY_NAME);

    if target.exists() {
        if !overwrite {
            bail!(
                "{} already exists. Use --overwrite to replace the existing file.",
                target.display()
            );
        }
        if same_file(source, &target) {
            bail!("{} is the running executable; nothing to install", target.display());
        }
        output::warning(&format!(
            "Overwriting existing file at {}...",
            target.display()
        ));
        std::fs::remove_file(&target)
            .with_context(|| format!("failed to remove {}", target.display()))?;
    }

    std::fs::copy(source, &target).with_context(|| {
        format!(
            "failed to copy {} to {}",
            source.display(),
            target.display()
        )
    })?;

    Ok(target)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
