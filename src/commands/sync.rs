//! `sync` subcommand: reconcile `scripts/install/` with the config.
//!
//! Scans the scripts directory for executable files, merges them with the
//! `scripts.install` list (existing descriptions win; paths are refreshed),
//! and rewrites the config under a [`ConfigTransaction`] so a crash or a
//! concurrent writer never leaves a partial document behind.
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::transaction::ConfigTransaction;
use crate::config::{self, Script};
use crate::error::TransactionError;
use crate::logging::Logger;

use super::CommandSetup;

/// Directory scanned for install scripts, relative to the repository root.
pub const SCRIPTS_DIR: &str = "scripts/install";

/// A script whose discovered metadata disagrees with the configured entry.
#[derive(Debug, Clone)]
pub struct Conflict {
    /// Script name (file name under the scripts directory).
    pub name: String,
    /// The entry currently in the config (path already refreshed).
    pub existing: Script,
    /// The entry synthesized from the discovered file.
    pub discovered: Script,
}

/// Run the sync command.
///
/// # Errors
///
/// Returns an error on I/O failure, on concurrent modification of the
/// config file, or when interactive conflict resolution is cancelled. The
/// config file is left in its pre-sync state on every error path.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let scripts_dir = setup.root().join(SCRIPTS_DIR);

    log.stage("Syncing install scripts");

    let tx = ConfigTransaction::begin(&setup.config_path)?;

    let mut cfg = setup.config.clone();
    let found = scan_scripts(&scripts_dir, &setup.root())?;
    let (mut merged, conflicts) = merge_scripts(&cfg.scripts.install, found);

    if !conflicts.is_empty() {
        log.info(&format!("{} conflict(s) to resolve", conflicts.len()));
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let resolved = resolve_conflicts(&conflicts, &mut stdin.lock(), &mut stdout)?;
        merged.extend(resolved);
    }

    merged.sort_by(|a, b| a.name.cmp(&b.name));

    if global.dry_run {
        log.dry_run(&format!("would record {} install script(s)", merged.len()));
        tx.rollback()?;
        return Ok(());
    }

    if tx.check_modified()? {
        tx.rollback()?;
        return Err(TransactionError::ConcurrentModification.into());
    }

    cfg.scripts.install = merged;
    config::save(&cfg, &setup.config_path)?;
    tx.commit()?;

    log.info(&format!(
        "synchronized {} install script(s)",
        cfg.scripts.install.len()
    ));
    Ok(())
}

/// Discover executable files in the scripts directory. A missing directory
/// yields an empty list. Paths are recorded relative to `root`.
///
/// # Errors
///
/// Returns an error when the directory exists but cannot be read.
pub fn scan_scripts(dir: &Path, root: &Path) -> Result<Vec<Script>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("read scripts directory: {}", dir.display()));
        }
    };

    let mut scripts = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in: {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() || !is_executable(&path) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let rel = path.strip_prefix(root).map_or_else(
            |_| path.display().to_string(),
            |p| p.display().to_string(),
        );
        scripts.push(Script {
            name,
            description: format!("Script from {rel}"),
            path: rel,
            compat: None,
        });
    }
    scripts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(scripts)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::metadata(path).is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

/// Merge discovered scripts into the configured list.
///
/// Existing entries keep their description and compat spec but get their
/// path refreshed; entries whose configured description differs from the
/// discovered default become [`Conflict`]s for the caller to resolve.
/// Configured entries whose file no longer exists are dropped.
#[must_use]
pub fn merge_scripts(existing: &[Script], found: Vec<Script>) -> (Vec<Script>, Vec<Conflict>) {
    let mut merged = Vec::new();
    let mut conflicts = Vec::new();

    for discovered in found {
        match existing.iter().find(|s| s.name == discovered.name) {
            None => merged.push(discovered),
            Some(configured) => {
                let mut kept = configured.clone();
                kept.path.clone_from(&discovered.path);
                if kept.description == discovered.description
                    || kept.description.is_empty()
                {
                    merged.push(Script {
                        description: discovered.description,
                        ..kept
                    });
                } else {
                    conflicts.push(Conflict {
                        name: discovered.name.clone(),
                        existing: kept,
                        discovered,
                    });
                }
            }
        }
    }

    (merged, conflicts)
}

/// Interactively resolve conflicts via a numbered prompt.
///
/// Reader and writer are injected so tests can drive the prompt without a
/// terminal. Entering `q` cancels the whole sync.
///
/// # Errors
///
/// Returns an error when input ends unexpectedly or the user cancels.
pub fn resolve_conflicts<R: BufRead, W: Write>(
    conflicts: &[Conflict],
    input: &mut R,
    output: &mut W,
) -> Result<Vec<Script>> {
    let mut resolved = Vec::new();

    for conflict in conflicts {
        writeln!(output, "\nConflict for script '{}':", conflict.name)?;
        writeln!(output, "  1. Keep existing: {}", conflict.existing.description)?;
        writeln!(output, "  2. Use discovered: {}", conflict.discovered.description)?;

        loop {
            write!(output, "#? ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                anyhow::bail!("conflict resolution aborted: end of input");
            }
            match line.trim() {
                "q" => anyhow::bail!("conflict resolution cancelled by user"),
                "1" => {
                    resolved.push(conflict.existing.clone());
                    break;
                }
                "2" => {
                    resolved.push(conflict.discovered.clone());
                    break;
                }
                _ => {}
            }
        }
    }

    Ok(resolved)
}
