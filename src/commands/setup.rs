//! `setup` subcommands: backup existing configuration, create symlinks,
//! restore from backup.
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Link;
use crate::logging::{Logger, TaskStatus};
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Resource as _, ResourceChange, ResourceState, fs};

use super::CommandSetup;

/// Prefix of backup directories created in `$HOME`.
pub const BACKUP_PREFIX: &str = "dotbk-";

/// Run `setup backup`: move each configured backup directory into a fresh
/// timestamped `$HOME/dotbk-<ts>` directory. Missing sources are skipped.
///
/// # Errors
///
/// Returns an error if the backup directory cannot be created or an entry
/// cannot be moved.
pub fn backup(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let home = home_dir()?;

    let sources: Vec<PathBuf> = setup
        .config
        .setup
        .backup_dirs
        .iter()
        .map(|entry| fs::expand_path(entry))
        .collect();

    if sources.is_empty() {
        log.info("no backup directories configured");
        return Ok(());
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let backup_dir = home.join(format!("{BACKUP_PREFIX}{timestamp}"));

    log.stage("Backing up existing configuration");

    if global.dry_run {
        for source in &sources {
            if source.exists() {
                log.dry_run(&format!("would move {} into backup", source.display()));
            }
        }
        log.record_task("backup", TaskStatus::DryRun, None);
        return Ok(());
    }

    std::fs::create_dir_all(&backup_dir)
        .with_context(|| format!("create backup dir: {}", backup_dir.display()))?;

    let mut moved = 0u32;
    for source in &sources {
        if !source.exists() {
            log.debug(&format!("skipping non-existent: {}", source.display()));
            continue;
        }
        let base = source
            .file_name()
            .map_or_else(|| "entry".to_string(), |n| n.to_string_lossy().to_string());
        let dest = backup_dir.join(base);
        fs::move_entry(source, &dest)
            .with_context(|| format!("backup {}", source.display()))?;
        log.info(&format!("backed up {} to {}", source.display(), dest.display()));
        moved += 1;
    }

    log.record_task("backup", TaskStatus::Ok, Some(&format!("{moved} moved")));
    log.info(&format!("backup created at: {}", backup_dir.display()));
    Ok(())
}

/// Run `setup link`: create core links first, then config links.
///
/// A target that is already the correct link is left untouched. An existing
/// wrong file or link is replaced. A non-empty real directory in the way of
/// a core link is replaced only when a `dotbk-` backup exists in `$HOME`;
/// otherwise the entry is skipped with a warning.
///
/// # Errors
///
/// Returns an error if a link cannot be created or an obstruction cannot be
/// removed.
pub fn link(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let home = home_dir()?;
    let root = setup.root();

    log.stage("Creating symlinks");

    let mut applied = 0u32;
    let mut already_ok = 0u32;
    let mut skipped = 0u32;

    let core = setup.config.setup.core_links.clone();
    let config_links = setup.config.setup.config_links.clone();

    for (entries, is_core) in [(core, true), (config_links, false)] {
        for entry in entries {
            match apply_link(&root, &home, &entry, is_core, global.dry_run, log)? {
                ResourceChange::Applied => applied += 1,
                ResourceChange::AlreadyCorrect => already_ok += 1,
                ResourceChange::Skipped { reason } => {
                    log.warn(&format!("skipped {}: {reason}", entry.target));
                    skipped += 1;
                }
            }
        }
    }

    if global.dry_run {
        log.info(&format!(
            "{applied} would change, {already_ok} already ok, {skipped} skipped"
        ));
        log.record_task("link", TaskStatus::DryRun, None);
        return Ok(());
    }

    log.info(&format!(
        "{applied} changed, {already_ok} already ok, {skipped} skipped"
    ));
    log.record_task("link", TaskStatus::Ok, None);
    Ok(())
}

/// Run `setup restore`: move the entries of the most recent `dotbk-` backup
/// back over `$HOME`, replacing whatever `setup link` created.
///
/// # Errors
///
/// Returns an error when no backup exists or an entry cannot be moved back.
pub fn restore(global: &GlobalOpts, log: &Logger) -> Result<()> {
    // Config is not needed, but run setup anyway so the user gets the same
    // discovery errors as every other subcommand.
    let _ = CommandSetup::init(global, log)?;
    let home = home_dir()?;

    let Some(backup_dir) = latest_backup(&home)? else {
        anyhow::bail!("no {BACKUP_PREFIX}* backup found in {}", home.display());
    };

    log.stage(&format!("Restoring from {}", backup_dir.display()));

    let entries = std::fs::read_dir(&backup_dir)
        .with_context(|| format!("read backup dir: {}", backup_dir.display()))?;

    let mut restored = 0u32;
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in: {}", backup_dir.display()))?;
        let target = home.join(entry.file_name());

        if global.dry_run {
            log.dry_run(&format!("would restore {}", target.display()));
            continue;
        }

        if target.symlink_metadata().is_ok() {
            remove_any(&target)
                .with_context(|| format!("remove before restore: {}", target.display()))?;
        }
        fs::move_entry(&entry.path(), &target)
            .with_context(|| format!("restore {}", target.display()))?;
        log.info(&format!("restored {}", target.display()));
        restored += 1;
    }

    if global.dry_run {
        log.record_task("restore", TaskStatus::DryRun, None);
        return Ok(());
    }

    // Remove the now-empty backup directory.
    let _ = std::fs::remove_dir(&backup_dir);
    log.record_task("restore", TaskStatus::Ok, Some(&format!("{restored} restored")));
    Ok(())
}

/// Create one symlink according to the core/config policy.
fn apply_link(
    root: &Path,
    home: &Path,
    entry: &Link,
    is_core: bool,
    dry_run: bool,
    log: &Logger,
) -> Result<ResourceChange> {
    let source = root.join(&entry.source);
    let target = fs::expand_path(&entry.target);

    let resource = SymlinkResource::new(source, target.clone());
    let state = resource.current_state()?;

    match state {
        ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
        ResourceState::Invalid { reason } => {
            // A real directory blocks the link. Core links may replace it,
            // but only when a backup exists to recover from.
            if is_core && reason == "target is a real directory" {
                if !has_backup(home)? {
                    return Ok(ResourceChange::Skipped {
                        reason: format!("{reason} and no {BACKUP_PREFIX}* backup exists"),
                    });
                }
                if dry_run {
                    log.dry_run(&format!("would replace directory {}", target.display()));
                    return Ok(ResourceChange::Applied);
                }
                std::fs::remove_dir_all(&target)
                    .with_context(|| format!("remove directory: {}", target.display()))?;
                let change = resource.apply()?;
                log.debug(&format!("linked {}", resource.description()));
                Ok(change)
            } else {
                Ok(ResourceChange::Skipped { reason })
            }
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } => {
            if dry_run {
                log.dry_run(&format!("would link {}", resource.description()));
                return Ok(ResourceChange::Applied);
            }
            let change = resource.apply()?;
            log.debug(&format!("linked {}", resource.description()));
            Ok(change)
        }
    }
}

/// Whether any `dotbk-` backup directory exists in `home`.
fn has_backup(home: &Path) -> Result<bool> {
    Ok(latest_backup(home)?.is_some())
}

/// The most recent `dotbk-` backup directory in `home`, by name (the name
/// embeds a Unix timestamp, so lexicographic order is chronological for
/// equal-length names).
fn latest_backup(home: &Path) -> Result<Option<PathBuf>> {
    let entries = match std::fs::read_dir(home) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read home: {}", home.display())),
    };

    let mut backups: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            entry.path().is_dir()
                && entry.file_name().to_string_lossy().starts_with(BACKUP_PREFIX)
        })
        .map(|entry| entry.path())
        .collect();
    backups.sort();
    Ok(backups.pop())
}

/// Remove a file, symlink, or directory at `path`.
fn remove_any(path: &Path) -> Result<()> {
    let metadata = path.symlink_metadata()?;
    if metadata.is_dir() && !metadata.is_symlink() {
        std::fs::remove_dir_all(path)?;
    } else if std::fs::remove_file(path).is_err() {
        // Windows directory symlinks need remove_dir.
        std::fs::remove_dir(path)?;
    }
    Ok(())
}

/// The user's home directory.
fn home_dir() -> Result<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var(var)
        .map(PathBuf::from)
        .with_context(|| format!("{var} environment variable is not set"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn latest_backup_picks_newest() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join("dotbk-1700000000")).unwrap();
        std::fs::create_dir(home.path().join("dotbk-1800000000")).unwrap();
        std::fs::create_dir(home.path().join("unrelated")).unwrap();

        let latest = latest_backup(home.path()).unwrap().unwrap();
        assert!(latest.ends_with("dotbk-1800000000"));
    }

    #[test]
    fn latest_backup_none_without_backups() {
        let home = tempfile::tempdir().unwrap();
        assert!(latest_backup(home.path()).unwrap().is_none());
    }

    #[test]
    fn has_backup_reflects_directory_presence() {
        let home = tempfile::tempdir().unwrap();
        assert!(!has_backup(home.path()).unwrap());
        std::fs::create_dir(home.path().join("dotbk-1234")).unwrap();
        assert!(has_backup(home.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn remove_any_handles_file_symlink_and_dir() {
        let dir = tempfile::tempdir().unwrap();

        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        remove_any(&file).unwrap();
        assert!(!file.exists());

        let target = dir.path().join("t");
        std::fs::write(&target, "x").unwrap();
        let link = dir.path().join("l");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        remove_any(&link).unwrap();
        assert!(link.symlink_metadata().is_err());

        let sub = dir.path().join("d");
        std::fs::create_dir_all(sub.join("inner")).unwrap();
        remove_any(&sub).unwrap();
        assert!(!sub.exists());
    }
}
