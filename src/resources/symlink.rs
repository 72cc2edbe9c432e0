//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Resource, ResourceChange, ResourceState};

/// A symlink resource that can be checked and applied.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The source file/directory (what the symlink points to).
    pub source: PathBuf,
    /// The target path (where the symlink will be created).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Resource for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        // A real (non-symlink) directory at the target must not be clobbered
        // here; the caller decides whether a backup justifies replacing it.
        if self.target.is_dir()
            && self
                .target
                .symlink_metadata()
                .map(|m| !m.is_symlink())
                .unwrap_or(false)
        {
            return Ok(ResourceState::Invalid {
                reason: "target is a real directory".to_string(),
            });
        }

        std::fs::read_link(&self.target).map_or_else(
            |_| {
                // Target doesn't exist or isn't a symlink
                if self.target.exists() {
                    Ok(ResourceState::Incorrect {
                        current: "target is a regular file".to_string(),
                    })
                } else {
                    Ok(ResourceState::Missing)
                }
            },
            |existing| {
                if paths_equal(&existing, &self.source) {
                    Ok(ResourceState::Correct)
                } else {
                    Ok(ResourceState::Incorrect {
                        current: format!("points to {}", existing.display()),
                    })
                }
            },
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        super::fs::ensure_parent_dir(&self.target)?;

        if matches!(self.current_state()?, ResourceState::Correct) {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        // Remove existing target if it's a symlink or file
        if self.target.exists() || self.target.symlink_metadata().is_ok() {
            remove_existing(&self.target)
                .with_context(|| format!("remove existing: {}", self.target.display()))?;
        }

        create_symlink(&self.source, &self.target)
            .with_context(|| format!("create link: {}", self.target.display()))?;

        Ok(ResourceChange::Applied)
    }
}

/// Compare two paths for equality after normalization, so `a/../b` style
/// spellings and Windows UNC prefixes do not produce false mismatches.
#[must_use]
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    let norm_a = dunce::canonicalize(a).unwrap_or_else(|_| a.to_path_buf());
    let norm_b = dunce::canonicalize(b).unwrap_or_else(|_| b.to_path_buf());
    norm_a == norm_b
}

/// Remove a symlink or regular file at `path` (not a real directory).
fn remove_existing(path: &Path) -> Result<()> {
    let metadata = path
        .symlink_metadata()
        .with_context(|| format!("stat: {}", path.display()))?;
    if metadata.is_dir() && !metadata.is_symlink() {
        anyhow::bail!("refusing to remove real directory: {}", path.display());
    }
    // On Windows a directory symlink must be removed with remove_dir.
    if std::fs::remove_file(path).is_err() {
        std::fs::remove_dir(path).with_context(|| format!("remove: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(unix)]
fn create_symlink(source: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(source, target)?;
    Ok(())
}

#[cfg(windows)]
fn create_symlink(source: &Path, target: &Path) -> Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)?;
    } else {
        std::os::windows::fs::symlink_file(source, target)?;
    }
    Ok(())
}
