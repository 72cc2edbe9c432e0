//! Atomic read-modify-write guard for the configuration file.
//!
//! A [`ConfigTransaction`] wraps one rewrite of `dotctl.yaml` with a
//! backup-and-restore safety net and an optimistic-concurrency check via
//! content hashing. The caller protocol is:
//!
//! 1. [`begin`](ConfigTransaction::begin) — hash the live file and copy it
//!    to a uniquely named backup.
//! 2. Read the config, compute the new version in memory.
//! 3. [`check_modified`](ConfigTransaction::check_modified) — if another
//!    writer touched the file, roll back and abort.
//! 4. Write the new config to the live path.
//! 5. [`commit`](ConfigTransaction::commit) — delete the backup.
//!
//! Dropping an open transaction rolls back, so every early `?` return leaves
//! the live file in its pre-transaction state. Failures are never retried.
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::error::TransactionError;

/// SHA-256 digest of a file's content.
type ContentHash = [u8; 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Committed,
    RolledBack,
}

/// An in-flight guarded rewrite of a configuration file.
#[derive(Debug)]
pub struct ConfigTransaction {
    config_path: PathBuf,
    backup_path: PathBuf,
    original_hash: ContentHash,
    state: State,
}

impl ConfigTransaction {
    /// Start a transaction: hash the live file and copy it byte-for-byte to
    /// a backup path suffixed with the process id and a nanosecond
    /// timestamp, so concurrent transactions never collide.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Io`] if the file cannot be read, hashed,
    /// or copied.
    pub fn begin(config_path: &Path) -> Result<Self, TransactionError> {
        let original_hash = hash_file(config_path)?;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let backup_name = format!(
            "{}.bak.{}.{nanos}",
            config_path
                .file_name()
                .map_or_else(|| "config".to_string(), |n| n.to_string_lossy().to_string()),
            std::process::id(),
        );
        let backup_path = config_path.with_file_name(backup_name);

        std::fs::copy(config_path, &backup_path)
            .map_err(|e| TransactionError::io(&backup_path, e))?;

        Ok(Self {
            config_path: config_path.to_path_buf(),
            backup_path,
            original_hash,
            state: State::Open,
        })
    }

    /// Path of the backup copy taken at transaction start.
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Re-hash the live file and compare against the hash captured at
    /// [`begin`](Self::begin). `Ok(true)` means another writer modified the
    /// file during this transaction's lifetime and the caller must abort.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Io`] if the live file cannot be read.
    pub fn check_modified(&self) -> Result<bool, TransactionError> {
        let current = hash_file(&self.config_path)?;
        Ok(current != self.original_hash)
    }

    /// Finalize the transaction by deleting the backup. The real write
    /// already happened through the caller before this point.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Io`] if the backup cannot be removed.
    pub fn commit(mut self) -> Result<(), TransactionError> {
        std::fs::remove_file(&self.backup_path)
            .map_err(|e| TransactionError::io(&self.backup_path, e))?;
        self.state = State::Committed;
        Ok(())
    }

    /// Undo the transaction by restoring the backup over the live file.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Io`] if the backup cannot be moved back
    /// into place.
    pub fn rollback(mut self) -> Result<(), TransactionError> {
        self.restore()?;
        self.state = State::RolledBack;
        Ok(())
    }

    /// Move the backup over the live path. Rename first; fall back to
    /// copy + delete when the rename crosses a filesystem boundary.
    fn restore(&self) -> Result<(), TransactionError> {
        if std::fs::rename(&self.backup_path, &self.config_path).is_ok() {
            return Ok(());
        }
        std::fs::copy(&self.backup_path, &self.config_path)
            .map_err(|e| TransactionError::io(&self.config_path, e))?;
        std::fs::remove_file(&self.backup_path)
            .map_err(|e| TransactionError::io(&self.backup_path, e))
    }
}

impl Drop for ConfigTransaction {
    fn drop(&mut self) {
        if self.state != State::Open {
            return;
        }
        // Guaranteed rollback on every exit path except the explicit commit.
        if let Err(e) = self.restore() {
            tracing::warn!(
                "failed to roll back transaction on {}: {e}",
                self.config_path.display()
            );
        } else {
            self.state = State::RolledBack;
        }
    }
}

/// SHA-256 hash of a file's full content.
fn hash_file(path: &Path) -> Result<ContentHash, TransactionError> {
    let content = std::fs::read(path).map_err(|e| TransactionError::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hasher.finalize().into())
}
