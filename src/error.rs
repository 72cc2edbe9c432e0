//! Domain-specific error types for the dotctl engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`TransactionError`]) while command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotctlError
//! ├── Config(ConfigError)           — YAML parsing, namespace resolution
//! ├── Registration(RegistrationError) — validator registry misuse
//! ├── Transaction(TransactionError) — config transaction failures
//! └── Script(ScriptError)           — install script execution
//! ```
//!
//! Compatibility verdicts are deliberately *not* errors: an incompatible
//! script is an ordinary `false` so callers can evaluate many scripts and
//! report which ones were skipped.

use thiserror::Error;

/// Top-level error type for the dotctl engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum DotctlError {
    /// Configuration-related error (parsing, namespace resolution, I/O).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validator registration error (duplicate or malformed registration).
    #[error("Validator registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Config transaction error (backup, hashing, concurrent modification).
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Install script execution error.
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
}

/// Errors that arise from configuration loading and namespace resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing a config file.
    #[error("IO error on config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read or written.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The YAML document could not be parsed or serialized.
    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        /// Path to the file that failed to parse.
        path: String,
        /// Underlying serde error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A local config names a namespace that is not registered globally.
    #[error("undefined namespace: {0}")]
    UndefinedNamespace(String),

    /// A namespace with this name is already registered.
    #[error("namespace already exists: {0}")]
    NamespaceExists(String),

    /// No namespace with this name is registered.
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    /// No active namespace is set and none was given on the command line.
    #[error("no active namespace; run 'dotctl namespace switch <name>' first")]
    NoActiveNamespace,

    /// No dotctl.yaml could be located for this invocation.
    #[error("cannot locate dotctl.yaml; run inside a dotfiles repository or switch to a namespace")]
    ConfigNotFound,
}

/// Errors that arise from validator registration.
///
/// Lookup misses are *not* represented here: a missing built-in predicate
/// means "field unconstrained" and a missing custom validator means "failed
/// requirement" — both are ordinary compatibility outcomes, not errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    /// The validator reported an empty name.
    #[error("validator name cannot be empty")]
    EmptyName,

    /// A validator with the same name is already registered.
    #[error("validator '{0}' is already registered")]
    Duplicate(String),
}

/// Errors that arise from the config transaction.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// A file could not be opened, hashed, copied, or removed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path of the file involved in the failed operation.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The live file's content hash no longer matches the hash captured at
    /// transaction start — another writer touched the file.
    #[error("configuration file was modified by another process")]
    ConcurrentModification,
}

impl TransactionError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Errors that arise from install script execution.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// No script with this name is declared in the config.
    #[error("script not found: {0}")]
    NotFound(String),

    /// The script file exists but lacks the executable bit.
    #[error("script is not executable: {0}")]
    NotExecutable(String),

    /// The script ran and exited non-zero.
    #[error("script '{script}' failed with exit code {code}")]
    ExecutionFailed {
        /// Name of the script that failed.
        script: String,
        /// Exit code reported by the process (-1 when killed by a signal).
        code: i32,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    // -----------------------------------------------------------------------
    // ConfigError
    // -----------------------------------------------------------------------

    #[test]
    fn config_error_io_display() {
        let e = ConfigError::Io {
            path: "/home/u/dotctl.yaml".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.to_string().contains("/home/u/dotctl.yaml"));
        assert!(e.to_string().contains("IO error on config file"));
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: "dotctl.yaml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn config_error_undefined_namespace_display() {
        let e = ConfigError::UndefinedNamespace("work".to_string());
        assert_eq!(e.to_string(), "undefined namespace: work");
    }

    #[test]
    fn config_error_namespace_exists_display() {
        let e = ConfigError::NamespaceExists("personal".to_string());
        assert_eq!(e.to_string(), "namespace already exists: personal");
    }

    #[test]
    fn config_error_no_active_namespace_mentions_switch() {
        let e = ConfigError::NoActiveNamespace;
        assert!(e.to_string().contains("namespace switch"));
    }

    // -----------------------------------------------------------------------
    // RegistrationError
    // -----------------------------------------------------------------------

    #[test]
    fn registration_error_duplicate_display() {
        let e = RegistrationError::Duplicate("min-memory".to_string());
        assert_eq!(e.to_string(), "validator 'min-memory' is already registered");
    }

    #[test]
    fn registration_error_empty_name_display() {
        let e = RegistrationError::EmptyName;
        assert_eq!(e.to_string(), "validator name cannot be empty");
    }

    // -----------------------------------------------------------------------
    // TransactionError
    // -----------------------------------------------------------------------

    #[test]
    fn transaction_error_io_display() {
        let e = TransactionError::io(
            Path::new("/tmp/dotctl.yaml"),
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert!(e.to_string().contains("/tmp/dotctl.yaml"));
    }

    #[test]
    fn transaction_error_concurrent_modification_display() {
        let e = TransactionError::ConcurrentModification;
        assert_eq!(
            e.to_string(),
            "configuration file was modified by another process"
        );
    }

    // -----------------------------------------------------------------------
    // ScriptError
    // -----------------------------------------------------------------------

    #[test]
    fn script_error_not_found_display() {
        let e = ScriptError::NotFound("docker".to_string());
        assert_eq!(e.to_string(), "script not found: docker");
    }

    #[test]
    fn script_error_execution_failed_display() {
        let e = ScriptError::ExecutionFailed {
            script: "docker".to_string(),
            code: 2,
        };
        assert_eq!(e.to_string(), "script 'docker' failed with exit code 2");
    }

    // -----------------------------------------------------------------------
    // DotctlError conversions
    // -----------------------------------------------------------------------

    #[test]
    fn dotctl_error_from_config_error() {
        let e: DotctlError = ConfigError::NoActiveNamespace.into();
        assert!(e.to_string().contains("Configuration error"));
    }

    #[test]
    fn dotctl_error_from_registration_error() {
        let e: DotctlError = RegistrationError::EmptyName.into();
        assert!(e.to_string().contains("Validator registration error"));
    }

    #[test]
    fn dotctl_error_from_transaction_error() {
        let e: DotctlError = TransactionError::ConcurrentModification.into();
        assert!(e.to_string().contains("Transaction error"));
    }

    #[test]
    fn dotctl_error_from_script_error() {
        let e: DotctlError = ScriptError::NotFound("x".to_string()).into();
        assert!(e.to_string().contains("Script error"));
    }

    // -----------------------------------------------------------------------
    // Send + Sync bounds
    // -----------------------------------------------------------------------

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<DotctlError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<RegistrationError>();
        assert_send_sync::<TransactionError>();
        assert_send_sync::<ScriptError>();
    }

    // -----------------------------------------------------------------------
    // anyhow conversion
    // -----------------------------------------------------------------------

    #[test]
    fn transaction_error_converts_to_anyhow() {
        let e = TransactionError::ConcurrentModification;
        let _anyhow_err: anyhow::Error = e.into();
    }

    #[test]
    fn registration_error_converts_to_anyhow() {
        let e = RegistrationError::Duplicate("x".to_string());
        let _anyhow_err: anyhow::Error = e.into();
    }
}
