// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed dotfiles repository builder so each
// integration test can set up an isolated environment without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dotctl::compat::{ValidatorRegistry, builtin};
use dotctl::config::{self, DotfilesConfig};
use dotctl::platform::HostFacts;

/// A minimal but valid `dotctl.yaml` document.
pub const MINIMAL_CONFIG: &str = "name: test-dotfiles\ndescription: integration fixture\n";

/// An isolated dotfiles repository backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct TestRepo {
    /// Temporary directory containing the repository.
    pub root: tempfile::TempDir,
}

impl TestRepo {
    /// Create a repository containing only a minimal config.
    pub fn new() -> Self {
        Self::with_config(MINIMAL_CONFIG)
    }

    /// Create a repository with the given `dotctl.yaml` content.
    pub fn with_config(config: &str) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::write(root.path().join(config::CONFIG_FILE), config).expect("write config");
        Self { root }
    }

    /// Path to the repository root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Path to the repository's config file.
    pub fn config_path(&self) -> PathBuf {
        self.root.path().join(config::CONFIG_FILE)
    }

    /// Load the repository's config.
    pub fn load_config(&self) -> DotfilesConfig {
        config::load(&self.config_path()).expect("load config")
    }

    /// Write an executable script under `scripts/install/`.
    #[cfg(unix)]
    pub fn add_script(&self, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt as _;
        let dir = self.root.path().join("scripts/install");
        std::fs::create_dir_all(&dir).expect("create scripts dir");
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
        path
    }
}

/// Fixed host facts so compatibility tests do not depend on the machine
/// running the suite.
pub fn fake_facts() -> HostFacts {
    HostFacts {
        os_id: "ubuntu".to_string(),
        os_family: "debian".to_string(),
        arch: "x86_64".to_string(),
        shell: "/bin/bash".to_string(),
        kernel: "6.8.0-41-generic".to_string(),
    }
}

/// A registry populated with built-in predicates bound to [`fake_facts`].
pub fn fake_registry() -> ValidatorRegistry {
    let registry = ValidatorRegistry::new();
    builtin::register(&registry, &fake_facts());
    registry
}

/// A registry populated with built-in predicates bound to the real host.
pub fn host_registry() -> ValidatorRegistry {
    let registry = ValidatorRegistry::new();
    builtin::register(&registry, &HostFacts::detect());
    registry
}
