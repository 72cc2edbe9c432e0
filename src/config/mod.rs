//! Configuration loading and persistence.
//!
//! Two documents exist: the local `dotctl.yaml` describing one dotfiles
//! repository ([`DotfilesConfig`]), and the per-user namespace registry
//! ([`global::GlobalConfig`]). Rewrites of the local file go through
//! [`transaction::ConfigTransaction`].
pub mod global;
pub mod transaction;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compat::CompatSpec;
use crate::error::ConfigError;

/// File name of the local configuration document.
pub const CONFIG_FILE: &str = "dotctl.yaml";

/// A local dotfiles repository configuration (`dotctl.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DotfilesConfig {
    /// Repository name; doubles as the default namespace name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Namespace this repository belongs to, validated against the global
    /// registry when one exists.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Environment variables exported to install scripts and build steps.
    /// Values may reference other variables (`$HOME/tools`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Declared system dependencies. Stored verbatim; dotctl is not a
    /// package manager and never resolves or installs these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Backup and symlink layout.
    #[serde(default)]
    pub setup: Setup,
    /// Ordered build steps.
    #[serde(default)]
    pub build: Build,
    /// User-authored scripts.
    #[serde(default)]
    pub scripts: Scripts,
}

/// The `setup:` block — what to back up and what to link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Setup {
    /// Directories moved aside by `setup backup` before linking. Entries
    /// may contain environment variables (`$HOME/.config`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backup_dirs: Vec<String>,
    /// Whole-directory links created first (e.g. `.config`, `.local`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub core_links: Vec<Link>,
    /// Individual file/directory links created after the core links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config_links: Vec<Link>,
}

/// One symlink declaration: repository-relative source, target in `$HOME`
/// (both may contain environment variables).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Source path, relative to the repository root.
    pub source: String,
    /// Target path; environment variables are expanded.
    pub target: String,
}

/// The `build:` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Build {
    /// Ordered build steps executed by `build run`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
}

/// One build step: a single command or a command sequence, optionally gated
/// by a compatibility spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step name, unique within the config.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Single shell command; mutually exclusive with `commands` by
    /// convention (when both are present, `command` runs first).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Shell command sequence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    /// Host requirements gating this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compat: Option<CompatSpec>,
}

/// The `scripts:` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scripts {
    /// Install scripts, selectable by name via `dotctl install <name>`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install: Vec<Script>,
}

/// One user-authored install script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Script name, unique within the config.
    pub name: String,
    /// Free-form description shown in listings.
    #[serde(default)]
    pub description: String,
    /// Path to the executable, relative to the repository root.
    pub path: String,
    /// Host requirements gating this script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compat: Option<CompatSpec>,
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

impl DotfilesConfig {
    /// Find an install script by name.
    #[must_use]
    pub fn script(&self, name: &str) -> Option<&Script> {
        self.scripts.install.iter().find(|s| s.name == name)
    }

    /// Find a build step by name.
    #[must_use]
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.build.steps.iter().find(|s| s.name == name)
    }

    /// Serialize to a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Yaml {
            path: CONFIG_FILE.to_string(),
            source: e,
        })
    }
}

/// Load a local configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read and
/// [`ConfigError::Yaml`] when it cannot be parsed.
pub fn load(path: &Path) -> Result<DotfilesConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::Yaml {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write a local configuration document to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save(config: &DotfilesConfig, path: &Path) -> Result<(), ConfigError> {
    let content = config.to_yaml()?;
    std::fs::write(path, content).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::compat::OsRequirement;

    const SAMPLE: &str = r"
name: my-dotfiles
description: personal configuration
namespace: personal
env:
  DOTFILES: $HOME/dotfiles
dependencies:
  - git
  - stow
setup:
  backup_dirs:
    - $HOME/.config
  core_links:
    - source: .config
      target: $HOME/.config
  config_links:
    - source: .bashrc
      target: $HOME/.bashrc
build:
  steps:
    - name: wm
      description: Set up window manager
      commands:
        - git clone https://example.com/wm
        - cd wm && make install
      compat:
        os: debian
scripts:
  install:
    - name: docker
      description: Install Docker
      path: scripts/install/docker
      compat:
        pkgmgr: apt
        custom:
          - name: min-memory
            value: 4096
";

    #[test]
    fn parse_full_document() {
        let config: DotfilesConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.name, "my-dotfiles");
        assert_eq!(config.namespace, "personal");
        assert_eq!(config.env.get("DOTFILES").unwrap(), "$HOME/dotfiles");
        assert_eq!(config.dependencies, vec!["git", "stow"]);
        assert_eq!(config.setup.backup_dirs, vec!["$HOME/.config"]);
        assert_eq!(config.setup.core_links[0].source, ".config");
        assert_eq!(config.build.steps[0].commands.len(), 2);
        assert_eq!(
            config.build.steps[0].compat.as_ref().unwrap().os,
            OsRequirement::from("debian")
        );
        assert_eq!(config.scripts.install[0].name, "docker");
        assert_eq!(
            config.scripts.install[0].compat.as_ref().unwrap().pkgmgr,
            "apt"
        );
    }

    #[test]
    fn script_and_step_lookup() {
        let config: DotfilesConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(config.script("docker").is_some());
        assert!(config.script("nope").is_none());
        assert!(config.step("wm").is_some());
        assert!(config.step("nope").is_none());
    }

    #[test]
    fn minimal_document_parses_with_defaults() {
        let config: DotfilesConfig = serde_yaml::from_str("name: tiny\n").unwrap();
        assert_eq!(config.name, "tiny");
        assert!(config.namespace.is_empty());
        assert!(config.setup.backup_dirs.is_empty());
        assert!(config.build.steps.is_empty());
        assert!(config.scripts.install.is_empty());
    }

    #[test]
    fn roundtrip_preserves_document() {
        let config: DotfilesConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let yaml = config.to_yaml().unwrap();
        let back: DotfilesConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn load_and_save_through_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, SAMPLE).unwrap();

        let config = load(&path).unwrap();
        let copy = dir.path().join("copy.yaml");
        save(&config, &copy).unwrap();
        assert_eq!(load(&copy).unwrap(), config);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_invalid_yaml_is_yaml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "scripts: [not: {valid").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn script_display_includes_name_and_description() {
        let script = Script {
            name: "docker".to_string(),
            description: "Install Docker".to_string(),
            path: "scripts/install/docker".to_string(),
            compat: None,
        };
        assert_eq!(script.to_string(), "docker: Install Docker");
    }
}
