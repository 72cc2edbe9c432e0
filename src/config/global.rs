//! Per-user registry of named dotfiles namespaces.
//!
//! Persisted as a flat YAML document at `$XDG_CONFIG_HOME/dotctl/config.yaml`
//! (default `~/.config/dotctl/config.yaml`; `%APPDATA%\dotctl` on Windows).
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding the active namespace for one invocation.
pub const NAMESPACE_ENV: &str = "DOTCTL_NAMESPACE";

/// Registered location of one dotfiles repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    /// Path to the dotfiles repository root.
    pub path: PathBuf,
    /// Name of the repository's local bin directory; defaults to the
    /// namespace name when empty.
    #[serde(default, rename = "local-bin", skip_serializing_if = "String::is_empty")]
    pub local_bin: String,
}

/// The persisted global configuration: namespace names, their locations,
/// and the currently active namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Registered namespace names, in registration order.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Per-namespace configuration, keyed by name.
    #[serde(default)]
    pub configs: BTreeMap<String, NamespaceInfo>,
    /// Name of the active namespace, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl GlobalConfig {
    /// Directory holding the global config file.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        if cfg!(windows)
            && let Ok(appdata) = std::env::var("APPDATA")
        {
            return PathBuf::from(appdata).join("dotctl");
        }
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
            && !xdg.is_empty()
        {
            return PathBuf::from(xdg).join("dotctl");
        }
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(".config").join("dotctl")
    }

    /// Default path of the global config file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load the global config from its default location.
    ///
    /// A missing file yields the empty default config, so first use needs no
    /// explicit initialization step.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load the global config from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Yaml {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Persist the global config to an explicit path, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let content = serde_yaml::to_string(self).map_err(|e| ConfigError::Yaml {
            path: path.display().to_string(),
            source: e,
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Persist the global config to its default location.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path())
    }

    /// Register a new namespace.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NamespaceExists`] when the name is taken and
    /// [`ConfigError::Io`] when the path does not exist.
    pub fn add_namespace(
        &mut self,
        name: &str,
        path: &Path,
        local_bin: &str,
    ) -> Result<(), ConfigError> {
        if self.namespaces.iter().any(|ns| ns == name) {
            return Err(ConfigError::NamespaceExists(name.to_string()));
        }
        std::fs::metadata(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        self.namespaces.push(name.to_string());
        self.configs.insert(
            name.to_string(),
            NamespaceInfo {
                path: path.to_path_buf(),
                local_bin: local_bin.to_string(),
            },
        );
        Ok(())
    }

    /// Remove a namespace, clearing `active` if it pointed there.
    ///
    /// Only the registration is removed; no files are deleted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NamespaceNotFound`] when no namespace with
    /// this name exists.
    pub fn remove_namespace(&mut self, name: &str) -> Result<(), ConfigError> {
        let Some(index) = self.namespaces.iter().position(|ns| ns == name) else {
            return Err(ConfigError::NamespaceNotFound(name.to_string()));
        };
        self.namespaces.remove(index);
        self.configs.remove(name);
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        Ok(())
    }

    /// Make a registered namespace the active one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NamespaceNotFound`] when no namespace with
    /// this name exists.
    pub fn switch(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.configs.contains_key(name) {
            return Err(ConfigError::NamespaceNotFound(name.to_string()));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    /// Whether a namespace with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    /// Info for a registered namespace.
    #[must_use]
    pub fn info(&self, name: &str) -> Option<&NamespaceInfo> {
        self.configs.get(name)
    }

    /// Resolve the active namespace: the `DOTCTL_NAMESPACE` environment
    /// variable wins over the persisted `active` field.
    #[must_use]
    pub fn active_namespace(&self) -> Option<String> {
        if let Ok(ns) = std::env::var(NAMESPACE_ENV)
            && !ns.is_empty()
        {
            return Some(ns);
        }
        self.active.clone()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn load_from_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = GlobalConfig::load_from(&dir.path().join("config.yaml")).unwrap();
        assert!(config.namespaces.is_empty());
        assert!(config.active.is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = GlobalConfig::default();
        config
            .add_namespace("work", repo.path(), "work-bins")
            .unwrap();
        config.switch("work").unwrap();
        config.save_to(&path).unwrap();

        let loaded = GlobalConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.active.as_deref(), Some("work"));
        assert_eq!(loaded.info("work").unwrap().local_bin, "work-bins");
    }

    #[test]
    fn add_duplicate_namespace_fails() {
        let repo = tempfile::tempdir().unwrap();
        let mut config = GlobalConfig::default();
        config.add_namespace("home", repo.path(), "").unwrap();
        let err = config.add_namespace("home", repo.path(), "").unwrap_err();
        assert!(matches!(err, ConfigError::NamespaceExists(_)));
        assert_eq!(config.namespaces.len(), 1);
    }

    #[test]
    fn add_namespace_with_missing_path_fails() {
        let mut config = GlobalConfig::default();
        let err = config
            .add_namespace("ghost", Path::new("/definitely/not/a/path"), "")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(config.namespaces.is_empty());
    }

    #[test]
    fn remove_clears_active() {
        let repo = tempfile::tempdir().unwrap();
        let mut config = GlobalConfig::default();
        config.add_namespace("solo", repo.path(), "").unwrap();
        config.switch("solo").unwrap();

        config.remove_namespace("solo").unwrap();
        assert!(config.active.is_none());
        assert!(!config.contains("solo"));
    }

    #[test]
    fn remove_unknown_namespace_fails() {
        let mut config = GlobalConfig::default();
        let err = config.remove_namespace("nope").unwrap_err();
        assert!(matches!(err, ConfigError::NamespaceNotFound(_)));
    }

    #[test]
    fn switch_to_unknown_namespace_fails() {
        let mut config = GlobalConfig::default();
        let err = config.switch("nope").unwrap_err();
        assert!(matches!(err, ConfigError::NamespaceNotFound(_)));
    }

    #[test]
    fn parse_handwritten_document() {
        let config: GlobalConfig = serde_yaml::from_str(
            "namespaces:\n  - blw\n  - jack\nconfigs:\n  blw:\n    path: /home/u/blw-dotfiles\n  jack:\n    path: /home/u/jack-dotfiles\n    local-bin: jack-bins\nactive: blw\n",
        )
        .unwrap();
        assert_eq!(config.namespaces, vec!["blw", "jack"]);
        assert_eq!(config.info("jack").unwrap().local_bin, "jack-bins");
        assert_eq!(config.active.as_deref(), Some("blw"));
    }
}
