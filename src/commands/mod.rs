//! Top-level subcommand orchestration.
pub mod build;
pub mod compat;
pub mod create;
pub mod install;
pub mod list;
pub mod namespace;
pub mod setup;
pub mod sync;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::compat::{ValidatorRegistry, builtin};
use crate::config::global::GlobalConfig;
use crate::config::{self, CONFIG_FILE, DotfilesConfig};
use crate::error::ConfigError;
use crate::logging::Logger;
use crate::platform::HostFacts;
use crate::plugins;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates host detection, validator registration, config discovery,
/// and namespace validation so that each command does not have to repeat the
/// boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Path of the local config document in use.
    pub config_path: PathBuf,
    /// The loaded local configuration.
    pub config: DotfilesConfig,
    /// Facts about the current host.
    pub facts: HostFacts,
    /// Registry holding the built-in predicates and bundled plugins.
    pub registry: ValidatorRegistry,
}

impl CommandSetup {
    /// Detect the host, build the validator registry, locate and load the
    /// local configuration, and validate its namespace reference.
    ///
    /// # Errors
    ///
    /// Returns an error if no config can be located, the config fails to
    /// parse, its namespace is not registered, or plugin registration fails.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let facts = HostFacts::detect();
        log.debug(&format!("host: {facts}"));

        let registry = ValidatorRegistry::new();
        builtin::register(&registry, &facts);
        plugins::register_all(&registry)?;

        let config_path = resolve_config_path(global)?;
        log.stage("Loading configuration");
        log.debug(&format!("config: {}", config_path.display()));
        let config = config::load(&config_path)?;
        validate_namespace(&config)?;

        log.info(&format!(
            "loaded {} scripts, {} build steps",
            config.scripts.install.len(),
            config.build.steps.len()
        ));

        Ok(Self {
            config_path,
            config,
            facts,
            registry,
        })
    }

    /// Root directory of the dotfiles repository the config belongs to.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.config_path
            .parent()
            .map_or_else(|| PathBuf::from("."), std::path::Path::to_path_buf)
    }

    /// Environment variables exported to scripts and build steps, with
    /// values expanded against the process environment.
    #[must_use]
    pub fn script_env(&self) -> Vec<(String, String)> {
        self.config
            .env
            .iter()
            .map(|(k, v)| (k.clone(), crate::resources::fs::expand_env(v)))
            .collect()
    }
}

/// Locate the local config document: explicit `--config` flag, then
/// `dotctl.yaml` in the current directory, then the active (or `-n`-selected)
/// namespace's repository.
///
/// # Errors
///
/// Returns [`ConfigError::ConfigNotFound`] when no candidate exists.
pub fn resolve_config_path(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(explicit) = &global.config {
        return Ok(explicit.clone());
    }

    let local = PathBuf::from(CONFIG_FILE);
    if global.namespace.is_none() && local.exists() {
        return Ok(local);
    }

    let registry = GlobalConfig::load()?;
    let ns = global
        .namespace
        .clone()
        .or_else(|| registry.active_namespace())
        .ok_or(ConfigError::ConfigNotFound)?;
    let info = registry
        .info(&ns)
        .ok_or_else(|| ConfigError::NamespaceNotFound(ns.clone()))?;
    Ok(info.path.join(CONFIG_FILE))
}

/// Validate a config's namespace reference against the global registry.
///
/// Skipped when no global config file exists, so fresh checkouts work
/// before any namespace is registered.
fn validate_namespace(config: &DotfilesConfig) -> Result<(), ConfigError> {
    if config.namespace.is_empty() || !GlobalConfig::default_path().exists() {
        return Ok(());
    }
    let registry = GlobalConfig::load()?;
    if registry.contains(&config.namespace) {
        Ok(())
    } else {
        Err(ConfigError::UndefinedNamespace(config.namespace.clone()))
    }
}
