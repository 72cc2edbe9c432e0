//! `namespace` subcommands: manage the per-user registry of dotfiles
//! repositories.
#![allow(clippy::print_stdout)]

use std::path::Path;

use anyhow::Result;

use crate::config::global::GlobalConfig;
use crate::logging::Logger;

/// Run `namespace list`: print registered namespaces, marking the active
/// one.
///
/// # Errors
///
/// Returns an error if the global config cannot be read.
pub fn list(_log: &Logger) -> Result<()> {
    let registry = GlobalConfig::load()?;
    if registry.namespaces.is_empty() {
        println!("No namespaces registered.");
        return Ok(());
    }

    let active = registry.active_namespace();
    println!("Available namespaces:");
    for ns in &registry.namespaces {
        if active.as_deref() == Some(ns.as_str()) {
            println!("* {ns} (active)");
        } else {
            println!("  {ns}");
        }
    }
    Ok(())
}

/// Run `namespace add <name> <path> [local-bin]`.
///
/// # Errors
///
/// Returns an error when the name is taken, the path does not exist, or the
/// registry cannot be persisted.
pub fn add(name: &str, path: &Path, local_bin: Option<&str>, log: &Logger) -> Result<()> {
    let absolute = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    let mut registry = GlobalConfig::load()?;
    registry.add_namespace(name, &absolute, local_bin.unwrap_or_default())?;
    registry.save()?;

    log.info(&format!(
        "added namespace '{name}' pointing to {}",
        absolute.display()
    ));
    Ok(())
}

/// Run `namespace remove <name>`. Only the registration is removed; no
/// files are deleted.
///
/// # Errors
///
/// Returns an error when the namespace is unknown or the registry cannot be
/// persisted.
pub fn remove(name: &str, log: &Logger) -> Result<()> {
    let mut registry = GlobalConfig::load()?;
    let was_active = registry.active.as_deref() == Some(name);
    registry.remove_namespace(name)?;
    registry.save()?;

    if was_active {
        log.info("cleared active namespace");
    }
    log.info(&format!("removed namespace '{name}'"));
    Ok(())
}

/// Run `namespace switch <name>`.
///
/// # Errors
///
/// Returns an error when the namespace is unknown or the registry cannot be
/// persisted.
pub fn switch(name: &str, log: &Logger) -> Result<()> {
    let mut registry = GlobalConfig::load()?;
    registry.switch(name)?;
    registry.save()?;

    let path = registry
        .info(name)
        .map(|info| info.path.display().to_string())
        .unwrap_or_default();
    log.info(&format!("switched to namespace: {name}"));
    log.info(&format!("dotfiles path: {path}"));
    Ok(())
}
