//! `create script` subcommand: scaffold a new install script and record it
//! in the config under a transaction.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::transaction::ConfigTransaction;
use crate::config::{self, Script};
use crate::error::TransactionError;
use crate::logging::Logger;

use super::CommandSetup;
use super::sync::SCRIPTS_DIR;

/// Skeleton written into newly created scripts.
const SCRIPT_TEMPLATE: &str = "#!/usr/bin/env bash\nset -euo pipefail\n\n# TODO: implement\n";

/// Run `create script <name> [description]`.
///
/// Writes an executable skeleton under `scripts/install/` and appends the
/// entry to `dotctl.yaml`; the config rewrite is guarded by a
/// [`ConfigTransaction`] so a failure after the file write never leaves the
/// config referencing a half-registered script.
///
/// # Errors
///
/// Returns an error when the script already exists (on disk or in the
/// config), on I/O failure, or on concurrent modification of the config.
pub fn script(
    global: &GlobalOpts,
    name: &str,
    description: Option<&str>,
    log: &Logger,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let root = setup.root();

    if setup.config.script(name).is_some() {
        anyhow::bail!("script already declared in config: {name}");
    }

    let rel_path = format!("{SCRIPTS_DIR}/{name}");
    let script_path = root.join(&rel_path);
    if script_path.exists() {
        anyhow::bail!("script file already exists: {}", script_path.display());
    }

    if global.dry_run {
        log.dry_run(&format!("would create {}", script_path.display()));
        log.dry_run("would record the script in the config");
        return Ok(());
    }

    let tx = ConfigTransaction::begin(&setup.config_path)?;

    write_skeleton(&script_path)?;

    let mut cfg = setup.config.clone();
    cfg.scripts.install.push(Script {
        name: name.to_string(),
        description: description.unwrap_or_default().to_string(),
        path: rel_path,
        compat: None,
    });
    cfg.scripts.install.sort_by(|a, b| a.name.cmp(&b.name));

    if tx.check_modified()? {
        // Undo the file we just created, then restore the config.
        let _ = std::fs::remove_file(&script_path);
        tx.rollback()?;
        return Err(TransactionError::ConcurrentModification.into());
    }

    config::save(&cfg, &setup.config_path)?;
    tx.commit()?;

    log.info(&format!("created {}", script_path.display()));
    log.info(&format!("recorded script '{name}' in the config"));
    Ok(())
}

/// Write the executable script skeleton.
fn write_skeleton(path: &Path) -> Result<()> {
    crate::resources::fs::ensure_parent_dir(path)?;
    std::fs::write(path, SCRIPT_TEMPLATE)
        .with_context(|| format!("write script: {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod script: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn skeleton_is_executable() {
        use std::os::unix::fs::PermissionsExt as _;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scripts/install/newtool");
        write_skeleton(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0, "script must be executable");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("#!/usr/bin/env bash"));
    }
}
