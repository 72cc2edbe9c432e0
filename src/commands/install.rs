//! `install` subcommand: list or execute user-authored install scripts.
#![allow(clippy::print_stdout)]

use std::path::Path;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::compat;
use crate::config::Script;
use crate::error::ScriptError;
use crate::exec;
use crate::logging::{Logger, TaskStatus};

use super::CommandSetup;

/// Environment variable carrying the path of the script being executed.
pub const SCRIPT_ENV: &str = "DOTCTL_SCRIPT";
/// Environment variable carrying the directory of the script being executed.
pub const SCRIPT_DIR_ENV: &str = "DOTCTL_SCRIPT_DIR";

/// Run the install command. Without a script name, list the available
/// scripts; with one, compat-gate and execute it.
///
/// # Errors
///
/// Returns an error if setup fails, the script is unknown or not
/// executable, or the script exits non-zero.
pub fn run(global: &GlobalOpts, script_name: Option<&str>, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    let Some(name) = script_name else {
        println!("Available installation scripts:");
        for script in &setup.config.scripts.install {
            println!("  {script}");
        }
        return Ok(());
    };

    let script = setup
        .config
        .script(name)
        .ok_or_else(|| ScriptError::NotFound(name.to_string()))?
        .clone();

    if let Some(spec) = &script.compat {
        let report = compat::evaluate(spec, &setup.registry);
        if !report.compatible() {
            for failure in report.failures() {
                log.warn(&format!(
                    "unmet requirement: {} {}",
                    failure.field, failure.requirement
                ));
            }
            log.record_task(name, TaskStatus::Skipped, Some("incompatible host"));
            anyhow::bail!("script '{name}' is not compatible with this host");
        }
    }

    execute_script(&setup, &script, global.dry_run, log)?;
    log.record_task(name, TaskStatus::Ok, None);
    Ok(())
}

/// Execute one script with the configured environment.
fn execute_script(
    setup: &CommandSetup,
    script: &Script,
    dry_run: bool,
    log: &Logger,
) -> Result<()> {
    let root = setup.root();
    let path = root.join(&script.path);

    ensure_executable(&path, &script.name)?;

    if dry_run {
        log.dry_run(&format!("would execute {}", path.display()));
        return Ok(());
    }

    log.stage(&format!("Running {}", script.name));

    let mut env = setup.script_env();
    env.push((SCRIPT_ENV.to_string(), path.display().to_string()));
    env.push((
        SCRIPT_DIR_ENV.to_string(),
        path.parent().unwrap_or(&root).display().to_string(),
    ));

    let code = exec::run_interactive(&path, Some(&root), &env)?;
    if code != 0 {
        return Err(ScriptError::ExecutionFailed {
            script: script.name.clone(),
            code,
        }
        .into());
    }
    Ok(())
}

/// Verify the script file exists and is executable.
fn ensure_executable(path: &Path, name: &str) -> Result<(), ScriptError> {
    let Ok(metadata) = std::fs::metadata(path) else {
        return Err(ScriptError::NotFound(name.to_string()));
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(ScriptError::NotExecutable(path.display().to_string()));
        }
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
    }
    Ok(())
}
