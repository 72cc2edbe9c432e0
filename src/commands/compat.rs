//! `compat check` and `compat list` subcommands.
#![allow(clippy::print_stdout)]

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::compat::{self, builtin};
use crate::error::ScriptError;
use crate::logging::Logger;

use super::CommandSetup;

/// Run `compat check <script>`: print the per-constraint report and return
/// the verdict. The caller maps `false` to a non-zero process exit code.
///
/// # Errors
///
/// Returns an error if setup fails or the script is not declared.
pub fn check(global: &GlobalOpts, script_name: &str, log: &Logger) -> Result<bool> {
    let setup = CommandSetup::init(global, log)?;

    let script = setup
        .config
        .script(script_name)
        .ok_or_else(|| ScriptError::NotFound(script_name.to_string()))?;

    println!("Checking compatibility for script: {script_name}");
    println!();
    print_host_summary(&setup);

    let Some(spec) = &script.compat else {
        println!("No compatibility requirements declared; script is compatible.");
        return Ok(true);
    };

    let report = compat::evaluate(spec, &setup.registry);
    if report.outcomes.is_empty() {
        println!("No compatibility requirements declared; script is compatible.");
        return Ok(true);
    }

    println!("Requirements:");
    for outcome in &report.outcomes {
        let mark = if outcome.passed { "ok" } else { "FAIL" };
        println!("  [{mark:>4}] {:<8} {}", outcome.field, outcome.requirement);
    }
    println!();

    let compatible = report.compatible();
    if compatible {
        println!("Script '{script_name}' is compatible with this host.");
    } else {
        println!(
            "Script '{script_name}' is NOT compatible with this host ({} failed requirement(s)).",
            report.failures().len()
        );
    }
    Ok(compatible)
}

/// Run `compat list`: print built-in fields and registered custom
/// validators.
///
/// # Errors
///
/// Returns an error if setup fails.
pub fn list(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    println!("Built-in validators:");
    for field in builtin::FIELDS {
        println!("  {field:<8} {}", builtin::describe(field));
    }

    let custom = setup.registry.custom_names();
    if custom.is_empty() {
        println!("\nNo custom validators registered.");
    } else {
        println!("\nCustom validators:");
        for name in custom {
            println!("  {name}");
        }
    }
    Ok(())
}

/// Print the host facts the built-in predicates evaluate against.
fn print_host_summary(setup: &CommandSetup) {
    println!("System information:");
    println!("  os:     {}", setup.facts.os_id);
    if !setup.facts.os_family.is_empty() {
        println!("  family: {}", setup.facts.os_family);
    }
    println!("  arch:   {}", setup.facts.arch);
    if !setup.facts.shell.is_empty() {
        println!("  shell:  {}", setup.facts.shell);
    }
    if !setup.facts.kernel.is_empty() {
        println!("  kernel: {}", setup.facts.kernel);
    }
    println!();
}
