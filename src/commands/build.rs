//! `build list` and `build run` subcommands.
#![allow(clippy::print_stdout)]

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::compat;
use crate::config::Step;
use crate::logging::{Logger, TaskStatus};

use super::CommandSetup;

/// Run `build list`: print the declared build steps.
///
/// # Errors
///
/// Returns an error if setup fails.
pub fn list(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    println!("Available build steps:");
    for step in &setup.config.build.steps {
        println!("  {} - {}", step.name, step.description);
    }
    Ok(())
}

/// Run `build run [step]`: execute all build steps in declaration order, or
/// just the named one. Incompatible steps are reported and skipped, not
/// errors; a failing command aborts the run.
///
/// # Errors
///
/// Returns an error if setup fails, a named step does not exist, or a step
/// command exits non-zero.
pub fn run(global: &GlobalOpts, step_name: Option<&str>, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    let steps: Vec<Step> = match step_name {
        Some(name) => {
            let step = setup
                .config
                .step(name)
                .ok_or_else(|| anyhow::anyhow!("build step not found: {name}"))?;
            vec![step.clone()]
        }
        None => setup.config.build.steps.clone(),
    };

    if steps.is_empty() {
        log.info("no build steps declared");
        return Ok(());
    }

    for step in &steps {
        run_step(&setup, step, global.dry_run, log)?;
    }

    log.print_summary();
    if log.has_failures() {
        anyhow::bail!("{} build step(s) failed", log.failure_count());
    }
    Ok(())
}

/// Execute one build step: compat gate, then its command(s) through the
/// shell, in order, stopping at the first failure.
fn run_step(setup: &CommandSetup, step: &Step, dry_run: bool, log: &Logger) -> Result<()> {
    if let Some(spec) = &step.compat {
        let report = compat::evaluate(spec, &setup.registry);
        if !report.compatible() {
            for failure in report.failures() {
                log.debug(&format!(
                    "unmet requirement for {}: {} {}",
                    step.name, failure.field, failure.requirement
                ));
            }
            log.info(&format!("skipping incompatible step: {}", step.name));
            log.record_task(&step.name, TaskStatus::Skipped, Some("incompatible host"));
            return Ok(());
        }
    }

    let commands: Vec<&str> = step
        .command
        .iter()
        .map(String::as_str)
        .chain(step.commands.iter().map(String::as_str))
        .collect();

    if commands.is_empty() {
        log.record_task(&step.name, TaskStatus::Skipped, Some("no commands"));
        return Ok(());
    }

    if dry_run {
        for command in &commands {
            log.dry_run(&format!("would run: {command}"));
        }
        log.record_task(&step.name, TaskStatus::DryRun, None);
        return Ok(());
    }

    log.stage(&step.name);
    let root = setup.root();
    let env = setup.script_env();
    for command in &commands {
        log.debug(&format!("running: {command}"));
        let code = crate::exec::run_shell(command, Some(&root), &env)?;
        if code != 0 {
            log.record_task(
                &step.name,
                TaskStatus::Failed,
                Some(&format!("exit code {code}")),
            );
            anyhow::bail!("build step '{}' failed (exit {code}): {command}", step.name);
        }
    }

    log.record_task(&step.name, TaskStatus::Ok, None);
    Ok(())
}
