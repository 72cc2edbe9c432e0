//! `list` subcommand: show the install scripts the active config declares.
#![allow(clippy::print_stdout)]

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::compat;
use crate::logging::Logger;

use super::CommandSetup;

/// Run the list command. Each script is annotated with its compatibility
/// verdict for the current host so users can see at a glance what would be
/// skipped.
///
/// # Errors
///
/// Returns an error if setup fails.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    if setup.config.scripts.install.is_empty() {
        println!("No installation scripts declared.");
        return Ok(());
    }

    println!("Available installation scripts:");
    for script in &setup.config.scripts.install {
        let compatible = script
            .compat
            .as_ref()
            .is_none_or(|spec| compat::check(spec, &setup.registry));
        let marker = if compatible { " " } else { "!" };
        println!("{marker} {script}");
    }
    println!("\nScripts marked '!' are not compatible with this host.");
    Ok(())
}
