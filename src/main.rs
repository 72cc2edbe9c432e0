#![allow(clippy::print_stdout)]

use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};

use dotctl::cli::{self, BuildAction, Command, CompatAction, CreateAction, NamespaceAction, SetupAction};
use dotctl::commands;
use dotctl::logging;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = logging::Logger::new(args.verbose);

    match args.command {
        Command::Setup { action } => match action {
            SetupAction::Backup => commands::setup::backup(&args.global, &log),
            SetupAction::Link => commands::setup::link(&args.global, &log),
            SetupAction::Restore => commands::setup::restore(&args.global, &log),
        },
        Command::Install { script } => {
            commands::install::run(&args.global, script.as_deref(), &log)
        }
        Command::Build { action } => match action {
            BuildAction::List => commands::build::list(&args.global, &log),
            BuildAction::Run { step } => {
                commands::build::run(&args.global, step.as_deref(), &log)
            }
        },
        Command::List => commands::list::run(&args.global, &log),
        Command::Sync => commands::sync::run(&args.global, &log),
        Command::Create { action } => match action {
            CreateAction::Script { name, description } => {
                commands::create::script(&args.global, &name, description.as_deref(), &log)
            }
        },
        Command::Namespace { action } => match action {
            NamespaceAction::List => commands::namespace::list(&log),
            NamespaceAction::Add {
                name,
                path,
                local_bin,
            } => commands::namespace::add(&name, &path, local_bin.as_deref(), &log),
            NamespaceAction::Remove { name } => commands::namespace::remove(&name, &log),
            NamespaceAction::Switch { name } => commands::namespace::switch(&name, &log),
        },
        Command::Compat { action } => match action {
            CompatAction::Check { script } => {
                let compatible = commands::compat::check(&args.global, &script, &log)?;
                if !compatible {
                    // Exit code contract: 0 = compatible, 1 = incompatible.
                    std::process::exit(1);
                }
                Ok(())
            }
            CompatAction::List => commands::compat::list(&args.global, &log),
        },
        Command::Completion { shell } => {
            let mut command = cli::Cli::command();
            clap_complete::generate(shell, &mut command, "dotctl", &mut std::io::stdout());
            Ok(())
        }
        Command::Version => {
            let version = option_env!("DOTCTL_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("dotctl {version}");
            Ok(())
        }
    }
}
