//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the dotctl engine.
#[derive(Parser, Debug)]
#[command(
    name = "dotctl",
    about = "Namespace-aware dotfiles management engine",
    version
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Explicit path to the dotctl.yaml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Operate on a specific namespace instead of the active one
    #[arg(short = 'n', long, global = true)]
    pub namespace: Option<String>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Core setup operations (backup, link, restore)
    Setup {
        /// Setup operation to perform.
        #[command(subcommand)]
        action: SetupAction,
    },
    /// List or execute installation scripts
    Install {
        /// Script to execute; lists available scripts when omitted
        script: Option<String>,
    },
    /// Execute or list build steps
    Build {
        /// Build operation to perform.
        #[command(subcommand)]
        action: BuildAction,
    },
    /// List installation scripts with compatibility verdicts
    List,
    /// Synchronize install scripts from scripts/install into the config
    Sync,
    /// Create new resources (install scripts)
    Create {
        /// Resource to create.
        #[command(subcommand)]
        action: CreateAction,
    },
    /// Manage dotfiles namespaces
    Namespace {
        /// Namespace operation to perform.
        #[command(subcommand)]
        action: NamespaceAction,
    },
    /// Check system compatibility for scripts
    Compat {
        /// Compatibility operation to perform.
        #[command(subcommand)]
        action: CompatAction,
    },
    /// Generate shell completion definitions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

/// Operations under `setup`.
#[derive(Subcommand, Debug)]
pub enum SetupAction {
    /// Backup existing dotfiles into $HOME/dotbk-<timestamp>
    Backup,
    /// Create symlinks for dotfiles
    Link,
    /// Restore the most recent backup
    Restore,
}

/// Operations under `build`.
#[derive(Subcommand, Debug)]
pub enum BuildAction {
    /// List available build steps
    List,
    /// Execute build steps
    Run {
        /// Step to execute; runs all steps when omitted
        step: Option<String>,
    },
}

/// Operations under `create`.
#[derive(Subcommand, Debug)]
pub enum CreateAction {
    /// Scaffold a new install script and record it in the config
    Script {
        /// Name of the new script
        name: String,
        /// Description recorded in the config
        description: Option<String>,
    },
}

/// Operations under `namespace`.
#[derive(Subcommand, Debug)]
pub enum NamespaceAction {
    /// List registered namespaces
    List,
    /// Register a new namespace
    Add {
        /// Namespace name
        name: String,
        /// Path to the dotfiles repository
        path: PathBuf,
        /// Name of the repository's local bin directory
        #[arg(long)]
        local_bin: Option<String>,
    },
    /// Remove a namespace registration (files are untouched)
    Remove {
        /// Namespace name
        name: String,
    },
    /// Switch the active namespace
    Switch {
        /// Namespace name
        name: String,
    },
}

/// Operations under `compat`.
#[derive(Subcommand, Debug)]
pub enum CompatAction {
    /// Check compatibility of a script; exit code 1 when incompatible
    Check {
        /// Name of the script to check
        script: String,
    },
    /// List available compatibility validators
    List,
}
