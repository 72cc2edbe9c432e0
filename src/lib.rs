//! Dotfiles management engine.
//!
//! Namespace-aware tool for managing dotfiles repositories: backing up
//! existing configuration, creating symlinks into `$HOME`, running
//! user-authored install scripts and build steps, and maintaining a per-user
//! registry of named namespaces — all driven by a YAML configuration file
//! (`dotctl.yaml`).
//!
//! The public API is organised into five layers:
//!
//! - **[`config`]** — the `dotctl.yaml` model, the namespace registry, and
//!   the transaction guarding config rewrites
//! - **[`compat`]** — the validator registry and the compatibility checker
//!   gating scripts and build steps
//! - **[`resources`]** — idempotent `check + apply` primitives (symlinks,
//!   filesystem moves)
//! - **[`plugins`]** — bundled custom validators with explicit registration
//! - **[`commands`]** — top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod compat;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod plugins;
pub mod resources;
