//! Built-in compatibility predicates.
//!
//! Each predicate closes over a [`HostFacts`] snapshot taken at startup and
//! treats an empty requirement value as "no constraint".
use crate::exec;
use crate::platform::HostFacts;

use super::registry::ValidatorRegistry;

/// The five built-in compatibility fields, in evaluation order.
pub const FIELDS: [&str; 5] = ["os", "arch", "shell", "pkgmgr", "kernel"];

/// One-line description of a built-in field, shown by `compat list`.
#[must_use]
pub fn describe(field: &str) -> &'static str {
    match field {
        "os" => "operating system id or family (e.g. debian, ubuntu, darwin)",
        "arch" => "CPU architecture (e.g. x86_64, aarch64)",
        "shell" => "default shell executable name (e.g. bash, zsh)",
        "pkgmgr" => "package manager available on PATH (e.g. apt, pacman)",
        "kernel" => "kernel release prefix (e.g. 6.8)",
        _ => "",
    }
}

/// Register the built-in predicates for the five compatibility fields.
///
/// Idempotent in effect: re-registering replaces the previous predicates
/// with ones bound to the given facts snapshot.
pub fn register(registry: &ValidatorRegistry, facts: &HostFacts) {
    let os_id = facts.os_id.to_lowercase();
    let os_family = facts.os_family.to_lowercase();
    registry.register_field("os", move |value| {
        if value.is_empty() {
            return true;
        }
        let want = value.to_lowercase();
        os_id == want || os_family.contains(&want)
    });

    let arch = facts.arch.clone();
    registry.register_field("arch", move |value| {
        value.is_empty() || arch.eq_ignore_ascii_case(value)
    });

    let shell = facts.shell.clone();
    registry.register_field("shell", move |value| {
        value.is_empty() || shell.ends_with(value)
    });

    registry.register_field("pkgmgr", |value| {
        value.is_empty() || exec::lookup_path(value)
    });

    let kernel = facts.kernel.clone();
    registry.register_field("kernel", move |value| {
        value.is_empty() || kernel.starts_with(value)
    });
}
