//! Host environment facts consumed by the compatibility validators.
use std::fmt;

/// A snapshot of the facts about the current host that compatibility
/// checks are evaluated against.
///
/// Detected once per invocation via [`HostFacts::detect`] and passed by
/// reference into validator registration, so predicates close over a stable
/// view of the host rather than re-querying the system on every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFacts {
    /// Distro/platform identifier (`ID` from os-release, e.g. `ubuntu`;
    /// `darwin` on macOS, `windows` on Windows).
    pub os_id: String,
    /// OS family string (`ID_LIKE` from os-release, e.g. `debian`), used for
    /// substring family matching. Lowercase.
    pub os_family: String,
    /// CPU architecture identifier (e.g. `x86_64`, `aarch64`).
    pub arch: String,
    /// The user's configured default shell (value of `$SHELL`, may be empty).
    pub shell: String,
    /// Kernel release string (e.g. `6.8.0-41-generic`), empty when unknown.
    pub kernel: String,
}

impl fmt::Display for HostFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.os_id, self.arch, self.kernel)
    }
}

impl HostFacts {
    /// Detect facts about the current host.
    #[must_use]
    pub fn detect() -> Self {
        let (os_id, os_family) = detect_os();
        Self {
            os_id,
            os_family,
            arch: std::env::consts::ARCH.to_string(),
            shell: std::env::var("SHELL").unwrap_or_default(),
            kernel: detect_kernel(),
        }
    }
}

/// Resolve the `(id, family)` pair for the current platform.
///
/// Linux hosts are identified from `/etc/os-release`; platforms without a
/// standard OS-release descriptor get a fixed synthesized pair.
fn detect_os() -> (String, String) {
    if cfg!(target_os = "macos") {
        return ("darwin".to_string(), "darwin macos".to_string());
    }
    if cfg!(target_os = "windows") {
        return ("windows".to_string(), "windows".to_string());
    }

    std::fs::read_to_string("/etc/os-release").map_or_else(
        |_| (std::env::consts::OS.to_string(), String::new()),
        |content| parse_os_release(&content),
    )
}

/// Parse the `ID` and `ID_LIKE` fields out of an os-release document.
///
/// Values may be quoted; both are lowercased. Missing fields fall back to
/// the generic platform name and an empty family.
fn parse_os_release(content: &str) -> (String, String) {
    let mut id = String::new();
    let mut id_like = String::new();

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_lowercase();
        match key.trim() {
            "ID" => id = value,
            "ID_LIKE" => id_like = value,
            _ => {}
        }
    }

    if id.is_empty() {
        id = std::env::consts::OS.to_string();
    }
    (id, id_like)
}

/// Kernel release string as reported by the platform (`uname -r`).
fn detect_kernel() -> String {
    if cfg!(windows) {
        return String::new();
    }
    crate::exec::run_unchecked("uname", &["-r"])
        .ok()
        .filter(|result| result.success)
        .map(|result| result.stdout.trim().to_string())
        .unwrap_or_default()
}
