//! Host compatibility checking for scripts and build steps.
//!
//! A [`CompatSpec`] declares the requirements a script or build step places
//! on the host: the five built-in fields (`os`, `arch`, `shell`, `pkgmgr`,
//! `kernel`) plus an ordered list of custom requirements referencing
//! [`CustomValidator`]s by name. [`check`] composes the spec against a
//! [`ValidatorRegistry`] into a single pass/fail verdict (logical AND over
//! every declared constraint); [`evaluate`] produces the per-constraint
//! report shown by `dotctl compat check`.
//!
//! Verdicts are plain booleans, never errors, so callers can cheaply gate
//! many scripts and report which ones were skipped.
pub mod builtin;
pub mod custom;
pub mod registry;

pub use custom::CustomValidator;
pub use registry::{ValidatorFn, ValidatorRegistry};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Compatibility requirements attached to a script or build step.
///
/// Every field is independently optional; an absent field imposes no
/// constraint, and the zero-value spec always passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatSpec {
    /// Required operating system — a single identifier or a list of
    /// acceptable candidates (the field passes when any candidate matches).
    #[serde(default, skip_serializing_if = "OsRequirement::is_empty")]
    pub os: OsRequirement,

    /// Required CPU architecture.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arch: String,

    /// Required default-shell executable name suffix.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shell: String,

    /// Package manager that must be present on the executable search path.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pkgmgr: String,

    /// Required kernel version prefix.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kernel: String,

    /// Ordered custom requirements, each naming a registered validator.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<CustomRequirement>,
}

impl CompatSpec {
    /// Whether this spec declares no requirements at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.os.is_empty()
            && self.arch.is_empty()
            && self.shell.is_empty()
            && self.pkgmgr.is_empty()
            && self.kernel.is_empty()
            && self.custom.is_empty()
    }
}

/// The `os` field of a spec: one identifier, or several acceptable ones.
///
/// The plain-string form is what most configs use; the list form exists
/// because AND-composition cannot express "linux OR darwin".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OsRequirement {
    /// A single OS identifier (empty string means unconstrained).
    One(String),
    /// Any of several acceptable OS identifiers.
    AnyOf(Vec<String>),
}

impl Default for OsRequirement {
    fn default() -> Self {
        Self::One(String::new())
    }
}

impl OsRequirement {
    /// Whether no OS constraint is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(value) => value.is_empty(),
            Self::AnyOf(values) => values.iter().all(String::is_empty),
        }
    }

    /// The non-empty candidate identifiers, in declaration order.
    #[must_use]
    pub fn candidates(&self) -> Vec<&str> {
        match self {
            Self::One(value) => {
                if value.is_empty() {
                    Vec::new()
                } else {
                    vec![value.as_str()]
                }
            }
            Self::AnyOf(values) => values
                .iter()
                .filter(|v| !v.is_empty())
                .map(String::as_str)
                .collect(),
        }
    }
}

impl From<&str> for OsRequirement {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

/// One entry of a spec's `custom` list.
///
/// YAML accepts two well-formed shapes — a bare validator name and a mapping
/// with a mandatory `name` and optional `value` — and anything else is
/// preserved as [`Malformed`](Self::Malformed), which always fails the check
/// without aborting the evaluation of sibling entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomRequirement {
    /// Bare validator name; the validator is invoked with no value.
    Name(String),
    /// Structured requirement with an optional value forwarded to the
    /// validator.
    Entry {
        /// Name of the registered validator.
        name: String,
        /// Optional value passed to [`CustomValidator::validate`].
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// Any other shape (missing/non-string `name`, bare scalar, …).
    Malformed(Value),
}

impl CustomRequirement {
    /// Human-readable label for reports.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Name(name) | Self::Entry { name, .. } => name.clone(),
            Self::Malformed(_) => "<malformed requirement>".to_string(),
        }
    }
}

/// Outcome of a single declared constraint, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Field name (`os`, `arch`, …) or `custom`.
    pub field: String,
    /// The declared requirement, rendered for humans.
    pub requirement: String,
    /// Whether the host satisfies the requirement.
    pub passed: bool,
}

/// Per-constraint compatibility report produced by [`evaluate`].
///
/// Only declared constraints appear; an empty report means the spec imposed
/// no requirements (and is therefore compatible).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatReport {
    /// One outcome per declared constraint, in evaluation order.
    pub outcomes: Vec<CheckOutcome>,
}

impl CompatReport {
    /// Whether every declared constraint passed.
    #[must_use]
    pub fn compatible(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// The outcomes that failed, in evaluation order.
    #[must_use]
    pub fn failures(&self) -> Vec<&CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }
}

/// Decide whether the current host satisfies `spec`.
///
/// All declared constraints must hold; evaluation short-circuits on the
/// first failure. A field with no registered predicate is skipped
/// (unconstrained); a custom entry naming an unregistered validator fails.
#[must_use]
pub fn check(spec: &CompatSpec, registry: &ValidatorRegistry) -> bool {
    if !os_satisfied(&spec.os, registry) {
        return false;
    }

    for (field, value) in scalar_fields(spec) {
        if let Some(func) = registry.field(field)
            && !func(value)
        {
            return false;
        }
    }

    spec.custom
        .iter()
        .all(|req| custom_satisfied(req, registry))
}

/// Evaluate every declared constraint of `spec` without short-circuiting.
///
/// [`CompatReport::compatible`] agrees with [`check`] for the same spec and
/// registry.
#[must_use]
pub fn evaluate(spec: &CompatSpec, registry: &ValidatorRegistry) -> CompatReport {
    let mut outcomes = Vec::new();

    let candidates = spec.os.candidates();
    if !candidates.is_empty() {
        outcomes.push(CheckOutcome {
            field: "os".to_string(),
            requirement: candidates.join(" | "),
            passed: os_satisfied(&spec.os, registry),
        });
    }

    for (field, value) in scalar_fields(spec) {
        if value.is_empty() {
            continue;
        }
        let passed = registry.field(field).is_none_or(|func| func(value));
        outcomes.push(CheckOutcome {
            field: field.to_string(),
            requirement: value.to_string(),
            passed,
        });
    }

    for req in &spec.custom {
        outcomes.push(CheckOutcome {
            field: "custom".to_string(),
            requirement: req.label(),
            passed: custom_satisfied(req, registry),
        });
    }

    CompatReport { outcomes }
}

/// The four single-valued built-in fields, in evaluation order.
fn scalar_fields(spec: &CompatSpec) -> [(&'static str, &str); 4] {
    [
        ("arch", spec.arch.as_str()),
        ("shell", spec.shell.as_str()),
        ("pkgmgr", spec.pkgmgr.as_str()),
        ("kernel", spec.kernel.as_str()),
    ]
}

fn os_satisfied(req: &OsRequirement, registry: &ValidatorRegistry) -> bool {
    let Some(func) = registry.field("os") else {
        return true;
    };
    let candidates = req.candidates();
    if candidates.is_empty() {
        return func("");
    }
    candidates.iter().any(|candidate| func(candidate))
}

fn custom_satisfied(req: &CustomRequirement, registry: &ValidatorRegistry) -> bool {
    match req {
        CustomRequirement::Name(name) => {
            registry.custom(name).is_some_and(|v| v.validate(None))
        }
        CustomRequirement::Entry { name, value } => registry
            .custom(name)
            .is_some_and(|v| v.validate(value.as_ref())),
        CustomRequirement::Malformed(_) => false,
    }
}
