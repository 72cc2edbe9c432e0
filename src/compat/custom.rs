//! Pluggable custom validator capability.
use serde_yaml::Value;

/// A pluggable, named compatibility check.
///
/// This is the sole extension point of the compatibility system: any
/// component may implement this trait and register the value with
/// [`ValidatorRegistry::register_custom`](super::registry::ValidatorRegistry::register_custom)
/// before checks run. Configuration then references the validator by name in
/// a spec's `custom` list, either bare (`- has-gpu`) or parameterized
/// (`- name: min-memory` / `value: 4096`).
///
/// Values arrive as [`serde_yaml::Value`] — the tagged union produced at the
/// configuration boundary (`Null | Bool | Number | String | Sequence |
/// Mapping`) — which implementations interpret freely.
///
/// # Semantics of `validate(None)`
///
/// A `None` value means "the presence of this capability alone is the
/// requirement, with no parameterization". Implementations should return
/// `true` for `None` unless their semantics require a value to exist.
pub trait CustomValidator: Send + Sync {
    /// Unique identifier of this validator.
    fn name(&self) -> &str;

    /// Decide whether the current host satisfies the requirement.
    fn validate(&self, value: Option<&Value>) -> bool;
}
