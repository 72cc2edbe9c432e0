//! Registry of compatibility predicates.
//!
//! Holds the per-field built-in predicates and the name-keyed custom
//! validators. The registry is constructed once at startup and passed by
//! reference into whichever component needs lookups; plugin modules receive
//! it through an explicit `register` entry point rather than self-registering
//! at load time.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::RegistrationError;

use super::custom::CustomValidator;

/// A named predicate over a single string requirement value.
///
/// Shared so that a lookup hands back an owned handle and no registry lock
/// is held while the predicate runs.
pub type ValidatorFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Shared registry of field predicates and custom validators.
///
/// Registration takes the write lock, lookups the read lock, so concurrent
/// checks never block each other. Checks may also run while a late plugin
/// registers, which is why lookups clone the `Arc` handle out of the map
/// instead of borrowing into it.
pub struct ValidatorRegistry {
    fields: RwLock<HashMap<String, ValidatorFn>>,
    custom: RwLock<HashMap<String, Arc<dyn CustomValidator>>>,
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("fields", &self.field_names())
            .field("custom", &self.custom_names())
            .finish()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: RwLock::new(HashMap::new()),
            custom: RwLock::new(HashMap::new()),
        }
    }

    /// Install the predicate for a compatibility field.
    ///
    /// Re-registering a field silently replaces the previous predicate:
    /// field registration is startup-time wiring and last-write-wins keeps
    /// plugin layering simple (unlike [`register_custom`](Self::register_custom),
    /// where names are user-facing configuration surface and duplicates are
    /// rejected).
    pub fn register_field(&self, field: &str, func: impl Fn(&str) -> bool + Send + Sync + 'static) {
        let mut guard = self
            .fields
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(field.to_string(), Arc::new(func));
    }

    /// Look up the predicate for a field.
    ///
    /// `None` means no predicate is registered; callers treat the field as
    /// unconstrained, not as failed.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<ValidatorFn> {
        let guard = self
            .fields
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.get(field).cloned()
    }

    /// Register a custom validator under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::EmptyName`] when the validator reports an
    /// empty name, and [`RegistrationError::Duplicate`] when the name is
    /// already taken — in which case the existing validator stays active.
    pub fn register_custom(
        &self,
        validator: Arc<dyn CustomValidator>,
    ) -> Result<(), RegistrationError> {
        let name = validator.name().to_string();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let mut guard = self
            .custom
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.contains_key(&name) {
            return Err(RegistrationError::Duplicate(name));
        }
        guard.insert(name, validator);
        Ok(())
    }

    /// Look up a custom validator by name.
    #[must_use]
    pub fn custom(&self, name: &str) -> Option<Arc<dyn CustomValidator>> {
        let guard = self
            .custom
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.get(name).cloned()
    }

    /// Sorted names of all registered field predicates.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        let guard = self
            .fields
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        names
    }

    /// Sorted names of all registered custom validators.
    #[must_use]
    pub fn custom_names(&self) -> Vec<String> {
        let guard = self
            .custom
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    struct NamedValidator {
        name: &'static str,
        result: bool,
    }

    impl CustomValidator for NamedValidator {
        fn name(&self) -> &str {
            self.name
        }

        fn validate(&self, _value: Option<&Value>) -> bool {
            self.result
        }
    }

    #[test]
    fn field_lookup_miss_returns_none() {
        let registry = ValidatorRegistry::new();
        assert!(registry.field("os").is_none());
    }

    #[test]
    fn field_register_and_lookup() {
        let registry = ValidatorRegistry::new();
        registry.register_field("arch", |value| value == "x86_64");

        let func = registry.field("arch").expect("predicate registered");
        assert!(func("x86_64"));
        assert!(!func("riscv64"));
    }

    #[test]
    fn field_reregistration_replaces_predicate() {
        let registry = ValidatorRegistry::new();
        registry.register_field("os", |_| false);
        registry.register_field("os", |_| true);

        let func = registry.field("os").expect("predicate registered");
        assert!(func("anything"));
    }

    #[test]
    fn custom_duplicate_name_rejected_and_first_stays_active() {
        let registry = ValidatorRegistry::new();
        registry
            .register_custom(Arc::new(NamedValidator {
                name: "has-gpu",
                result: true,
            }))
            .expect("first registration succeeds");

        let err = registry
            .register_custom(Arc::new(NamedValidator {
                name: "has-gpu",
                result: false,
            }))
            .unwrap_err();
        assert_eq!(err, RegistrationError::Duplicate("has-gpu".to_string()));

        // The first validator must remain active.
        let v = registry.custom("has-gpu").expect("validator present");
        assert!(v.validate(None));
    }

    #[test]
    fn custom_empty_name_rejected() {
        let registry = ValidatorRegistry::new();
        let err = registry
            .register_custom(Arc::new(NamedValidator {
                name: "",
                result: true,
            }))
            .unwrap_err();
        assert_eq!(err, RegistrationError::EmptyName);
    }

    #[test]
    fn custom_lookup_miss_returns_none() {
        let registry = ValidatorRegistry::new();
        assert!(registry.custom("nope").is_none());
    }

    #[test]
    fn names_are_sorted() {
        let registry = ValidatorRegistry::new();
        registry.register_field("shell", |_| true);
        registry.register_field("arch", |_| true);
        registry
            .register_custom(Arc::new(NamedValidator {
                name: "zz",
                result: true,
            }))
            .unwrap();
        registry
            .register_custom(Arc::new(NamedValidator {
                name: "aa",
                result: true,
            }))
            .unwrap();

        assert_eq!(registry.field_names(), vec!["arch", "shell"]);
        assert_eq!(registry.custom_names(), vec!["aa", "zz"]);
    }

    #[test]
    fn registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValidatorRegistry>();
    }

    #[test]
    fn concurrent_lookups_do_not_block() {
        let registry = Arc::new(ValidatorRegistry::new());
        registry.register_field("os", |value| value.is_empty());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let func = registry.field("os").expect("predicate registered");
                    assert!(func(""));
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread panicked");
        }
    }
}
