//! Bundled custom validators.
//!
//! Plugins never self-register at load time; startup code calls
//! [`register_all`] with the registry it owns, and each plugin module
//! exposes an explicit `register` entry point. Third-party extensions follow
//! the same shape: implement [`CustomValidator`](crate::compat::CustomValidator)
//! and register it before checks run.
pub mod memory;

use std::sync::Arc;

use crate::compat::ValidatorRegistry;
use crate::error::RegistrationError;

/// Register every bundled validator.
///
/// # Errors
///
/// Returns the first registration failure (duplicate or empty name).
pub fn register_all(registry: &ValidatorRegistry) -> Result<(), RegistrationError> {
    registry.register_custom(Arc::new(memory::MinMemory::new()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn register_all_installs_bundled_validators() {
        let registry = ValidatorRegistry::new();
        register_all(&registry).unwrap();
        assert!(registry.custom("min-memory").is_some());
    }

    #[test]
    fn register_all_twice_reports_duplicate() {
        let registry = ValidatorRegistry::new();
        register_all(&registry).unwrap();
        let err = register_all(&registry).unwrap_err();
        assert!(matches!(err, RegistrationError::Duplicate(_)));
    }
}
