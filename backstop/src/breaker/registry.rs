//! Per-target breaker registry.

use super::{BreakerConfig, CircuitBreaker};
use crate::errors::ConfigError;
use dashmap::DashMap;
use std::sync::Arc;

/// Hands out one shared [`CircuitBreaker`] per downstream target.
///
/// Pipelines bound to the same target share failure state; independent
/// targets never interfere. The registry holds no state beyond the breakers
/// themselves.
#[derive(Debug)]
pub struct BreakerRegistry {
    config: BreakerConfig,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    /// Creates a registry that builds breakers with `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn new(config: BreakerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            breakers: DashMap::new(),
        })
    }

    /// Returns the breaker for `target`, creating it on first use.
    #[must_use]
    pub fn breaker_for(&self, target: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(target.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::from_validated(self.config)))
            .clone()
    }

    /// Number of targets with a breaker.
    #[must_use]
    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    /// Returns true if no target has requested a breaker yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}

impl Default for BreakerRegistry {
    fn default() -> Self {
        Self {
            config: BreakerConfig::default(),
            breakers: DashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_target_shares_one_breaker() {
        let registry = BreakerRegistry::default();
        let a = registry.breaker_for("addresses.example.com");
        let b = registry.breaker_for("addresses.example.com");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_independent_targets_get_independent_breakers() {
        let registry = BreakerRegistry::default();
        let a = registry.breaker_for("a.example.com");
        let b = registry.breaker_for("b.example.com");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = BreakerConfig::new().with_failure_ratio(2.0);
        assert!(BreakerRegistry::new(config).is_err());
    }
}
