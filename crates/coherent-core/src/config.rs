//! Dispatch configuration
//!
//! The process-wide level used for automatic node creation is the best level
//! the processor supports, optionally capped through
//! [`MAX_FEATURE_SET_ENV`]. It is resolved once and cached.

use crate::feature_set::FeatureSet;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Environment variable capping the automatically resolved level
pub const MAX_FEATURE_SET_ENV: &str = "COHERENT_NOISE_MAX_FEATURE_SET";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Highest level automatic dispatch may select
    pub max_feature_set: Option<FeatureSet>,
}

impl DispatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_feature_set(mut self, feature_set: FeatureSet) -> Self {
        self.max_feature_set = Some(feature_set);
        self
    }

    /// Read the cap from [`MAX_FEATURE_SET_ENV`]
    ///
    /// An unparsable value is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(MAX_FEATURE_SET_ENV) {
            match value.parse::<FeatureSet>() {
                Ok(cap) => config.max_feature_set = Some(cap),
                Err(e) => log::warn!("Ignoring {}: {}", MAX_FEATURE_SET_ENV, e),
            }
        }
        config
    }

    /// Best available level not above the configured cap
    pub fn resolve(&self) -> FeatureSet {
        let best = FeatureSet::best_available();
        match self.max_feature_set {
            None => best,
            Some(cap) => FeatureSet::available()
                .into_iter()
                .filter(|level| *level <= cap)
                .last()
                .unwrap_or(FeatureSet::Scalar),
        }
    }
}

lazy_static! {
    static ref RESOLVED: FeatureSet = {
        let config = DispatchConfig::from_env();
        let level = config.resolve();
        log::info!(
            "Automatic dispatch level: {} (cap: {:?})",
            level,
            config.max_feature_set
        );
        level
    };
}

/// Level used for automatic node creation, resolved once per process
pub fn resolved_feature_set() -> FeatureSet {
    *RESOLVED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_cap() {
        let config = DispatchConfig::default();
        assert_eq!(config.max_feature_set, None);
        assert_eq!(config.resolve(), FeatureSet::best_available());
    }

    #[test]
    fn test_scalar_cap_forces_scalar() {
        let config = DispatchConfig::new().with_max_feature_set(FeatureSet::Scalar);
        assert_eq!(config.resolve(), FeatureSet::Scalar);
    }

    #[test]
    fn test_cap_never_exceeds_best_available() {
        for cap in FeatureSet::ALL {
            let level = DispatchConfig::new().with_max_feature_set(cap).resolve();
            assert!(level.is_available());
            assert!(level <= cap);
            assert!(level <= FeatureSet::best_available());
        }
    }

    #[test]
    fn test_resolved_feature_set_is_stable() {
        let first = resolved_feature_set();
        assert!(first.is_available());
        for _ in 0..10 {
            assert_eq!(resolved_feature_set(), first);
        }
    }

    #[test]
    fn test_config_serde() {
        let config = DispatchConfig::new().with_max_feature_set(FeatureSet::Sse41);
        let json = serde_json::to_string(&config).unwrap();
        let back: DispatchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
