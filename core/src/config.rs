use crate::error::ConfigError;
use crate::fallback::{FallbackPolicy, DEFAULT_THRESHOLD};
use std::time::Duration;

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

/// Tunables for an [`crate::Assistant`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Minimum cosine score for a local answer to be trusted.
    pub threshold: f64,
    /// Upper bound on a single remote lookup.
    pub remote_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD, remote_timeout: DEFAULT_REMOTE_TIMEOUT }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<FallbackPolicy, ConfigError> {
        if self.remote_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        FallbackPolicy::new(self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let policy = EngineConfig::default().validate().unwrap();
        assert_eq!(policy.threshold(), 0.7);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = EngineConfig { remote_timeout: Duration::ZERO, ..EngineConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidTimeout));
    }
}
