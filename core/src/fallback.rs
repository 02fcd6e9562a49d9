use crate::error::ConfigError;
use serde::Serialize;

pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Where an answer has to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    LocalMatch,
    NeedsRemoteLookup,
}

/// Single confidence gate: a local match is trusted only at or above
/// `threshold`. There is no separate noise floor; anything below the gate
/// goes to the remote provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPolicy {
    threshold: f64,
}

impl FallbackPolicy {
    pub fn new(threshold: f64) -> Result<Self, ConfigError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 { self.threshold }

    pub fn decide(&self, best_score: f64) -> Route {
        if best_score >= self.threshold { Route::LocalMatch } else { Route::NeedsRemoteLookup }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self { Self { threshold: DEFAULT_THRESHOLD } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_is_inclusive() {
        let p = FallbackPolicy::default();
        assert_eq!(p.decide(0.7), Route::LocalMatch);
        assert_eq!(p.decide(0.95), Route::LocalMatch);
        assert_eq!(p.decide(0.69999), Route::NeedsRemoteLookup);
        assert_eq!(p.decide(0.0), Route::NeedsRemoteLookup);
        assert_eq!(p.decide(-0.3), Route::NeedsRemoteLookup);
    }

    #[test]
    fn threshold_is_tunable() {
        let p = FallbackPolicy::new(0.2).unwrap();
        assert_eq!(p.decide(0.25), Route::LocalMatch);
        assert_eq!(p.threshold(), 0.2);
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        assert_eq!(FallbackPolicy::new(0.0), Err(ConfigError::InvalidThreshold(0.0)));
        assert_eq!(FallbackPolicy::new(1.5), Err(ConfigError::InvalidThreshold(1.5)));
        assert!(FallbackPolicy::new(f64::NAN).is_err());
        assert!(FallbackPolicy::new(1.0).is_ok());
    }
}
