//! Session configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Scan configuration, fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Words per generated phrase
    pub phrase_length: usize,
    /// Chance that a single tick is flagged as a hit, in [0, 1]
    pub hit_probability: f64,
    /// Time between ticks while scanning, in milliseconds
    pub tick_period_ms: u64,
    /// Maximum number of lines kept in the live feed
    pub log_capacity: usize,
    /// Exclusive upper bound for synthetic balances
    pub max_balance: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            phrase_length: seedscan_phrase::DEFAULT_PHRASE_LENGTH,
            hit_probability: 0.0001,
            tick_period_ms: 30,
            log_capacity: 31,
            max_balance: 5000.0,
        }
    }
}

impl ScanConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Check every field is usable before a session is built
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.phrase_length == 0 {
            return Err(EngineError::Configuration(
                "phrase_length must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.hit_probability) {
            return Err(EngineError::Configuration(format!(
                "hit_probability must be within [0, 1], got {}",
                self.hit_probability
            )));
        }
        if self.tick_period_ms == 0 {
            return Err(EngineError::Configuration(
                "tick_period_ms must be at least 1".into(),
            ));
        }
        if self.log_capacity == 0 {
            return Err(EngineError::Configuration(
                "log_capacity must be at least 1".into(),
            ));
        }
        if !self.max_balance.is_finite() || self.max_balance <= 0.0 {
            return Err(EngineError::Configuration(format!(
                "max_balance must be positive and finite, got {}",
                self.max_balance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.phrase_length, 12);
        assert_eq!(config.log_capacity, 31);
        assert_eq!(config.tick_period(), Duration::from_millis(30));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let bad = [
            ScanConfig {
                phrase_length: 0,
                ..Default::default()
            },
            ScanConfig {
                hit_probability: 1.5,
                ..Default::default()
            },
            ScanConfig {
                hit_probability: -0.1,
                ..Default::default()
            },
            ScanConfig {
                hit_probability: f64::NAN,
                ..Default::default()
            },
            ScanConfig {
                tick_period_ms: 0,
                ..Default::default()
            },
            ScanConfig {
                log_capacity: 0,
                ..Default::default()
            },
            ScanConfig {
                max_balance: 0.0,
                ..Default::default()
            },
            ScanConfig {
                max_balance: f64::INFINITY,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(EngineError::Configuration(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ScanConfig =
            serde_json::from_str(r#"{"hit_probability": 0.5, "tick_period_ms": 5}"#).unwrap();
        assert_eq!(config.hit_probability, 0.5);
        assert_eq!(config.tick_period_ms, 5);
        assert_eq!(config.log_capacity, 31);
    }
}
