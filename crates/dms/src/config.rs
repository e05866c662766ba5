//! DMS configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::geometry::DEGENERATE_SPAN_PX;
use crate::DmsError;

/// DMS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Per-eye EAR below which the eye counts as closed
    pub ear_threshold: f64,

    /// Continuous closure before the driver is reported drowsy (milliseconds)
    pub drowsy_time_threshold_ms: u64,

    /// Continuous closure before the driver is reported asleep (milliseconds)
    pub sleep_time_threshold_ms: u64,

    /// LAR above which the mouth counts as yawning
    pub yawn_lar_threshold: f64,

    /// Average EAR must also be below this for a yawn
    pub yawn_ear_gate: f64,

    /// Minimum yawn run length (milliseconds)
    pub yawn_time_threshold_ms: u64,

    /// Smallest usable ratio denominator (pixels)
    pub min_span_px: f64,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.22,
            drowsy_time_threshold_ms: 3000,
            sleep_time_threshold_ms: 8000,
            yawn_lar_threshold: 0.7,
            yawn_ear_gate: 0.10,
            yawn_time_threshold_ms: 3000,
            min_span_px: DEGENERATE_SPAN_PX,
        }
    }
}

impl DmsConfig {
    /// Create strict config (lower thresholds)
    pub fn strict() -> Self {
        Self {
            drowsy_time_threshold_ms: 2000,
            sleep_time_threshold_ms: 5000,
            yawn_time_threshold_ms: 2500,
            ..Default::default()
        }
    }

    /// Create lenient config (higher thresholds)
    pub fn lenient() -> Self {
        Self {
            drowsy_time_threshold_ms: 4000,
            sleep_time_threshold_ms: 10_000,
            yawn_time_threshold_ms: 4000,
            ..Default::default()
        }
    }

    pub fn drowsy_time_threshold(&self) -> Duration {
        Duration::from_millis(self.drowsy_time_threshold_ms)
    }

    pub fn sleep_time_threshold(&self) -> Duration {
        Duration::from_millis(self.sleep_time_threshold_ms)
    }

    pub fn yawn_time_threshold(&self) -> Duration {
        Duration::from_millis(self.yawn_time_threshold_ms)
    }

    /// Reject configurations the trackers cannot run with
    pub fn validate(&self) -> Result<(), DmsError> {
        for (name, value) in [
            ("ear_threshold", self.ear_threshold),
            ("yawn_lar_threshold", self.yawn_lar_threshold),
            ("yawn_ear_gate", self.yawn_ear_gate),
            ("min_span_px", self.min_span_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DmsError::Config(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }

        if self.drowsy_time_threshold_ms == 0 {
            return Err(DmsError::Config(
                "drowsy_time_threshold_ms must be greater than zero".into(),
            ));
        }

        if self.drowsy_time_threshold_ms >= self.sleep_time_threshold_ms {
            return Err(DmsError::Config(format!(
                "drowsy_time_threshold_ms ({}) must be below sleep_time_threshold_ms ({})",
                self.drowsy_time_threshold_ms, self.sleep_time_threshold_ms
            )));
        }

        if self.yawn_time_threshold_ms == 0 {
            return Err(DmsError::Config(
                "yawn_time_threshold_ms must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(DmsConfig::default().validate().is_ok());
        assert!(DmsConfig::strict().validate().is_ok());
        assert!(DmsConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_time_thresholds() {
        let config = DmsConfig {
            drowsy_time_threshold_ms: 8000,
            sleep_time_threshold_ms: 8000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_rejects_non_finite_ratio_threshold() {
        let config = DmsConfig {
            yawn_lar_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_yawn_time() {
        let config = DmsConfig {
            yawn_time_threshold_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: DmsConfig =
            serde_json::from_str(r#"{"ear_threshold": 0.2}"#).unwrap();
        assert_eq!(config.ear_threshold, 0.2);
        assert_eq!(config.sleep_time_threshold_ms, 8000);
    }
}
