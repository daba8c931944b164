use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// How strictly frame framing is checked before delivery.
///
/// Frames with zero channels or a non-positive sample rate are dropped in
/// both modes. Empty frames are always delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameValidation {
    /// Deliver frames whose sample count is not a multiple of the channel
    /// count, counting them as misaligned.
    #[default]
    Lenient,
    /// Drop misaligned frames.
    Strict,
}

/// Configuration for a capture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Framing checks applied in the delivery path (default: lenient).
    pub frame_validation: FrameValidation,

    /// Log a warning when one sink call takes longer than this many
    /// milliseconds (default: 50). `None` disables the check. The call is
    /// never interrupted.
    pub slow_delivery_warning_ms: Option<u64>,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.slow_delivery_warning_ms == Some(0) {
            return Err("slow delivery threshold must be positive".into());
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::ConfigurationFailed(format!("invalid config: {}", e)))?;
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(config)
    }

    pub fn slow_delivery_threshold(&self) -> Option<Duration> {
        self.slow_delivery_warning_ms.map(Duration::from_millis)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_validation: FrameValidation::Lenient,
            slow_delivery_warning_ms: Some(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slow_delivery_threshold(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = SessionConfig::from_json(r#"{ "frame_validation": "strict" }"#).unwrap();
        assert_eq!(config.frame_validation, FrameValidation::Strict);
        assert_eq!(config.slow_delivery_warning_ms, Some(50));
    }

    #[test]
    fn json_can_disable_slow_warning() {
        let config = SessionConfig::from_json(r#"{ "slow_delivery_warning_ms": null }"#).unwrap();
        assert_eq!(config.slow_delivery_threshold(), None);
    }

    #[test]
    fn zero_threshold_rejected() {
        let err = SessionConfig::from_json(r#"{ "slow_delivery_warning_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, CaptureError::ConfigurationFailed(_)));
    }

    #[test]
    fn malformed_json_rejected() {
        let err = SessionConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CaptureError::ConfigurationFailed(_)));
    }
}
