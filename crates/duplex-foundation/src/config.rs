use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Process-wide engine configuration.
///
/// One instance is passed into the session at construction; there is no
/// implicit global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Canonical sample rate shared by the playback and capture paths.
    pub sample_rate_hz: u32,
    pub barge_in: BargeInConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BargeInConfig {
    /// Master switch; callers can additionally disable per invocation.
    pub enabled: bool,
    /// Classifier aggressiveness, 0..=3 (3 filters hardest).
    pub aggressiveness: u8,
    /// Speech must persist this long before it cuts playback.
    pub min_speech_ms: u32,
    /// Ignore the first part of the session to avoid self-triggering on the
    /// assistant's own voice.
    pub grace_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 16_000,
            barge_in: BargeInConfig::default(),
        }
    }
}

impl Default for BargeInConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            aggressiveness: 2,
            min_speech_ms: 250,
            grace_ms: 300,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !matches!(self.sample_rate_hz, 8_000 | 16_000 | 32_000 | 48_000) {
            return Err(EngineError::Config(format!(
                "sample rate must be 8000, 16000, 32000 or 48000 Hz, got {}",
                self.sample_rate_hz
            )));
        }
        if self.barge_in.aggressiveness > 3 {
            return Err(EngineError::Config(format!(
                "aggressiveness must be 0..=3, got {}",
                self.barge_in.aggressiveness
            )));
        }
        if self.barge_in.min_speech_ms == 0 {
            return Err(EngineError::Config(
                "min_speech_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate_hz, 16_000);
        assert!(config.barge_in.enabled);
        assert_eq!(config.barge_in.aggressiveness, 2);
        assert_eq!(config.barge_in.min_speech_ms, 250);
        assert_eq!(config.barge_in.grace_ms, 300);
    }

    #[test]
    fn rejects_odd_sample_rate() {
        let config = EngineConfig {
            sample_rate_hz: 44_100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_aggressiveness() {
        let mut config = EngineConfig::default();
        config.barge_in.aggressiveness = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_min_speech() {
        let mut config = EngineConfig::default();
        config.barge_in.min_speech_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [barge_in]
            aggressiveness = 3
            grace_ms = 500
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.sample_rate_hz, 16_000);
        assert_eq!(config.barge_in.aggressiveness, 3);
        assert_eq!(config.barge_in.grace_ms, 500);
        assert_eq!(config.barge_in.min_speech_ms, 250);
    }
}
