use serde::{Deserialize, Serialize};

use crate::constants::{FRAME_DURATION_MS, FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};

/// Settings for the classifier and the barge-in debounce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VadConfig {
    /// Detection aggressiveness, 0..=3 (3 filters hardest).
    pub aggressiveness: u8,
    pub sample_rate_hz: u32,
    pub frame_size_samples: usize,
    /// Speech must persist this long before it counts as a barge-in.
    pub min_speech_ms: u32,
    /// Initial interval during which classifications are observed but ignored.
    pub grace_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            aggressiveness: 2,
            sample_rate_hz: SAMPLE_RATE_HZ,
            frame_size_samples: FRAME_SIZE_SAMPLES,
            min_speech_ms: 250,
            grace_ms: 300,
        }
    }
}

impl VadConfig {
    /// Default config with the frame size re-derived for a non-canonical rate.
    pub fn with_sample_rate(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz,
            frame_size_samples: (sample_rate_hz as usize / 1000) * FRAME_DURATION_MS as usize,
            ..Default::default()
        }
    }

    pub fn frame_duration_ms(&self) -> u32 {
        (self.frame_size_samples as u64 * 1000 / self.sample_rate_hz as u64) as u32
    }

    /// Consecutive speech frames required to trigger a barge-in. Rounds up
    /// so the detected run is never shorter than the configured duration.
    pub fn min_speech_frames(&self) -> u32 {
        self.min_speech_ms.div_ceil(self.frame_duration_ms().max(1)).max(1)
    }

    /// Frames ignored at the start of a session.
    pub fn grace_frames(&self) -> u64 {
        (self.grace_ms / self.frame_duration_ms().max(1)) as u64
    }
}
