use duplex_vad::{SpeechClassifier, VadConfig};
use webrtc_vad::{SampleRate, Vad, VadMode};

/// Speech classifier backed by the WebRTC voice activity detector.
pub struct WebRtcClassifier {
    vad: Vad,
    aggressiveness: u8,
    sample_rate_hz: u32,
    frame_size_samples: usize,
}

impl std::fmt::Debug for WebRtcClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebRtcClassifier")
            .field("aggressiveness", &self.aggressiveness)
            .field("sample_rate_hz", &self.sample_rate_hz)
            .field("frame_size_samples", &self.frame_size_samples)
            .finish_non_exhaustive()
    }
}

fn mode_for(aggressiveness: u8) -> Option<VadMode> {
    match aggressiveness {
        0 => Some(VadMode::Quality),
        1 => Some(VadMode::LowBitrate),
        2 => Some(VadMode::Aggressive),
        3 => Some(VadMode::VeryAggressive),
        _ => None,
    }
}

fn rate_for(sample_rate_hz: u32) -> Option<SampleRate> {
    match sample_rate_hz {
        8_000 => Some(SampleRate::Rate8kHz),
        16_000 => Some(SampleRate::Rate16kHz),
        32_000 => Some(SampleRate::Rate32kHz),
        48_000 => Some(SampleRate::Rate48kHz),
        _ => None,
    }
}

fn build_vad(mode: VadMode, rate: SampleRate) -> Vad {
    let mut vad = Vad::new();
    vad.set_mode(mode);
    vad.set_sample_rate(rate);
    vad
}

impl WebRtcClassifier {
    pub fn new(config: &VadConfig) -> Result<Self, String> {
        let mode = mode_for(config.aggressiveness)
            .ok_or_else(|| format!("aggressiveness must be 0..=3, got {}", config.aggressiveness))?;
        let rate = rate_for(config.sample_rate_hz).ok_or_else(|| {
            format!(
                "WebRTC VAD supports 8, 16, 32 or 48 kHz, got {} Hz",
                config.sample_rate_hz
            )
        })?;

        // The detector only accepts 10, 20 or 30 ms worth of samples at a time.
        let frame_ms = config.frame_size_samples as u64 * 1000 / config.sample_rate_hz as u64;
        if !matches!(frame_ms, 10 | 20 | 30) {
            return Err(format!(
                "WebRTC VAD requires 10, 20 or 30 ms frames, got {} ms ({} samples at {} Hz)",
                frame_ms, config.frame_size_samples, config.sample_rate_hz
            ));
        }

        Ok(Self {
            vad: build_vad(mode, rate),
            aggressiveness: config.aggressiveness,
            sample_rate_hz: config.sample_rate_hz,
            frame_size_samples: config.frame_size_samples,
        })
    }
}

impl SpeechClassifier for WebRtcClassifier {
    fn is_speech(&mut self, frame: &[i16]) -> Result<bool, String> {
        if frame.len() != self.frame_size_samples {
            return Err(format!(
                "expected {} samples, got {}",
                self.frame_size_samples,
                frame.len()
            ));
        }
        self.vad
            .is_voice_segment(frame)
            .map_err(|e| format!("VAD rejected frame: {:?}", e))
    }

    fn reset(&mut self) {
        // The underlying detector has no reset; a fresh instance is the
        // documented equivalent. Stored parameters were validated in new().
        if let (Some(mode), Some(rate)) = (
            mode_for(self.aggressiveness),
            rate_for(self.sample_rate_hz),
        ) {
            self.vad = build_vad(mode, rate);
        }
    }

    fn required_sample_rate(&self) -> u32 {
        self.sample_rate_hz
    }

    fn required_frame_size_samples(&self) -> usize {
        self.frame_size_samples
    }
}
