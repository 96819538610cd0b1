/// Canonical sample rate shared by the capture and playback paths.
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Classifier frame duration. WebRTC-style detectors accept 10, 20 or 30 ms.
pub const FRAME_DURATION_MS: u32 = 20;

/// Samples per classifier frame at the canonical rate.
pub const FRAME_SIZE_SAMPLES: usize =
    (SAMPLE_RATE_HZ as usize / 1000) * FRAME_DURATION_MS as usize;
