use std::path::Path;
use std::time::Duration;

use hound::{SampleFormat, WavReader};
use tracing::info;

use duplex_foundation::WaveformError;

use crate::resampler::resample_linear;

/// A mono waveform at the engine's canonical sample rate.
///
/// Produced once per playback invocation and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate_hz: u32,
}

impl AudioClip {
    /// Load a WAV file, keep its first channel, and resample to `target_rate`.
    ///
    /// Handles integer PCM up to 32 bits and 32-bit float. A zero-sample
    /// file is valid and plays as immediate natural completion.
    pub fn from_wav_file<P: AsRef<Path>>(path: P, target_rate: u32) -> Result<Self, WaveformError> {
        let mut reader = WavReader::open(&path)?;
        let spec = reader.spec();

        info!(
            "Loading WAV: {} Hz, {} channels, {}-bit {:?}",
            spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
        );

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
            (SampleFormat::Int, bits) if (1..=32).contains(&bits) => {
                let scale = 1.0 / (1i64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()?
            }
            (format, bits) => {
                return Err(WaveformError::UnsupportedFormat {
                    bits,
                    format: format!("{:?}", format),
                });
            }
        };

        // The engine is single-channel throughout; keep the first channel.
        let channels = spec.channels.max(1) as usize;
        let mono: Vec<f32> = interleaved.iter().step_by(channels).copied().collect();

        let samples = resample_linear(&mono, spec.sample_rate, target_rate);
        info!(
            "WAV canonicalized: {} samples at {} Hz",
            samples.len(),
            target_rate
        );

        Ok(Self {
            samples,
            sample_rate_hz: target_rate,
        })
    }

    pub fn from_samples(samples: Vec<f32>, sample_rate_hz: u32) -> Self {
        Self {
            samples,
            sample_rate_hz,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate_hz as f64)
    }
}
