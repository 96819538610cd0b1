use thiserror::Error;

/// Top-level error for one playback session.
///
/// Only failures that prevent a session from starting reach the caller;
/// mid-session device trouble is logged and degraded inside the engine so an
/// interaction loop built on top of it keeps running.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Waveform error: {0}")]
    Waveform(#[from] WaveformError),

    #[error("Audio subsystem error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// The waveform could not be read or decoded.
#[derive(Error, Debug)]
pub enum WaveformError {
    #[error("Failed to decode WAV: {0}")]
    Decode(#[from] hound::Error),

    #[error("Unsupported sample format: {bits}-bit {format}")]
    UnsupportedFormat { bits: u16, format: String },
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No default {direction} device available")]
    NoDevice { direction: &'static str },

    #[error("No supported f32 {direction} config at {rate} Hz")]
    FormatNotSupported { direction: &'static str, rate: u32 },

    #[error("Build stream error: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Play stream error: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Stream error: {0}")]
    Stream(#[from] cpal::StreamError),

    #[error("Supported stream configs error: {0}")]
    SupportedStreamConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}
