//! Audio I/O for the duplex engine: waveform loading and canonicalization,
//! the chunked playback streamer, the microphone speech-activity monitor,
//! and the session coordinator that ties them together.

pub mod control;
pub mod device;
pub mod monitor;
pub mod playback;
pub mod resampler;
pub mod session;
pub mod source;

// Public API
pub use control::ControlState;
pub use monitor::{ClassifierFactory, FrameAccumulator, MonitorCore, MonitorHandle, MonitorVerdict};
pub use playback::{FeedStatus, OutputFeed, PlaybackChunk, CHUNK_DURATION_MS};
pub use resampler::resample_linear;
pub use session::{PlaybackOutcome, PlaybackSession};
pub use source::AudioClip;
