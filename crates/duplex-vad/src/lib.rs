//! Voice-activity classification for the duplex playback engine.
//!
//! The crate defines the classifier interface, its configuration, and the
//! debounce state machine that turns per-frame classifications into a single
//! barge-in decision. Concrete classifier backends live in their own crates.

pub mod classifier;
pub mod config;
pub mod constants;
pub mod debounce;

pub use classifier::SpeechClassifier;
pub use config::VadConfig;
pub use constants::{FRAME_DURATION_MS, FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};
pub use debounce::{BargeInDetector, MonitorState};
