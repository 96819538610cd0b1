//! Foundation types for the duplex playback engine: the error taxonomy and
//! the engine-wide configuration.

pub mod config;
pub mod error;

pub use config::{BargeInConfig, EngineConfig};
pub use error::{AudioError, EngineError, WaveformError};
