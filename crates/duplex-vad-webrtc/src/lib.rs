//! WebRTC-VAD backed speech classifier for duplex.
//!
//! This is the engine's optional capability: constructing the classifier
//! doubles as the capability probe, and a construction failure downgrades
//! playback to the non-interruptible path instead of erroring.

#[cfg(feature = "webrtc")]
pub mod webrtc_wrapper;

#[cfg(feature = "webrtc")]
pub use webrtc_wrapper::WebRtcClassifier;
