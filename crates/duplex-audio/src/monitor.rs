use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, StreamTrait};
use crossbeam_channel::{bounded, RecvTimeoutError};
use tracing::{debug, warn};

use duplex_foundation::AudioError;
use duplex_vad::{BargeInDetector, MonitorState, SpeechClassifier, VadConfig};

use crate::control::ControlState;
use crate::device;

/// Factory for the optional classifier capability. It is invoked on the
/// monitor thread, so the classifier itself never crosses a thread boundary.
pub type ClassifierFactory =
    Arc<dyn Fn(&VadConfig) -> Result<Box<dyn SpeechClassifier>, String> + Send + Sync>;

/// Capture buffers held in flight between the input callback and the monitor
/// thread. Small on purpose: frames are classified immediately, not stored.
const CAPTURE_QUEUE_DEPTH: usize = 8;

/// Re-frames arbitrary capture buffer sizes into exact classifier frames.
pub struct FrameAccumulator {
    pending: Vec<i16>,
    frame_size: usize,
}

impl FrameAccumulator {
    pub fn new(frame_size: usize) -> Self {
        Self {
            pending: Vec::with_capacity(frame_size * 2),
            frame_size,
        }
    }

    pub fn push(&mut self, samples: &[i16]) {
        self.pending.extend_from_slice(samples);
    }

    pub fn next_frame(&mut self) -> Option<Vec<i16>> {
        if self.pending.len() < self.frame_size {
            return None;
        }
        let rest = self.pending.split_off(self.frame_size);
        Some(std::mem::replace(&mut self.pending, rest))
    }
}

/// Whether the monitor loop should keep consuming capture data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorVerdict {
    Continue,
    Finished,
}

/// Device-independent monitor logic: re-frame, classify, debounce, decide.
pub struct MonitorCore {
    classifier: Box<dyn SpeechClassifier>,
    detector: BargeInDetector,
    control: Arc<ControlState>,
    frames: FrameAccumulator,
    classify_failed: bool,
}

impl MonitorCore {
    pub fn new(
        classifier: Box<dyn SpeechClassifier>,
        config: &VadConfig,
        control: Arc<ControlState>,
    ) -> Self {
        Self {
            frames: FrameAccumulator::new(config.frame_size_samples),
            classifier,
            detector: BargeInDetector::new(config),
            control,
            classify_failed: false,
        }
    }

    /// Consume captured mono samples. Returns `Finished` once a terminal
    /// decision is reached or the session is ending for any other reason.
    pub fn ingest(&mut self, samples: &[i16]) -> MonitorVerdict {
        self.frames.push(samples);
        while let Some(frame) = self.frames.next_frame() {
            if self.control.finished() {
                self.detector.mark_stopped();
                return MonitorVerdict::Finished;
            }
            let is_speech = match self.classifier.is_speech(&frame) {
                Ok(flag) => flag,
                Err(e) => {
                    // Mid-session classifier trouble must not kill playback.
                    if !self.classify_failed {
                        warn!("Classifier error, treating frames as non-speech: {}", e);
                        self.classify_failed = true;
                    }
                    false
                }
            };
            if self.detector.observe(is_speech) == MonitorState::Triggered {
                if self.control.try_barge() {
                    debug!(
                        "Barge-in detected after {} frames",
                        self.detector.seen_frames()
                    );
                } else {
                    debug!("Speech detected but the session already stopped");
                }
                return MonitorVerdict::Finished;
            }
        }
        MonitorVerdict::Continue
    }

    pub fn state(&self) -> MonitorState {
        self.detector.state()
    }
}

/// Handle to the monitor thread.
pub struct MonitorHandle {
    handle: JoinHandle<()>,
}

impl MonitorHandle {
    /// Spawn the monitor. The classifier is constructed on the new thread;
    /// an input-device failure stops the whole session with a warning.
    pub fn spawn(
        factory: ClassifierFactory,
        config: VadConfig,
        control: Arc<ControlState>,
    ) -> Result<Self, AudioError> {
        let handle = thread::Builder::new()
            .name("barge-monitor".to_string())
            .spawn(move || run_monitor(factory, config, control))
            .map_err(|e| AudioError::Fatal(format!("Failed to spawn monitor thread: {}", e)))?;
        Ok(Self { handle })
    }

    /// Bounded join. Returns false if the thread is still running when the
    /// deadline passes; the handle is dropped and the thread left detached.
    pub fn join_timeout(self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.handle.is_finished() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
        self.handle.join().is_ok()
    }
}

fn run_monitor(factory: ClassifierFactory, config: VadConfig, control: Arc<ControlState>) {
    let classifier = match factory(&config) {
        Ok(c) => c,
        Err(e) => {
            // The capability was probed at session construction; losing it
            // here still must not raise.
            warn!("Classifier unavailable, monitor exiting: {}", e);
            return;
        }
    };
    let mut core = MonitorCore::new(classifier, &config, control.clone());

    let (device, stream_config) = match device::default_input(config.sample_rate_hz) {
        Ok(pair) => pair,
        Err(e) => {
            warn!("Input device unavailable, stopping session: {}", e);
            control.request_stop();
            return;
        }
    };
    let channels = stream_config.channels as usize;

    let (frame_tx, frame_rx) = bounded::<Vec<i16>>(CAPTURE_QUEUE_DEPTH);
    let err_control = control.clone();
    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // First channel only, scaled to i16 for the classifier. Dropping
            // a buffer when the queue is full absorbs scheduling jitter
            // without ever blocking the callback.
            let mono: Vec<i16> = data
                .iter()
                .step_by(channels.max(1))
                .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0).round() as i16)
                .collect();
            let _ = frame_tx.try_send(mono);
        },
        move |err| {
            warn!("Input stream error: {}", err);
            err_control.request_stop();
        },
        None,
    );
    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to open input stream, stopping session: {}", e);
            control.request_stop();
            return;
        }
    };
    if let Err(e) = stream.play() {
        warn!("Failed to start input stream, stopping session: {}", e);
        control.request_stop();
        return;
    }

    while !control.finished() {
        match frame_rx.recv_timeout(Duration::from_millis(10)) {
            Ok(samples) => {
                if core.ingest(&samples) == MonitorVerdict::Finished {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    drop(stream);
    debug!("Monitor exiting in state {:?}", core.state());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_reframes_odd_buffer_sizes() {
        let mut frames = FrameAccumulator::new(320);
        frames.push(&[1i16; 100]);
        assert!(frames.next_frame().is_none());
        frames.push(&[1i16; 300]);
        let frame = frames.next_frame().expect("400 samples buffered");
        assert_eq!(frame.len(), 320);
        assert!(frames.next_frame().is_none());
        frames.push(&[1i16; 240]);
        assert_eq!(frames.next_frame().expect("remainder completes").len(), 320);
    }

    #[test]
    fn accumulator_preserves_sample_order() {
        let mut frames = FrameAccumulator::new(4);
        frames.push(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(frames.next_frame(), Some(vec![1, 2, 3, 4]));
        frames.push(&[7, 8]);
        assert_eq!(frames.next_frame(), Some(vec![5, 6, 7, 8]));
    }
}
