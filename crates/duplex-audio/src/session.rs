use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use duplex_foundation::{EngineConfig, EngineError};
use duplex_vad::VadConfig;

use crate::control::ControlState;
use crate::monitor::{ClassifierFactory, MonitorHandle};
use crate::playback::{self, OutputFeed};
use crate::source::AudioClip;

/// Poll cadence for the coordinator's wait loop.
const WAIT_POLL: Duration = Duration::from_millis(10);
/// Bound on joining the monitor thread during teardown.
const JOIN_TIMEOUT: Duration = Duration::from_millis(500);
/// Wall-clock allowance past the clip duration before the coordinator
/// assumes the output side is wedged and abandons the wait.
const WEDGE_MARGIN: Duration = Duration::from_secs(2);

/// How one playback invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The clip played to its natural end, or interruption was off.
    Completed,
    /// Sustained speech interrupted playback; the caller can start
    /// listening immediately, the user is already talking.
    Interrupted,
}

impl PlaybackOutcome {
    pub fn was_interrupted(self) -> bool {
        matches!(self, PlaybackOutcome::Interrupted)
    }
}

/// Coordinates barge-in-aware playback, one self-contained session per call.
///
/// Owns the configuration and the optional classifier capability; all
/// per-invocation state (control flags, chunk FIFO, threads) is created
/// fresh in `play_clip` and torn down before it returns.
pub struct PlaybackSession {
    config: EngineConfig,
    classifier: Option<ClassifierFactory>,
}

impl PlaybackSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            classifier: None,
        }
    }

    /// Install the classifier capability. The factory is probed once here;
    /// a failing probe downgrades to non-interruptible playback rather than
    /// erroring.
    pub fn with_classifier(mut self, factory: ClassifierFactory) -> Self {
        match factory(&self.vad_config()) {
            Ok(_) => self.classifier = Some(factory),
            Err(e) => warn!("Speech classifier unavailable, barge-in disabled: {}", e),
        }
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn vad_config(&self) -> VadConfig {
        VadConfig {
            aggressiveness: self.config.barge_in.aggressiveness,
            min_speech_ms: self.config.barge_in.min_speech_ms,
            grace_ms: self.config.barge_in.grace_ms,
            ..VadConfig::with_sample_rate(self.config.sample_rate_hz)
        }
    }

    /// Load a waveform and play it. Decode failures propagate before any
    /// audio starts; device failures mid-session degrade to an
    /// uninterrupted outcome so the caller's loop keeps running.
    pub fn play_file<P: AsRef<Path>>(
        &self,
        path: P,
        allow_interrupt: bool,
    ) -> Result<PlaybackOutcome, EngineError> {
        let clip = AudioClip::from_wav_file(path, self.config.sample_rate_hz)?;
        self.play_clip(&clip, allow_interrupt)
    }

    pub fn play_clip(
        &self,
        clip: &AudioClip,
        allow_interrupt: bool,
    ) -> Result<PlaybackOutcome, EngineError> {
        self.config.validate()?;

        if clip.is_empty() {
            debug!("Empty clip, nothing to play");
            return Ok(PlaybackOutcome::Completed);
        }

        let armed = allow_interrupt && self.config.barge_in.enabled;
        let factory = match (&self.classifier, armed) {
            (Some(factory), true) => factory.clone(),
            _ => {
                debug!("Barge-in disabled or unavailable, playing straight through");
                return self.degrade_to_blocking(clip);
            }
        };

        let control = Arc::new(ControlState::new());
        let monitor = match MonitorHandle::spawn(factory, self.vad_config(), control.clone()) {
            Ok(monitor) => monitor,
            Err(e) => {
                warn!("Failed to start monitor, playing straight through: {}", e);
                return self.degrade_to_blocking(clip);
            }
        };

        let rx = playback::load_chunk_queue(clip);
        let feed = OutputFeed::new(rx, control.clone());
        let stream = match playback::start_output_stream(feed, control.clone(), clip.sample_rate_hz())
        {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Output device failure, aborting session: {}", e);
                control.request_stop();
                self.join_monitor(monitor);
                return Ok(PlaybackOutcome::Completed);
            }
        };

        info!("Streaming {:?} of audio with barge-in armed", clip.duration());

        // Coarse wait: the real-time sides communicate through the flags,
        // and this thread is the only one allowed to sleep.
        let deadline = Instant::now() + clip.duration() + WEDGE_MARGIN;
        while !control.finished() {
            if Instant::now() >= deadline {
                warn!("Output made no progress before its deadline, aborting session");
                break;
            }
            thread::sleep(WAIT_POLL);
        }

        // Idempotent: guarantees both callbacks observe a stop even when
        // the wake-up came from natural completion.
        control.request_stop();
        drop(stream);
        self.join_monitor(monitor);

        let outcome = if control.barged() {
            PlaybackOutcome::Interrupted
        } else {
            PlaybackOutcome::Completed
        };
        info!("Playback finished: {:?}", outcome);
        Ok(outcome)
    }

    fn degrade_to_blocking(&self, clip: &AudioClip) -> Result<PlaybackOutcome, EngineError> {
        match playback::play_blocking(clip) {
            Ok(()) => Ok(PlaybackOutcome::Completed),
            Err(e) => {
                warn!("Playback device failure: {}", e);
                Ok(PlaybackOutcome::Completed)
            }
        }
    }

    fn join_monitor(&self, monitor: MonitorHandle) {
        if !monitor.join_timeout(JOIN_TIMEOUT) {
            warn!("Monitor thread did not exit within {:?}", JOIN_TIMEOUT);
        }
    }
}
