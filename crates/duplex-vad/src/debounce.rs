use crate::config::VadConfig;

/// Where the monitor is in one playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Startup grace window: frames are classified but cannot trigger.
    Warmup,
    /// Counting consecutive speech frames.
    Watching,
    /// Sustained speech detected. Terminal.
    Triggered,
    /// Ended without a detection (playback finished or stop requested). Terminal.
    Stopped,
}

impl MonitorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, MonitorState::Triggered | MonitorState::Stopped)
    }
}

/// Debounce state machine that turns per-frame speech classifications into a
/// single barge-in decision.
///
/// One instance covers one playback session; nothing is shared outside the
/// monitor that owns it.
pub struct BargeInDetector {
    state: MonitorState,
    seen_frames: u64,
    speech_run: u32,
    grace_frames: u64,
    min_speech_frames: u32,
}

impl BargeInDetector {
    pub fn new(config: &VadConfig) -> Self {
        let grace_frames = config.grace_frames();
        Self {
            state: if grace_frames == 0 {
                MonitorState::Watching
            } else {
                MonitorState::Warmup
            },
            seen_frames: 0,
            speech_run: 0,
            grace_frames,
            min_speech_frames: config.min_speech_frames(),
        }
    }

    /// Advance by one classified frame and return the resulting state.
    pub fn observe(&mut self, is_speech: bool) -> MonitorState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.seen_frames += 1;

        // Startup frames are observed but never counted; this is what keeps
        // the assistant's own voice from cutting itself off.
        if self.seen_frames <= self.grace_frames {
            return self.state;
        }
        self.state = MonitorState::Watching;

        if is_speech {
            self.speech_run += 1;
            if self.speech_run >= self.min_speech_frames {
                self.state = MonitorState::Triggered;
            }
        } else {
            self.speech_run = 0;
        }
        self.state
    }

    /// Force the terminal no-detection state when the session ends externally.
    pub fn mark_stopped(&mut self) {
        if !self.state.is_terminal() {
            self.state = MonitorState::Stopped;
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Total frames observed so far, grace window included.
    pub fn seen_frames(&self) -> u64 {
        self.seen_frames
    }

    pub fn reset(&mut self) {
        self.state = if self.grace_frames == 0 {
            MonitorState::Watching
        } else {
            MonitorState::Warmup
        };
        self.seen_frames = 0;
        self.speech_run = 0;
    }
}
