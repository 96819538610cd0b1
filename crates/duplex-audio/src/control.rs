use std::sync::atomic::{AtomicBool, Ordering};

/// Shared control flags for one playback session.
///
/// `stop` is monotonic, and `barged` is only ever written by the single
/// winner of the compare-and-swap on `stop`. Whoever latches `stop` first
/// decides the attributed cause of termination, and `barged` implies `stop`
/// for every observer.
///
/// Created fresh per invocation and discarded with the session; both
/// real-time callbacks touch nothing else that is shared and mutable.
#[derive(Debug, Default)]
pub struct ControlState {
    stop: AtomicBool,
    barged: AtomicBool,
    playback_done: AtomicBool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination of both sides. Returns true if this call was the
    /// first writer; later calls are idempotent.
    pub fn request_stop(&self) -> bool {
        self.stop
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Claim the stop as a barge-in. Loses (and leaves `barged` unset) if
    /// anything else already stopped the session.
    pub fn try_barge(&self) -> bool {
        if self.request_stop() {
            self.barged.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn barged(&self) -> bool {
        self.barged.load(Ordering::SeqCst)
    }

    pub fn mark_playback_done(&self) {
        self.playback_done.store(true, Ordering::SeqCst);
    }

    pub fn playback_done(&self) -> bool {
        self.playback_done.load(Ordering::SeqCst)
    }

    /// True once either side has finished or termination was requested.
    pub fn finished(&self) -> bool {
        self.stop_requested() || self.playback_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle() {
        let state = ControlState::new();
        assert!(!state.stop_requested());
        assert!(!state.barged());
        assert!(!state.playback_done());
        assert!(!state.finished());
    }

    #[test]
    fn first_stop_wins() {
        let state = ControlState::new();
        assert!(state.request_stop());
        assert!(!state.request_stop());
        assert!(state.stop_requested());
    }

    #[test]
    fn barge_claims_the_stop() {
        let state = ControlState::new();
        assert!(state.try_barge());
        assert!(state.barged());
        assert!(state.stop_requested());
    }

    #[test]
    fn barge_loses_against_an_earlier_stop() {
        let state = ControlState::new();
        state.request_stop();
        assert!(!state.try_barge());
        assert!(!state.barged());
    }

    #[test]
    fn playback_done_finishes_without_stopping() {
        let state = ControlState::new();
        state.mark_playback_done();
        assert!(state.finished());
        assert!(!state.stop_requested());
    }
}
