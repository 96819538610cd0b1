//! Barge-in decision tests driven by a scripted classifier instead of a
//! live microphone. Each classifier frame is 20 ms, so logical elapsed time
//! is frame count times 20 ms.

use std::sync::Arc;

use duplex_audio::{ControlState, MonitorCore, MonitorVerdict};
use duplex_vad::{MonitorState, SpeechClassifier, VadConfig};

/// Replays a fixed speech/non-speech script, one entry per frame.
struct ScriptedClassifier {
    script: Vec<bool>,
    cursor: usize,
    frame_size: usize,
}

impl ScriptedClassifier {
    fn new(script: Vec<bool>, frame_size: usize) -> Self {
        Self {
            script,
            cursor: 0,
            frame_size,
        }
    }
}

impl SpeechClassifier for ScriptedClassifier {
    fn is_speech(&mut self, frame: &[i16]) -> Result<bool, String> {
        assert_eq!(frame.len(), self.frame_size, "monitor broke the frame contract");
        let flag = self.script.get(self.cursor).copied().unwrap_or(false);
        self.cursor += 1;
        Ok(flag)
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn required_sample_rate(&self) -> u32 {
        16_000
    }

    fn required_frame_size_samples(&self) -> usize {
        self.frame_size
    }
}

fn test_config() -> VadConfig {
    // The deployment defaults: 300 ms grace (15 frames), 250 ms minimum
    // sustained speech (13 frames), 20 ms frames at 16 kHz.
    VadConfig::default()
}

fn core_with_script(script: Vec<bool>, control: Arc<ControlState>) -> MonitorCore {
    let config = test_config();
    MonitorCore::new(
        Box::new(ScriptedClassifier::new(script, config.frame_size_samples)),
        &config,
        control,
    )
}

/// Feed `frames` worth of capture data in `piece_size`-sample buffers,
/// stopping early if the monitor reaches a terminal verdict. Returns the
/// number of whole frames ingested at that point.
fn drive(core: &mut MonitorCore, frames: usize, piece_size: usize) -> (MonitorVerdict, usize) {
    let config = test_config();
    let total = frames * config.frame_size_samples;
    let mut sent = 0usize;
    while sent < total {
        let piece = piece_size.min(total - sent);
        if core.ingest(&vec![0i16; piece]) == MonitorVerdict::Finished {
            return (MonitorVerdict::Finished, (sent + piece) / config.frame_size_samples);
        }
        sent += piece;
    }
    (MonitorVerdict::Continue, frames)
}

#[test]
fn a_quiet_microphone_never_interrupts() {
    let control = Arc::new(ControlState::new());
    let mut core = core_with_script(vec![false; 200], control.clone());

    let (verdict, _) = drive(&mut core, 150, 320);
    assert_eq!(verdict, MonitorVerdict::Continue);
    assert!(!control.barged());

    // Natural completion arrives from the playback side; the monitor winds
    // down without a detection.
    control.mark_playback_done();
    let (verdict, _) = drive(&mut core, 1, 320);
    assert_eq!(verdict, MonitorVerdict::Finished);
    assert!(!control.barged());
    assert_eq!(core.state(), MonitorState::Stopped);
}

#[test]
fn sustained_speech_interrupts_at_the_expected_moment() {
    // Speech from frame 20 for 20 consecutive frames: the 13-frame debounce
    // completes on frame 33, about 660 ms into playback.
    let script: Vec<bool> = (0..200).map(|frame| (20..40).contains(&frame)).collect();
    let control = Arc::new(ControlState::new());
    let mut core = core_with_script(script, control.clone());

    let (verdict, frames_seen) = drive(&mut core, 150, 320);
    assert_eq!(verdict, MonitorVerdict::Finished);
    assert!(control.barged());
    assert!(control.stop_requested());
    assert_eq!(core.state(), MonitorState::Triggered);

    assert_eq!(frames_seen, 33);
    let config = test_config();
    let elapsed_ms = frames_seen as u64 * u64::from(config.frame_duration_ms());
    assert_eq!(elapsed_ms, 660);
}

#[test]
fn speech_only_inside_the_grace_window_is_ignored() {
    // 15 solid speech frames, all within the 15-frame grace window.
    let script: Vec<bool> = (0..200).map(|frame| frame < 15).collect();
    let control = Arc::new(ControlState::new());
    let mut core = core_with_script(script, control.clone());

    let (verdict, _) = drive(&mut core, 150, 320);
    assert_eq!(verdict, MonitorVerdict::Continue);
    assert!(!control.barged());
}

#[test]
fn monitor_defers_to_an_earlier_stop() {
    // The playback side (or the coordinator) stopped the session first; a
    // later trigger must not claim the outcome.
    let script = vec![true; 200];
    let control = Arc::new(ControlState::new());
    control.request_stop();
    let mut core = core_with_script(script, control.clone());

    let (verdict, _) = drive(&mut core, 5, 320);
    assert_eq!(verdict, MonitorVerdict::Finished);
    assert!(!control.barged());
    assert_eq!(core.state(), MonitorState::Stopped);
}

#[test]
fn capture_buffer_size_does_not_change_the_decision() {
    // Same script as the 660 ms scenario, delivered in ragged 100-sample
    // pieces instead of whole frames.
    let script: Vec<bool> = (0..200).map(|frame| (20..40).contains(&frame)).collect();
    let control = Arc::new(ControlState::new());
    let mut core = core_with_script(script, control.clone());

    let (verdict, frames_seen) = drive(&mut core, 150, 100);
    assert_eq!(verdict, MonitorVerdict::Finished);
    assert!(control.barged());
    // Delivery granularity may overshoot by the partial buffer that carried
    // the deciding frame, never undershoot.
    assert!(frames_seen >= 33 && frames_seen <= 34, "saw {}", frames_seen);
}

#[test]
fn classifier_failure_degrades_to_silence() {
    struct FailingClassifier;
    impl SpeechClassifier for FailingClassifier {
        fn is_speech(&mut self, _frame: &[i16]) -> Result<bool, String> {
            Err("backend gone".to_string())
        }
        fn reset(&mut self) {}
        fn required_sample_rate(&self) -> u32 {
            16_000
        }
        fn required_frame_size_samples(&self) -> usize {
            320
        }
    }

    let config = test_config();
    let control = Arc::new(ControlState::new());
    let mut core = MonitorCore::new(Box::new(FailingClassifier), &config, control.clone());

    let (verdict, _) = drive(&mut core, 100, 320);
    assert_eq!(verdict, MonitorVerdict::Continue);
    assert!(!control.barged());
    assert!(!control.stop_requested());
}
