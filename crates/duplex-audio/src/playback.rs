use std::sync::Arc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use tracing::{debug, warn};

use duplex_foundation::AudioError;

use crate::control::ControlState;
use crate::device;
use crate::source::AudioClip;

/// Playback chunk duration. Distinct from the 20 ms classifier frame; the
/// output and input streams are clocked independently.
pub const CHUNK_DURATION_MS: u32 = 40;

pub fn chunk_size_samples(sample_rate_hz: u32) -> usize {
    (sample_rate_hz as usize / 1000) * CHUNK_DURATION_MS as usize
}

/// One entry in the playback FIFO.
pub enum PlaybackChunk {
    Samples(Vec<f32>),
    /// End-of-data sentinel.
    End,
}

/// Split the clip into ~40 ms chunks and pre-fill a bounded FIFO, sentinel
/// last. The FIFO is sized for the whole clip so enqueueing never blocks;
/// the output callback is its only consumer.
pub fn load_chunk_queue(clip: &AudioClip) -> Receiver<PlaybackChunk> {
    let chunk = chunk_size_samples(clip.sample_rate_hz()).max(1);
    let n_chunks = clip.len().div_ceil(chunk);
    let (tx, rx) = bounded(n_chunks + 1);
    for piece in clip.samples().chunks(chunk) {
        // Capacity covers every chunk, so send cannot block or fail here.
        let _ = tx.send(PlaybackChunk::Samples(piece.to_vec()));
    }
    let _ = tx.send(PlaybackChunk::End);
    rx
}

/// What the output callback should do after a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Continue,
    /// Nothing further will be written; the coordinator tears the stream down.
    Complete,
}

/// Drains the chunk FIFO into device buffers from inside the output
/// callback. Non-blocking: the only queue operation is `try_recv`, and a
/// stop request turns every subsequent fill into silence.
pub struct OutputFeed {
    rx: Receiver<PlaybackChunk>,
    control: Arc<ControlState>,
    current: Vec<f32>,
    offset: usize,
    done: bool,
}

impl OutputFeed {
    pub fn new(rx: Receiver<PlaybackChunk>, control: Arc<ControlState>) -> Self {
        Self {
            rx,
            control,
            current: Vec::new(),
            offset: 0,
            done: false,
        }
    }

    /// Fill one device buffer. Mono clip samples are duplicated across the
    /// device's channels; anything not covered by clip data is zeroed.
    pub fn fill(&mut self, out: &mut [f32], channels: usize) -> FeedStatus {
        if self.done || self.control.stop_requested() {
            out.fill(0.0);
            self.done = true;
            return FeedStatus::Complete;
        }
        for frame in out.chunks_mut(channels.max(1)) {
            let sample = if self.done { 0.0 } else { self.next_sample() };
            for slot in frame.iter_mut() {
                *slot = sample;
            }
        }
        if self.done {
            FeedStatus::Complete
        } else {
            FeedStatus::Continue
        }
    }

    fn next_sample(&mut self) -> f32 {
        loop {
            if self.offset < self.current.len() {
                let sample = self.current[self.offset];
                self.offset += 1;
                return sample;
            }
            match self.rx.try_recv() {
                Ok(PlaybackChunk::Samples(chunk)) => {
                    self.current = chunk;
                    self.offset = 0;
                }
                Ok(PlaybackChunk::End) => {
                    // Natural end of the clip; pad the rest with silence.
                    self.control.mark_playback_done();
                    self.done = true;
                    return 0.0;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                    // The queue was pre-filled, so running dry means the
                    // sentinel is already gone. Treat it as completion.
                    self.control.mark_playback_done();
                    self.done = true;
                    return 0.0;
                }
            }
        }
    }
}

/// Build and start the output stream; the callback owns `feed`.
pub fn start_output_stream(
    mut feed: OutputFeed,
    control: Arc<ControlState>,
    sample_rate_hz: u32,
) -> Result<cpal::Stream, AudioError> {
    let (device, config) = device::default_output(sample_rate_hz)?;
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let _ = feed.fill(data, channels);
        },
        move |err| {
            warn!("Output stream error: {}", err);
            control.request_stop();
        },
        None,
    )?;
    stream.play()?;
    Ok(stream)
}

/// Straight-through playback with no interruption path. Used when barge-in
/// is disabled or the classifier capability is absent.
pub fn play_blocking(clip: &AudioClip) -> Result<(), AudioError> {
    if clip.is_empty() {
        return Ok(());
    }

    let control = Arc::new(ControlState::new());
    let rx = load_chunk_queue(clip);
    let feed = OutputFeed::new(rx, control.clone());
    let stream = start_output_stream(feed, control.clone(), clip.sample_rate_hz())?;

    // Poll until the sentinel is consumed, with a margin for device latency.
    let deadline = Instant::now() + clip.duration() + Duration::from_millis(500);
    while !control.finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    if !control.playback_done() {
        warn!("Playback did not report completion before its deadline");
    }
    drop(stream);
    debug!("Blocking playback finished ({} samples)", clip.len());
    Ok(())
}
