/// A frame-level speech/non-speech classifier.
///
/// Implementations are constructed on, and owned by, the monitor thread, so
/// they are not required to be thread-safe. A frame is mono PCM at
/// `required_sample_rate` with exactly `required_frame_size_samples` samples.
pub trait SpeechClassifier {
    fn is_speech(&mut self, frame: &[i16]) -> Result<bool, String>;

    fn reset(&mut self);

    fn required_sample_rate(&self) -> u32;

    fn required_frame_size_samples(&self) -> usize;
}
