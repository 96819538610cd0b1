use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, SampleFormat, SampleRate, StreamConfig, SupportedStreamConfigRange};
use tracing::debug;

use duplex_foundation::AudioError;

/// Pick an f32 config at `rate`, preferring mono and falling back to
/// whatever channel count the device insists on.
fn config_at_rate(candidates: &[SupportedStreamConfigRange], rate: u32) -> Option<StreamConfig> {
    let supports = |c: &&SupportedStreamConfigRange| {
        c.sample_format() == SampleFormat::F32
            && c.min_sample_rate() <= SampleRate(rate)
            && c.max_sample_rate() >= SampleRate(rate)
    };
    candidates
        .iter()
        .find(|c| c.channels() == 1 && supports(c))
        .or_else(|| candidates.iter().find(supports))
        .map(|c| StreamConfig {
            channels: c.channels(),
            sample_rate: SampleRate(rate),
            buffer_size: cpal::BufferSize::Default,
        })
}

pub fn default_output(rate: u32) -> Result<(Device, StreamConfig), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::NoDevice {
            direction: "output",
        })?;
    let candidates: Vec<_> = device.supported_output_configs()?.collect();
    let config = config_at_rate(&candidates, rate).ok_or(AudioError::FormatNotSupported {
        direction: "output",
        rate,
    })?;
    debug!(
        "Output device: {:?}, {} ch @ {} Hz",
        device.name().ok(),
        config.channels,
        rate
    );
    Ok((device, config))
}

pub fn default_input(rate: u32) -> Result<(Device, StreamConfig), AudioError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(AudioError::NoDevice {
        direction: "input",
    })?;
    let candidates: Vec<_> = device.supported_input_configs()?.collect();
    let config = config_at_rate(&candidates, rate).ok_or(AudioError::FormatNotSupported {
        direction: "input",
        rate,
    })?;
    debug!(
        "Input device: {:?}, {} ch @ {} Hz",
        device.name().ok(),
        config.channels,
        rate
    );
    Ok((device, config))
}
