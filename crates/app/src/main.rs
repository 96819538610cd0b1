use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use duplex_audio::PlaybackSession;
use duplex_foundation::EngineConfig;

/// Play a synthesized waveform, stopping early if the user starts talking.
#[derive(Parser, Debug)]
#[command(name = "duplex", version, about)]
struct Cli {
    /// WAV file to play.
    wav: PathBuf,

    /// Play straight through without monitoring the microphone.
    #[arg(long)]
    no_barge_in: bool,

    /// TOML configuration file.
    #[arg(long, env = "DUPLEX_CONFIG")]
    config: Option<PathBuf>,

    /// Classifier aggressiveness, 0..=3.
    #[arg(long)]
    aggressiveness: Option<u8>,

    /// Minimum sustained speech before interrupting, in milliseconds.
    #[arg(long)]
    min_speech_ms: Option<u32>,

    /// Startup interval during which the microphone is ignored, in milliseconds.
    #[arg(long)]
    grace_ms: Option<u32>,
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(aggressiveness) = cli.aggressiveness {
        config.barge_in.aggressiveness = aggressiveness;
    }
    if let Some(ms) = cli.min_speech_ms {
        config.barge_in.min_speech_ms = ms;
    }
    if let Some(ms) = cli.grace_ms {
        config.barge_in.grace_ms = ms;
    }
    Ok(config)
}

fn build_session(config: EngineConfig) -> PlaybackSession {
    let session = PlaybackSession::new(config);
    #[cfg(feature = "webrtc")]
    let session = {
        use duplex_vad::SpeechClassifier;
        use duplex_vad_webrtc::WebRtcClassifier;

        session.with_classifier(std::sync::Arc::new(|vad_config| {
            WebRtcClassifier::new(vad_config).map(|c| Box::new(c) as Box<dyn SpeechClassifier>)
        }))
    };
    session
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let session = build_session(config);
    let outcome = session.play_file(&cli.wav, !cli.no_barge_in)?;

    if outcome.was_interrupted() {
        info!("Playback interrupted by speech; the user is already talking");
    } else {
        info!("Playback completed");
    }
    println!("interrupted: {}", outcome.was_interrupted());
    Ok(())
}
