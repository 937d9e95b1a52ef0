use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use turn_interpreter::audio::file::samples_per_frame;
use turn_interpreter::{
    AudioFile, AudioSource, Callbacks, Config, FileSource, TurnMode, TurnSession, VadEvent,
    VoiceActivityDetector, WebSocketTransport,
};

#[derive(Parser)]
#[command(name = "turn-interpreter", about = "Real-time turn interpreter client")]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/turn-interpreter")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream a WAV file through a live interpreter session
    Stream {
        /// 16-bit or float WAV input
        file: PathBuf,
        /// Override the interpreter endpoint
        #[arg(long)]
        endpoint: Option<String>,
        /// Override the source language
        #[arg(long)]
        from: Option<String>,
        /// Override the target language
        #[arg(long)]
        to: Option<String>,
        /// Use language identification instead of alternating turns
        #[arg(long)]
        auto: bool,
    },
    /// Run the local VAD over a WAV file and print utterance boundaries
    Detect {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut cfg = load_config(&cli.config)?;
    info!("Loaded config: {}", cfg.service.name);

    match cli.command {
        Command::Stream {
            file,
            endpoint,
            from,
            to,
            auto,
        } => {
            if let Some(url) = endpoint {
                cfg.endpoint.url = url;
            }
            if let Some(from) = from {
                cfg.session.from = from;
            }
            if let Some(to) = to {
                cfg.session.to = to;
            }
            if auto {
                cfg.session.mode = TurnMode::AutoByLanguageId;
            }
            stream(&cfg, file).await
        }
        Command::Detect { file } => detect(&cfg, &file),
    }
}

/// Use the config file when present, otherwise defaults plus environment
fn load_config(path: &str) -> Result<Config> {
    let candidates = [path.to_string(), format!("{}.toml", path)];
    if candidates.iter().any(|p| Path::new(p).exists()) {
        Config::load(path)
    } else {
        info!("No config file at {}, using defaults", path);
        Config::from_env()
    }
}

/// Sleep for `tail` unless `interrupt` completes first; true if interrupted
async fn wait_tail<F: Future>(tail: Duration, interrupt: F) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(tail) => false,
        _ = interrupt => true,
    }
}

async fn stream(cfg: &Config, file: PathBuf) -> Result<()> {
    let transport = Arc::new(WebSocketTransport::new()?);
    let session = TurnSession::new(cfg.session_config(), transport);

    session.set_callbacks(
        Callbacks::new()
            .on_partial(|text| {
                print!("\r{}", text);
                std::io::stdout().flush().ok();
            })
            .on_final(|result| {
                println!("\n{}", result.asr);
                println!("  -> {}", result.translated_text);
            })
            .on_status(|status| info!("Status: {} ({:?})", status.value, status.direction))
            .on_error(|message| warn!("Interpreter error: {}", message))
            .on_close(|| info!("Interpreter connection closed")),
    );

    let mut source = FileSource::new(file, cfg.source_config());
    let mut frames = source
        .start()
        .await
        .context("Failed to start file source")?;

    session.start();

    let mut interrupted = false;
    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Some(frame) => session.push_pcm(&frame.samples),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                interrupted = true;
                break;
            }
        }
    }

    source.stop().await?;

    // Give the backend time to finish the last utterance
    let tail = Duration::from_millis(cfg.capture.tail_ms);
    if !interrupted && wait_tail(tail, tokio::signal::ctrl_c()).await {
        info!("Interrupted");
    }
    session.stop();

    let stats = session.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn detect(cfg: &Config, file: &Path) -> Result<()> {
    let audio = AudioFile::open(file)?;
    let sample_rate = cfg.session.sample_rate;
    let frame_ms = cfg.capture.frame_ms;
    let frame_len = samples_per_frame(sample_rate, frame_ms);
    let frames = audio.frames(sample_rate, frame_ms)?;

    let mut vad = VoiceActivityDetector::new(cfg.vad.clone(), sample_rate);
    let mut utterances = 0;

    for (index, frame) in frames.iter().enumerate() {
        let offset_secs = (index * frame_len) as f64 / sample_rate as f64;
        match vad.process(frame) {
            Some(VadEvent::Begin) => println!("{:>8.2}s  begin", offset_secs),
            Some(VadEvent::End) => {
                utterances += 1;
                println!("{:>8.2}s  end", offset_secs);
            }
            None => {}
        }
    }

    info!("{} utterances in {:.1}s of audio", utterances, audio.duration_seconds);
    Ok(())
}
