use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::file::{samples_per_frame, AudioFile};

/// One slice of mono capture input
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Normalized samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for an audio source
#[derive(Debug, Clone)]
pub struct AudioSourceConfig {
    /// Sample rate delivered to the session
    pub sample_rate: u32,
    /// Frame length in milliseconds
    pub frame_ms: u32,
    /// Pace frames at wall-clock speed (false = as fast as the consumer reads)
    pub realtime: bool,
}

impl Default for AudioSourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            frame_ms: 100,
            realtime: true,
        }
    }
}

/// Audio capture collaborator feeding a session
///
/// Implementations deliver frames on a channel at a cadence matching the
/// configured sample rate.
#[async_trait::async_trait]
pub trait AudioSource: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if source is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Replays a WAV file as a capture stream
pub struct FileSource {
    path: PathBuf,
    config: AudioSourceConfig,
    capturing: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, config: AudioSourceConfig) -> Self {
        Self {
            path: path.into(),
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioSource for FileSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let audio = AudioFile::open(&self.path)?;
        let frames = audio.frames(self.config.sample_rate, self.config.frame_ms)?;
        let frame_len = samples_per_frame(self.config.sample_rate, self.config.frame_ms);
        let sample_rate = self.config.sample_rate;
        let frame_ms = self.config.frame_ms as u64;
        let realtime = self.config.realtime;

        let (tx, rx) = mpsc::channel(32);
        let capturing = Arc::clone(&self.capturing);
        capturing.store(true, Ordering::SeqCst);

        info!(
            "File source started: {} ({} frames of {} samples)",
            self.path.display(),
            frames.len(),
            frame_len
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(frame_ms.max(1)));

            for (index, samples) in frames.into_iter().enumerate() {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }
                if realtime {
                    ticker.tick().await;
                }

                let frame = AudioFrame {
                    samples,
                    sample_rate,
                    timestamp_ms: index as u64 * frame_ms,
                };
                if tx.send(frame).await.is_err() {
                    debug!("Frame receiver dropped, ending file replay");
                    break;
                }
            }

            capturing.store(false, Ordering::SeqCst);
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file"
    }
}
