use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::info;

/// A WAV file decoded to mono, normalized f32 samples
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    /// Channel count of the source file (samples are already downmixed)
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path).context("Failed to open WAV file")?;

        let spec = reader.spec();
        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read audio samples")?,
            SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<Result<Vec<_>, _>>()
                    .context("Failed to read audio samples")?
            }
        };

        let samples = downmix(&interleaved, spec.channels);
        let duration_seconds = samples.len() as f64 / spec.sample_rate as f64;

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Samples at `target_rate`, decimating when the file rate is an integer multiple
    pub fn resample_to(&self, target_rate: u32) -> Result<Vec<f32>> {
        if self.sample_rate == target_rate {
            return Ok(self.samples.clone());
        }

        if target_rate == 0 || self.sample_rate % target_rate != 0 {
            anyhow::bail!(
                "Cannot convert {}Hz to {}Hz: only integer decimation is supported",
                self.sample_rate,
                target_rate
            );
        }

        let ratio = (self.sample_rate / target_rate) as usize;
        Ok(self.samples.iter().step_by(ratio).copied().collect())
    }

    /// Split samples at `target_rate` into frames of `frame_ms` (last frame may be short)
    pub fn frames(&self, target_rate: u32, frame_ms: u32) -> Result<Vec<Vec<f32>>> {
        let samples = self.resample_to(target_rate)?;
        let frame_len = samples_per_frame(target_rate, frame_ms);
        Ok(samples.chunks(frame_len).map(|c| c.to_vec()).collect())
    }
}

/// Number of samples in one frame, never less than one
pub fn samples_per_frame(sample_rate: u32, frame_ms: u32) -> usize {
    ((sample_rate as u64 * frame_ms as u64) / 1000).max(1) as usize
}

/// Average interleaved channels into mono
fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
