// Integration tests for WAV file input
//
// Fixtures are generated into a temporary directory with hound.

use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use turn_interpreter::audio::{AudioFile, AudioSource, AudioSourceConfig, FileSource};

fn write_i16_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for s in samples {
        writer.write_sample(*s)?;
    }
    writer.finalize()?;
    Ok(())
}

fn write_f32_wav(path: &Path, sample_rate: u32, samples: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for s in samples {
        writer.write_sample(*s)?;
    }
    writer.finalize()?;
    Ok(())
}

fn fixture(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

#[test]
fn test_audio_file_open_mono() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture(&dir, "mono.wav");
    // 1 second at 16kHz
    write_i16_wav(&path, 16000, 1, &vec![16384i16; 16000])?;

    let audio = AudioFile::open(&path)?;

    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 16000);
    assert!((audio.duration_seconds - 1.0).abs() < 1e-9);
    assert!((audio.samples[0] - 0.5).abs() < 1e-6);
    assert!(audio.path.contains("mono.wav"));

    Ok(())
}

#[test]
fn test_audio_file_downmixes_stereo() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture(&dir, "stereo.wav");
    // L = 0.5, R = 0.0 for 100 frames
    let interleaved: Vec<i16> = (0..200).map(|i| if i % 2 == 0 { 16384 } else { 0 }).collect();
    write_i16_wav(&path, 16000, 2, &interleaved)?;

    let audio = AudioFile::open(&path)?;

    assert_eq!(audio.channels, 2);
    assert_eq!(audio.samples.len(), 100);
    assert!((audio.samples[0] - 0.25).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_audio_file_reads_float_wav() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture(&dir, "float.wav");
    write_f32_wav(&path, 16000, &[0.25, -0.75, 1.0])?;

    let audio = AudioFile::open(&path)?;
    assert_eq!(audio.samples, vec![0.25, -0.75, 1.0]);

    Ok(())
}

#[test]
fn test_audio_file_decimates_to_target_rate() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture(&dir, "48k.wav");
    write_i16_wav(&path, 48000, 1, &vec![0i16; 48000])?;

    let audio = AudioFile::open(&path)?;
    let samples = audio.resample_to(16000)?;
    assert_eq!(samples.len(), 16000);

    let frames = audio.frames(16000, 100)?;
    assert_eq!(frames.len(), 10);
    assert!(frames.iter().all(|f| f.len() == 1600));

    Ok(())
}

#[test]
fn test_audio_file_rejects_fractional_rate() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture(&dir, "44k.wav");
    write_i16_wav(&path, 44100, 1, &vec![0i16; 441])?;

    let audio = AudioFile::open(&path)?;
    assert!(audio.resample_to(16000).is_err());

    Ok(())
}

#[test]
fn test_audio_file_last_frame_may_be_short() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture(&dir, "short.wav");
    write_i16_wav(&path, 16000, 1, &vec![0i16; 4000])?;

    let frames = AudioFile::open(&path)?.frames(16000, 100)?;
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2].len(), 800);

    Ok(())
}

#[test]
fn test_audio_file_nonexistent() {
    let path = PathBuf::from("/nonexistent/path/to/audio.wav");
    let result = AudioFile::open(&path);

    assert!(result.is_err(), "Opening nonexistent file should fail");
}

#[tokio::test]
async fn test_file_source_delivers_all_frames() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture(&dir, "source.wav");
    write_i16_wav(&path, 16000, 1, &vec![1000i16; 8000])?;

    let config = AudioSourceConfig {
        sample_rate: 16000,
        frame_ms: 100,
        realtime: false,
    };
    let mut source = FileSource::new(&path, config);
    let mut rx = source.start().await?;

    let mut frames = Vec::new();
    while let Some(frame) = rx.recv().await {
        frames.push(frame);
    }

    assert_eq!(frames.len(), 5);
    assert!(frames.iter().all(|f| f.samples.len() == 1600 && f.sample_rate == 16000));
    let timestamps: Vec<u64> = frames.iter().map(|f| f.timestamp_ms).collect();
    assert_eq!(timestamps, vec![0, 100, 200, 300, 400]);
    assert_eq!(source.name(), "file");

    source.stop().await?;
    assert!(!source.is_capturing());

    Ok(())
}

#[tokio::test]
async fn test_file_source_missing_file_fails_to_start() {
    let mut source = FileSource::new("/nonexistent/input.wav", AudioSourceConfig::default());
    assert!(source.start().await.is_err());
    assert!(!source.is_capturing());
}
