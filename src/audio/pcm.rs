// PCM helpers for the interpreter wire format
//
// Samples arrive as normalized f32 in [-1.0, 1.0] and leave as signed 16-bit
// little-endian integers, base64-encoded. Positive samples scale by 32767 and
// negative samples by 32768 so both extremes map onto the full i16 range.

use anyhow::{Context, Result};
use base64::Engine;

/// Scale factor for positive samples
pub const POSITIVE_SCALE: f32 = 32767.0;

/// Scale factor for negative samples
pub const NEGATIVE_SCALE: f32 = 32768.0;

/// Convert one normalized sample to i16 (clamped, truncated toward zero)
pub fn float_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * NEGATIVE_SCALE) as i16
    } else {
        (s * POSITIVE_SCALE) as i16
    }
}

/// Convert one i16 sample back to a normalized float
pub fn i16_to_float(sample: i16) -> f32 {
    if sample < 0 {
        sample as f32 / NEGATIVE_SCALE
    } else {
        sample as f32 / POSITIVE_SCALE
    }
}

/// Encode normalized samples as 16-bit little-endian PCM bytes
pub fn encode_pcm16(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|s| float_to_i16(*s).to_le_bytes())
        .collect()
}

/// Decode 16-bit little-endian PCM bytes into normalized samples
///
/// A trailing odd byte is ignored.
pub fn decode_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16_to_float(i16::from_le_bytes([pair[0], pair[1]])))
        .collect()
}

/// Standard (padded) base64 encoding
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .context("Invalid base64 payload")
}

/// Encode a frame straight to the base64 `pcm16` wire field
pub fn encode_frame(samples: &[f32]) -> String {
    encode_base64(&encode_pcm16(samples))
}

/// Mean absolute sample magnitude (0.0 for an empty frame)
pub fn frame_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s.abs()).sum();
    sum / samples.len() as f32
}

/// Duration of a mono frame in milliseconds
pub fn frame_duration_ms(sample_count: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f64 / sample_rate as f64 * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes_do_not_overflow() {
        assert_eq!(float_to_i16(1.0), i16::MAX);
        assert_eq!(float_to_i16(-1.0), i16::MIN);
        assert_eq!(float_to_i16(0.0), 0);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(float_to_i16(1.5), i16::MAX);
        assert_eq!(float_to_i16(-7.0), i16::MIN);
    }

    #[test]
    fn test_asymmetric_scaling() {
        // 0.5 * 32767 = 16383.5 -> 16383, -0.5 * 32768 = -16384
        assert_eq!(float_to_i16(0.5), 16383);
        assert_eq!(float_to_i16(-0.5), -16384);
    }

    #[test]
    fn test_little_endian_layout() {
        let bytes = encode_pcm16(&[1.0, -1.0]);
        assert_eq!(bytes, vec![0xFF, 0x7F, 0x00, 0x80]);
    }

    #[test]
    fn test_energy_of_empty_frame() {
        assert_eq!(frame_energy(&[]), 0.0);
    }

    #[test]
    fn test_energy_is_mean_absolute() {
        let energy = frame_energy(&[0.1, -0.1, 0.3, -0.3]);
        assert!((energy - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_frame_duration() {
        assert!((frame_duration_ms(1600, 16000) - 100.0).abs() < 1e-9);
        assert_eq!(frame_duration_ms(1600, 0), 0.0);
    }
}
