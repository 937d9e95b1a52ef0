// Integration tests for the PCM wire encoding
//
// Quantization and base64 properties the backend relies on.

use anyhow::Result;
use turn_interpreter::audio::pcm::{
    decode_base64, decode_pcm16, encode_base64, encode_frame, encode_pcm16, float_to_i16,
};

const QUANTUM: f32 = 1.0 / 32767.0;

#[test]
fn test_pcm_round_trip_within_quantization() {
    let samples: Vec<f32> = (0..=200).map(|i| -1.0 + i as f32 * 0.01).collect();

    let decoded = decode_pcm16(&encode_pcm16(&samples));

    assert_eq!(decoded.len(), samples.len());
    for (original, restored) in samples.iter().zip(&decoded) {
        assert!(
            (original - restored).abs() <= QUANTUM,
            "{} decoded as {}",
            original,
            restored
        );
    }
}

#[test]
fn test_pcm_extremes_are_exact() {
    let decoded = decode_pcm16(&encode_pcm16(&[1.0, -1.0, 0.0]));
    assert_eq!(decoded, vec![1.0, -1.0, 0.0]);
}

#[test]
fn test_pcm_table() {
    let cases: &[(f32, i16)] = &[
        (1.0, 32767),
        (-1.0, -32768),
        (0.0, 0),
        (-0.0, 0),
        (0.5, 16383),
        (-0.5, -16384),
        (2.0, 32767),
        (-2.0, -32768),
        (1.5 / 32767.0, 1),
        (-1.0 / 32768.0, -1),
    ];

    for (input, expected) in cases {
        assert_eq!(float_to_i16(*input), *expected, "input {}", input);
    }
}

#[test]
fn test_pcm_byte_length() {
    assert_eq!(encode_pcm16(&[0.0; 1600]).len(), 3200);
    assert!(encode_pcm16(&[]).is_empty());
}

#[test]
fn test_base64_round_trip_edge_buffers() -> Result<()> {
    let buffers: Vec<Vec<u8>> = vec![
        vec![],
        vec![0x00; 1],
        vec![0x00; 64],
        vec![0xFF; 1],
        vec![0xFF; 2],
        vec![0xFF; 63],
        (0..=255).collect(),
    ];

    for buffer in buffers {
        let decoded = decode_base64(&encode_base64(&buffer))?;
        assert_eq!(decoded, buffer);
    }

    Ok(())
}

#[test]
fn test_base64_known_vector() {
    // 1.0 and -1.0 -> FF 7F 00 80
    assert_eq!(encode_frame(&[1.0, -1.0]), "/38AgA==");
}

#[test]
fn test_base64_rejects_garbage() {
    assert!(decode_base64("not base64!").is_err());
}
