//! Raw 16-bit little-endian PCM codec for narration payloads.
//!
//! Narration audio arrives as base64 with no container or header: just
//! signed 16-bit samples, mono, at a fixed rate.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::SpeechError;

/// Sample rate of generated narration
pub const NARRATION_SAMPLE_RATE: u32 = 24_000;

/// Normalized samples ready for an audio output
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    /// Interleaved samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmBuffer {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        let frames_per_second = self.sample_rate as u64 * self.channels as u64;
        if frames_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / frames_per_second as f64)
    }
}

/// Decode little-endian i16 bytes into normalized samples (`x / 32768`)
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<PcmBuffer, SpeechError> {
    if sample_rate == 0 || channels == 0 {
        return Err(SpeechError::Decode(format!(
            "invalid format: {sample_rate} Hz, {channels} channels"
        )));
    }

    if bytes.len() % 2 != 0 {
        return Err(SpeechError::Decode(format!(
            "truncated payload: {} bytes is not a whole number of 16-bit samples",
            bytes.len()
        )));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    Ok(PcmBuffer {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode a base64 narration payload
pub fn decode_base64_pcm(
    payload: &str,
    sample_rate: u32,
    channels: u16,
) -> Result<PcmBuffer, SpeechError> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| SpeechError::Decode(format!("invalid base64: {e}")))?;

    decode_pcm16(&bytes, sample_rate, channels)
}

/// Quantize normalized samples to little-endian i16 bytes
pub fn encode_pcm16(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| {
            let quantized = (s * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            quantized.to_le_bytes()
        })
        .collect()
}

pub fn encode_base64_pcm(samples: &[f32]) -> String {
    STANDARD.encode(encode_pcm16(samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_samples() {
        // 0, i16::MAX, i16::MIN, -16384
        let bytes = [0x00, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x00, 0xc0];
        let buffer = decode_pcm16(&bytes, NARRATION_SAMPLE_RATE, 1).unwrap();

        assert_eq!(buffer.samples, vec![0.0, 32767.0 / 32768.0, -1.0, -0.5]);
        assert_eq!(buffer.sample_rate, 24_000);
        assert_eq!(buffer.channels, 1);
    }

    #[test]
    fn round_trip_within_quantization_error() {
        let original = [0.0, 0.5, -0.5, 0.25, -0.999, 0.123_456, -0.654_321, 1.0, -1.0];
        let payload = encode_base64_pcm(&original);

        let decoded = decode_base64_pcm(&payload, NARRATION_SAMPLE_RATE, 1).unwrap();

        assert_eq!(decoded.samples.len(), original.len());
        for (a, b) in original.iter().zip(&decoded.samples) {
            assert!(
                (a - b).abs() <= 1.0 / 32768.0 + f32::EPSILON,
                "{a} decoded as {b}"
            );
        }
    }

    #[test]
    fn odd_byte_count_is_truncated_payload() {
        let err = decode_pcm16(&[0x00, 0x01, 0x02], NARRATION_SAMPLE_RATE, 1).unwrap_err();
        assert!(matches!(err, SpeechError::Decode(_)));
    }

    #[test]
    fn invalid_base64_is_decode_error() {
        let err = decode_base64_pcm("not base64!!", NARRATION_SAMPLE_RATE, 1).unwrap_err();
        assert!(matches!(err, SpeechError::Decode(_)));
    }

    #[test]
    fn duration_follows_sample_rate() {
        let buffer = decode_pcm16(&vec![0u8; 48_000], NARRATION_SAMPLE_RATE, 1).unwrap();
        assert_eq!(buffer.duration(), Duration::from_secs(1));
    }
}
