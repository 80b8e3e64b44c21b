//! WAV Encoder - 基于 hound 的 PCM16 单声道 WAV 编码器
//!
//! 实现 AudioEncoderPort trait

use std::io::Cursor;

use crate::application::ports::{AudioEncoderPort, EncodeError};

const I16_MAX_F32: f32 = i16::MAX as f32;

/// WAV 编码器
///
/// 输出 16-bit 有符号整数、单声道、固定采样率
#[derive(Debug, Clone)]
pub struct WavEncoder {
    sample_rate: u32,
    header_len: usize,
}

impl WavEncoder {
    /// 创建编码器，构造时编码一次空采样得到文件头长度
    pub fn new(sample_rate: u32) -> Result<Self, EncodeError> {
        if sample_rate == 0 {
            return Err(EncodeError::EncodingError(
                "sample rate must be positive".to_string(),
            ));
        }

        let mut encoder = Self {
            sample_rate,
            header_len: 0,
        };
        encoder.header_len = encoder.encode(&[])?.len();

        tracing::debug!(sample_rate, header_len = encoder.header_len, "WavEncoder initialized");
        Ok(encoder)
    }

    fn spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

impl AudioEncoderPort for WavEncoder {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn content_type(&self) -> &'static str {
        "audio/wav"
    }

    fn extension(&self) -> &'static str {
        "wav"
    }

    fn encode(&self, samples: &[f32]) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(self.header_len + samples.len() * 2);

        let mut writer = hound::WavWriter::new(Cursor::new(&mut buf), self.spec())
            .map_err(|e| EncodeError::EncodingError(format!("wav write err: {e}")))?;
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * I16_MAX_F32) as i16;
            writer
                .write_sample(v)
                .map_err(|e| EncodeError::EncodingError(format!("wav sample err: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| EncodeError::EncodingError(format!("wav finalize err: {e}")))?;

        Ok(buf)
    }

    fn header_len(&self) -> usize {
        self.header_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_len_is_canonical_pcm_header() {
        let encoder = WavEncoder::new(24000).unwrap();
        assert_eq!(encoder.header_len(), 44);
        assert_eq!(encoder.content_type(), "audio/wav");
    }

    #[test]
    fn test_encode_clamps_and_scales() {
        let encoder = WavEncoder::new(24000).unwrap();
        let bytes = encoder.encode(&[0.0, 2.0, -2.0]).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 6);

        let samples: Vec<i16> = bytes[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(samples, vec![0, i16::MAX, -i16::MAX]);
    }

    #[test]
    fn test_output_is_readable_wav() {
        let encoder = WavEncoder::new(16000).unwrap();
        let bytes = encoder.encode(&[0.25; 160]).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.duration(), 160);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(WavEncoder::new(0).is_err());
    }
}
