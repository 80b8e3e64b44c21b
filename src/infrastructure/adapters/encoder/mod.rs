//! Encoder Adapter - 音频容器编码

mod wav_encoder;

pub use wav_encoder::WavEncoder;
