//! Persistence Layer - 数据持久化
//!
//! 音色参考以文件形式存放在 samples 目录

pub mod file;

pub use self::file::FileVoiceStore;
