//! File Persistence - 基于目录的音色参考存储

mod voice_store;

pub use voice_store::FileVoiceStore;
