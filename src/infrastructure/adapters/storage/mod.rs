//! Storage Adapter - 生成产物的文件系统存储

mod file_artifact_storage;

pub use file_artifact_storage::FileArtifactStorage;
