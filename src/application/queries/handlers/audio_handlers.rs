//! Audio Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{ArtifactStoragePort, OpenedArtifact};
use crate::application::queries::GetAudioQuery;

/// GetAudio Handler - 打开生成产物
///
/// 返回的产物持有租约，响应体发送完毕前不会被保留策略删除
pub struct GetAudioHandler {
    artifacts: Arc<dyn ArtifactStoragePort>,
}

impl GetAudioHandler {
    pub fn new(artifacts: Arc<dyn ArtifactStoragePort>) -> Self {
        Self { artifacts }
    }

    pub async fn handle(&self, query: GetAudioQuery) -> Result<OpenedArtifact, ApplicationError> {
        Ok(self.artifacts.open(&query.file_name).await?)
    }
}
