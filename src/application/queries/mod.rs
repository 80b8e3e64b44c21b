//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：音色查询、服务状态与产物下载

mod audio_queries;
mod voice_queries;

pub mod handlers;

pub use audio_queries::*;
pub use voice_queries::*;
