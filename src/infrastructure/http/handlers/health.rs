//! Health Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::GetServiceStatus;
use crate::infrastructure::http::dto::HealthResponse;
use crate::infrastructure::http::state::AppState;

/// 健康检查：引擎未就绪时返回 `initializing`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.status_handler.handle(GetServiceStatus);

    Json(HealthResponse {
        status: if status.ready { "ok" } else { "initializing" },
        model: status.model,
        available_voices: status.available_voices,
        default_voice: status.default_voice,
    })
}
