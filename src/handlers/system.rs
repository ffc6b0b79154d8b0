use super::AppState;
use crate::response::ApiResponse;
use axum::{extract::State, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

/// 签名URL缓存统计
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
}

/// 系统状态
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub database: String,
    pub storage: String,
    pub url_cache: Option<CacheStats>,
}

fn availability(present: bool) -> String {
    if present { "available" } else { "unavailable" }.to_string()
}

/// 系统状态
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "系统监控",
    responses(
        (status = 200, description = "各组件可用性与缓存统计", body = SystemStatus)
    )
)]
pub async fn system_status(State(app_state): State<AppState>) -> Json<ApiResponse<SystemStatus>> {
    let url_cache = app_state.media.as_ref().map(|media| CacheStats {
        entries: media.resolver().cached_entries(),
        capacity: media.resolver().cache_capacity(),
    });

    Json(ApiResponse::success(SystemStatus {
        database: availability(app_state.database.is_some()),
        storage: availability(app_state.media.is_some()),
        url_cache,
    }))
}
