use crate::handlers::{
    AppState, delete_video, get_channel, get_me, get_my_channel, get_video_details,
    list_subscriptions, list_videos, stream_video, system_status, update_channel_avatar,
    update_my_avatar, upload_video,
};
use axum::{
    Router,
    routing::{delete as axum_delete, get, post},
};

/// 创建API路由
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        // 系统状态
        .route("/api/status", get(system_status))
        // 用户
        .route("/api/auth/me", get(get_me))
        .route("/api/users/avatar", post(update_my_avatar))
        // 频道
        .route("/api/channels/my", get(get_my_channel))
        .route("/api/channels/{id}", get(get_channel))
        .route("/api/channels/{id}/avatar", post(update_channel_avatar))
        .route("/api/subscriptions", get(list_subscriptions))
        // 视频
        .route("/api/videos", get(list_videos).post(upload_video))
        .route("/api/videos/{id}", axum_delete(delete_video))
        .route("/api/videos/{id}/details", get(get_video_details))
        // 播放入口，重定向到签名URL
        .route("/api/stream/{filename}", get(stream_video))
}
