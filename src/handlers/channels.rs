use super::{AppState, CurrentUser, upload::read_file_field};
use crate::{
    error::AppError,
    media::ResolveMedia,
    models::Channel,
    repositories::ChannelRepository,
    response::ApiResponse,
};
use axum::{
    extract::{Multipart, Path, State},
    response::Json,
};
use uuid::Uuid;

/// 获取自己的频道，没有频道时返回空
#[utoipa::path(
    get,
    path = "/api/channels/my",
    tag = "频道",
    responses(
        (status = 200, description = "频道信息或null", body = Channel),
        (status = 401, description = "令牌无效")
    )
)]
pub async fn get_my_channel(
    State(app_state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<Option<Channel>>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;

    let mut channel = ChannelRepository::new(database.clone())
        .find_by_owner(user_id)
        .await?;
    channel.resolve_media(media.resolver()).await;

    Ok(Json(ApiResponse::success(channel)))
}

/// 获取频道详情
#[utoipa::path(
    get,
    path = "/api/channels/{id}",
    tag = "频道",
    params(("id" = Uuid, Path, description = "频道ID")),
    responses(
        (status = 200, description = "频道信息，含订阅人数与当前用户订阅状态", body = Channel),
        (status = 404, description = "频道不存在")
    )
)]
pub async fn get_channel(
    State(app_state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(channel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Channel>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;
    let repo = ChannelRepository::new(database.clone());

    let mut channel = repo
        .find_by_id(channel_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("频道 {}", channel_id)))?;
    channel.is_subscribed = Some(repo.is_subscribed(user_id, channel_id).await?);
    channel.resolve_media(media.resolver()).await;

    Ok(Json(ApiResponse::success(channel)))
}

/// 更新频道头像
#[utoipa::path(
    post,
    path = "/api/channels/{id}/avatar",
    tag = "频道",
    params(("id" = Uuid, Path, description = "频道ID")),
    responses(
        (status = 200, description = "更新成功", body = Channel),
        (status = 403, description = "不是频道所有者"),
        (status = 404, description = "频道不存在")
    )
)]
pub async fn update_channel_avatar(
    State(app_state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(channel_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Channel>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;
    let repo = ChannelRepository::new(database.clone());

    let channel = repo
        .find_by_id(channel_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("频道 {}", channel_id)))?;
    if channel.owner_user_id != user_id {
        return Err(AppError::forbidden("不是你的频道"));
    }

    let file = read_file_field(&mut multipart, "avatar", app_state.config.upload.max_size).await?;
    let key = media.store(file.folder, &file.filename, &file.data).await?;

    let previous = match repo.replace_avatar(channel_id, &key).await {
        Ok(previous) => previous,
        Err(e) => {
            media.discard(Some(&key)).await;
            return Err(e);
        }
    };
    // 旧头像提前失效，必须主动移除缓存
    media.discard(previous.as_deref()).await;

    tracing::info!(channel_id = %channel_id, key = %key, "频道头像已更新");

    let mut channel = repo
        .find_by_id(channel_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("频道 {}", channel_id)))?;
    channel.resolve_media(media.resolver()).await;

    Ok(Json(ApiResponse::success(channel)))
}

/// 当前用户订阅的频道
#[utoipa::path(
    get,
    path = "/api/subscriptions",
    tag = "频道",
    responses(
        (status = 200, description = "订阅的频道列表", body = Vec<Channel>),
        (status = 401, description = "令牌无效")
    )
)]
pub async fn list_subscriptions(
    State(app_state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<Vec<Channel>>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;

    let mut channels = ChannelRepository::new(database.clone())
        .list_subscriptions(user_id)
        .await?;
    channels.resolve_media(media.resolver()).await;

    Ok(Json(ApiResponse::success(channels)))
}
