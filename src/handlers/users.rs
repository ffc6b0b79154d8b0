use super::{AppState, CurrentUser, upload::read_file_field};
use crate::{
    error::AppError,
    media::ResolveMedia,
    models::User,
    repositories::UserRepository,
    response::ApiResponse,
};
use axum::{
    extract::{Multipart, State},
    response::Json,
};

/// 获取当前用户
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "用户",
    responses(
        (status = 200, description = "当前用户信息，头像已解析为可访问URL", body = User),
        (status = 401, description = "令牌无效")
    )
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;

    let mut user = UserRepository::new(database.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("用户不存在"))?;

    user.resolve_media(media.resolver()).await;

    Ok(Json(ApiResponse::success(user)))
}

/// 更新当前用户头像
///
/// 新头像上传成功后更新记录，旧头像对象被删除并移除缓存。
#[utoipa::path(
    post,
    path = "/api/users/avatar",
    tag = "用户",
    responses(
        (status = 200, description = "更新成功，返回用户信息", body = User),
        (status = 400, description = "缺少头像文件"),
        (status = 401, description = "令牌无效")
    )
)]
pub async fn update_my_avatar(
    State(app_state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;
    let repo = UserRepository::new(database.clone());

    let file = read_file_field(&mut multipart, "avatar", app_state.config.upload.max_size).await?;
    let key = media.store(file.folder, &file.filename, &file.data).await?;

    let previous = match repo.replace_avatar(user_id, &key).await {
        Ok(previous) => previous,
        Err(e) => {
            // 记录未更新，新上传的对象不再被引用
            media.discard(Some(&key)).await;
            return Err(e);
        }
    };
    media.discard(previous.as_deref()).await;

    tracing::info!(user_id = %user_id, key = %key, "用户头像已更新");

    let mut user = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("用户不存在"))?;
    user.resolve_media(media.resolver()).await;

    Ok(Json(ApiResponse::success(user)))
}
