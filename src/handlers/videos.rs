use super::{
    AppState, CurrentUser,
    upload::{UploadForm, UploadedFile, read_upload_form},
};
use crate::{
    error::{AppError, AppResult},
    media::{MediaService, ResolveMedia},
    models::{NewVideo, VideoDetails, VideoFilter, VideoListItem},
    repositories::{ChannelRepository, CommentRepository, VideoRepository},
    response::ApiResponse,
    storage::StorageFolder,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// 视频列表查询参数
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct VideoQueryParams {
    /// true 只返回短视频，false 只返回普通视频
    pub is_short: Option<bool>,
    /// 频道ID
    pub channel_id: Option<Uuid>,
    /// 标题或频道名关键字
    pub search: Option<String>,
}

impl From<VideoQueryParams> for VideoFilter {
    fn from(params: VideoQueryParams) -> Self {
        Self {
            is_short: params.is_short,
            channel_id: params.channel_id,
            search: params.search,
        }
    }
}

/// 视频列表
///
/// 返回前解析每条记录的视频地址、封面和频道头像。
#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "视频",
    params(VideoQueryParams),
    responses(
        (status = 200, description = "视频列表", body = Vec<VideoListItem>)
    )
)]
pub async fn list_videos(
    State(app_state): State<AppState>,
    Query(params): Query<VideoQueryParams>,
) -> Result<Json<ApiResponse<Vec<VideoListItem>>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;

    let filter = VideoFilter::from(params);
    let mut videos = VideoRepository::new(database.clone()).list(&filter).await?;
    videos.resolve_media(media.resolver()).await;

    tracing::debug!("查询到 {} 个视频", videos.len());

    Ok(Json(ApiResponse::success(videos)))
}

/// 已上传的视频与封面对象
#[derive(Debug)]
struct StoredVideoFiles {
    video_key: String,
    thumbnail_key: Option<String>,
}

impl StoredVideoFiles {
    /// 依次上传视频和封面，封面失败时删除已上传的视频
    async fn store(
        media: &MediaService,
        video: &UploadedFile,
        thumbnail: Option<&UploadedFile>,
    ) -> AppResult<Self> {
        let video_key = media
            .store(video.folder, &video.filename, &video.data)
            .await?;

        let thumbnail_key = match thumbnail {
            Some(file) => match media.store(file.folder, &file.filename, &file.data).await {
                Ok(key) => Some(key),
                Err(e) => {
                    media.discard(Some(&video_key)).await;
                    return Err(e);
                }
            },
            None => None,
        };

        Ok(Self {
            video_key,
            thumbnail_key,
        })
    }

    /// 记录未写入，新上传的对象不再被引用
    async fn discard(self, media: &MediaService) {
        media.discard(Some(&self.video_key)).await;
        media.discard(self.thumbnail_key.as_deref()).await;
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(value, Some("true" | "on" | "1"))
}

fn new_video_from_form(form: &UploadForm) -> AppResult<NewVideo> {
    let channel_id = form
        .text("channelId")
        .ok_or_else(|| AppError::bad_request("缺少字段: channelId"))?
        .parse::<Uuid>()
        .map_err(|_| AppError::bad_request("无效的频道ID"))?;
    let title = form
        .text("title")
        .ok_or_else(|| AppError::bad_request("缺少字段: title"))?
        .to_string();

    Ok(NewVideo {
        channel_id,
        title,
        description: form.text("description").map(str::to_string),
        is_short: parse_flag(form.text("isShort")),
    })
}

/// 上传视频
///
/// 表单字段 `video` 必填，`thumbnail` 可选。写入记录失败时删除本次上传的对象。
#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "视频",
    responses(
        (status = 200, description = "上传成功，返回解析后的视频", body = VideoListItem),
        (status = 400, description = "缺少视频文件或字段"),
        (status = 403, description = "不是频道所有者"),
        (status = 404, description = "频道不存在"),
        (status = 413, description = "文件过大")
    )
)]
pub async fn upload_video(
    State(app_state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<VideoListItem>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;

    let mut form = read_upload_form(&mut multipart, app_state.config.upload.max_size).await?;
    let video_file = form
        .take_file(StorageFolder::Videos)
        .ok_or_else(|| AppError::bad_request("缺少文件字段: video"))?;
    let thumbnail_file = form.take_file(StorageFolder::Thumbnails);
    let new_video = new_video_from_form(&form)?;

    let channel = ChannelRepository::new(database.clone())
        .find_by_id(new_video.channel_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("频道 {}", new_video.channel_id)))?;
    if channel.owner_user_id != user_id {
        return Err(AppError::forbidden("不是你的频道"));
    }

    let stored = StoredVideoFiles::store(media, &video_file, thumbnail_file.as_ref()).await?;
    let created = VideoRepository::new(database.clone())
        .create(&new_video, &stored.video_key, stored.thumbnail_key.as_deref())
        .await;
    let mut video = match created {
        Ok(video) => video,
        Err(e) => {
            stored.discard(media).await;
            return Err(e);
        }
    };

    tracing::info!(video_id = %video.id, channel_id = %channel.id, "视频已上传");

    video.resolve_media(media.resolver()).await;
    Ok(Json(ApiResponse::success(video)))
}

/// 视频详情：点赞、评论与订阅状态
#[utoipa::path(
    get,
    path = "/api/videos/{id}/details",
    tag = "视频",
    params(("id" = Uuid, Path, description = "视频ID")),
    responses(
        (status = 200, description = "视频详情", body = VideoDetails),
        (status = 401, description = "令牌无效")
    )
)]
pub async fn get_video_details(
    State(app_state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(video_id): Path<Uuid>,
) -> Result<Json<ApiResponse<VideoDetails>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;
    let videos = VideoRepository::new(database.clone());
    let channels = ChannelRepository::new(database.clone());

    let mut details = VideoDetails {
        likes: videos.count_likes(video_id).await?,
        user_reaction: videos.find_reaction(video_id, user_id).await?,
        comments: CommentRepository::new(database.clone())
            .list_by_video(video_id)
            .await?,
        ..VideoDetails::default()
    };

    if let Some(channel_id) = videos.find_owner_channel_id(video_id).await? {
        details.subscribers_count = channels.subscribers_count(channel_id).await?;
        details.is_subscribed = channels.is_subscribed(user_id, channel_id).await?;
    }

    details.resolve_media(media.resolver()).await;

    Ok(Json(ApiResponse::success(details)))
}

/// 删除视频
///
/// 存储对象删除失败时只记录警告，数据库记录照常删除。
#[utoipa::path(
    delete,
    path = "/api/videos/{id}",
    tag = "视频",
    params(("id" = Uuid, Path, description = "视频ID")),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "不是视频所有者"),
        (status = 404, description = "视频不存在")
    )
)]
pub async fn delete_video(
    State(app_state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(video_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let database = app_state.database()?;
    let media = app_state.media()?;
    let repo = VideoRepository::new(database.clone());

    let video = repo
        .find_ownership(video_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("视频 {}", video_id)))?;
    if video.owner_user_id != user_id {
        return Err(AppError::forbidden("不是你的视频"));
    }

    media.discard(video.video_key().as_deref()).await;
    media.discard(video.thumbnail_key().as_deref()).await;

    repo.delete(video.id).await?;

    tracing::info!(video_id = %video_id, "视频已删除");

    Ok(Json(ApiResponse::success(())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MediaConfig,
        handlers::upload::tests::{file_part, multipart, text_part},
        storage::mock::MockStorage,
    };
    use std::sync::Arc;

    const BUCKET: &str = "aitube";

    fn media() -> (MediaService, Arc<MockStorage>) {
        let storage = Arc::new(MockStorage::new());
        let media = MediaService::new(storage.clone(), BUCKET, &MediaConfig::default()).unwrap();
        (media, storage)
    }

    fn file(folder: StorageFolder, filename: &str) -> UploadedFile {
        UploadedFile {
            folder,
            filename: filename.to_string(),
            data: b"bytes".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_store_video_and_thumbnail() {
        let (media, storage) = media();
        let video = file(StorageFolder::Videos, "clip.mp4");
        let thumbnail = file(StorageFolder::Thumbnails, "t.jpg");

        let stored = StoredVideoFiles::store(&media, &video, Some(&thumbnail))
            .await
            .unwrap();
        assert!(stored.video_key.starts_with("videos/"));
        assert!(stored.video_key.ends_with(".mp4"));
        let thumbnail_key = stored.thumbnail_key.clone().unwrap();
        assert!(thumbnail_key.starts_with("thumbnails/"));
        assert!(storage.contains(BUCKET, &stored.video_key));
        assert!(storage.contains(BUCKET, &thumbnail_key));
    }

    #[tokio::test]
    async fn test_failed_insert_discards_new_objects() {
        let (media, storage) = media();
        let video = file(StorageFolder::Videos, "clip.mp4");
        let thumbnail = file(StorageFolder::Thumbnails, "t.jpg");

        let stored = StoredVideoFiles::store(&media, &video, Some(&thumbnail))
            .await
            .unwrap();
        media.resolve(Some(&stored.video_key)).await;
        assert_eq!(storage.object_count(), 2);

        stored.discard(&media).await;
        assert_eq!(storage.object_count(), 0);
        assert_eq!(media.resolver().cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_thumbnail_failure_discards_video() {
        let (media, storage) = media();
        storage.set_fail_upload(Some("thumbnails/"));
        let video = file(StorageFolder::Videos, "clip.mp4");
        let thumbnail = file(StorageFolder::Thumbnails, "t.jpg");

        let result = StoredVideoFiles::store(&media, &video, Some(&thumbnail)).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(storage.object_count(), 0);
    }

    #[tokio::test]
    async fn test_new_video_from_form() {
        let channel_id = Uuid::new_v4();
        let mut body = multipart(vec![
            text_part("title", "My clip"),
            text_part("channelId", &channel_id.to_string()),
            text_part("isShort", "on"),
            file_part("video", "clip.mp4", b"video-bytes"),
        ])
        .await;
        let form = read_upload_form(&mut body, 1024).await.unwrap();

        let new_video = new_video_from_form(&form).unwrap();
        assert_eq!(
            new_video,
            NewVideo {
                channel_id,
                title: "My clip".to_string(),
                description: None,
                is_short: true,
            }
        );
    }

    #[tokio::test]
    async fn test_new_video_requires_channel() {
        let mut body = multipart(vec![
            text_part("title", "My clip"),
            text_part("channelId", "not-a-uuid"),
        ])
        .await;
        let form = read_upload_form(&mut body, 1024).await.unwrap();
        assert!(matches!(
            new_video_from_form(&form),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("on")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(None));
    }
}
