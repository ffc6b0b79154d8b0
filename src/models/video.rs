use super::Comment;
use crate::{
    media::{ResolveMedia, UrlResolver, resolve_field},
    storage::{StorageFolder, qualify_key},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// 视频列表项（含频道信息）
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoListItem {
    pub id: Uuid,
    pub owner_channel_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// 视频文件的存储key（旧记录只有文件名）
    pub filename: String,
    /// 封面路径，没有封面时为空
    pub thumbnail_path: Option<String>,
    pub is_short: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub channel_name: String,
    pub channel_tag: String,
    pub channel_avatar: Option<String>,
    pub owner_user_id: Uuid,
    /// 视频播放地址
    #[sqlx(skip)]
    pub video_url: Option<String>,
}

/// 视频文件的存储key，文件名为空时没有对象
fn video_key_of(filename: &str) -> Option<String> {
    qualify_key(StorageFolder::Videos, filename)
}

/// 封面的存储路径，列表解析和删除使用同一规则
fn thumbnail_key_of(thumbnail_path: Option<&str>) -> Option<String> {
    thumbnail_path.and_then(|p| qualify_key(StorageFolder::Thumbnails, p))
}

impl VideoListItem {
    pub fn video_key(&self) -> Option<String> {
        video_key_of(&self.filename)
    }

    pub fn thumbnail_key(&self) -> Option<String> {
        thumbnail_key_of(self.thumbnail_path.as_deref())
    }
}

#[async_trait::async_trait]
impl ResolveMedia for VideoListItem {
    async fn resolve_media(&mut self, resolver: &UrlResolver) {
        self.video_url = match self.video_key() {
            Some(key) => Some(resolver.resolve_url(Some(&key)).await),
            None => None,
        };
        self.thumbnail_path = match self.thumbnail_key() {
            Some(key) => Some(resolver.resolve_url(Some(&key)).await),
            None => None,
        };
        resolve_field(&mut self.channel_avatar, resolver).await;
    }
}

/// 删除视频时需要的记录信息
#[derive(Debug, Clone, FromRow)]
pub struct VideoOwnership {
    pub id: Uuid,
    pub filename: String,
    pub thumbnail_path: Option<String>,
    pub owner_user_id: Uuid,
}

impl VideoOwnership {
    pub fn video_key(&self) -> Option<String> {
        video_key_of(&self.filename)
    }

    pub fn thumbnail_key(&self) -> Option<String> {
        thumbnail_key_of(self.thumbnail_path.as_deref())
    }
}

/// 新上传视频的记录信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub channel_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_short: bool,
}

/// 视频列表查询条件
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoFilter {
    /// 只查询短视频或普通视频
    pub is_short: Option<bool>,
    /// 按频道过滤
    pub channel_id: Option<Uuid>,
    /// 标题或频道名模糊搜索
    pub search: Option<String>,
}

/// 视频详情（点赞、评论、订阅状态）
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub likes: i64,
    /// 当前用户的反应（like / dislike）
    pub user_reaction: Option<String>,
    pub comments: Vec<Comment>,
    pub is_subscribed: bool,
    pub subscribers_count: i64,
}

#[async_trait::async_trait]
impl ResolveMedia for VideoDetails {
    async fn resolve_media(&mut self, resolver: &UrlResolver) {
        self.comments.resolve_media(resolver).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::MediaConfig, storage::mock::MockStorage};
    use std::sync::Arc;

    fn resolver() -> UrlResolver {
        UrlResolver::new(Arc::new(MockStorage::new()), "aitube", &MediaConfig::default()).unwrap()
    }

    fn item(filename: &str, thumbnail: Option<&str>, avatar: Option<&str>) -> VideoListItem {
        VideoListItem {
            id: Uuid::new_v4(),
            owner_channel_id: Uuid::new_v4(),
            title: "title".to_string(),
            description: None,
            filename: filename.to_string(),
            thumbnail_path: thumbnail.map(str::to_string),
            is_short: false,
            views: 0,
            created_at: Utc::now(),
            channel_name: "channel".to_string(),
            channel_tag: "tag".to_string(),
            channel_avatar: avatar.map(str::to_string),
            owner_user_id: Uuid::new_v4(),
            video_url: None,
        }
    }

    #[tokio::test]
    async fn test_resolve_list_item() {
        let resolver = resolver();
        let mut video = item("xyz.mp4", Some("/uploads/thumbnails/t.jpg"), None);

        video.resolve_media(&resolver).await;

        assert!(
            video
                .video_url
                .as_deref()
                .unwrap()
                .starts_with("https://signed.example/videos/xyz.mp4")
        );
        assert!(
            video
                .thumbnail_path
                .as_deref()
                .unwrap()
                .starts_with("https://signed.example/thumbnails/t.jpg")
        );
        assert_eq!(
            video.channel_avatar.as_deref(),
            Some("/assets/avatar-placeholder.svg")
        );
        // 原始key保持不变
        assert_eq!(video.filename, "xyz.mp4");
    }

    #[tokio::test]
    async fn test_missing_thumbnail_stays_empty() {
        let resolver = resolver();
        let mut videos = vec![item("videos/a.mp4", None, None), item("videos/b.mp4", Some(""), None)];

        videos.resolve_media(&resolver).await;

        assert!(videos.iter().all(|v| v.thumbnail_path.is_none()));
        assert!(videos.iter().all(|v| v.video_url.is_some()));
    }

    #[test]
    fn test_ownership_keys() {
        let video = VideoOwnership {
            id: Uuid::new_v4(),
            filename: "xyz.mp4".to_string(),
            thumbnail_path: Some("/uploads/thumbnails/t.jpg".to_string()),
            owner_user_id: Uuid::new_v4(),
        };
        assert_eq!(video.video_key().as_deref(), Some("videos/xyz.mp4"));
        assert_eq!(video.thumbnail_key().as_deref(), Some("/uploads/thumbnails/t.jpg"));

        let video = VideoOwnership {
            thumbnail_path: Some("  ".to_string()),
            ..video
        };
        assert!(video.thumbnail_key().is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete_share_thumbnail_key() {
        let storage = Arc::new(MockStorage::new());
        let resolver =
            UrlResolver::new(storage.clone(), "aitube", &MediaConfig::default()).unwrap();

        for thumbnail in ["t.jpg", "thumbnails/t.jpg", "/uploads/thumbnails/t.jpg"] {
            let mut listed = item("xyz.mp4", Some(thumbnail), None);
            let owned = VideoOwnership {
                id: listed.id,
                filename: listed.filename.clone(),
                thumbnail_path: listed.thumbnail_path.clone(),
                owner_user_id: listed.owner_user_id,
            };
            assert_eq!(listed.thumbnail_key(), owned.thumbnail_key());

            listed.resolve_media(&resolver).await;
            assert!(
                listed
                    .thumbnail_path
                    .as_deref()
                    .unwrap()
                    .starts_with("https://signed.example/thumbnails/t.jpg")
            );

            // 删除时移除的正是列表写入的缓存条目
            assert!(resolver.invalidate(owned.thumbnail_key().as_deref()));
            assert_eq!(resolver.cached_entries(), 1);
            assert!(resolver.invalidate(owned.video_key().as_deref()));
        }
    }

    #[tokio::test]
    async fn test_blank_filename_not_signed() {
        let storage = Arc::new(MockStorage::new());
        let resolver =
            UrlResolver::new(storage.clone(), "aitube", &MediaConfig::default()).unwrap();
        let mut video = item("  ", None, Some("avatars/c.png"));

        video.resolve_media(&resolver).await;

        assert!(video.video_url.is_none());
        assert!(video.video_key().is_none());
        // 只有频道头像被签名
        assert_eq!(storage.sign_calls(), 1);
    }
}
