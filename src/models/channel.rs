use crate::media::{ResolveMedia, UrlResolver, resolve_field};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// 频道模型
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: Uuid,
    /// 频道所有者
    pub owner_user_id: Uuid,
    pub channel_name: String,
    /// 频道标签（全局唯一）
    pub channel_tag: String,
    /// 频道头像路径，返回前解析为URL
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
    /// 订阅人数
    #[sqlx(default)]
    pub subscribers_count: i64,
    /// 当前用户是否已订阅（仅在查询单个频道时填充）
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
}

#[async_trait::async_trait]
impl ResolveMedia for Channel {
    async fn resolve_media(&mut self, resolver: &UrlResolver) {
        resolve_field(&mut self.avatar_path, resolver).await;
    }
}
