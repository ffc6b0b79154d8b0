use crate::media::{ResolveMedia, UrlResolver, resolve_field};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// 评论及作者信息
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    /// 作者头像
    pub avatar_path: Option<String>,
}

#[async_trait::async_trait]
impl ResolveMedia for Comment {
    async fn resolve_media(&mut self, resolver: &UrlResolver) {
        resolve_field(&mut self.avatar_path, resolver).await;
    }
}
