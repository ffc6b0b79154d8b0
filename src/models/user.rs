use crate::media::{ResolveMedia, UrlResolver, resolve_field};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// 用户模型（不含密码哈希）
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// 用户ID
    pub id: Uuid,
    /// 显示名称
    pub name: String,
    /// 登录名
    pub username: String,
    /// 头像路径，返回前解析为URL
    pub avatar_path: Option<String>,
    /// 界面语言
    pub language: Option<String>,
    /// 界面主题
    pub theme: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
impl ResolveMedia for User {
    async fn resolve_media(&mut self, resolver: &UrlResolver) {
        resolve_field(&mut self.avatar_path, resolver).await;
    }
}
