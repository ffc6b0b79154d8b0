use crate::{database::Database, error::AppResult, models::Channel};
use uuid::Uuid;

const CHANNEL_COLUMNS: &str = r#"
    c.id, c.owner_user_id, c.channel_name, c.channel_tag, c.avatar_path, c.created_at,
    (SELECT COUNT(*) FROM subscriptions s WHERE s.target_channel_id = c.id) AS subscribers_count
"#;

/// 频道仓库
#[derive(Clone)]
pub struct ChannelRepository {
    db: Database,
}

impl ChannelRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 根据ID查找频道（含订阅人数）
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Channel>> {
        let sql = format!("SELECT {} FROM channels c WHERE c.id = $1", CHANNEL_COLUMNS);
        let channel = sqlx::query_as::<_, Channel>(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(channel)
    }

    /// 查找用户自己的频道
    pub async fn find_by_owner(&self, owner_user_id: Uuid) -> AppResult<Option<Channel>> {
        let sql = format!(
            "SELECT {} FROM channels c WHERE c.owner_user_id = $1 ORDER BY c.created_at LIMIT 1",
            CHANNEL_COLUMNS
        );
        let channel = sqlx::query_as::<_, Channel>(&sql)
            .bind(owner_user_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(channel)
    }

    /// 用户订阅的频道列表
    pub async fn list_subscriptions(&self, subscriber_user_id: Uuid) -> AppResult<Vec<Channel>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM subscriptions sub
            JOIN channels c ON sub.target_channel_id = c.id
            WHERE sub.subscriber_user_id = $1
            ORDER BY sub.created_at DESC
            "#,
            CHANNEL_COLUMNS
        );
        let channels = sqlx::query_as::<_, Channel>(&sql)
            .bind(subscriber_user_id)
            .fetch_all(self.db.pool())
            .await?;

        Ok(channels)
    }

    /// 订阅人数
    pub async fn subscribers_count(&self, channel_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subscriptions WHERE target_channel_id = $1",
        )
        .bind(channel_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count)
    }

    /// 用户是否订阅了频道
    pub async fn is_subscribed(&self, subscriber_user_id: Uuid, channel_id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM subscriptions
                WHERE subscriber_user_id = $1 AND target_channel_id = $2
            )
            "#,
        )
        .bind(subscriber_user_id)
        .bind(channel_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(exists)
    }

    /// 替换频道头像，返回旧的头像路径
    pub async fn replace_avatar(&self, id: Uuid, avatar_path: &str) -> AppResult<Option<String>> {
        let mut tx = self.db.begin().await?;

        let previous = sqlx::query_scalar::<_, Option<String>>(
            "SELECT avatar_path FROM channels WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .flatten();

        sqlx::query("UPDATE channels SET avatar_path = $2 WHERE id = $1")
            .bind(id)
            .bind(avatar_path)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(previous)
    }
}
