use crate::{database::Database, error::AppResult, models::User};
use uuid::Uuid;

/// 用户仓库
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 根据会话令牌查找用户ID
    pub async fn find_user_id_by_token(&self, token: &str) -> AppResult<Option<Uuid>> {
        let user_id = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(user_id)
    }

    /// 根据ID查找用户
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, avatar_path, language, theme, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(user)
    }

    /// 替换头像，返回旧的头像路径
    pub async fn replace_avatar(&self, id: Uuid, avatar_path: &str) -> AppResult<Option<String>> {
        let mut tx = self.db.begin().await?;

        let previous = sqlx::query_scalar::<_, Option<String>>(
            "SELECT avatar_path FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .flatten();

        sqlx::query("UPDATE users SET avatar_path = $2 WHERE id = $1")
            .bind(id)
            .bind(avatar_path)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(previous)
    }
}
