use crate::{database::Database, error::AppResult, models::Comment};
use uuid::Uuid;

/// 评论仓库
#[derive(Clone)]
pub struct CommentRepository {
    db: Database,
}

impl CommentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 视频下的评论，最新的在前
    pub async fn list_by_video(&self, video_id: Uuid) -> AppResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.text, c.created_at, u.id AS user_id, u.username, u.name, u.avatar_path
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.video_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(video_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(comments)
    }
}
