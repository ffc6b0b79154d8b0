use crate::{
    database::Database,
    error::AppResult,
    models::{NewVideo, VideoFilter, VideoListItem, VideoOwnership},
};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

const LIST_SELECT: &str = r#"
    SELECT
        v.id, v.owner_channel_id, v.title, v.description, v.filename, v.thumbnail_path,
        v.is_short, v.views, v.created_at,
        c.channel_name, c.channel_tag, c.avatar_path AS channel_avatar, c.owner_user_id
    FROM videos v
    JOIN channels c ON v.owner_channel_id = c.id
"#;

/// 视频仓库
#[derive(Clone)]
pub struct VideoRepository {
    db: Database,
}

impl VideoRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 查询视频列表，最新的在前
    pub async fn list(&self, filter: &VideoFilter) -> AppResult<Vec<VideoListItem>> {
        let mut query_builder = QueryBuilder::<Postgres>::new(LIST_SELECT);

        apply_filter(&mut query_builder, filter);
        query_builder.push(" ORDER BY v.created_at DESC");

        let videos = query_builder
            .build_query_as::<VideoListItem>()
            .fetch_all(self.db.pool())
            .await?;

        Ok(videos)
    }

    /// 创建视频记录，返回带频道信息的列表项
    pub async fn create(
        &self,
        video: &NewVideo,
        video_key: &str,
        thumbnail_key: Option<&str>,
    ) -> AppResult<VideoListItem> {
        let mut tx = self.db.begin().await?;
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO videos (
                id, owner_channel_id, title, description, filename, thumbnail_path,
                is_short, views, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 0, NOW())
            "#,
        )
        .bind(id)
        .bind(video.channel_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video_key)
        .bind(thumbnail_key)
        .bind(video.is_short)
        .execute(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, VideoListItem>(&format!("{} WHERE v.id = $1", LIST_SELECT))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// 查找视频及其所属用户
    pub async fn find_ownership(&self, id: Uuid) -> AppResult<Option<VideoOwnership>> {
        let video = sqlx::query_as::<_, VideoOwnership>(
            r#"
            SELECT v.id, v.filename, v.thumbnail_path, c.owner_user_id
            FROM videos v
            JOIN channels c ON v.owner_channel_id = c.id
            WHERE v.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(video)
    }

    /// 视频所属频道
    pub async fn find_owner_channel_id(&self, id: Uuid) -> AppResult<Option<Uuid>> {
        let channel_id =
            sqlx::query_scalar::<_, Uuid>("SELECT owner_channel_id FROM videos WHERE id = $1")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(channel_id)
    }

    /// 点赞数
    pub async fn count_likes(&self, id: Uuid) -> AppResult<i64> {
        let likes = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM likes WHERE video_id = $1 AND type = 'like'",
        )
        .bind(id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(likes)
    }

    /// 用户对视频的反应
    pub async fn find_reaction(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<String>> {
        let reaction = sqlx::query_scalar::<_, String>(
            "SELECT type FROM likes WHERE video_id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(reaction)
    }

    /// 删除视频及其点赞、评论
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM likes WHERE video_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE video_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn apply_filter(query_builder: &mut QueryBuilder<'_, Postgres>, filter: &VideoFilter) {
    let mut separator = " WHERE ";

    if let Some(is_short) = filter.is_short {
        query_builder.push(separator).push("v.is_short = ").push_bind(is_short);
        separator = " AND ";
    }

    if let Some(channel_id) = filter.channel_id {
        query_builder
            .push(separator)
            .push("v.owner_channel_id = ")
            .push_bind(channel_id);
        separator = " AND ";
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        query_builder
            .push(separator)
            .push("(v.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.channel_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
