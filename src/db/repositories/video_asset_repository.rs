use sqlx::{Sqlite, SqlitePool, Transaction};
use time::OffsetDateTime;

use super::contains_pattern;
use crate::db::{DatabaseError, DbResult, VideoAsset, VideoAssetData, VideoAssetSummary};
use crate::video_url::Platform;

const VIDEO_COLUMNS: &str = "v.id, v.title, v.platform, v.external_id, v.duration_seconds, \
    v.uploaded_date, v.description, v.created_at, v.updated_at";

pub struct VideoAssetRepository;

impl VideoAssetRepository {
    /// Newest first, as the admin pickers show them.
    pub async fn list(pool: &SqlitePool) -> DbResult<Vec<VideoAsset>> {
        let sql = format!("SELECT {VIDEO_COLUMNS} FROM video_assets v ORDER BY v.id DESC");
        let videos = sqlx::query_as::<_, VideoAsset>(&sql).fetch_all(pool).await?;
        Ok(videos)
    }

    pub async fn list_with_counts(
        pool: &SqlitePool,
        search: Option<&str>,
        platform: Option<Platform>,
    ) -> DbResult<Vec<VideoAssetSummary>> {
        let sql = format!(
            r#"
            SELECT {VIDEO_COLUMNS},
                (SELECT COUNT(*) FROM topics t WHERE t.video_id = v.id) AS topic_count
            FROM video_assets v
            WHERE (?1 IS NULL
                    OR v.title LIKE ?1 ESCAPE '\'
                    OR v.external_id LIKE ?1 ESCAPE '\'
                    OR v.description LIKE ?1 ESCAPE '\')
                AND (?2 IS NULL OR v.platform = ?2)
            ORDER BY v.id DESC
            "#
        );
        let videos = sqlx::query_as::<_, VideoAssetSummary>(&sql)
            .bind(search.map(contains_pattern))
            .bind(platform)
            .fetch_all(pool)
            .await?;
        Ok(videos)
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> DbResult<Option<VideoAsset>> {
        let sql = format!("SELECT {VIDEO_COLUMNS} FROM video_assets v WHERE v.id = ?1");
        let video = sqlx::query_as::<_, VideoAsset>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(video)
    }

    pub async fn topic_count(pool: &SqlitePool, id: i64) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM topics WHERE video_id = ?1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn count(pool: &SqlitePool) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM video_assets")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn create(
        tx: &mut Transaction<'_, Sqlite>,
        data: &VideoAssetData,
    ) -> DbResult<VideoAsset> {
        let now = OffsetDateTime::now_utc();
        let video = sqlx::query_as::<_, VideoAsset>(
            r#"
            INSERT INTO video_assets
                (title, platform, external_id, duration_seconds, uploaded_date, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING id, title, platform, external_id, duration_seconds, uploaded_date, description, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(data.platform)
        .bind(&data.external_id)
        .bind(data.duration_seconds)
        .bind(data.uploaded_date)
        .bind(&data.description)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;
        Ok(video)
    }

    pub async fn update(
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
        data: &VideoAssetData,
    ) -> DbResult<VideoAsset> {
        sqlx::query_as::<_, VideoAsset>(
            r#"
            UPDATE video_assets
            SET title = ?1, platform = ?2, external_id = ?3, duration_seconds = ?4,
                uploaded_date = ?5, description = ?6, updated_at = ?7
            WHERE id = ?8
            RETURNING id, title, platform, external_id, duration_seconds, uploaded_date, description, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(data.platform)
        .bind(&data.external_id)
        .bind(data.duration_seconds)
        .bind(data.uploaded_date)
        .bind(&data.description)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    /// Removes the video and every topic pointing into it.
    pub async fn delete(tx: &mut Transaction<'_, Sqlite>, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM video_assets WHERE id = ?1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }
}
