use sqlx::{Sqlite, SqlitePool, Transaction};
use time::OffsetDateTime;

use super::contains_pattern;
use crate::db::{total_duration_seconds, DatabaseError, DbResult, Quiz, QuizData, QuizSummary};

const QUIZ_COLUMNS: &str = "q.id, q.title, q.description, q.passing_score, q.time_limit_minutes, \
    q.is_active, q.created_at, q.updated_at";

pub struct QuizRepository;

impl QuizRepository {
    pub async fn list_with_counts(
        pool: &SqlitePool,
        search: Option<&str>,
        is_active: Option<bool>,
    ) -> DbResult<Vec<QuizSummary>> {
        let sql = format!(
            r#"
            SELECT {QUIZ_COLUMNS},
                (SELECT COUNT(*) FROM quiz_topics qt WHERE qt.quiz_id = q.id) AS topic_count
            FROM quizzes q
            WHERE (?1 IS NULL
                    OR q.title LIKE ?1 ESCAPE '\'
                    OR q.description LIKE ?1 ESCAPE '\')
                AND (?2 IS NULL OR q.is_active = ?2)
            ORDER BY q.id DESC
            "#
        );
        let quizzes = sqlx::query_as::<_, QuizSummary>(&sql)
            .bind(search.map(contains_pattern))
            .bind(is_active)
            .fetch_all(pool)
            .await?;
        Ok(quizzes)
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> DbResult<Option<Quiz>> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes q WHERE q.id = ?1");
        let quiz = sqlx::query_as::<_, Quiz>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(quiz)
    }

    /// Active quizzes that evaluate the given topic.
    pub async fn active_for_topic(pool: &SqlitePool, topic_id: i64) -> DbResult<Vec<Quiz>> {
        let sql = format!(
            r#"
            SELECT {QUIZ_COLUMNS}
            FROM quizzes q
            JOIN quiz_topics qt ON qt.quiz_id = q.id
            WHERE qt.topic_id = ?1 AND q.is_active = 1
            ORDER BY q.id DESC
            "#
        );
        let quizzes = sqlx::query_as::<_, Quiz>(&sql)
            .bind(topic_id)
            .fetch_all(pool)
            .await?;
        Ok(quizzes)
    }

    /// Codes of the quiz's topics, sorted.
    pub async fn topic_codes(pool: &SqlitePool, quiz_id: i64) -> DbResult<Vec<String>> {
        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT t.code
            FROM topics t
            JOIN quiz_topics qt ON qt.topic_id = t.id
            WHERE qt.quiz_id = ?1
            ORDER BY t.code
            "#,
        )
        .bind(quiz_id)
        .fetch_all(pool)
        .await?;
        Ok(codes)
    }

    /// Estimated duration: the known lengths of the distinct videos behind the quiz.
    pub async fn total_duration_seconds(pool: &SqlitePool, quiz_id: i64) -> DbResult<u64> {
        let videos = sqlx::query_as::<_, (i64, Option<u32>)>(
            r#"
            SELECT v.id, v.duration_seconds
            FROM video_assets v
            JOIN topics t ON t.video_id = v.id
            JOIN quiz_topics qt ON qt.topic_id = t.id
            WHERE qt.quiz_id = ?1
            "#,
        )
        .bind(quiz_id)
        .fetch_all(pool)
        .await?;
        Ok(total_duration_seconds(videos))
    }

    pub async fn count(pool: &SqlitePool) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quizzes")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn create(tx: &mut Transaction<'_, Sqlite>, data: &QuizData) -> DbResult<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes
                (title, description, passing_score, time_limit_minutes, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING id, title, description, passing_score, time_limit_minutes, is_active, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.passing_score)
        .bind(data.time_limit_minutes)
        .bind(data.is_active)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&mut **tx)
        .await?;
        Ok(quiz)
    }

    pub async fn update(
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
        data: &QuizData,
    ) -> DbResult<Quiz> {
        sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes
            SET title = ?1, description = ?2, passing_score = ?3, time_limit_minutes = ?4,
                is_active = ?5, updated_at = ?6
            WHERE id = ?7
            RETURNING id, title, description, passing_score, time_limit_minutes, is_active, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.passing_score)
        .bind(data.time_limit_minutes)
        .bind(data.is_active)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn toggle_active(tx: &mut Transaction<'_, Sqlite>, id: i64) -> DbResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE quizzes
            SET is_active = NOT is_active, updated_at = ?1
            WHERE id = ?2
            RETURNING is_active
            "#,
        )
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    /// Replaces the set of topics the quiz evaluates.
    pub async fn set_topics(
        tx: &mut Transaction<'_, Sqlite>,
        quiz_id: i64,
        topic_ids: &[i64],
    ) -> DbResult<()> {
        sqlx::query("DELETE FROM quiz_topics WHERE quiz_id = ?1")
            .bind(quiz_id)
            .execute(&mut **tx)
            .await?;

        for topic_id in topic_ids {
            sqlx::query("INSERT OR IGNORE INTO quiz_topics (quiz_id, topic_id) VALUES (?1, ?2)")
                .bind(quiz_id)
                .bind(topic_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    pub async fn delete(tx: &mut Transaction<'_, Sqlite>, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = ?1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }
}
