use sqlx::{Sqlite, SqlitePool, Transaction};

use super::contains_pattern;
use crate::db::{DatabaseError, DbResult, Tag, TagData, TagSummary};
use crate::formatting::slugify;

pub struct TagRepository;

impl TagRepository {
    pub async fn list(pool: &SqlitePool) -> DbResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(tags)
    }

    pub async fn list_with_counts(
        pool: &SqlitePool,
        search: Option<&str>,
    ) -> DbResult<Vec<TagSummary>> {
        let tags = sqlx::query_as::<_, TagSummary>(
            r#"
            SELECT g.id, g.name, g.slug,
                (SELECT COUNT(*) FROM topic_tags tt WHERE tt.tag_id = g.id) AS topic_count
            FROM tags g
            WHERE ?1 IS NULL OR g.name LIKE ?1 ESCAPE '\'
            ORDER BY g.name
            "#,
        )
        .bind(search.map(contains_pattern))
        .fetch_all(pool)
        .await?;
        Ok(tags)
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> DbResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(tag)
    }

    /// Codes of the topics carrying a tag, in code order, at most `limit` of them.
    pub async fn topic_codes(pool: &SqlitePool, tag_id: i64, limit: i64) -> DbResult<Vec<String>> {
        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT t.code
            FROM topics t
            JOIN topic_tags tt ON tt.topic_id = t.id
            WHERE tt.tag_id = ?1
            ORDER BY t.code
            LIMIT ?2
            "#,
        )
        .bind(tag_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(codes)
    }

    pub async fn topic_count(pool: &SqlitePool, tag_id: i64) -> DbResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM topic_tags WHERE tag_id = ?1")
                .bind(tag_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    pub async fn count(pool: &SqlitePool) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tags")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn create(tx: &mut Transaction<'_, Sqlite>, data: &TagData) -> DbResult<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, slug) VALUES (?1, ?2) RETURNING id, name, slug",
        )
        .bind(&data.name)
        .bind(&data.slug)
        .fetch_one(&mut **tx)
        .await?;
        Ok(tag)
    }

    pub async fn update(
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
        data: &TagData,
    ) -> DbResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "UPDATE tags SET name = ?1, slug = ?2 WHERE id = ?3 RETURNING id, name, slug",
        )
        .bind(&data.name)
        .bind(&data.slug)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    /// Resolves tag names to tags, creating the ones that do not exist yet.
    ///
    /// Names match case-insensitively; new tags get a slug derived from the name.
    pub async fn find_or_create_by_names(
        tx: &mut Transaction<'_, Sqlite>,
        names: &[String],
    ) -> DbResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = Vec::with_capacity(names.len());

        for name in names {
            let existing = sqlx::query_as::<_, Tag>(
                "SELECT id, name, slug FROM tags WHERE name = ?1 COLLATE NOCASE",
            )
            .bind(name)
            .fetch_optional(&mut **tx)
            .await?;

            let tag = match existing {
                Some(tag) => tag,
                None => {
                    let slug = slugify(name);
                    if slug.is_empty() {
                        return Err(DatabaseError::InvalidInput(format!(
                            "Tag name '{}' has no URL-safe characters",
                            name
                        )));
                    }
                    Self::create(
                        tx,
                        &TagData {
                            name: name.clone(),
                            slug,
                        },
                    )
                    .await?
                }
            };

            if !tags.iter().any(|t| t.id == tag.id) {
                tags.push(tag);
            }
        }

        Ok(tags)
    }

    pub async fn delete(tx: &mut Transaction<'_, Sqlite>, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }
}
