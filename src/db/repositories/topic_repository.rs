use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use time::OffsetDateTime;

use super::contains_pattern;
use crate::db::{
    DatabaseError, DbResult, LocationTag, Page, PageRequest, Tag, Topic, TopicData, TopicListing,
};

const TOPIC_COLUMNS: &str = "t.id, t.code, t.title, t.category_id, t.video_id, t.start_seconds, \
    t.description, t.location_tag, t.is_published, t.created_at, t.updated_at";

const LISTING_COLUMNS: &str = "t.id, t.code, t.title, t.start_seconds, t.description, \
    t.location_tag, t.is_published, t.created_at, \
    c.id AS category_id, c.name AS category_name, c.slug AS category_slug, \
    v.id AS video_id, v.title AS video_title, v.platform AS video_platform, \
    v.external_id AS video_external_id, v.duration_seconds AS video_duration_seconds";

const LISTING_FROM: &str = "FROM topics t \
    JOIN categories c ON c.id = t.category_id \
    JOIN video_assets v ON v.id = t.video_id";

/// Published topic matching the search text in title, code, description or a tag name.
const SEARCH_WHERE: &str = r#"t.is_published = 1 AND (
        t.title LIKE ?1 ESCAPE '\'
        OR t.code LIKE ?1 ESCAPE '\'
        OR t.description LIKE ?1 ESCAPE '\'
        OR EXISTS (
            SELECT 1 FROM topic_tags tt
            JOIN tags g ON g.id = tt.tag_id
            WHERE tt.topic_id = t.id AND g.name LIKE ?1 ESCAPE '\'
        )
    )"#;

pub const RECENT_LIMIT: i64 = 6;
pub const CATEGORY_PAGE_SIZE: u32 = 20;
pub const SEARCH_PAGE_SIZE: u32 = 20;
pub const COURSE_PAGE_SIZE: u32 = 50;

/// Admin list filters. `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub location: Option<LocationTag>,
    pub is_published: Option<bool>,
}

pub struct TopicRepository;

impl TopicRepository {
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> DbResult<Option<Topic>> {
        let sql = format!("SELECT {TOPIC_COLUMNS} FROM topics t WHERE t.id = ?1");
        let topic = sqlx::query_as::<_, Topic>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(topic)
    }

    /// Looks a topic up by code among published topics only.
    pub async fn get_published_by_code(pool: &SqlitePool, code: &str) -> DbResult<Option<Topic>> {
        let sql = format!(
            "SELECT {TOPIC_COLUMNS} FROM topics t WHERE t.code = ?1 AND t.is_published = 1"
        );
        let topic = sqlx::query_as::<_, Topic>(&sql)
            .bind(code)
            .fetch_optional(pool)
            .await?;
        Ok(topic)
    }

    pub async fn get_by_codes(pool: &SqlitePool, codes: &[String]) -> DbResult<Vec<Topic>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {TOPIC_COLUMNS} FROM topics t WHERE t.code IN ("
        ));
        let mut separated = builder.separated(", ");
        for code in codes {
            separated.push_bind(code);
        }
        separated.push_unseparated(") ORDER BY t.code");

        let topics = builder.build_query_as::<Topic>().fetch_all(pool).await?;
        Ok(topics)
    }

    /// Published topic with the greatest code strictly below `code`.
    ///
    /// Codes compare as strings under the column collation (bytewise), so
    /// `"1.10"` sorts before `"1.9"`.
    pub async fn previous(pool: &SqlitePool, code: &str) -> DbResult<Option<Topic>> {
        let sql = format!(
            r#"
            SELECT {TOPIC_COLUMNS} FROM topics t
            WHERE t.is_published = 1 AND t.code < ?1
            ORDER BY t.code DESC
            LIMIT 1
            "#
        );
        let topic = sqlx::query_as::<_, Topic>(&sql)
            .bind(code)
            .fetch_optional(pool)
            .await?;
        Ok(topic)
    }

    /// Published topic with the least code strictly above `code`.
    pub async fn next(pool: &SqlitePool, code: &str) -> DbResult<Option<Topic>> {
        let sql = format!(
            r#"
            SELECT {TOPIC_COLUMNS} FROM topics t
            WHERE t.is_published = 1 AND t.code > ?1
            ORDER BY t.code ASC
            LIMIT 1
            "#
        );
        let topic = sqlx::query_as::<_, Topic>(&sql)
            .bind(code)
            .fetch_optional(pool)
            .await?;
        Ok(topic)
    }

    /// The most recently created published topics, newest first.
    ///
    /// Ids follow insertion order; stored timestamps do not sort exactly as text.
    pub async fn recent(pool: &SqlitePool, limit: i64) -> DbResult<Vec<TopicListing>> {
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS} {LISTING_FROM}
            WHERE t.is_published = 1
            ORDER BY t.id DESC
            LIMIT ?1
            "#
        );
        let topics = sqlx::query_as::<_, TopicListing>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(topics)
    }

    pub async fn count_published_in_category(pool: &SqlitePool, category_id: i64) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM topics WHERE category_id = ?1 AND is_published = 1",
        )
        .bind(category_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// One page of a category's published topics, by code.
    ///
    /// `page` is the raw `?page=` value; see [`PageRequest::resolve`].
    pub async fn by_category(
        pool: &SqlitePool,
        category_id: i64,
        page: Option<&str>,
    ) -> DbResult<Page<TopicListing>> {
        let total = Self::count_published_in_category(pool, category_id).await?;
        let page = PageRequest::resolve(page, CATEGORY_PAGE_SIZE, total)?;
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS} {LISTING_FROM}
            WHERE t.is_published = 1 AND t.category_id = ?1
            ORDER BY t.code
            LIMIT ?2 OFFSET ?3
            "#
        );
        let topics = sqlx::query_as::<_, TopicListing>(&sql)
            .bind(category_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok(Page::new(topics, page, total))
    }

    /// Number of published topics matching `query`. Blank queries match nothing.
    pub async fn count_search(pool: &SqlitePool, query: &str) -> DbResult<i64> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(0);
        }

        let sql = format!("SELECT COUNT(*) FROM topics t WHERE {SEARCH_WHERE}");
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(contains_pattern(query))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Case-insensitive substring search over title, code, description and tag names.
    ///
    /// Each topic appears at most once, ordered by code. A blank query yields
    /// an empty page rather than the whole catalog.
    pub async fn search(
        pool: &SqlitePool,
        query: &str,
        page: Option<&str>,
    ) -> DbResult<Page<TopicListing>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Page::empty(SEARCH_PAGE_SIZE));
        }

        let total = Self::count_search(pool, query).await?;
        let page = PageRequest::resolve(page, SEARCH_PAGE_SIZE, total)?;
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS} {LISTING_FROM}
            WHERE {SEARCH_WHERE}
            ORDER BY t.code
            LIMIT ?2 OFFSET ?3
            "#
        );
        let topics = sqlx::query_as::<_, TopicListing>(&sql)
            .bind(contains_pattern(query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok(Page::new(topics, page, total))
    }

    pub async fn count_published(pool: &SqlitePool) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM topics WHERE is_published = 1")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Course mode: every published topic in code order.
    pub async fn course(pool: &SqlitePool, page: Option<&str>) -> DbResult<Page<TopicListing>> {
        let total = Self::count_published(pool).await?;
        let page = PageRequest::resolve(page, COURSE_PAGE_SIZE, total)?;
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS} {LISTING_FROM}
            WHERE t.is_published = 1
            ORDER BY t.code
            LIMIT ?1 OFFSET ?2
            "#
        );
        let topics = sqlx::query_as::<_, TopicListing>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        Ok(Page::new(topics, page, total))
    }

    /// Admin listing over every topic, published or not.
    pub async fn list_filtered(
        pool: &SqlitePool,
        filter: &TopicFilter,
    ) -> DbResult<Vec<TopicListing>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {LISTING_COLUMNS} {LISTING_FROM} WHERE 1 = 1"
        ));

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(search);
            builder.push(" AND (t.code LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR t.title LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR t.description LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(
                r" ESCAPE '\' OR EXISTS (SELECT 1 FROM topic_tags tt JOIN tags g ON g.id = tt.tag_id WHERE tt.topic_id = t.id AND g.name LIKE ",
            );
            builder.push_bind(pattern);
            builder.push(r" ESCAPE '\'))");
        }
        if let Some(category_id) = filter.category_id {
            builder.push(" AND t.category_id = ");
            builder.push_bind(category_id);
        }
        if let Some(location) = filter.location {
            builder.push(" AND t.location_tag = ");
            builder.push_bind(location);
        }
        if let Some(is_published) = filter.is_published {
            builder.push(" AND t.is_published = ");
            builder.push_bind(is_published);
        }
        builder.push(" ORDER BY t.code");

        let topics = builder.build_query_as::<TopicListing>().fetch_all(pool).await?;
        Ok(topics)
    }

    pub async fn count(pool: &SqlitePool) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM topics")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Tags attached to a topic, by name.
    pub async fn tags_for(pool: &SqlitePool, topic_id: i64) -> DbResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT g.id, g.name, g.slug
            FROM tags g
            JOIN topic_tags tt ON tt.tag_id = g.id
            WHERE tt.topic_id = ?1
            ORDER BY g.name
            "#,
        )
        .bind(topic_id)
        .fetch_all(pool)
        .await?;
        Ok(tags)
    }

    /// Tag names of every tagged topic, keyed by topic id, each list in name order.
    pub async fn tag_names_by_topic(pool: &SqlitePool) -> DbResult<HashMap<i64, Vec<String>>> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT tt.topic_id, g.name
            FROM topic_tags tt
            JOIN tags g ON g.id = tt.tag_id
            ORDER BY tt.topic_id, g.name
            "#,
        )
        .fetch_all(pool)
        .await?;

        let mut names: HashMap<i64, Vec<String>> = HashMap::new();
        for (topic_id, name) in rows {
            names.entry(topic_id).or_default().push(name);
        }
        Ok(names)
    }

    pub async fn create(tx: &mut Transaction<'_, Sqlite>, data: &TopicData) -> DbResult<Topic> {
        let now = OffsetDateTime::now_utc();
        let topic = sqlx::query_as::<_, Topic>(
            r#"
            INSERT INTO topics
                (code, title, category_id, video_id, start_seconds, description, location_tag,
                 is_published, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            RETURNING id, code, title, category_id, video_id, start_seconds, description,
                location_tag, is_published, created_at, updated_at
            "#,
        )
        .bind(&data.code)
        .bind(&data.title)
        .bind(data.category_id)
        .bind(data.video_id)
        .bind(data.start_seconds)
        .bind(&data.description)
        .bind(data.location_tag)
        .bind(data.is_published)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;
        Ok(topic)
    }

    pub async fn update(
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
        data: &TopicData,
    ) -> DbResult<Topic> {
        sqlx::query_as::<_, Topic>(
            r#"
            UPDATE topics
            SET code = ?1, title = ?2, category_id = ?3, video_id = ?4, start_seconds = ?5,
                description = ?6, location_tag = ?7, is_published = ?8, updated_at = ?9
            WHERE id = ?10
            RETURNING id, code, title, category_id, video_id, start_seconds, description,
                location_tag, is_published, created_at, updated_at
            "#,
        )
        .bind(&data.code)
        .bind(&data.title)
        .bind(data.category_id)
        .bind(data.video_id)
        .bind(data.start_seconds)
        .bind(&data.description)
        .bind(data.location_tag)
        .bind(data.is_published)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    /// Flips the published flag and returns the new value.
    pub async fn toggle_published(tx: &mut Transaction<'_, Sqlite>, id: i64) -> DbResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE topics
            SET is_published = NOT is_published, updated_at = ?1
            WHERE id = ?2
            RETURNING is_published
            "#,
        )
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    /// Replaces the topic's tag set.
    pub async fn set_tags(
        tx: &mut Transaction<'_, Sqlite>,
        topic_id: i64,
        tag_ids: &[i64],
    ) -> DbResult<()> {
        sqlx::query("DELETE FROM topic_tags WHERE topic_id = ?1")
            .bind(topic_id)
            .execute(&mut **tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO topic_tags (topic_id, tag_id) VALUES (?1, ?2)")
                .bind(topic_id)
                .bind(tag_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    pub async fn delete(tx: &mut Transaction<'_, Sqlite>, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM topics WHERE id = ?1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }
}
