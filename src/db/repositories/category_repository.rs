use sqlx::{Sqlite, SqlitePool, Transaction};

use super::contains_pattern;
use crate::db::{Category, CategoryData, CategorySummary, DatabaseError, DbResult};

const CATEGORY_COLUMNS: &str = "c.id, c.name, c.slug, c.icon, c.description, c.display_order";

pub struct CategoryRepository;

impl CategoryRepository {
    /// All categories in display order.
    pub async fn list(pool: &SqlitePool) -> DbResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c ORDER BY c.display_order, c.name");
        let categories = sqlx::query_as::<_, Category>(&sql).fetch_all(pool).await?;
        Ok(categories)
    }

    /// Admin listing with topic counts, optionally narrowed by name/description.
    pub async fn list_with_counts(
        pool: &SqlitePool,
        search: Option<&str>,
    ) -> DbResult<Vec<CategorySummary>> {
        let sql = format!(
            r#"
            SELECT {CATEGORY_COLUMNS},
                (SELECT COUNT(*) FROM topics t WHERE t.category_id = c.id) AS topic_count
            FROM categories c
            WHERE ?1 IS NULL
                OR c.name LIKE ?1 ESCAPE '\'
                OR c.description LIKE ?1 ESCAPE '\'
            ORDER BY c.display_order, c.name
            "#
        );
        let pattern = search.map(contains_pattern);
        let categories = sqlx::query_as::<_, CategorySummary>(&sql)
            .bind(pattern)
            .fetch_all(pool)
            .await?;
        Ok(categories)
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> DbResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.id = ?1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    pub async fn get_by_slug(pool: &SqlitePool, slug: &str) -> DbResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.slug = ?1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    /// Topics filed under the category, published or not.
    pub async fn topic_count(pool: &SqlitePool, id: i64) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM topics WHERE category_id = ?1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn count(pool: &SqlitePool) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn create(
        tx: &mut Transaction<'_, Sqlite>,
        data: &CategoryData,
    ) -> DbResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, icon, description, display_order)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, name, slug, icon, description, display_order
            "#,
        )
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.icon)
        .bind(&data.description)
        .bind(data.display_order)
        .fetch_one(&mut **tx)
        .await?;
        Ok(category)
    }

    pub async fn update(
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
        data: &CategoryData,
    ) -> DbResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = ?1, slug = ?2, icon = ?3, description = ?4, display_order = ?5
            WHERE id = ?6
            RETURNING id, name, slug, icon, description, display_order
            "#,
        )
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.icon)
        .bind(&data.description)
        .bind(data.display_order)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn set_display_order(
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
        display_order: u32,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE categories SET display_order = ?1 WHERE id = ?2")
            .bind(display_order)
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    /// Removes the category and, through the schema, every topic filed under it.
    pub async fn delete(tx: &mut Transaction<'_, Sqlite>, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }
}
