use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::validate_slug;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub icon: String,
    pub description: String,
    pub display_order: u32,
}

impl Category {
    pub fn absolute_url(&self) -> String {
        format!("/category/{}/", self.slug)
    }
}

/// Category row with the number of topics filed under it.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct CategorySummary {
    #[sqlx(flatten)]
    pub category: Category,
    pub topic_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CategoryData {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters long"))]
    pub name: String,
    #[validate(
        length(max = 100, message = "Slug must be at most 100 characters long"),
        custom(function = "validate_slug")
    )]
    pub slug: String,
    #[validate(length(max = 50, message = "Icon must be at most 50 characters long"))]
    pub icon: String,
    pub description: String,
    pub display_order: u32,
}
