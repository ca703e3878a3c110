use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::validate_slug;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TagSummary {
    #[sqlx(flatten)]
    pub tag: Tag,
    pub topic_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TagData {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters long"))]
    pub name: String,
    #[validate(
        length(max = 100, message = "Slug must be at most 100 characters long"),
        custom(function = "validate_slug")
    )]
    pub slug: String,
}
