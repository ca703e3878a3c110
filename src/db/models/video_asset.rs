use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use validator::Validate;

use crate::formatting;
use crate::video_url::Platform;

/// Physical reference to a hosted video. Offsets live on topics, not here.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct VideoAsset {
    pub id: i64,
    pub title: String,
    pub platform: Platform,
    pub external_id: String,
    pub duration_seconds: Option<u32>,
    pub uploaded_date: Option<Date>,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl VideoAsset {
    pub fn watch_url(&self, start_seconds: Option<u32>) -> String {
        self.platform.watch_url(&self.external_id, start_seconds)
    }

    pub fn embed_url(&self, start_seconds: Option<u32>) -> String {
        self.platform.embed_url(&self.external_id, start_seconds)
    }

    /// `title (Platform)`
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.title, self.platform.label())
    }

    pub fn duration_formatted(&self) -> String {
        match self.duration_seconds {
            Some(secs) if secs > 0 => formatting::clock(secs),
            _ => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct VideoAssetSummary {
    #[sqlx(flatten)]
    pub video: VideoAsset,
    pub topic_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VideoAssetData {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters long"))]
    pub title: String,
    pub platform: Platform,
    #[validate(length(min = 1, max = 100, message = "External ID must be 1 to 100 characters long"))]
    pub external_id: String,
    pub duration_seconds: Option<u32>,
    pub uploaded_date: Option<Date>,
    pub description: String,
}
