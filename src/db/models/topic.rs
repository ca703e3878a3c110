use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use time::OffsetDateTime;
use validator::Validate;

use crate::formatting;
use crate::video_url::Platform;

/// Physical or contextual place a topic applies to. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LocationTag {
    #[sqlx(rename = "floor_1")]
    #[serde(rename = "floor_1")]
    Floor1,
    #[sqlx(rename = "floor_2")]
    #[serde(rename = "floor_2")]
    Floor2,
    #[sqlx(rename = "floor_3")]
    #[serde(rename = "floor_3")]
    Floor3,
    #[sqlx(rename = "floor_4")]
    #[serde(rename = "floor_4")]
    Floor4,
    Checkout,
    Warehouse,
    DistributionCenter,
    Office,
    Remote,
    General,
}

impl LocationTag {
    pub fn all() -> &'static [LocationTag] {
        &[
            LocationTag::Floor1,
            LocationTag::Floor2,
            LocationTag::Floor3,
            LocationTag::Floor4,
            LocationTag::Checkout,
            LocationTag::Warehouse,
            LocationTag::DistributionCenter,
            LocationTag::Office,
            LocationTag::Remote,
            LocationTag::General,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            LocationTag::Floor1 => "floor_1",
            LocationTag::Floor2 => "floor_2",
            LocationTag::Floor3 => "floor_3",
            LocationTag::Floor4 => "floor_4",
            LocationTag::Checkout => "checkout",
            LocationTag::Warehouse => "warehouse",
            LocationTag::DistributionCenter => "distribution_center",
            LocationTag::Office => "office",
            LocationTag::Remote => "remote",
            LocationTag::General => "general",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LocationTag::Floor1 => "Floor 1",
            LocationTag::Floor2 => "Floor 2",
            LocationTag::Floor3 => "Floor 3",
            LocationTag::Floor4 => "Floor 4",
            LocationTag::Checkout => "Checkout",
            LocationTag::Warehouse => "Warehouse",
            LocationTag::DistributionCenter => "Distribution center",
            LocationTag::Office => "Office",
            LocationTag::Remote => "Remote",
            LocationTag::General => "General",
        }
    }
}

impl Display for LocationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LocationTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationTag::all()
            .iter()
            .copied()
            .find(|tag| tag.code() == s)
            .ok_or_else(|| format!("Unknown location: {}", s))
    }
}

/// The central knowledge unit: a titled offset into a video.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub category_id: i64,
    pub video_id: i64,
    pub start_seconds: u32,
    pub description: String,
    pub location_tag: Option<LocationTag>,
    pub is_published: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Topic {
    pub fn absolute_url(&self) -> String {
        format!("/topic/{}/", self.code)
    }

    pub fn formatted_timestamp(&self) -> String {
        formatting::clock(self.start_seconds)
    }

    pub fn location_label(&self) -> &'static str {
        self.location_tag.map(|l| l.label()).unwrap_or("")
    }
}

/// Topic joined with the category and video columns the listings show.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TopicListing {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub start_seconds: u32,
    pub description: String,
    pub location_tag: Option<LocationTag>,
    pub is_published: bool,
    pub created_at: OffsetDateTime,
    pub category_id: i64,
    pub category_name: String,
    pub category_slug: String,
    pub video_id: i64,
    pub video_title: String,
    pub video_platform: Platform,
    pub video_external_id: String,
    pub video_duration_seconds: Option<u32>,
}

impl TopicListing {
    pub fn absolute_url(&self) -> String {
        format!("/topic/{}/", self.code)
    }

    pub fn formatted_timestamp(&self) -> String {
        formatting::clock(self.start_seconds)
    }

    pub fn watch_url(&self) -> String {
        self.video_platform
            .watch_url(&self.video_external_id, Some(self.start_seconds))
    }

    pub fn embed_url(&self) -> String {
        self.video_platform
            .embed_url(&self.video_external_id, Some(self.start_seconds))
    }

    pub fn video_title_short(&self) -> String {
        formatting::truncate(&self.video_title, 30)
    }

    pub fn location_label(&self) -> &'static str {
        self.location_tag.map(|l| l.label()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TopicData {
    #[validate(length(min = 1, max = 20, message = "Code must be 1 to 20 characters long"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters long"))]
    pub title: String,
    pub category_id: i64,
    pub video_id: i64,
    pub start_seconds: u32,
    pub description: String,
    pub location_tag: Option<LocationTag>,
    pub is_published: bool,
}

impl TopicData {
    /// Stored location code, empty when unset.
    pub fn location_code(&self) -> &'static str {
        self.location_tag.map(|l| l.code()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_codes_round_trip_through_from_str() {
        for tag in LocationTag::all() {
            assert_eq!(tag.code().parse::<LocationTag>(), Ok(*tag));
        }
        assert!("basement".parse::<LocationTag>().is_err());
    }

    #[test]
    fn listing_urls_use_topic_offset() {
        let listing = TopicListing {
            id: 1,
            code: "1.13".to_string(),
            title: "Closing".to_string(),
            start_seconds: 1690,
            description: String::new(),
            location_tag: Some(LocationTag::Checkout),
            is_published: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            category_id: 1,
            category_name: "Sales".to_string(),
            category_slug: "sales".to_string(),
            video_id: 1,
            video_title: "Sales management end-to-end walkthrough".to_string(),
            video_platform: Platform::Youtube,
            video_external_id: "dQw4w9WgXcQ".to_string(),
            video_duration_seconds: Some(2400),
        };

        assert_eq!(
            listing.watch_url(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1690s"
        );
        assert_eq!(
            listing.embed_url(),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=1690"
        );
        assert_eq!(listing.formatted_timestamp(), "28:10");
        assert_eq!(listing.video_title_short(), "Sales management end-to-end wa...");
        assert_eq!(listing.absolute_url(), "/topic/1.13/");
        assert_eq!(listing.location_label(), "Checkout");
    }
}
