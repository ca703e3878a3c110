//! Raw HTML form payloads for the admin console and their conversion into
//! the validated `*Data` models.

use serde::{de, Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;
use time::{macros::format_description, Date};
use validator::ValidationErrors;

use crate::db::{CategoryData, LocationTag, QuizData, TagData, TopicData, VideoAssetData};
use crate::formatting::slugify;
use crate::video_url::Platform;

/// Treats a blank form field as absent and parses anything else.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Splits a comma-separated field into trimmed, non-empty, de-duplicated entries.
pub fn split_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing.eq_ignore_ascii_case(item)) {
            items.push(item.to_string());
        }
    }
    items
}

/// Flattens validator output into `field: message` lines, sorted for stable display.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();
    messages
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub display_order: Option<u32>,
}

impl CategoryForm {
    pub fn into_data(self) -> CategoryData {
        let name = self.name.trim().to_string();
        let slug = match self.slug.trim() {
            "" => slugify(&name),
            slug => slug.to_string(),
        };
        CategoryData {
            name,
            slug,
            icon: self.icon.trim().to_string(),
            description: self.description.trim().to_string(),
            display_order: self.display_order.unwrap_or(0),
        }
    }
}

/// Inline order edit from the category list.
#[derive(Debug, Deserialize)]
pub struct CategoryOrderForm {
    pub display_order: u32,
}

#[derive(Debug, Deserialize)]
pub struct TagForm {
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl TagForm {
    pub fn into_data(self) -> TagData {
        let name = self.name.trim().to_string();
        let slug = match self.slug.trim() {
            "" => slugify(&name),
            slug => slug.to_string(),
        };
        TagData { name, slug }
    }
}

#[derive(Debug, Deserialize)]
pub struct VideoAssetForm {
    pub title: String,
    pub platform: String,
    pub external_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub uploaded_date: String,
    #[serde(default)]
    pub description: String,
}

impl VideoAssetForm {
    /// Converts the payload. Fields that cannot be parsed fall back to their
    /// defaults and are reported alongside.
    pub fn into_data(self) -> (VideoAssetData, Vec<String>) {
        let mut errors = Vec::new();

        let platform = match self.platform.parse::<Platform>() {
            Ok(platform) => platform,
            Err(e) => {
                errors.push(format!("platform: {}", e));
                Platform::default()
            }
        };

        let uploaded_date = match self.uploaded_date.trim() {
            "" => None,
            raw => match Date::parse(raw, format_description!("[year]-[month]-[day]")) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(format!("uploaded_date: {} is not a YYYY-MM-DD date", raw));
                    None
                }
            },
        };

        let data = VideoAssetData {
            title: self.title.trim().to_string(),
            platform,
            external_id: self.external_id.trim().to_string(),
            duration_seconds: self.duration_seconds,
            uploaded_date,
            description: self.description.trim().to_string(),
        };
        (data, errors)
    }
}

#[derive(Debug, Deserialize)]
pub struct TopicForm {
    pub code: String,
    pub title: String,
    pub category_id: i64,
    pub video_id: i64,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_seconds: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location_tag: Option<LocationTag>,
    pub is_published: Option<String>,
    #[serde(default)]
    pub tags: String,
}

impl TopicForm {
    /// Topic fields plus the tag names typed into the inline tag field.
    pub fn into_parts(self) -> (TopicData, Vec<String>) {
        let data = TopicData {
            code: self.code.trim().to_string(),
            title: self.title.trim().to_string(),
            category_id: self.category_id,
            video_id: self.video_id,
            start_seconds: self.start_seconds.unwrap_or(0),
            description: self.description.trim().to_string(),
            location_tag: self.location_tag,
            is_published: self.is_published.is_some(),
        };
        (data, split_list(&self.tags))
    }
}

#[derive(Debug, Deserialize)]
pub struct QuizForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub passing_score: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub time_limit_minutes: Option<u32>,
    pub is_active: Option<String>,
    #[serde(default)]
    pub topic_codes: String,
}

impl QuizForm {
    /// Quiz fields plus the topic codes it evaluates.
    pub fn into_parts(self) -> (QuizData, Vec<String>) {
        let data = QuizData {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            passing_score: self.passing_score.unwrap_or(70),
            time_limit_minutes: self.time_limit_minutes,
            is_active: self.is_active.is_some(),
        };
        (data, split_list(&self.topic_codes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn blank_category_slug_is_derived_from_name() {
        let data = CategoryForm {
            name: " Gestión de Ventas ".to_string(),
            slug: String::new(),
            icon: "fa-shopping-cart".to_string(),
            description: String::new(),
            display_order: None,
        }
        .into_data();

        assert_eq!(data.name, "Gestión de Ventas");
        assert_eq!(data.slug, "gestion-de-ventas");
        assert_eq!(data.display_order, 0);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn split_list_trims_and_dedups() {
        assert_eq!(
            split_list(" Timeout, error 505 ,,timeout, Saldo negativo"),
            vec!["Timeout", "error 505", "Saldo negativo"]
        );
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn video_form_rejects_unknown_platform_and_bad_date() {
        let (data, errors) = VideoAssetForm {
            title: "Onboarding".to_string(),
            platform: "dailymotion".to_string(),
            external_id: "x1".to_string(),
            duration_seconds: None,
            uploaded_date: "31/12/2025".to_string(),
            description: String::new(),
        }
        .into_data();

        assert_eq!(data.external_id, "x1");
        assert_eq!(data.uploaded_date, None);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("platform:"));
        assert!(errors[1].starts_with("uploaded_date:"));
    }

    #[test]
    fn quiz_form_defaults_passing_score() {
        let (data, codes) = QuizForm {
            title: "Sales basics".to_string(),
            description: String::new(),
            passing_score: None,
            time_limit_minutes: Some(15),
            is_active: Some("on".to_string()),
            topic_codes: "1.11, 1.12".to_string(),
        }
        .into_parts();

        assert_eq!(data.passing_score, 70);
        assert!(data.is_active);
        assert_eq!(codes, vec!["1.11", "1.12"]);
    }

    #[test]
    fn out_of_range_quiz_values_fail_validation() {
        let data = QuizData {
            title: "Broken".to_string(),
            description: String::new(),
            passing_score: 120,
            time_limit_minutes: Some(0),
            is_active: true,
        };
        let errors = data.validate().unwrap_err();
        let messages = validation_messages(&errors);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("passing_score"));
        assert!(messages[1].starts_with("time_limit_minutes"));
    }
}
