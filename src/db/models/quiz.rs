use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::OffsetDateTime;
use validator::Validate;

use crate::formatting;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub passing_score: u32,
    pub time_limit_minutes: Option<u32>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Quiz {
    pub fn time_limit_label(&self) -> String {
        match self.time_limit_minutes {
            Some(minutes) => format!("{minutes} min"),
            None => "No limit".to_string(),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct QuizSummary {
    #[sqlx(flatten)]
    pub quiz: Quiz,
    pub topic_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuizData {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters long"))]
    pub title: String,
    pub description: String,
    #[validate(range(max = 100, message = "Passing score is a percentage (0-100)"))]
    pub passing_score: u32,
    #[validate(range(min = 1, message = "Time limit must be at least one minute"))]
    pub time_limit_minutes: Option<u32>,
    pub is_active: bool,
}

/// Sums the known durations of the distinct videos behind a quiz's topics.
///
/// Each item is `(video_id, duration_seconds)`; a video shared by several
/// topics counts once and unknown durations count as zero.
pub fn total_duration_seconds<I>(videos: I) -> u64
where
    I: IntoIterator<Item = (i64, Option<u32>)>,
{
    let mut seen = HashSet::new();
    videos
        .into_iter()
        .filter(|(video_id, _)| seen.insert(*video_id))
        .filter_map(|(_, duration)| duration)
        .map(u64::from)
        .sum()
}

/// Admin rendering of [`total_duration_seconds`].
pub fn estimated_duration_label(total_seconds: u64) -> String {
    formatting::estimated_duration(total_seconds).unwrap_or_else(|| "Not calculated".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_durations_contribute_nothing() {
        let total = total_duration_seconds([(1, Some(120)), (2, None), (3, Some(300))]);
        assert_eq!(total, 420);
    }

    #[test]
    fn shared_videos_count_once() {
        let total = total_duration_seconds([(1, Some(120)), (1, Some(120)), (2, Some(60))]);
        assert_eq!(total, 180);
    }

    #[test]
    fn empty_quiz_is_not_calculated() {
        assert_eq!(total_duration_seconds(Vec::new()), 0);
        assert_eq!(estimated_duration_label(0), "Not calculated");
        assert_eq!(estimated_duration_label(3900), "1h 5m");
    }
}
