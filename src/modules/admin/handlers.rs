use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::config::AdminSiteConfig;
use crate::db::repositories::{
    CategoryRepository, QuizRepository, TagRepository, TopicRepository, VideoAssetRepository,
};
use crate::error::AppResult;
use crate::modules::html::HtmlTemplate;

use super::forms::empty_as_none;

/// Query string shared by the admin list pages. Filters an entity does not
/// support are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub active: Option<bool>,
}

impl ListQuery {
    pub fn search(&self) -> Option<&str> {
        Some(self.q.trim()).filter(|q| !q.is_empty())
    }
}

/// Re-renders a form that failed validation.
pub(super) fn rejected_form<T: Template>(template: T) -> Response {
    (StatusCode::BAD_REQUEST, HtmlTemplate(template)).into_response()
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
struct DashboardTemplate {
    site: AdminSiteConfig,
    category_count: i64,
    video_count: i64,
    topic_count: i64,
    published_count: i64,
    tag_count: i64,
    quiz_count: i64,
}

pub async fn admin_dashboard(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let db = &state.db;

    Ok(HtmlTemplate(DashboardTemplate {
        site: state.env.admin.clone(),
        category_count: CategoryRepository::count(db).await?,
        video_count: VideoAssetRepository::count(db).await?,
        topic_count: TopicRepository::count(db).await?,
        published_count: TopicRepository::count_published(db).await?,
        tag_count: TagRepository::count(db).await?,
        quiz_count: QuizRepository::count(db).await?,
    }))
}
