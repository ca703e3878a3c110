use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::info;
use validator::Validate;

use super::forms::{validation_messages, VideoAssetForm};
use super::handlers::{rejected_form, ListQuery};
use crate::app_state::AppState;
use crate::config::AdminSiteConfig;
use crate::db::repositories::VideoAssetRepository;
use crate::db::{VideoAsset, VideoAssetData, VideoAssetSummary};
use crate::error::{AppError, AppResult};
use crate::modules::html::HtmlTemplate;
use crate::video_url::Platform;

const LIST_URL: &str = "/admin/videos/";

#[derive(Template)]
#[template(path = "admin/video_list.html")]
struct VideoListTemplate {
    site: AdminSiteConfig,
    search: String,
    platform_code: String,
    platforms: &'static [Platform],
    videos: Vec<VideoAssetSummary>,
}

#[derive(Template)]
#[template(path = "admin/video_form.html")]
struct VideoFormTemplate {
    site: AdminSiteConfig,
    platforms: &'static [Platform],
    /// Stored asset, when editing.
    video: Option<VideoAsset>,
    form: VideoAssetData,
    topic_count: i64,
    errors: Vec<String>,
}

impl VideoFormTemplate {
    fn blank(site: AdminSiteConfig) -> Self {
        Self {
            site,
            platforms: Platform::all(),
            video: None,
            form: VideoAssetData::default(),
            topic_count: 0,
            errors: Vec::new(),
        }
    }
}

fn check(form: VideoAssetForm) -> (VideoAssetData, Vec<String>) {
    let (data, mut errors) = form.into_data();
    if let Err(invalid) = data.validate() {
        errors.extend(validation_messages(&invalid));
    }
    (data, errors)
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let platform = query
        .platform
        .as_deref()
        .map(str::parse::<Platform>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let videos = VideoAssetRepository::list_with_counts(&state.db, query.search(), platform).await?;

    Ok(HtmlTemplate(VideoListTemplate {
        site: state.env.admin.clone(),
        search: query.q,
        platform_code: platform.map(|p| p.code().to_string()).unwrap_or_default(),
        platforms: Platform::all(),
        videos,
    }))
}

pub async fn new_form(State(state): State<AppState>) -> impl IntoResponse {
    HtmlTemplate(VideoFormTemplate::blank(state.env.admin.clone()))
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<VideoAssetForm>,
) -> AppResult<Response> {
    let (data, errors) = check(form);
    if !errors.is_empty() {
        return Ok(rejected_form(VideoFormTemplate {
            form: data,
            errors,
            ..VideoFormTemplate::blank(state.env.admin.clone())
        }));
    }

    let mut tx = state.db.begin().await?;
    let video = VideoAssetRepository::create(&mut tx, &data).await?;
    tx.commit().await?;

    info!(video_id = video.id, platform = %video.platform, "Video asset created");
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let video = VideoAssetRepository::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video asset {}", id)))?;
    let topic_count = VideoAssetRepository::topic_count(&state.db, id).await?;

    let form = VideoAssetData {
        title: video.title.clone(),
        platform: video.platform,
        external_id: video.external_id.clone(),
        duration_seconds: video.duration_seconds,
        uploaded_date: video.uploaded_date,
        description: video.description.clone(),
    };

    Ok(HtmlTemplate(VideoFormTemplate {
        video: Some(video),
        form,
        topic_count,
        ..VideoFormTemplate::blank(state.env.admin.clone())
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<VideoAssetForm>,
) -> AppResult<Response> {
    let (data, errors) = check(form);
    if !errors.is_empty() {
        let video = VideoAssetRepository::get_by_id(&state.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video asset {}", id)))?;
        let topic_count = VideoAssetRepository::topic_count(&state.db, id).await?;
        return Ok(rejected_form(VideoFormTemplate {
            video: Some(video),
            form: data,
            topic_count,
            errors,
            ..VideoFormTemplate::blank(state.env.admin.clone())
        }));
    }

    let mut tx = state.db.begin().await?;
    VideoAssetRepository::update(&mut tx, id, &data).await?;
    tx.commit().await?;

    info!(video_id = id, "Video asset updated");
    Ok(Redirect::to(LIST_URL).into_response())
}

/// Deleting a video removes every topic pointing into it.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    VideoAssetRepository::delete(&mut tx, id).await?;
    tx.commit().await?;

    info!(video_id = id, "Video asset deleted");
    Ok(Redirect::to(LIST_URL))
}
