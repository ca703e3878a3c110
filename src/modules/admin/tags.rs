use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::info;
use validator::Validate;

use super::forms::{validation_messages, TagForm};
use super::handlers::{rejected_form, ListQuery};
use crate::app_state::AppState;
use crate::config::AdminSiteConfig;
use crate::db::repositories::TagRepository;
use crate::db::{TagData, TagSummary};
use crate::error::{AppError, AppResult};
use crate::formatting::preview_list;
use crate::modules::html::HtmlTemplate;

const LIST_URL: &str = "/admin/tags/";
const PREVIEW_CODES: usize = 5;

/// A tag list row with the codes of the first topics carrying it.
struct TagRow {
    summary: TagSummary,
    topics_preview: String,
}

#[derive(Template)]
#[template(path = "admin/tag_list.html")]
struct TagListTemplate {
    site: AdminSiteConfig,
    search: String,
    tags: Vec<TagRow>,
}

#[derive(Template)]
#[template(path = "admin/tag_form.html")]
struct TagFormTemplate {
    site: AdminSiteConfig,
    tag_id: Option<i64>,
    form: TagData,
    topic_count: i64,
    topics_preview: String,
    errors: Vec<String>,
}

async fn topics_preview(state: &AppState, tag_id: i64, total: i64) -> AppResult<String> {
    let codes = TagRepository::topic_codes(&state.db, tag_id, PREVIEW_CODES as i64).await?;
    Ok(preview_list(&codes, PREVIEW_CODES, total.max(0) as usize))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let summaries = TagRepository::list_with_counts(&state.db, query.search()).await?;

    let mut tags = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let topics_preview = topics_preview(&state, summary.tag.id, summary.topic_count).await?;
        tags.push(TagRow {
            summary,
            topics_preview,
        });
    }

    Ok(HtmlTemplate(TagListTemplate {
        site: state.env.admin.clone(),
        search: query.q,
        tags,
    }))
}

pub async fn new_form(State(state): State<AppState>) -> impl IntoResponse {
    HtmlTemplate(TagFormTemplate {
        site: state.env.admin.clone(),
        tag_id: None,
        form: TagData::default(),
        topic_count: 0,
        topics_preview: String::new(),
        errors: Vec::new(),
    })
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<TagForm>,
) -> AppResult<Response> {
    let data = form.into_data();
    if let Err(errors) = data.validate() {
        return Ok(rejected_form(TagFormTemplate {
            site: state.env.admin.clone(),
            tag_id: None,
            form: data,
            topic_count: 0,
            topics_preview: String::new(),
            errors: validation_messages(&errors),
        }));
    }

    let mut tx = state.db.begin().await?;
    let tag = TagRepository::create(&mut tx, &data).await?;
    tx.commit().await?;

    info!(tag_id = tag.id, name = %tag.name, "Tag created");
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let tag = TagRepository::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag {}", id)))?;
    let topic_count = TagRepository::topic_count(&state.db, id).await?;
    let topics_preview = topics_preview(&state, id, topic_count).await?;

    Ok(HtmlTemplate(TagFormTemplate {
        site: state.env.admin.clone(),
        tag_id: Some(tag.id),
        form: TagData {
            name: tag.name,
            slug: tag.slug,
        },
        topic_count,
        topics_preview,
        errors: Vec::new(),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<TagForm>,
) -> AppResult<Response> {
    let data = form.into_data();
    if let Err(errors) = data.validate() {
        let topic_count = TagRepository::topic_count(&state.db, id).await?;
        let topics_preview = topics_preview(&state, id, topic_count).await?;
        return Ok(rejected_form(TagFormTemplate {
            site: state.env.admin.clone(),
            tag_id: Some(id),
            form: data,
            topic_count,
            topics_preview,
            errors: validation_messages(&errors),
        }));
    }

    let mut tx = state.db.begin().await?;
    TagRepository::update(&mut tx, id, &data).await?;
    tx.commit().await?;

    info!(tag_id = id, "Tag updated");
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    TagRepository::delete(&mut tx, id).await?;
    tx.commit().await?;

    info!(tag_id = id, "Tag deleted");
    Ok(Redirect::to(LIST_URL))
}
