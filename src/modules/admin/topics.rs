use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::info;
use validator::Validate;

use super::forms::{validation_messages, TopicForm};
use super::handlers::{rejected_form, ListQuery};
use crate::app_state::AppState;
use crate::config::AdminSiteConfig;
use crate::db::repositories::{
    CategoryRepository, TagRepository, TopicFilter, TopicRepository, VideoAssetRepository,
};
use crate::db::{Category, LocationTag, Topic, TopicData, TopicListing, VideoAsset};
use crate::error::{AppError, AppResult};
use crate::formatting::preview_list;
use crate::modules::html::HtmlTemplate;

const LIST_URL: &str = "/admin/topics/";
const PREVIEW_TAGS: usize = 3;

struct TopicRow {
    topic: TopicListing,
    tag_summary: String,
}

#[derive(Template)]
#[template(path = "admin/topic_list.html")]
struct TopicListTemplate {
    site: AdminSiteConfig,
    search: String,
    /// Selected filter values; `0` and `""` mean "any".
    category_id: i64,
    location_code: String,
    published_code: String,
    categories: Vec<Category>,
    locations: &'static [LocationTag],
    topics: Vec<TopicRow>,
}

#[derive(Template)]
#[template(path = "admin/topic_form.html")]
struct TopicFormTemplate {
    site: AdminSiteConfig,
    categories: Vec<Category>,
    videos: Vec<VideoAsset>,
    locations: &'static [LocationTag],
    /// Stored topic, when editing.
    topic: Option<Topic>,
    form: TopicData,
    tags: String,
    embed_url: Option<String>,
    prev_topic: Option<Topic>,
    next_topic: Option<Topic>,
    errors: Vec<String>,
}

impl TopicFormTemplate {
    /// Loads the pickers and, for a stored topic, its preview and neighbours.
    async fn load(
        state: &AppState,
        topic: Option<Topic>,
        form: TopicData,
        tags: String,
        errors: Vec<String>,
    ) -> AppResult<Self> {
        let db = &state.db;
        let categories = CategoryRepository::list(db).await?;
        let videos = VideoAssetRepository::list(db).await?;

        let (embed_url, prev_topic, next_topic) = match &topic {
            Some(topic) => {
                let embed_url = VideoAssetRepository::get_by_id(db, topic.video_id)
                    .await?
                    .map(|video| video.embed_url(Some(topic.start_seconds)));
                (
                    embed_url,
                    TopicRepository::previous(db, &topic.code).await?,
                    TopicRepository::next(db, &topic.code).await?,
                )
            }
            None => (None, None, None),
        };

        Ok(Self {
            site: state.env.admin.clone(),
            categories,
            videos,
            locations: LocationTag::all(),
            topic,
            form,
            tags,
            embed_url,
            prev_topic,
            next_topic,
            errors,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let location = query
        .location
        .as_deref()
        .map(str::parse::<LocationTag>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let filter = TopicFilter {
        search: query.search().map(str::to_string),
        category_id: query.category,
        location,
        is_published: query.published,
    };
    let listings = TopicRepository::list_filtered(&state.db, &filter).await?;
    let mut tag_names = TopicRepository::tag_names_by_topic(&state.db).await?;

    let topics = listings
        .into_iter()
        .map(|topic| {
            let names = tag_names.remove(&topic.id).unwrap_or_default();
            let tag_summary = preview_list(&names, PREVIEW_TAGS, names.len());
            TopicRow { topic, tag_summary }
        })
        .collect();

    Ok(HtmlTemplate(TopicListTemplate {
        site: state.env.admin.clone(),
        search: query.q,
        category_id: query.category.unwrap_or(0),
        location_code: location.map(|l| l.code().to_string()).unwrap_or_default(),
        published_code: query.published.map(|p| p.to_string()).unwrap_or_default(),
        categories: CategoryRepository::list(&state.db).await?,
        locations: LocationTag::all(),
        topics,
    }))
}

pub async fn new_form(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let form = TopicData {
        is_published: true,
        ..TopicData::default()
    };
    Ok(HtmlTemplate(
        TopicFormTemplate::load(&state, None, form, String::new(), Vec::new()).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<TopicForm>,
) -> AppResult<Response> {
    let tags_field = form.tags.clone();
    let (data, tag_names) = form.into_parts();
    if let Err(errors) = data.validate() {
        let template = TopicFormTemplate::load(
            &state,
            None,
            data,
            tags_field,
            validation_messages(&errors),
        )
        .await?;
        return Ok(rejected_form(template));
    }

    let mut tx = state.db.begin().await?;
    let topic = TopicRepository::create(&mut tx, &data).await?;
    let tags = TagRepository::find_or_create_by_names(&mut tx, &tag_names).await?;
    let tag_ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
    TopicRepository::set_tags(&mut tx, topic.id, &tag_ids).await?;
    tx.commit().await?;

    info!(topic_id = topic.id, code = %topic.code, tags = tag_ids.len(), "Topic created");
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let topic = TopicRepository::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Topic {}", id)))?;
    let tags = TopicRepository::tags_for(&state.db, id)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect::<Vec<_>>()
        .join(", ");

    let form = TopicData {
        code: topic.code.clone(),
        title: topic.title.clone(),
        category_id: topic.category_id,
        video_id: topic.video_id,
        start_seconds: topic.start_seconds,
        description: topic.description.clone(),
        location_tag: topic.location_tag,
        is_published: topic.is_published,
    };

    Ok(HtmlTemplate(
        TopicFormTemplate::load(&state, Some(topic), form, tags, Vec::new()).await?,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<TopicForm>,
) -> AppResult<Response> {
    let tags_field = form.tags.clone();
    let (data, tag_names) = form.into_parts();
    if let Err(errors) = data.validate() {
        let topic = TopicRepository::get_by_id(&state.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Topic {}", id)))?;
        let template = TopicFormTemplate::load(
            &state,
            Some(topic),
            data,
            tags_field,
            validation_messages(&errors),
        )
        .await?;
        return Ok(rejected_form(template));
    }

    let mut tx = state.db.begin().await?;
    let topic = TopicRepository::update(&mut tx, id, &data).await?;
    let tags = TagRepository::find_or_create_by_names(&mut tx, &tag_names).await?;
    let tag_ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
    TopicRepository::set_tags(&mut tx, topic.id, &tag_ids).await?;
    tx.commit().await?;

    info!(topic_id = id, code = %topic.code, "Topic updated");
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn toggle_published(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    let is_published = TopicRepository::toggle_published(&mut tx, id).await?;
    tx.commit().await?;

    info!(topic_id = id, is_published, "Topic visibility toggled");
    Ok(Redirect::to(LIST_URL))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    TopicRepository::delete(&mut tx, id).await?;
    tx.commit().await?;

    info!(topic_id = id, "Topic deleted");
    Ok(Redirect::to(LIST_URL))
}
