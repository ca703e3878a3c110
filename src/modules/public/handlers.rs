use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::debug;

use crate::app_state::AppState;
use crate::db::repositories::{
    CategoryRepository, QuizRepository, TopicRepository, VideoAssetRepository, RECENT_LIMIT,
};
use crate::db::{Category, Page, PageQuery, Quiz, Tag, Topic, TopicListing, VideoAsset};
use crate::error::{AppError, AppResult};
use crate::modules::html::HtmlTemplate;

#[derive(Template)]
#[template(path = "public/home.html")]
struct HomeTemplate {
    app_name: String,
    recent_topics: Vec<TopicListing>,
    categories: Vec<Category>,
}

/// Landing page: latest topics and the category index.
pub async fn home(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let recent_topics = TopicRepository::recent(&state.db, RECENT_LIMIT).await?;
    let categories = CategoryRepository::list(&state.db).await?;

    Ok(HtmlTemplate(HomeTemplate {
        app_name: state.env.app.name.clone(),
        recent_topics,
        categories,
    }))
}

#[derive(Template)]
#[template(path = "public/topic_detail.html")]
struct TopicDetailTemplate {
    app_name: String,
    topic: Topic,
    category: Category,
    video: VideoAsset,
    tags: Vec<Tag>,
    prev_topic: Option<Topic>,
    next_topic: Option<Topic>,
    quizzes: Vec<Quiz>,
    watch_url: String,
    embed_url: String,
}

/// Topic player page with course navigation and the quizzes that cover it.
pub async fn topic_detail(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let topic = TopicRepository::get_published_by_code(&state.db, &code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Topic {}", code)))?;

    let category = CategoryRepository::get_by_id(&state.db, topic.category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category of topic {}", code)))?;
    let video = VideoAssetRepository::get_by_id(&state.db, topic.video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video of topic {}", code)))?;

    let tags = TopicRepository::tags_for(&state.db, topic.id).await?;
    let prev_topic = TopicRepository::previous(&state.db, &topic.code).await?;
    let next_topic = TopicRepository::next(&state.db, &topic.code).await?;
    let quizzes = QuizRepository::active_for_topic(&state.db, topic.id).await?;

    let watch_url = video.watch_url(Some(topic.start_seconds));
    let embed_url = video.embed_url(Some(topic.start_seconds));

    Ok(HtmlTemplate(TopicDetailTemplate {
        app_name: state.env.app.name.clone(),
        topic,
        category,
        video,
        tags,
        prev_topic,
        next_topic,
        quizzes,
        watch_url,
        embed_url,
    }))
}

#[derive(Template)]
#[template(path = "public/category_list.html")]
struct CategoryListTemplate {
    app_name: String,
    category: Category,
    all_categories: Vec<Category>,
    page: Page<TopicListing>,
}

/// Library mode: one category's topics, by code.
pub async fn category_list(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepository::get_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {}", slug)))?;

    let page = TopicRepository::by_category(&state.db, category.id, query.page.as_deref()).await?;
    let all_categories = CategoryRepository::list(&state.db).await?;

    Ok(HtmlTemplate(CategoryListTemplate {
        app_name: state.env.app.name.clone(),
        category,
        all_categories,
        page,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

#[derive(Template)]
#[template(path = "public/search_results.html")]
struct SearchResultsTemplate {
    app_name: String,
    query: String,
    total_results: i64,
    page: Page<TopicListing>,
}

/// Substring search over titles, codes, descriptions and tag names.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<impl IntoResponse> {
    let query = params.q.unwrap_or_default().trim().to_string();
    let page = TopicRepository::search(&state.db, &query, params.page.as_deref()).await?;
    debug!(query = %query, total = page.total, "Search executed");

    Ok(HtmlTemplate(SearchResultsTemplate {
        app_name: state.env.app.name.clone(),
        total_results: page.total,
        query,
        page,
    }))
}

#[derive(Template)]
#[template(path = "public/course_mode.html")]
struct CourseModeTemplate {
    app_name: String,
    total_topics: i64,
    page: Page<TopicListing>,
}

/// Course mode: the whole published catalog in sequence.
pub async fn course_mode(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = TopicRepository::course(&state.db, query.page.as_deref()).await?;

    Ok(HtmlTemplate(CourseModeTemplate {
        app_name: state.env.app.name.clone(),
        total_topics: page.total,
        page,
    }))
}
