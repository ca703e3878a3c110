use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::info;
use validator::Validate;

use super::forms::{validation_messages, QuizForm};
use super::handlers::{rejected_form, ListQuery};
use crate::app_state::AppState;
use crate::config::AdminSiteConfig;
use crate::db::repositories::{QuizRepository, TopicRepository};
use crate::db::{estimated_duration_label, Quiz, QuizData, QuizSummary, Topic};
use crate::error::{AppError, AppResult};
use crate::modules::html::HtmlTemplate;

const LIST_URL: &str = "/admin/quizzes/";

#[derive(Template)]
#[template(path = "admin/quiz_list.html")]
struct QuizListTemplate {
    site: AdminSiteConfig,
    search: String,
    active_code: String,
    quizzes: Vec<QuizSummary>,
}

#[derive(Template)]
#[template(path = "admin/quiz_form.html")]
struct QuizFormTemplate {
    site: AdminSiteConfig,
    /// Stored quiz, when editing.
    quiz: Option<Quiz>,
    form: QuizData,
    topic_codes: String,
    assigned_codes: Vec<String>,
    duration_label: String,
    errors: Vec<String>,
}

impl QuizFormTemplate {
    async fn load(
        state: &AppState,
        quiz: Option<Quiz>,
        form: QuizData,
        topic_codes: Option<String>,
        errors: Vec<String>,
    ) -> AppResult<Self> {
        let (assigned_codes, total_seconds) = match &quiz {
            Some(quiz) => (
                QuizRepository::topic_codes(&state.db, quiz.id).await?,
                QuizRepository::total_duration_seconds(&state.db, quiz.id).await?,
            ),
            None => (Vec::new(), 0),
        };

        Ok(Self {
            site: state.env.admin.clone(),
            quiz,
            form,
            topic_codes: topic_codes.unwrap_or_else(|| assigned_codes.join(", ")),
            assigned_codes,
            duration_label: estimated_duration_label(total_seconds),
            errors,
        })
    }
}

/// Validates the quiz fields and resolves the typed topic codes.
///
/// Every code must name an existing topic.
async fn check(
    state: &AppState,
    data: &QuizData,
    codes: &[String],
) -> AppResult<(Vec<Topic>, Vec<String>)> {
    let mut errors = match data.validate() {
        Ok(()) => Vec::new(),
        Err(invalid) => validation_messages(&invalid),
    };

    let topics = TopicRepository::get_by_codes(&state.db, codes).await?;
    let unknown: Vec<&str> = codes
        .iter()
        .filter(|code| !topics.iter().any(|t| &t.code == *code))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        errors.push(format!("topic_codes: unknown topic codes {}", unknown.join(", ")));
    }

    Ok((topics, errors))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let quizzes = QuizRepository::list_with_counts(&state.db, query.search(), query.active).await?;

    Ok(HtmlTemplate(QuizListTemplate {
        site: state.env.admin.clone(),
        search: query.q,
        active_code: query.active.map(|a| a.to_string()).unwrap_or_default(),
        quizzes,
    }))
}

pub async fn new_form(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let form = QuizData {
        passing_score: 70,
        is_active: true,
        ..QuizData::default()
    };
    Ok(HtmlTemplate(
        QuizFormTemplate::load(&state, None, form, None, Vec::new()).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<QuizForm>,
) -> AppResult<Response> {
    let codes_field = form.topic_codes.clone();
    let (data, codes) = form.into_parts();
    let (topics, errors) = check(&state, &data, &codes).await?;
    if !errors.is_empty() {
        let template =
            QuizFormTemplate::load(&state, None, data, Some(codes_field), errors).await?;
        return Ok(rejected_form(template));
    }

    let topic_ids: Vec<i64> = topics.iter().map(|t| t.id).collect();
    let mut tx = state.db.begin().await?;
    let quiz = QuizRepository::create(&mut tx, &data).await?;
    QuizRepository::set_topics(&mut tx, quiz.id, &topic_ids).await?;
    tx.commit().await?;

    info!(quiz_id = quiz.id, topics = topic_ids.len(), "Quiz created");
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let quiz = QuizRepository::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz {}", id)))?;

    let form = QuizData {
        title: quiz.title.clone(),
        description: quiz.description.clone(),
        passing_score: quiz.passing_score,
        time_limit_minutes: quiz.time_limit_minutes,
        is_active: quiz.is_active,
    };

    Ok(HtmlTemplate(
        QuizFormTemplate::load(&state, Some(quiz), form, None, Vec::new()).await?,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<QuizForm>,
) -> AppResult<Response> {
    let codes_field = form.topic_codes.clone();
    let (data, codes) = form.into_parts();
    let (topics, errors) = check(&state, &data, &codes).await?;
    if !errors.is_empty() {
        let quiz = QuizRepository::get_by_id(&state.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz {}", id)))?;
        let template =
            QuizFormTemplate::load(&state, Some(quiz), data, Some(codes_field), errors).await?;
        return Ok(rejected_form(template));
    }

    let topic_ids: Vec<i64> = topics.iter().map(|t| t.id).collect();
    let mut tx = state.db.begin().await?;
    QuizRepository::update(&mut tx, id, &data).await?;
    QuizRepository::set_topics(&mut tx, id, &topic_ids).await?;
    tx.commit().await?;

    info!(quiz_id = id, topics = topic_ids.len(), "Quiz updated");
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn toggle_active(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    let is_active = QuizRepository::toggle_active(&mut tx, id).await?;
    tx.commit().await?;

    info!(quiz_id = id, is_active, "Quiz activation toggled");
    Ok(Redirect::to(LIST_URL))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    QuizRepository::delete(&mut tx, id).await?;
    tx.commit().await?;

    info!(quiz_id = id, "Quiz deleted");
    Ok(Redirect::to(LIST_URL))
}
