use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::info;
use validator::Validate;

use super::forms::{validation_messages, CategoryForm, CategoryOrderForm};
use super::handlers::{rejected_form, ListQuery};
use crate::app_state::AppState;
use crate::config::AdminSiteConfig;
use crate::db::repositories::CategoryRepository;
use crate::db::{CategoryData, CategorySummary};
use crate::error::{AppError, AppResult};
use crate::modules::html::HtmlTemplate;

const LIST_URL: &str = "/admin/categories/";

#[derive(Template)]
#[template(path = "admin/category_list.html")]
struct CategoryListTemplate {
    site: AdminSiteConfig,
    search: String,
    categories: Vec<CategorySummary>,
}

#[derive(Template)]
#[template(path = "admin/category_form.html")]
struct CategoryFormTemplate {
    site: AdminSiteConfig,
    category_id: Option<i64>,
    form: CategoryData,
    topic_count: i64,
    errors: Vec<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let categories = CategoryRepository::list_with_counts(&state.db, query.search()).await?;

    Ok(HtmlTemplate(CategoryListTemplate {
        site: state.env.admin.clone(),
        search: query.q,
        categories,
    }))
}

pub async fn new_form(State(state): State<AppState>) -> impl IntoResponse {
    HtmlTemplate(CategoryFormTemplate {
        site: state.env.admin.clone(),
        category_id: None,
        form: CategoryData::default(),
        topic_count: 0,
        errors: Vec::new(),
    })
}

pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> AppResult<Response> {
    let data = form.into_data();
    if let Err(errors) = data.validate() {
        return Ok(rejected_form(CategoryFormTemplate {
            site: state.env.admin.clone(),
            category_id: None,
            form: data,
            topic_count: 0,
            errors: validation_messages(&errors),
        }));
    }

    let mut tx = state.db.begin().await?;
    let category = CategoryRepository::create(&mut tx, &data).await?;
    tx.commit().await?;

    info!(category_id = category.id, slug = %category.slug, "Category created");
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepository::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {}", id)))?;
    let topic_count = CategoryRepository::topic_count(&state.db, id).await?;

    Ok(HtmlTemplate(CategoryFormTemplate {
        site: state.env.admin.clone(),
        category_id: Some(category.id),
        form: CategoryData {
            name: category.name,
            slug: category.slug,
            icon: category.icon,
            description: category.description,
            display_order: category.display_order,
        },
        topic_count,
        errors: Vec::new(),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CategoryForm>,
) -> AppResult<Response> {
    let data = form.into_data();
    if let Err(errors) = data.validate() {
        let topic_count = CategoryRepository::topic_count(&state.db, id).await?;
        return Ok(rejected_form(CategoryFormTemplate {
            site: state.env.admin.clone(),
            category_id: Some(id),
            form: data,
            topic_count,
            errors: validation_messages(&errors),
        }));
    }

    let mut tx = state.db.begin().await?;
    CategoryRepository::update(&mut tx, id, &data).await?;
    tx.commit().await?;

    info!(category_id = id, "Category updated");
    Ok(Redirect::to(LIST_URL).into_response())
}

pub async fn reorder(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CategoryOrderForm>,
) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    CategoryRepository::set_display_order(&mut tx, id, form.display_order).await?;
    tx.commit().await?;

    info!(category_id = id, display_order = form.display_order, "Category reordered");
    Ok(Redirect::to(LIST_URL))
}

/// Deleting a category removes its topics too.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let mut tx = state.db.begin().await?;
    CategoryRepository::delete(&mut tx, id).await?;
    tx.commit().await?;

    info!(category_id = id, "Category deleted");
    Ok(Redirect::to(LIST_URL))
}
