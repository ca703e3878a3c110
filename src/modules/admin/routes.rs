use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::admin_dashboard;
use super::{categories, quizzes, tags, topics, videos};
use crate::app_state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_dashboard))
        .route("/admin/", get(admin_dashboard))
        .route("/admin/categories/", get(categories::list))
        .route(
            "/admin/categories/new",
            get(categories::new_form).post(categories::create),
        )
        .route(
            "/admin/categories/{id}/",
            get(categories::edit_form).post(categories::update),
        )
        .route("/admin/categories/{id}/order", post(categories::reorder))
        .route("/admin/categories/{id}/delete", post(categories::delete))
        .route("/admin/videos/", get(videos::list))
        .route("/admin/videos/new", get(videos::new_form).post(videos::create))
        .route("/admin/videos/{id}/", get(videos::edit_form).post(videos::update))
        .route("/admin/videos/{id}/delete", post(videos::delete))
        .route("/admin/topics/", get(topics::list))
        .route("/admin/topics/new", get(topics::new_form).post(topics::create))
        .route("/admin/topics/{id}/", get(topics::edit_form).post(topics::update))
        .route(
            "/admin/topics/{id}/toggle-published",
            post(topics::toggle_published),
        )
        .route("/admin/topics/{id}/delete", post(topics::delete))
        .route("/admin/tags/", get(tags::list))
        .route("/admin/tags/new", get(tags::new_form).post(tags::create))
        .route("/admin/tags/{id}/", get(tags::edit_form).post(tags::update))
        .route("/admin/tags/{id}/delete", post(tags::delete))
        .route("/admin/quizzes/", get(quizzes::list))
        .route("/admin/quizzes/new", get(quizzes::new_form).post(quizzes::create))
        .route("/admin/quizzes/{id}/", get(quizzes::edit_form).post(quizzes::update))
        .route("/admin/quizzes/{id}/toggle-active", post(quizzes::toggle_active))
        .route("/admin/quizzes/{id}/delete", post(quizzes::delete))
}
