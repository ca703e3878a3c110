use axum::{routing::get, Router};

use super::handlers::{category_list, course_mode, home, search, topic_detail};
use crate::app_state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/topic/{code}/", get(topic_detail))
        .route("/category/{slug}/", get(category_list))
        .route("/search/", get(search))
        .route("/course/", get(course_mode))
}
