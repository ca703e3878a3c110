mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::TopicSeed;
use kb_catalog::app::create_router;
use kb_catalog::app_state::AppState;
use kb_catalog::config::Config;
use kb_catalog::db::repositories::{CategoryRepository, QuizRepository, TopicRepository};
use kb_catalog::middleware::tracing::REQUEST_ID_HEADER;

fn router(pool: &sqlx::SqlitePool) -> Router {
    create_router(AppState::new(pool.clone(), Config::for_tests()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_form(app: Router, uri: &str, body: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Sales category, one video and three topics, the middle one hidden.
async fn seeded() -> sqlx::SqlitePool {
    let pool = common::pool().await;
    let sales = common::category(&pool, "Sales", "sales").await;
    let video = common::video(&pool, "abc123", Some(3600)).await;
    common::topic(
        &pool,
        &sales,
        &video,
        TopicSeed::new("1.1", "Opening the register").at(125).tagged(&["Cash"]),
    )
    .await;
    common::topic(&pool, &sales, &video, TopicSeed::new("1.2", "Unreleased draft").hidden()).await;
    common::topic(&pool, &sales, &video, TopicSeed::new("1.3", "Closing the day").at(1690)).await;
    pool
}

#[tokio::test]
async fn home_lists_recent_topics_and_categories() {
    let pool = seeded().await;

    let (status, body) = get(router(&pool), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Opening the register"));
    assert!(body.contains("Closing the day"));
    assert!(body.contains("Sales"));
    assert!(!body.contains("Unreleased draft"));
}

#[tokio::test]
async fn topic_detail_shows_timestamp_and_neighbours() {
    let pool = seeded().await;

    let (status, body) = get(router(&pool), "/topic/1.3/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("28:10"));
    assert!(body.contains("Opening the register"));
    assert!(!body.contains("Unreleased draft"));
}

#[tokio::test]
async fn unpublished_or_unknown_topic_is_404() {
    let pool = seeded().await;

    let (status, _) = get(router(&pool), "/topic/1.2/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(router(&pool), "/topic/9.9/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_page_is_paginated_and_404s_when_unknown() {
    let pool = seeded().await;

    let (status, body) = get(router(&pool), "/category/sales/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Closing the day"));

    let (status, _) = get(router(&pool), "/category/sales/?page=last").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(router(&pool), "/category/sales/?page=2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(router(&pool), "/category/unknown/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_search_renders_an_empty_page() {
    let pool = seeded().await;

    let (status, body) = get(router(&pool), "/search/?q=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No topics found."));

    let (status, body) = get(router(&pool), "/search/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No topics found."));
}

#[tokio::test]
async fn search_matches_tag_names() {
    let pool = seeded().await;

    let (status, body) = get(router(&pool), "/search/?q=cash").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("1 result(s)"));
    assert!(body.contains("Opening the register"));
    assert!(!body.contains("Closing the day"));
}

#[tokio::test]
async fn course_mode_lists_published_topics() {
    let pool = seeded().await;

    let (status, body) = get(router(&pool), "/course/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Opening the register"));
    assert!(body.contains("Closing the day"));
    assert!(!body.contains("Unreleased draft"));
}

#[tokio::test]
async fn health_reports_database_status() {
    let pool = common::pool().await;

    let response = router(&pool)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["services"]["database"], "healthy");
}

#[tokio::test]
async fn admin_dashboard_uses_configured_labels() {
    let pool = seeded().await;

    let (status, body) = get(router(&pool), "/admin/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Administration Panel"));
    assert!(body.contains("KB Admin"));
}

#[tokio::test]
async fn admin_creates_category_with_derived_slug() {
    let pool = common::pool().await;

    let response = post_form(
        router(&pool),
        "/admin/categories/new",
        "name=Gesti%C3%B3n+de+Ventas&slug=&icon=fa-cart&description=&display_order=",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/admin/categories/"
    );

    let category = CategoryRepository::get_by_slug(&pool, "gestion-de-ventas")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(category.name, "Gestión de Ventas");
    assert_eq!(category.display_order, 0);
}

#[tokio::test]
async fn admin_rejects_invalid_and_duplicate_categories() {
    let pool = seeded().await;

    let response = post_form(router(&pool), "/admin/categories/new", "name=&slug=Bad+Slug").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_form(router(&pool), "/admin/categories/new", "name=Sales&slug=sales").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_edits_category_order_from_the_list() {
    let pool = seeded().await;
    let sales = CategoryRepository::get_by_slug(&pool, "sales")
        .await
        .unwrap()
        .unwrap();

    let (_, body) = get(router(&pool), "/admin/categories/").await;
    assert!(body.contains(&format!("/admin/categories/{}/order", sales.id)));

    let uri = format!("/admin/categories/{}/order", sales.id);
    let response = post_form(router(&pool), &uri, "display_order=7").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/categories/");

    let sales = CategoryRepository::get_by_id(&pool, sales.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sales.display_order, 7);
    assert_eq!(sales.name, "Sales");

    let response = post_form(router(&pool), "/admin/categories/999/order", "display_order=1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_topic_form_creates_tags_inline() {
    let pool = common::pool().await;
    let sales = common::category(&pool, "Sales", "sales").await;
    let video = common::video(&pool, "abc123", None).await;

    let body = format!(
        "code=1.11&title=Card+payment&category_id={}&video_id={}&start_seconds=125\
         &description=&location_tag=checkout&is_published=on&tags=Timeout%2C+Cash%2C+timeout",
        sales.id, video.id
    );
    let response = post_form(router(&pool), "/admin/topics/new", &body).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let topic = TopicRepository::get_published_by_code(&pool, "1.11")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(topic.start_seconds, 125);
    assert_eq!(topic.location_label(), "Checkout");

    let tags = TopicRepository::tags_for(&pool, topic.id).await.unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Cash", "Timeout"]);
}

#[tokio::test]
async fn admin_quiz_form_rejects_unknown_topic_codes() {
    let pool = seeded().await;

    let response = post_form(
        router(&pool),
        "/admin/quizzes/new",
        "title=Sales+basics&passing_score=80&topic_codes=1.1%2C+7.7&is_active=on",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(QuizRepository::count(&pool).await.unwrap(), 0);

    let response = post_form(
        router(&pool),
        "/admin/quizzes/new",
        "title=Sales+basics&passing_score=80&topic_codes=1.3%2C+1.1&is_active=on",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let quizzes = QuizRepository::list_with_counts(&pool, None, Some(true))
        .await
        .unwrap();
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].topic_count, 2);
    assert_eq!(
        QuizRepository::topic_codes(&pool, quizzes[0].quiz.id).await.unwrap(),
        vec!["1.1", "1.3"]
    );
}

#[tokio::test]
async fn admin_toggle_hides_topic_from_public_pages() {
    let pool = seeded().await;
    let topic = TopicRepository::get_published_by_code(&pool, "1.1")
        .await
        .unwrap()
        .unwrap();

    let uri = format!("/admin/topics/{}/toggle-published", topic.id);
    let response = post_form(router(&pool), &uri, "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (status, _) = get(router(&pool), "/topic/1.1/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_lists_render_computed_columns() {
    let pool = seeded().await;

    let (status, body) = get(router(&pool), "/admin/topics/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("02:05"));
    assert!(body.contains("Unreleased draft"));

    let (status, body) = get(router(&pool), "/admin/topics/?published=false").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Unreleased draft"));
    assert!(!body.contains("Closing the day"));

    let (status, _) = get(router(&pool), "/admin/videos/?platform=vimeo").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(router(&pool), "/admin/videos/?platform=dailymotion").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(router(&pool), "/admin/tags/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Cash"));
}

#[tokio::test]
async fn static_assets_are_served() {
    let pool = common::pool().await;

    let (status, body) = get(router(&pool), "/static/app.css").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("site-header"));
}
