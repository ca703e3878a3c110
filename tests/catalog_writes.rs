mod common;

use common::TopicSeed;
use kb_catalog::db::repositories::{
    CategoryRepository, QuizRepository, TagRepository, TopicRepository, VideoAssetRepository,
};
use kb_catalog::db::{estimated_duration_label, CategoryData, DatabaseError, QuizData, VideoAssetData};
use kb_catalog::video_url::Platform;

async fn row_count(pool: &sqlx::SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn deleting_a_category_removes_its_topics_and_links() {
    let pool = common::pool().await;
    let sales = common::category(&pool, "Sales", "sales").await;
    let stock = common::category(&pool, "Stock", "stock").await;
    let video = common::video(&pool, "abc123", Some(600)).await;

    let opening = common::topic(
        &pool,
        &sales,
        &video,
        TopicSeed::new("1.1", "Opening").tagged(&["Cash"]),
    )
    .await;
    let receiving = common::topic(&pool, &stock, &video, TopicSeed::new("2.1", "Receiving")).await;
    let quiz = common::quiz(&pool, "Basics", &[&opening, &receiving]).await;

    let mut tx = pool.begin().await.unwrap();
    CategoryRepository::delete(&mut tx, sales.id).await.unwrap();
    tx.commit().await.unwrap();

    assert!(TopicRepository::get_by_id(&pool, opening.id).await.unwrap().is_none());
    assert_eq!(row_count(&pool, "topic_tags").await, 0);
    assert_eq!(
        QuizRepository::topic_codes(&pool, quiz.id).await.unwrap(),
        vec!["2.1"]
    );
    // The tag itself survives.
    assert_eq!(TagRepository::count(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn deleting_a_video_removes_its_topics() {
    let pool = common::pool().await;
    let sales = common::category(&pool, "Sales", "sales").await;
    let video = common::video(&pool, "abc123", None).await;
    common::topic(&pool, &sales, &video, TopicSeed::new("1.1", "Opening")).await;

    let mut tx = pool.begin().await.unwrap();
    VideoAssetRepository::delete(&mut tx, video.id).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(TopicRepository::count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_codes_and_slugs_are_rejected() {
    let pool = common::pool().await;
    let sales = common::category(&pool, "Sales", "sales").await;
    let video = common::video(&pool, "abc123", None).await;
    common::topic(&pool, &sales, &video, TopicSeed::new("1.1", "Opening")).await;

    let mut tx = pool.begin().await.unwrap();
    let duplicate = CategoryRepository::create(
        &mut tx,
        &CategoryData {
            name: "Sales again".to_string(),
            slug: "sales".to_string(),
            ..CategoryData::default()
        },
    )
    .await;
    assert!(matches!(duplicate, Err(DatabaseError::Duplicate(_))));
    drop(tx);

    let mut tx = pool.begin().await.unwrap();
    let duplicate = VideoAssetRepository::create(
        &mut tx,
        &VideoAssetData {
            title: "Same recording".to_string(),
            platform: Platform::Youtube,
            external_id: "abc123".to_string(),
            ..VideoAssetData::default()
        },
    )
    .await;
    assert!(matches!(duplicate, Err(DatabaseError::Duplicate(_))));
    drop(tx);

    // Same external id on another platform is a different asset.
    let mut tx = pool.begin().await.unwrap();
    VideoAssetRepository::create(
        &mut tx,
        &VideoAssetData {
            title: "Vimeo copy".to_string(),
            platform: Platform::Vimeo,
            external_id: "abc123".to_string(),
            ..VideoAssetData::default()
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn out_of_range_passing_score_violates_the_schema() {
    let pool = common::pool().await;

    let mut tx = pool.begin().await.unwrap();
    let result = QuizRepository::create(
        &mut tx,
        &QuizData {
            title: "Broken".to_string(),
            passing_score: 101,
            ..QuizData::default()
        },
    )
    .await;
    assert!(matches!(result, Err(DatabaseError::InvalidInput(_))));
}

#[tokio::test]
async fn tags_are_matched_case_insensitively_and_created_on_demand() {
    let pool = common::pool().await;
    let sales = common::category(&pool, "Sales", "sales").await;
    let video = common::video(&pool, "abc123", None).await;
    let first = common::topic(
        &pool,
        &sales,
        &video,
        TopicSeed::new("1.1", "Opening").tagged(&["Timeout"]),
    )
    .await;
    let second = common::topic(
        &pool,
        &sales,
        &video,
        TopicSeed::new("1.2", "Closing").tagged(&["timeout", "Saldo negativo"]),
    )
    .await;

    let tags = TagRepository::list(&pool).await.unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Saldo negativo", "Timeout"]);
    assert_eq!(tags[0].slug, "saldo-negativo");

    let shared = tags.iter().find(|t| t.name == "Timeout").unwrap();
    assert_eq!(TagRepository::topic_count(&pool, shared.id).await.unwrap(), 2);
    assert_eq!(
        TagRepository::topic_codes(&pool, shared.id, 5).await.unwrap(),
        vec!["1.1", "1.2"]
    );

    let names = TopicRepository::tag_names_by_topic(&pool).await.unwrap();
    assert_eq!(names[&first.id], vec!["Timeout"]);
    assert_eq!(names[&second.id], vec!["Saldo negativo", "Timeout"]);
}

#[tokio::test]
async fn quiz_duration_counts_each_video_once() {
    let pool = common::pool().await;
    let sales = common::category(&pool, "Sales", "sales").await;
    let short = common::video(&pool, "short", Some(120)).await;
    let unknown = common::video(&pool, "unknown", None).await;
    let long = common::video(&pool, "long", Some(300)).await;

    let a = common::topic(&pool, &sales, &short, TopicSeed::new("1.1", "A")).await;
    let b = common::topic(&pool, &sales, &short, TopicSeed::new("1.2", "B").at(60)).await;
    let c = common::topic(&pool, &sales, &unknown, TopicSeed::new("1.3", "C")).await;
    let d = common::topic(&pool, &sales, &long, TopicSeed::new("1.4", "D")).await;
    let quiz = common::quiz(&pool, "Sales basics", &[&a, &b, &c, &d]).await;

    let total = QuizRepository::total_duration_seconds(&pool, quiz.id).await.unwrap();
    assert_eq!(total, 420);
    assert_eq!(estimated_duration_label(total), "7m");

    let empty = common::quiz(&pool, "Empty", &[]).await;
    let total = QuizRepository::total_duration_seconds(&pool, empty.id).await.unwrap();
    assert_eq!(estimated_duration_label(total), "Not calculated");
    assert!(QuizRepository::topic_codes(&pool, empty.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn active_quizzes_are_listed_for_their_topics() {
    let pool = common::pool().await;
    let sales = common::category(&pool, "Sales", "sales").await;
    let video = common::video(&pool, "abc123", None).await;
    let topic = common::topic(&pool, &sales, &video, TopicSeed::new("1.1", "Opening")).await;
    let active = common::quiz(&pool, "Active", &[&topic]).await;
    let inactive = common::quiz(&pool, "Retired", &[&topic]).await;

    let mut tx = pool.begin().await.unwrap();
    let is_active = QuizRepository::toggle_active(&mut tx, inactive.id).await.unwrap();
    tx.commit().await.unwrap();
    assert!(!is_active);

    let quizzes = QuizRepository::active_for_topic(&pool, topic.id).await.unwrap();
    let ids: Vec<i64> = quizzes.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![active.id]);
}

#[tokio::test]
async fn toggling_publication_hides_a_topic() {
    let pool = common::pool().await;
    let sales = common::category(&pool, "Sales", "sales").await;
    let video = common::video(&pool, "abc123", None).await;
    let topic = common::topic(&pool, &sales, &video, TopicSeed::new("1.1", "Opening")).await;

    let mut tx = pool.begin().await.unwrap();
    let published = TopicRepository::toggle_published(&mut tx, topic.id).await.unwrap();
    tx.commit().await.unwrap();

    assert!(!published);
    assert!(TopicRepository::get_published_by_code(&pool, "1.1")
        .await
        .unwrap()
        .is_none());
    assert_eq!(TopicRepository::count_published(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_a_missing_row_is_not_found() {
    let pool = common::pool().await;

    let mut tx = pool.begin().await.unwrap();
    let result = TagRepository::delete(&mut tx, 42).await;
    assert!(matches!(result, Err(DatabaseError::NotFound)));
}
