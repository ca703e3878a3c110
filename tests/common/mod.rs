#![allow(dead_code)]

use kb_catalog::config::DatabaseConfig;
use kb_catalog::db::repositories::{
    CategoryRepository, QuizRepository, TagRepository, TopicRepository, VideoAssetRepository,
};
use kb_catalog::db::{
    self, Category, CategoryData, Quiz, QuizData, Topic, TopicData, VideoAsset, VideoAssetData,
};
use kb_catalog::video_url::Platform;
use sqlx::SqlitePool;

/// Fresh in-memory database with the schema applied.
pub async fn pool() -> SqlitePool {
    db::init_pool(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database")
}

pub async fn category(pool: &SqlitePool, name: &str, slug: &str) -> Category {
    let mut tx = pool.begin().await.unwrap();
    let category = CategoryRepository::create(
        &mut tx,
        &CategoryData {
            name: name.to_string(),
            slug: slug.to_string(),
            ..CategoryData::default()
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    category
}

pub async fn video(pool: &SqlitePool, external_id: &str, duration_seconds: Option<u32>) -> VideoAsset {
    let mut tx = pool.begin().await.unwrap();
    let video = VideoAssetRepository::create(
        &mut tx,
        &VideoAssetData {
            title: format!("Recording {external_id}"),
            platform: Platform::Youtube,
            external_id: external_id.to_string(),
            duration_seconds,
            ..VideoAssetData::default()
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    video
}

pub struct TopicSeed<'a> {
    pub code: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub start_seconds: u32,
    pub is_published: bool,
    pub tags: &'a [&'a str],
}

impl<'a> TopicSeed<'a> {
    pub fn new(code: &'a str, title: &'a str) -> Self {
        Self {
            code,
            title,
            description: "",
            start_seconds: 0,
            is_published: true,
            tags: &[],
        }
    }

    pub fn hidden(mut self) -> Self {
        self.is_published = false;
        self
    }

    pub fn at(mut self, start_seconds: u32) -> Self {
        self.start_seconds = start_seconds;
        self
    }

    pub fn described(mut self, description: &'a str) -> Self {
        self.description = description;
        self
    }

    pub fn tagged(mut self, tags: &'a [&'a str]) -> Self {
        self.tags = tags;
        self
    }
}

pub async fn topic(
    pool: &SqlitePool,
    category: &Category,
    video: &VideoAsset,
    seed: TopicSeed<'_>,
) -> Topic {
    let mut tx = pool.begin().await.unwrap();
    let topic = TopicRepository::create(
        &mut tx,
        &TopicData {
            code: seed.code.to_string(),
            title: seed.title.to_string(),
            category_id: category.id,
            video_id: video.id,
            start_seconds: seed.start_seconds,
            description: seed.description.to_string(),
            location_tag: None,
            is_published: seed.is_published,
        },
    )
    .await
    .unwrap();

    let names: Vec<String> = seed.tags.iter().map(|t| t.to_string()).collect();
    let tags = TagRepository::find_or_create_by_names(&mut tx, &names)
        .await
        .unwrap();
    let tag_ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
    TopicRepository::set_tags(&mut tx, topic.id, &tag_ids)
        .await
        .unwrap();

    tx.commit().await.unwrap();
    topic
}

pub async fn quiz(pool: &SqlitePool, title: &str, topics: &[&Topic]) -> Quiz {
    let mut tx = pool.begin().await.unwrap();
    let quiz = QuizRepository::create(
        &mut tx,
        &QuizData {
            title: title.to_string(),
            passing_score: 70,
            is_active: true,
            ..QuizData::default()
        },
    )
    .await
    .unwrap();
    let topic_ids: Vec<i64> = topics.iter().map(|t| t.id).collect();
    QuizRepository::set_topics(&mut tx, quiz.id, &topic_ids)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    quiz
}
