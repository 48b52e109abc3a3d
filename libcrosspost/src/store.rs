//! Post persistence
//!
//! `PostStore` is the seam the publisher and lifecycle coordinator work
//! against; `SqliteStore` is the sqlx-backed implementation. Collection
//! fields are JSON-encoded text columns.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, StoreError};
use crate::types::{MediaRef, Platform, PostStatus, PublishFailure, SocialPost};

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, post: &SocialPost) -> Result<()>;

    async fn get_post(&self, id: &str) -> Result<Option<SocialPost>>;

    /// Record the outcome of a publish attempt.
    ///
    /// `published_at` is stamped only when the attempt reached at least one
    /// platform; `errors` replaces the previous attempt's error list.
    async fn update_post_status(
        &self,
        id: &str,
        status: PostStatus,
        published_at: Option<i64>,
        errors: &[PublishFailure],
    ) -> Result<()>;

    /// Move a post into the scheduled state with its target time.
    async fn schedule_post(&self, id: &str, scheduled_at: i64, timezone: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at the given path and run
    /// migrations.
    pub async fn new(db_path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::IoError)?;
        }

        // mode=rwc creates the database file if it doesn't exist
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));
        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(StoreError::SqlxError)?;

        Self::with_pool(pool).await
    }

    /// In-memory database for tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(StoreError::SqlxError)?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::MigrationError)?;
        Ok(Self { pool })
    }

    fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> std::result::Result<SocialPost, StoreError> {
        let media: Vec<MediaRef> = serde_json::from_str(&row.get::<String, _>("media"))?;
        let platforms_raw: Vec<String> =
            serde_json::from_str(&row.get::<String, _>("platforms"))?;
        // Rows written before a platform was dropped would fail FromStr;
        // the closed enum makes that a decode error rather than silence.
        let platforms = platforms_raw
            .iter()
            .map(|s| Platform::from_str(s))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                StoreError::EncodingError(serde::de::Error::custom(e))
            })?;
        let platform_options: HashMap<Platform, serde_json::Value> =
            serde_json::from_str(&row.get::<String, _>("platform_options"))?;
        let publish_errors: Vec<PublishFailure> =
            serde_json::from_str(&row.get::<String, _>("publish_errors"))?;
        let status = PostStatus::from_str(&row.get::<String, _>("status"))
            .map_err(|e| StoreError::EncodingError(serde::de::Error::custom(e)))?;

        Ok(SocialPost {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            media,
            platforms,
            platform_options,
            campaign: row.get("campaign"),
            status,
            created_at: row.get("created_at"),
            scheduled_at: row.get("scheduled_at"),
            timezone: row.get("timezone"),
            published_at: row.get("published_at"),
            publish_errors,
        })
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn create_post(&self, post: &SocialPost) -> Result<()> {
        let media = serde_json::to_string(&post.media).map_err(StoreError::EncodingError)?;
        let platforms = serde_json::to_string(
            &post
                .platforms
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>(),
        )
        .map_err(StoreError::EncodingError)?;
        let platform_options =
            serde_json::to_string(&post.platform_options).map_err(StoreError::EncodingError)?;
        let publish_errors =
            serde_json::to_string(&post.publish_errors).map_err(StoreError::EncodingError)?;

        sqlx::query(
            r#"
            INSERT INTO posts (
                id, title, content, media, platforms, platform_options,
                campaign, status, created_at, scheduled_at, timezone,
                published_at, publish_errors
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(media)
        .bind(platforms)
        .bind(platform_options)
        .bind(&post.campaign)
        .bind(post.status.as_str())
        .bind(post.created_at)
        .bind(post.scheduled_at)
        .bind(&post.timezone)
        .bind(post.published_at)
        .bind(publish_errors)
        .execute(&self.pool)
        .await
        .map_err(StoreError::SqlxError)?;

        Ok(())
    }

    async fn get_post(&self, id: &str) -> Result<Option<SocialPost>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, media, platforms, platform_options,
                   campaign, status, created_at, scheduled_at, timezone,
                   published_at, publish_errors
            FROM posts WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::SqlxError)?;

        match row {
            Some(r) => Ok(Some(Self::row_to_post(&r)?)),
            None => Ok(None),
        }
    }

    async fn update_post_status(
        &self,
        id: &str,
        status: PostStatus,
        published_at: Option<i64>,
        errors: &[PublishFailure],
    ) -> Result<()> {
        let publish_errors =
            serde_json::to_string(errors).map_err(StoreError::EncodingError)?;

        sqlx::query(
            r#"
            UPDATE posts
            SET status = ?, published_at = ?, publish_errors = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(published_at)
        .bind(publish_errors)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::SqlxError)?;

        Ok(())
    }

    async fn schedule_post(&self, id: &str, scheduled_at: i64, timezone: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET status = ?, scheduled_at = ?, timezone = ?
            WHERE id = ?
            "#,
        )
        .bind(PostStatus::Scheduled.as_str())
        .bind(scheduled_at)
        .bind(timezone)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::SqlxError)?;

        Ok(())
    }
}
