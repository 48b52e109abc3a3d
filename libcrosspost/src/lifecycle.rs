//! Post lifecycle coordination
//!
//! Thin layer over the post store that owns status transitions. The
//! publisher reports outcomes; this module decides what they mean for the
//! post record and performs the single status write.

use std::sync::Arc;

use tracing::info;

use crate::error::{CrosspostError, Result};
use crate::store::PostStore;
use crate::types::{PostStatus, PublishReport, SocialPost};

pub struct Lifecycle {
    store: Arc<dyn PostStore>,
}

impl Lifecycle {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn create_post(&self, post: &SocialPost) -> Result<()> {
        self.store.create_post(post).await
    }

    /// Fetch a post, treating a missing id as an error.
    pub async fn get_post(&self, id: &str) -> Result<SocialPost> {
        self.store
            .get_post(id)
            .await?
            .ok_or_else(|| CrosspostError::PostNotFound(id.to_string()))
    }

    /// Record the outcome of a publish attempt on the post.
    ///
    /// Any successful platform makes the post published (partial success
    /// is a terminal success state); only a fully failed attempt marks it
    /// failed. Per-platform errors are persisted either way.
    pub async fn record_publish(&self, id: &str, report: &PublishReport) -> Result<SocialPost> {
        let (status, published_at) = if report.any_success() {
            (PostStatus::Published, Some(chrono::Utc::now().timestamp()))
        } else {
            (PostStatus::Failed, None)
        };

        self.store
            .update_post_status(id, status, published_at, &report.errors)
            .await?;
        info!(post_id = %id, status = status.as_str(), "post status updated");

        self.get_post(id).await
    }

    /// Schedule a post for later publication.
    ///
    /// The timezone defaults to UTC when the caller does not supply one.
    /// Only the schedule write happens here; triggering the publish at the
    /// scheduled time is an external concern.
    pub async fn schedule_post(
        &self,
        id: &str,
        scheduled_at: i64,
        timezone: Option<&str>,
    ) -> Result<SocialPost> {
        // Fail early on unknown ids so the write never silently no-ops
        self.get_post(id).await?;

        let tz = timezone.unwrap_or("UTC");
        self.store.schedule_post(id, scheduled_at, tz).await?;
        info!(post_id = %id, scheduled_at, timezone = tz, "post scheduled");

        self.get_post(id).await
    }
}
