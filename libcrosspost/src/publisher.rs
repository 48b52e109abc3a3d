//! Multi-platform publish orchestration
//!
//! Fans one post out to every requested platform concurrently. Each
//! platform is an isolated failure domain: one connector failing, hanging,
//! or rejecting content never affects the others, and the aggregate report
//! partitions every requested platform into exactly one of success or
//! failure.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::{CrosspostError, PlatformError, Result};
use crate::registry::ConnectionRegistry;
use crate::store::PostStore;
use crate::types::{Platform, PublishOutcome, PublishReport, SocialPost};
use crate::validator;

/// One post's entry in a bulk publish response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEntry {
    pub id: String,
    #[serde(flatten)]
    pub report: PublishReport,
}

/// Aggregate outcome of a bulk publish request.
///
/// `successful` and `failed` are counts on the wire; the id lists say
/// which post landed where. A post id counts as failed when it cannot
/// be loaded or when its publish attempt produced no successful
/// platform outcome.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub successful: usize,
    pub failed: usize,
    pub successful_ids: Vec<String>,
    pub failed_ids: Vec<String>,
    pub results: Vec<BulkEntry>,
}

pub struct Publisher {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn PostStore>,
    call_timeout: Duration,
}

impl Publisher {
    pub fn new(registry: Arc<ConnectionRegistry>, store: Arc<dyn PostStore>) -> Self {
        let timeout_secs = registry.config().publish.timeout_secs;
        Self {
            registry,
            store,
            call_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Publish a post to every platform it targets, concurrently.
    ///
    /// An empty platform set is a request-level error: no connector is
    /// invoked and the report carries a single unattributed error entry.
    pub async fn publish_post(&self, post: &SocialPost) -> PublishReport {
        if post.platforms.is_empty() {
            return PublishReport::request_error("No platforms selected");
        }

        let attempts: Vec<_> = post
            .platforms
            .iter()
            .map(|&platform| self.publish_to_platform(post, platform))
            .collect();

        let mut report = PublishReport::new();
        for outcome in join_all(attempts).await {
            report.record(outcome);
        }

        info!(
            post_id = %post.id,
            successful = report.successful.len(),
            failed = report.failed.len(),
            "publish fan-out complete"
        );
        report
    }

    /// Load a post by id and publish it.
    ///
    /// # Errors
    ///
    /// Returns `CrosspostError::PostNotFound` when no post has that id.
    pub async fn publish_post_by_id(&self, id: &str) -> Result<(SocialPost, PublishReport)> {
        let post = self
            .store
            .get_post(id)
            .await?
            .ok_or_else(|| CrosspostError::PostNotFound(id.to_string()))?;
        let report = self.publish_post(&post).await;
        Ok((post, report))
    }

    /// Publish a batch of posts by id, isolating failures per post.
    ///
    /// Entries are dispatched concurrently. A post that cannot be loaded,
    /// or whose publish attempt succeeds on no platform, counts as failed;
    /// the rest of the batch proceeds.
    pub async fn bulk_publish(&self, ids: &[String]) -> BulkReport {
        let attempts: Vec<_> = ids
            .iter()
            .map(|id| async move { (id.clone(), self.publish_post_by_id(id).await) })
            .collect();

        let mut bulk = BulkReport::default();
        for (id, entry) in join_all(attempts).await {
            let report = match entry {
                Ok((_, report)) => report,
                Err(e) => {
                    warn!(post_id = %id, error = %e, "bulk publish entry failed");
                    PublishReport::request_error(e.to_string())
                }
            };
            if report.any_success() {
                bulk.successful_ids.push(id.clone());
            } else {
                bulk.failed_ids.push(id.clone());
            }
            bulk.results.push(BulkEntry { id, report });
        }
        bulk.successful = bulk.successful_ids.len();
        bulk.failed = bulk.failed_ids.len();
        bulk
    }

    /// One platform's publish attempt, reduced to an outcome.
    ///
    /// Content rules are enforced here, immediately before the connector
    /// call, so an invalid post for one platform becomes that platform's
    /// failure without touching the others.
    async fn publish_to_platform(&self, post: &SocialPost, platform: Platform) -> PublishOutcome {
        let violations = validator::validate_for_platform(post, platform);
        if !violations.is_empty() {
            let message = violations
                .iter()
                .map(|v| v.message.clone())
                .collect::<Vec<_>>()
                .join("; ");
            return PublishOutcome::failure(platform, message);
        }

        let connector = match self.registry.connector_for(platform) {
            Some(c) => c,
            None => {
                return PublishOutcome::failure(
                    platform,
                    PlatformError::Unsupported(platform).to_string(),
                )
            }
        };

        if !self.registry.is_enabled(platform) {
            return PublishOutcome::failure(
                platform,
                PlatformError::NotConfigured(format!("{} is not enabled", platform)).to_string(),
            );
        }

        let credential = match self.registry.credential_for(platform) {
            Ok(c) => c,
            Err(e) => return PublishOutcome::failure(platform, e.to_string()),
        };

        let options = post.options_for(platform);
        match timeout(
            self.call_timeout,
            connector.publish(post, &credential, &options),
        )
        .await
        {
            Ok(Ok(remote_post_id)) => {
                info!(post_id = %post.id, %platform, %remote_post_id, "published");
                PublishOutcome::success(platform, remote_post_id)
            }
            Ok(Err(e)) => {
                warn!(post_id = %post.id, %platform, error = %e, "publish failed");
                PublishOutcome::failure(platform, e.to_string())
            }
            Err(_) => {
                let e = PlatformError::Timeout(format!(
                    "{} publish exceeded {}s",
                    platform,
                    self.call_timeout.as_secs()
                ));
                warn!(post_id = %post.id, %platform, error = %e, "publish timed out");
                PublishOutcome::failure(platform, e.to_string())
            }
        }
    }
}
