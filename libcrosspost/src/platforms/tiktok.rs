//! TikTok connector
//!
//! Publishes videos via pull-from-URL direct post. A video media item is
//! a hard precondition; its absence fails before any network call.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PlatformError, Result};
use crate::platforms::{map_api_error, map_transport_error, resolve_media_url, Connector};
use crate::types::{Identity, Platform, PlatformCredential, SocialPost};

pub const TIKTOK_API_BASE: &str = "https://open.tiktokapis.com";

pub struct TiktokConnector {
    http: reqwest::Client,
    api_base: String,
    public_url: String,
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    data: PublishData,
}

#[derive(Debug, Deserialize)]
struct PublishData {
    publish_id: String,
}

impl TiktokConnector {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self::with_api_base(public_url, TIKTOK_API_BASE)
    }

    pub fn with_api_base(public_url: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            public_url: public_url.into(),
        }
    }
}

#[async_trait]
impl Connector for TiktokConnector {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    async fn publish(
        &self,
        post: &SocialPost,
        credential: &PlatformCredential,
        _options: &serde_json::Value,
    ) -> Result<String> {
        let video = post.media.iter().find(|m| m.is_video()).ok_or_else(|| {
            PlatformError::Validation("TikTok posts require a video".to_string())
        })?;

        let body = serde_json::json!({
            "post_info": {
                "title": post.content,
                "privacy_level": "PUBLIC_TO_EVERYONE"
            },
            "source_info": {
                "source": "PULL_FROM_URL",
                "video_url": resolve_media_url(&self.public_url, &video.url)
            }
        });

        let response = self
            .http
            .post(format!("{}/v2/post/publish/video/init/", self.api_base))
            .bearer_auth(&credential.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Tiktok, "publish", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(Platform::Tiktok, "publish", status, &body).into());
        }

        let published: PublishResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Tiktok, "publish", e))?;

        Ok(published.data.publish_id)
    }

    async fn validate_token(&self, credential: &PlatformCredential) -> Result<Identity> {
        let response = self
            .http
            .get(format!("{}/v2/user/info/", self.api_base))
            .bearer_auth(&credential.access_token)
            .query(&[("fields", "open_id,display_name")])
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Tiktok, "validate token", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(Platform::Tiktok, "validate token", status, &body).into());
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Tiktok, "validate token", e))?;

        let open_id = payload
            .pointer("/data/user/open_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                PlatformError::Authentication(
                    "TikTok user info response missing open_id".to_string(),
                )
            })?;

        Ok(Identity {
            id: open_id.to_string(),
            name: payload
                .pointer("/data/user/display_name")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }
}
