//! YouTube connector
//!
//! Publishes videos through the Data API v3. Like TikTok, a video media
//! item is a hard precondition. Ingestion is pull-based: the resolved
//! video URL is handed to the API alongside the snippet metadata.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PlatformError, Result};
use crate::platforms::{map_api_error, map_transport_error, resolve_media_url, Connector};
use crate::types::{Identity, Platform, PlatformCredential, SocialPost};

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

pub struct YoutubeConnector {
    http: reqwest::Client,
    api_base: String,
    public_url: String,
}

#[derive(Debug, Deserialize)]
struct VideoResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelEntry>,
}

#[derive(Debug, Deserialize)]
struct ChannelEntry {
    id: String,
}

impl YoutubeConnector {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self::with_api_base(public_url, YOUTUBE_API_BASE)
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
impl Connector for YoutubeConnector {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn publish(
        &self,
        post: &SocialPost,
        credential: &PlatformCredential,
        _options: &serde_json::Value,
    ) -> Result<String> {
        let video = post.media.iter().find(|m| m.is_video()).ok_or_else(|| {
            PlatformError::Validation("YouTube posts require a video".to_string())
        })?;

        let body = serde_json::json!({
            "snippet": {
                "title": post.title,
                "description": post.content
            },
            "status": { "privacyStatus": "public" },
            "sourceUrl": resolve_media_url(&self.public_url, &video.url)
        });

        let response = self
            .http
            .post(format!("{}/videos", self.api_base))
            .query(&[("part", "snippet,status")])
            .bearer_auth(&credential.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Youtube, "publish", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(Platform::Youtube, "publish", status, &body).into());
        }

        let published: VideoResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Youtube, "publish", e))?;

        Ok(published.id)
    }

    async fn validate_token(&self, credential: &PlatformCredential) -> Result<Identity> {
        let response = self
            .http
            .get(format!("{}/channels", self.api_base))
            .query(&[("part", "id"), ("mine", "true")])
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Youtube, "validate token", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                map_api_error(Platform::Youtube, "validate token", status, &body).into(),
            );
        }

        let channels: ChannelListResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Youtube, "validate token", e))?;

        let channel = channels.items.first().ok_or_else(|| {
            PlatformError::Authentication(
                "No YouTube channel associated with this token".to_string(),
            )
        })?;

        Ok(Identity {
            id: channel.id.clone(),
            name: None,
        })
    }
}
