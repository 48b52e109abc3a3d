//! Instagram connector
//!
//! Publishes through the Facebook Graph API in two steps: create a media
//! container for the image or video, then publish the container. Requires
//! at least one media item and an IG business user id; the access token is
//! the Facebook one.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PlatformError, Result};
use crate::platforms::facebook::FACEBOOK_API_BASE;
use crate::platforms::{map_api_error, map_transport_error, resolve_media_url, Connector};
use crate::types::{Identity, Platform, PlatformCredential, SocialPost};

pub struct InstagramConnector {
    http: reqwest::Client,
    api_base: String,
    public_url: String,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

impl InstagramConnector {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self::with_api_base(public_url, FACEBOOK_API_BASE)
    }

    pub fn with_api_base(public_url: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            public_url: public_url.into(),
        }
    }

    async fn graph_post(
        &self,
        context: &str,
        endpoint: String,
        params: &[(&str, String)],
    ) -> Result<String> {
        let response = self
            .http
            .post(endpoint)
            .form(params)
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Instagram, context, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(Platform::Instagram, context, status, &body).into());
        }

        let payload: IdResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Instagram, context, e))?;

        Ok(payload.id)
    }
}

#[async_trait]
impl Connector for InstagramConnector {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn publish(
        &self,
        post: &SocialPost,
        credential: &PlatformCredential,
        _options: &serde_json::Value,
    ) -> Result<String> {
        let ig_user_id = credential.target_id.as_deref().ok_or_else(|| {
            PlatformError::NotConfigured(
                "Instagram business user id not configured".to_string(),
            )
        })?;

        let media = post.media.first().ok_or_else(|| {
            PlatformError::Validation(
                "Instagram posts require at least one image or video".to_string(),
            )
        })?;

        let media_url = resolve_media_url(&self.public_url, &media.url);
        let mut params: Vec<(&str, String)> = vec![
            ("caption", post.content.clone()),
            ("access_token", credential.access_token.clone()),
        ];
        if media.is_video() {
            params.push(("media_type", "REELS".to_string()));
            params.push(("video_url", media_url));
        } else {
            params.push(("image_url", media_url));
        }

        let container_id = self
            .graph_post(
                "create container",
                format!("{}/{}/media", self.api_base, ig_user_id),
                &params,
            )
            .await?;

        self.graph_post(
            "publish container",
            format!("{}/{}/media_publish", self.api_base, ig_user_id),
            &[
                ("creation_id", container_id),
                ("access_token", credential.access_token.clone()),
            ],
        )
        .await
    }

    async fn validate_token(&self, credential: &PlatformCredential) -> Result<Identity> {
        let response = self
            .http
            .get(format!("{}/me", self.api_base))
            .query(&[
                ("access_token", credential.access_token.as_str()),
                ("fields", "id,name"),
            ])
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Instagram, "validate token", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                map_api_error(Platform::Instagram, "validate token", status, &body).into(),
            );
        }

        let identity: Identity = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Instagram, "validate token", e))?;

        Ok(identity)
    }
}
