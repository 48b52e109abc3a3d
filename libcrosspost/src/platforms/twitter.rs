//! Twitter connector
//!
//! Publishes tweets through the v2 API with a bearer token.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::platforms::{map_api_error, map_transport_error, Connector};
use crate::types::{Identity, Platform, PlatformCredential, SocialPost};

pub const TWITTER_API_BASE: &str = "https://api.twitter.com";

pub struct TwitterConnector {
    http: reqwest::Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

impl TwitterConnector {
    pub fn new() -> Self {
        Self::with_api_base(TWITTER_API_BASE)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }
}

impl Default for TwitterConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for TwitterConnector {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn publish(
        &self,
        post: &SocialPost,
        credential: &PlatformCredential,
        _options: &serde_json::Value,
    ) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/2/tweets", self.api_base))
            .bearer_auth(&credential.access_token)
            .json(&serde_json::json!({ "text": post.content }))
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Twitter, "publish", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(Platform::Twitter, "publish", status, &body).into());
        }

        let tweet: TweetResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Twitter, "publish", e))?;

        Ok(tweet.data.id)
    }

    async fn validate_token(&self, credential: &PlatformCredential) -> Result<Identity> {
        let response = self
            .http
            .get(format!("{}/2/users/me", self.api_base))
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Twitter, "validate token", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(Platform::Twitter, "validate token", status, &body).into());
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Twitter, "validate token", e))?;

        Ok(Identity {
            id: user.data.id,
            name: user.data.name,
        })
    }
}
