//! LinkedIn connector
//!
//! Publishes member shares through the UGC posts endpoint. The author URN
//! comes from the per-post options or the configured credential; when
//! neither is present it is derived from the token's own identity.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::platforms::{map_api_error, map_transport_error, Connector};
use crate::types::{Identity, Platform, PlatformCredential, SocialPost};

pub const LINKEDIN_API_BASE: &str = "https://api.linkedin.com";

pub struct LinkedinConnector {
    http: reqwest::Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct ShareResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
}

impl LinkedinConnector {
    pub fn new() -> Self {
        Self::with_api_base(LINKEDIN_API_BASE)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    async fn author_urn(
        &self,
        credential: &PlatformCredential,
        options: &serde_json::Value,
    ) -> Result<String> {
        if let Some(urn) = options.get("authorUrn").and_then(|v| v.as_str()) {
            return Ok(urn.to_string());
        }
        if let Some(urn) = &credential.target_id {
            return Ok(urn.clone());
        }
        let identity = self.validate_token(credential).await?;
        Ok(format!("urn:li:person:{}", identity.id))
    }
}

impl Default for LinkedinConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for LinkedinConnector {
    fn platform(&self) -> Platform {
        Platform::Linkedin
    }

    async fn publish(
        &self,
        post: &SocialPost,
        credential: &PlatformCredential,
        options: &serde_json::Value,
    ) -> Result<String> {
        let author = self.author_urn(credential, options).await?;

        let body = serde_json::json!({
            "author": author,
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": post.content },
                    "shareMediaCategory": "NONE"
                }
            },
            "visibility": {
                "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
            }
        });

        let response = self
            .http
            .post(format!("{}/v2/ugcPosts", self.api_base))
            .bearer_auth(&credential.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Linkedin, "publish", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(Platform::Linkedin, "publish", status, &body).into());
        }

        let share: ShareResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Linkedin, "publish", e))?;

        Ok(share.id)
    }

    async fn validate_token(&self, credential: &PlatformCredential) -> Result<Identity> {
        let response = self
            .http
            .get(format!("{}/v2/userinfo", self.api_base))
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Linkedin, "validate token", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                map_api_error(Platform::Linkedin, "validate token", status, &body).into(),
            );
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Linkedin, "validate token", e))?;

        Ok(Identity {
            id: info.sub,
            name: info.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_publish_share_with_configured_urn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .and(header("authorization", "Bearer li-token"))
            .and(body_string_contains("urn:li:person:77"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "urn:li:share:600"
            })))
            .mount(&server)
            .await;

        let connector = LinkedinConnector::with_api_base(server.uri());
        let credential = PlatformCredential::new("li-token").with_target("urn:li:person:77");
        let id = connector
            .publish(
                &SocialPost::new("t", "professional update"),
                &credential,
                &serde_json::Value::Null,
            )
            .await
            .unwrap();
        assert_eq!(id, "urn:li:share:600");
    }

    #[tokio::test]
    async fn test_publish_derives_urn_from_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "abc123", "name": "Member"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .and(body_string_contains("urn:li:person:abc123"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "urn:li:share:601"
            })))
            .mount(&server)
            .await;

        let connector = LinkedinConnector::with_api_base(server.uri());
        let id = connector
            .publish(
                &SocialPost::new("t", "c"),
                &PlatformCredential::new("li-token"),
                &serde_json::Value::Null,
            )
            .await
            .unwrap();
        assert_eq!(id, "urn:li:share:601");
    }

    #[tokio::test]
    async fn test_validate_token_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/userinfo"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Expired access token"
            })))
            .mount(&server)
            .await;

        let connector = LinkedinConnector::with_api_base(server.uri());
        let err = connector
            .validate_token(&PlatformCredential::new("li-token"))
            .await
            .unwrap_err();
        assert!(format!("{}", err).contains("Expired access token"));
    }
}
