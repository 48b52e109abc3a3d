//! Facebook connector
//!
//! Publishes page posts through the Facebook Graph API. Media handling:
//! a single image goes to the photo endpoint, a single video to the video
//! endpoint, and multiple images upload only the first image (multi-image
//! albums are unsupported). Without media the post lands on the page feed,
//! optionally carrying a link.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PlatformError, Result};
use crate::platforms::{map_api_error, map_transport_error, resolve_media_url, Connector};
use crate::types::{Identity, Platform, PlatformCredential, PostAnalytics, SocialPost};

pub const FACEBOOK_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Insight metrics requested from the Graph API for post analytics.
const ANALYTICS_METRICS: &str =
    "post_impressions,post_engaged_users,post_clicks,post_reactions_by_type_total";

pub struct FacebookConnector {
    http: reqwest::Client,
    api_base: String,
    public_url: String,
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    data: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    id: String,
}

impl FacebookConnector {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self::with_api_base(public_url, FACEBOOK_API_BASE)
    }

    /// Create a connector pointed at a non-default API base (for tests).
    pub fn with_api_base(public_url: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            public_url: public_url.into(),
        }
    }

    /// Resolve the first page owned by the authenticated identity.
    async fn default_page_id(&self, access_token: &str) -> Result<String> {
        let response = self
            .http
            .get(format!("{}/me/accounts", self.api_base))
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Facebook, "list pages", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(Platform::Facebook, "list pages", status, &body).into());
        }

        let accounts: AccountsResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Facebook, "list pages", e))?;

        accounts
            .data
            .first()
            .map(|page| page.id.clone())
            .ok_or_else(|| {
                PlatformError::Publish("No Facebook pages found for this account".to_string())
                    .into()
            })
    }

    async fn post_to_endpoint(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<String> {
        let response = self
            .http
            .post(endpoint)
            .form(params)
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Facebook, "publish", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(Platform::Facebook, "publish", status, &body).into());
        }

        let published: PublishResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Facebook, "publish", e))?;

        Ok(published.id)
    }

    /// Fetch canonical analytics for a published post.
    ///
    /// Metrics absent in the insights response stay at zero.
    pub async fn post_analytics(
        &self,
        remote_post_id: &str,
        credential: &PlatformCredential,
    ) -> Result<PostAnalytics> {
        let response = self
            .http
            .get(format!("{}/{}/insights", self.api_base, remote_post_id))
            .query(&[
                ("access_token", credential.access_token.as_str()),
                ("metric", ANALYTICS_METRICS),
            ])
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Facebook, "fetch analytics", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                map_api_error(Platform::Facebook, "fetch analytics", status, &body).into(),
            );
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Facebook, "fetch analytics", e))?;

        let mut analytics = PostAnalytics::default();
        if let Some(insights) = payload.get("data").and_then(|d| d.as_array()) {
            for insight in insights {
                let name = insight.get("name").and_then(|n| n.as_str()).unwrap_or("");
                let value = insight.pointer("/values/0/value");
                match name {
                    "post_impressions" => {
                        analytics.impressions =
                            value.and_then(|v| v.as_u64()).unwrap_or(0);
                    }
                    "post_engaged_users" => {
                        analytics.engagements =
                            value.and_then(|v| v.as_u64()).unwrap_or(0);
                    }
                    "post_clicks" => {
                        analytics.clicks = value.and_then(|v| v.as_u64()).unwrap_or(0);
                    }
                    "post_reactions_by_type_total" => {
                        analytics.likes = value
                            .and_then(|v| v.get("like"))
                            .and_then(|v| v.as_u64())
                            .unwrap_or(0);
                    }
                    _ => {}
                }
            }
        }

        Ok(analytics)
    }
}

#[async_trait]
impl Connector for FacebookConnector {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn publish(
        &self,
        post: &SocialPost,
        credential: &PlatformCredential,
        options: &serde_json::Value,
    ) -> Result<String> {
        // Destination page: explicit option > configured target > first owned page
        let page_id = match options
            .get("pageId")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .or_else(|| credential.target_id.clone())
        {
            Some(id) => id,
            None => self.default_page_id(&credential.access_token).await?,
        };

        let mut params: Vec<(&str, String)> = vec![
            ("message", post.content.clone()),
            ("access_token", credential.access_token.clone()),
        ];

        if !post.media.is_empty() {
            if post.media.len() == 1 && post.media[0].is_video() {
                params.push((
                    "file_url",
                    resolve_media_url(&self.public_url, &post.media[0].url),
                ));
                let endpoint = format!("{}/{}/videos", self.api_base, page_id);
                return self.post_to_endpoint(&endpoint, &params).await;
            }

            // Single image, or multiple images: only the first image is
            // uploaded. Multi-image albums are unsupported.
            if let Some(image) = post.media.iter().find(|m| m.is_image()) {
                params.push(("url", resolve_media_url(&self.public_url, &image.url)));
                let endpoint = format!("{}/{}/photos", self.api_base, page_id);
                return self.post_to_endpoint(&endpoint, &params).await;
            }
        }

        // Text post, optionally with a link
        if let Some(link) = options.get("link").and_then(|v| v.as_str()) {
            params.push(("link", link.to_string()));
        }

        let endpoint = format!("{}/{}/feed", self.api_base, page_id);
        self.post_to_endpoint(&endpoint, &params).await
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
            .map_err(|e| map_transport_error(Platform::Facebook, "validate token", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Authentication(format!(
                "Facebook token validation failed: {}",
                map_api_error(Platform::Facebook, "validate token", status, &body)
            ))
            .into());
        }

        let identity: Identity = response
            .json()
            .await
            .map_err(|e| map_transport_error(Platform::Facebook, "validate token", e))?;

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaRef;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn connector(server: &MockServer) -> FacebookConnector {
        FacebookConnector::with_api_base("http://localhost:8080", server.uri())
    }

    fn credential() -> PlatformCredential {
        PlatformCredential::new("fb-token").with_target("page-1")
    }

    fn post_with_media(media: Vec<MediaRef>) -> SocialPost {
        let mut post = SocialPost::new("title", "hello world");
        post.media = media;
        post
    }

    #[tokio::test]
    async fn test_validate_token_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(query_param("access_token", "fb-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "42", "name": "Page Owner"
            })))
            .mount(&server)
            .await;

        let identity = connector(&server)
            .validate_token(&credential())
            .await
            .unwrap();
        assert_eq!(identity.id, "42");
        assert_eq!(identity.name.as_deref(), Some("Page Owner"));
    }

    #[tokio::test]
    async fn test_validate_token_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Invalid OAuth access token"}
            })))
            .mount(&server)
            .await;

        let err = connector(&server)
            .validate_token(&credential())
            .await
            .unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("Invalid OAuth access token"));
    }

    #[tokio::test]
    async fn test_publish_text_post_hits_feed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/page-1/feed"))
            .and(body_string_contains("message=hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "page-1_987"
            })))
            .mount(&server)
            .await;

        let post = post_with_media(vec![]);
        let id = connector(&server)
            .publish(&post, &credential(), &serde_json::Value::Null)
            .await
            .unwrap();
        assert_eq!(id, "page-1_987");
    }

    #[tokio::test]
    async fn test_publish_single_image_hits_photos() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/page-1/photos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "photo-1"
            })))
            .mount(&server)
            .await;

        let post = post_with_media(vec![MediaRef::new("image/jpeg", "/uploads/a.jpg")]);
        let id = connector(&server)
            .publish(&post, &credential(), &serde_json::Value::Null)
            .await
            .unwrap();
        assert_eq!(id, "photo-1");
    }

    #[tokio::test]
    async fn test_publish_single_video_hits_videos() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/page-1/videos"))
            .and(body_string_contains("file_url="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "video-1"
            })))
            .mount(&server)
            .await;

        let post = post_with_media(vec![MediaRef::new("video/mp4", "/uploads/v.mp4")]);
        let id = connector(&server)
            .publish(&post, &credential(), &serde_json::Value::Null)
            .await
            .unwrap();
        assert_eq!(id, "video-1");
    }

    #[tokio::test]
    async fn test_publish_two_images_uploads_only_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/page-1/photos"))
            .and(body_string_contains("first.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "photo-first"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let post = post_with_media(vec![
            MediaRef::new("image/jpeg", "/uploads/first.jpg"),
            MediaRef::new("image/png", "/uploads/second.png"),
        ]);
        let id = connector(&server)
            .publish(&post, &credential(), &serde_json::Value::Null)
            .await
            .unwrap();
        assert_eq!(id, "photo-first");
    }

    #[tokio::test]
    async fn test_publish_resolves_default_page_when_no_target() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "auto-page"}, {"id": "other-page"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auto-page/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "auto-page_1"
            })))
            .mount(&server)
            .await;

        let post = post_with_media(vec![]);
        let id = connector(&server)
            .publish(
                &post,
                &PlatformCredential::new("fb-token"),
                &serde_json::Value::Null,
            )
            .await
            .unwrap();
        assert_eq!(id, "auto-page_1");
    }

    #[tokio::test]
    async fn test_publish_fails_when_no_pages_exist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&server)
            .await;

        let err = connector(&server)
            .publish(
                &post_with_media(vec![]),
                &PlatformCredential::new("fb-token"),
                &serde_json::Value::Null,
            )
            .await
            .unwrap_err();
        assert!(format!("{}", err).contains("No Facebook pages found"));
    }

    #[tokio::test]
    async fn test_publish_page_id_option_overrides_target() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/option-page/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "option-page_1"
            })))
            .mount(&server)
            .await;

        let post = post_with_media(vec![]);
        let options = serde_json::json!({"pageId": "option-page"});
        let id = connector(&server)
            .publish(&post, &credential(), &options)
            .await
            .unwrap();
        assert_eq!(id, "option-page_1");
    }

    #[tokio::test]
    async fn test_publish_error_message_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/page-1/feed"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "(#100) Missing message or attachment"}
            })))
            .mount(&server)
            .await;

        let err = connector(&server)
            .publish(
                &post_with_media(vec![]),
                &credential(),
                &serde_json::Value::Null,
            )
            .await
            .unwrap_err();
        assert!(format!("{}", err).contains("(#100) Missing message or attachment"));
    }

    #[tokio::test]
    async fn test_analytics_maps_metrics_and_defaults_missing_to_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page-1_987/insights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"name": "post_impressions", "values": [{"value": 1200}]},
                    {"name": "post_engaged_users", "values": [{"value": 80}]},
                    {"name": "post_reactions_by_type_total",
                     "values": [{"value": {"like": 55, "love": 3}}]}
                ]
            })))
            .mount(&server)
            .await;

        let analytics = connector(&server)
            .post_analytics("page-1_987", &credential())
            .await
            .unwrap();
        assert_eq!(analytics.impressions, 1200);
        assert_eq!(analytics.engagements, 80);
        assert_eq!(analytics.likes, 55);
        // post_clicks was absent from the response
        assert_eq!(analytics.clicks, 0);
    }
}
