//! Core types for Crosspost

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// The fixed set of supported social platforms.
///
/// Platform identity is a closed enum so dispatch stays exhaustive at
/// compile time. On the wire (config files, JSON, database columns) each
/// platform is its lowercase name, e.g. `"facebook"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Twitter,
    Linkedin,
    Tiktok,
    Youtube,
}

impl Platform {
    /// All supported platforms, in canonical order.
    pub const ALL: [Platform; 6] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Tiktok,
        Platform::Youtube,
    ];

    /// Lowercase wire name for this platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            "twitter" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::Linkedin),
            "tiktok" => Ok(Platform::Tiktok),
            "youtube" => Ok(Platform::Youtube),
            _ => Err(format!("Unsupported platform: {}", s)),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A media item attached to a post.
///
/// The URL may be relative to the deployment's public base URL; connectors
/// resolve it to an absolute URL before handing it to a platform API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaRef {
    /// MIME type, e.g. "image/jpeg" or "video/mp4"
    pub mime: String,
    /// Absolute URL, or a path relative to the public base URL
    pub url: String,
}

impl MediaRef {
    pub fn new(mime: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            url: url.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image")
    }

    pub fn is_video(&self) -> bool {
        self.mime.starts_with("video")
    }
}

/// Lifecycle status of a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "scheduled" => Ok(PostStatus::Scheduled),
            "published" => Ok(PostStatus::Published),
            "failed" => Ok(PostStatus::Failed),
            _ => Err(format!("Unknown post status: {}", s)),
        }
    }
}

/// The platform-agnostic representation of content to be published.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPost {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Ordered media attachments
    #[serde(default)]
    pub media: Vec<MediaRef>,
    /// Target platforms for this post
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Per-platform free-form option overrides (e.g. a Facebook page id)
    #[serde(default)]
    pub platform_options: HashMap<Platform, serde_json::Value>,
    /// Optional campaign association
    #[serde(default)]
    pub campaign: Option<String>,
    pub status: PostStatus,
    pub created_at: i64,
    #[serde(default)]
    pub scheduled_at: Option<i64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub published_at: Option<i64>,
    /// Per-platform errors recorded by the last publish attempt
    #[serde(default)]
    pub publish_errors: Vec<PublishFailure>,
}

impl SocialPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            media: Vec::new(),
            platforms: Vec::new(),
            platform_options: HashMap::new(),
            campaign: None,
            status: PostStatus::Draft,
            created_at: chrono::Utc::now().timestamp(),
            scheduled_at: None,
            timezone: None,
            published_at: None,
            publish_errors: Vec::new(),
        }
    }

    /// Free-form option overrides for one platform, `Null` when absent.
    pub fn options_for(&self, platform: Platform) -> serde_json::Value {
        self.platform_options
            .get(&platform)
            .cloned()
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Result of one (post, platform) publish attempt.
///
/// Exactly one of `remote_post_id` and `error` is populated; use the
/// constructors to keep that invariant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub platform: Platform,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishOutcome {
    pub fn success(platform: Platform, remote_post_id: impl Into<String>) -> Self {
        Self {
            platform,
            success: true,
            remote_post_id: Some(remote_post_id.into()),
            error: None,
        }
    }

    pub fn failure(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            remote_post_id: None,
            error: Some(error.into()),
        }
    }
}

/// An error detail record inside a [`PublishReport`].
///
/// `platform` is `None` for request-level errors (e.g. an empty platform
/// set), which are not attributable to any one platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublishFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    pub message: String,
}

/// Aggregate outcome of one publish attempt over all requested platforms.
///
/// Every requested platform lands in exactly one of the successful/failed
/// partitions. Partial success is a valid terminal state, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub successful: Vec<PublishOutcome>,
    pub failed: Vec<Platform>,
    pub errors: Vec<PublishFailure>,
}

impl PublishReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a report carrying a single request-level error.
    pub fn request_error(message: impl Into<String>) -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
            errors: vec![PublishFailure {
                platform: None,
                message: message.into(),
            }],
        }
    }

    /// Fold one per-platform outcome into the report.
    pub fn record(&mut self, outcome: PublishOutcome) {
        if outcome.success {
            self.successful.push(outcome);
        } else {
            self.failed.push(outcome.platform);
            self.errors.push(PublishFailure {
                platform: Some(outcome.platform),
                message: outcome
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
    }

    pub fn any_success(&self) -> bool {
        !self.successful.is_empty()
    }
}

/// A content-policy violation for one platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub platform: Platform,
    pub field: String,
    pub message: String,
}

/// Output of content-policy checking across all requested platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// Build a result from accumulated violations; `valid` is true iff the
    /// list is empty.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }
}

/// Opaque credential bundle for one platform.
///
/// Provisioned externally and read-only to the core. Expiry is detected
/// only through platform API errors.
#[derive(Debug, Clone)]
pub struct PlatformCredential {
    /// Primary access or bearer token
    pub access_token: String,
    /// Optional secondary token (refresh token, app secret)
    pub secondary_token: Option<String>,
    /// Optional destination identifier (page id, IG user id, author URN)
    pub target_id: Option<String>,
}

impl PlatformCredential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            secondary_token: None,
            target_id: None,
        }
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }
}

/// Identity reported by a platform for a validated token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Canonical analytics shape for one remote post.
///
/// Metrics absent in a platform's response default to zero, never null.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostAnalytics {
    pub impressions: u64,
    pub engagements: u64,
    pub clicks: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.as_str().parse().unwrap();
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn test_platform_parse_case_insensitive() {
        assert_eq!("Facebook".parse::<Platform>().unwrap(), Platform::Facebook);
        assert_eq!("TWITTER".parse::<Platform>().unwrap(), Platform::Twitter);
    }

    #[test]
    fn test_platform_parse_unknown() {
        let err = "myspace".parse::<Platform>().unwrap_err();
        assert!(err.contains("Unsupported platform"));
    }

    #[test]
    fn test_platform_serde_lowercase() {
        let json = serde_json::to_string(&Platform::Linkedin).unwrap();
        assert_eq!(json, r#""linkedin""#);
        let parsed: Platform = serde_json::from_str(r#""tiktok""#).unwrap();
        assert_eq!(parsed, Platform::Tiktok);
    }

    #[test]
    fn test_media_ref_kind_detection() {
        let image = MediaRef::new("image/png", "/uploads/a.png");
        let video = MediaRef::new("video/mp4", "/uploads/b.mp4");
        assert!(image.is_image());
        assert!(!image.is_video());
        assert!(video.is_video());
        assert!(!video.is_image());
    }

    #[test]
    fn test_social_post_new_defaults() {
        let post = SocialPost::new("Launch", "We shipped it");
        assert!(Uuid::parse_str(&post.id).is_ok());
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.platforms.is_empty());
        assert!(post.media.is_empty());
        assert_eq!(post.published_at, None);
    }

    #[test]
    fn test_options_for_missing_platform_is_null() {
        let post = SocialPost::new("t", "c");
        assert_eq!(post.options_for(Platform::Facebook), serde_json::Value::Null);
    }

    #[test]
    fn test_options_for_present_platform() {
        let mut post = SocialPost::new("t", "c");
        post.platform_options.insert(
            Platform::Facebook,
            serde_json::json!({"pageId": "123"}),
        );
        assert_eq!(
            post.options_for(Platform::Facebook)["pageId"],
            serde_json::json!("123")
        );
    }

    #[test]
    fn test_publish_outcome_invariant() {
        let ok = PublishOutcome::success(Platform::Twitter, "140");
        assert!(ok.success);
        assert_eq!(ok.remote_post_id.as_deref(), Some("140"));
        assert!(ok.error.is_none());

        let err = PublishOutcome::failure(Platform::Twitter, "rejected");
        assert!(!err.success);
        assert!(err.remote_post_id.is_none());
        assert_eq!(err.error.as_deref(), Some("rejected"));
    }

    #[test]
    fn test_report_partitions_every_platform_once() {
        let mut report = PublishReport::new();
        report.record(PublishOutcome::success(Platform::Facebook, "fb_1"));
        report.record(PublishOutcome::failure(Platform::Twitter, "boom"));

        assert_eq!(report.successful.len(), 1);
        assert_eq!(report.failed, vec![Platform::Twitter]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].platform, Some(Platform::Twitter));
        assert_eq!(report.errors[0].message, "boom");
        assert!(report.any_success());
    }

    #[test]
    fn test_request_error_report() {
        let report = PublishReport::request_error("No platforms selected");
        assert!(report.successful.is_empty());
        assert!(report.failed.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].platform, None);
    }

    #[test]
    fn test_validation_result_flag_matches_violations() {
        let ok = ValidationResult::from_violations(vec![]);
        assert!(ok.valid);

        let bad = ValidationResult::from_violations(vec![Violation {
            platform: Platform::Twitter,
            field: "content".to_string(),
            message: "too long".to_string(),
        }]);
        assert!(!bad.valid);
        assert_eq!(bad.violations.len(), 1);
    }

    #[test]
    fn test_post_serialization_round_trip() {
        let mut post = SocialPost::new("Title", "Body");
        post.platforms = vec![Platform::Facebook, Platform::Twitter];
        post.media.push(MediaRef::new("image/jpeg", "/uploads/x.jpg"));
        post.campaign = Some("spring".to_string());

        let json = serde_json::to_string(&post).unwrap();
        let back: SocialPost = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, post.id);
        assert_eq!(back.platforms, post.platforms);
        assert_eq!(back.media, post.media);
        assert_eq!(back.campaign, post.campaign);
    }

    #[test]
    fn test_analytics_defaults_to_zero() {
        let analytics = PostAnalytics::default();
        assert_eq!(analytics.impressions, 0);
        assert_eq!(analytics.shares, 0);
    }
}
