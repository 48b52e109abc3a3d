//! Platform connector abstraction and implementations
//!
//! Each connector translates a canonical post plus credentials into one
//! platform's publish protocol, owns that platform's API error mapping,
//! and exposes a lightweight "who am I" token check.

use async_trait::async_trait;

use crate::error::{PlatformError, Result};
use crate::types::{Identity, Platform, PlatformCredential, SocialPost};

pub mod facebook;
pub mod instagram;
pub mod linkedin;
pub mod tiktok;
pub mod twitter;
pub mod youtube;

// Mock connector is available for all builds to support integration tests
pub mod mock;

/// Unified interface over the per-platform publish protocols.
///
/// Implementations are stateless apart from their HTTP client and base
/// URLs; credentials arrive per call from the connection registry.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The platform this connector serves.
    fn platform(&self) -> Platform;

    /// Publish the post and return the platform-assigned post id.
    ///
    /// `options` carries the post's free-form per-platform overrides
    /// (`Null` when none were given).
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Publish` when the platform rejects the
    /// payload (the platform's own message is preserved where available),
    /// `PlatformError::Authentication` for credential rejections, and
    /// `PlatformError::Network` for transport failures.
    async fn publish(
        &self,
        post: &SocialPost,
        credential: &PlatformCredential,
        options: &serde_json::Value,
    ) -> Result<String>;

    /// Validate the credential with a lightweight live call.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` on an invalid or expired
    /// credential.
    async fn validate_token(&self, credential: &PlatformCredential) -> Result<Identity>;
}

/// Resolve a media URL against the deployment's public base URL.
///
/// Already-absolute URLs pass through untouched.
pub fn resolve_media_url(public_url: &str, media_url: &str) -> String {
    if media_url.starts_with("http://") || media_url.starts_with("https://") {
        return media_url.to_string();
    }
    format!(
        "{}{}",
        public_url.trim_end_matches('/'),
        media_url
    )
}

/// Map a reqwest transport error into a connector failure.
pub(crate) fn map_transport_error(
    platform: Platform,
    context: &str,
    error: reqwest::Error,
) -> PlatformError {
    if error.is_timeout() {
        PlatformError::Timeout(format!("{} {}: {}", platform, context, error))
    } else {
        PlatformError::Network(format!("{} {}: {}", platform, context, error))
    }
}

/// Map a non-success HTTP response into a connector failure.
///
/// The platform's own error message is extracted from the common
/// `{"error": {"message": ...}}` / `{"detail": ...}` / `{"message": ...}`
/// body shapes and preserved verbatim; the raw body is the fallback.
pub(crate) fn map_api_error(
    platform: Platform,
    context: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> PlatformError {
    let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
    let detail = format!("{} {}: {}", platform, context, message);

    match status.as_u16() {
        401 | 403 => PlatformError::Authentication(detail),
        429 => PlatformError::RateLimit(detail),
        _ => PlatformError::Publish(detail),
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.pointer("/error"))
        .or_else(|| value.pointer("/detail"))
        .or_else(|| value.pointer("/message"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
