//! Mock connector for testing
//!
//! A configurable connector that can simulate successes, failures, and
//! slow upstreams. Used by registry and publisher tests to verify fan-out
//! behavior without platform credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::platforms::Connector;
use crate::types::{Identity, Platform, PlatformCredential, SocialPost};

/// Configuration for mock connector behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform this mock stands in for
    pub platform: Platform,

    /// Whether token validation should succeed
    pub token_valid: bool,

    /// Whether publishing should succeed
    pub publish_succeeds: bool,

    /// Error to return on token validation failure
    pub auth_error: Option<String>,

    /// Error to return on publish failure
    pub publish_error: Option<String>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Number of times publish has been called
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Number of times validate_token has been called
    pub validate_call_count: Arc<Mutex<usize>>,

    /// Content of posts that were published (for verification)
    pub published_content: Arc<Mutex<Vec<String>>>,
}

impl MockConfig {
    fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            token_valid: true,
            publish_succeeds: true,
            auth_error: None,
            publish_error: None,
            delay: Duration::from_millis(0),
            publish_call_count: Arc::new(Mutex::new(0)),
            validate_call_count: Arc::new(Mutex::new(0)),
            published_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock connector for testing
pub struct MockConnector {
    config: MockConfig,
}

impl MockConnector {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock connector that always succeeds
    pub fn success(platform: Platform) -> Self {
        Self::new(MockConfig::for_platform(platform))
    }

    /// Create a mock connector whose token validation fails
    pub fn auth_failure(platform: Platform, error: &str) -> Self {
        Self::new(MockConfig {
            token_valid: false,
            auth_error: Some(error.to_string()),
            ..MockConfig::for_platform(platform)
        })
    }

    /// Create a mock connector whose publish fails
    pub fn publish_failure(platform: Platform, error: &str) -> Self {
        Self::new(MockConfig {
            publish_succeeds: false,
            publish_error: Some(error.to_string()),
            ..MockConfig::for_platform(platform)
        })
    }

    /// Create a mock connector with a delay
    pub fn with_delay(platform: Platform, delay: Duration) -> Self {
        Self::new(MockConfig {
            delay,
            ..MockConfig::for_platform(platform)
        })
    }

    pub fn publish_call_count(&self) -> usize {
        *self.config.publish_call_count.lock().unwrap()
    }

    pub fn validate_call_count(&self) -> usize {
        *self.config.validate_call_count.lock().unwrap()
    }

    pub fn published_content(&self) -> Vec<String> {
        self.config.published_content.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn platform(&self) -> Platform {
        self.config.platform
    }

    async fn publish(
        &self,
        post: &SocialPost,
        _credential: &PlatformCredential,
        _options: &serde_json::Value,
    ) -> Result<String> {
        *self.config.publish_call_count.lock().unwrap() += 1;

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if self.config.publish_succeeds {
            self.config
                .published_content
                .lock()
                .unwrap()
                .push(post.content.clone());
            Ok(format!("{}:mock-{}", self.config.platform, uuid::Uuid::new_v4()))
        } else {
            let error_msg = self
                .config
                .publish_error
                .clone()
                .unwrap_or_else(|| "Mock publish failed".to_string());
            Err(PlatformError::Publish(error_msg).into())
        }
    }

    async fn validate_token(&self, _credential: &PlatformCredential) -> Result<Identity> {
        *self.config.validate_call_count.lock().unwrap() += 1;

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if self.config.token_valid {
            Ok(Identity {
                id: format!("mock-{}", self.config.platform),
                name: Some("Mock Account".to_string()),
            })
        } else {
            let error_msg = self
                .config
                .auth_error
                .clone()
                .unwrap_or_else(|| "Mock token rejected".to_string());
            Err(PlatformError::Authentication(error_msg).into())
        }
    }
}
