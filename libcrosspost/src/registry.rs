//! Connection registry
//!
//! Owns the mapping from platform to connector and to configured
//! credentials, and reports connection health. Constructed once at
//! startup and handed to the publisher and the HTTP layer; tests swap
//! in mock connectors through `with_connectors`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{PlatformError, Result};
use crate::platforms::facebook::FacebookConnector;
use crate::platforms::instagram::InstagramConnector;
use crate::platforms::linkedin::LinkedinConnector;
use crate::platforms::tiktok::TiktokConnector;
use crate::platforms::twitter::TwitterConnector;
use crate::platforms::youtube::YoutubeConnector;
use crate::platforms::Connector;
use crate::types::{Identity, Platform, PlatformCredential};

/// Static and live health of one platform connection.
///
/// `enabled` and `configured` are read from configuration without
/// touching the network; `connected` is the result of a live token
/// check and is only attempted when the first two hold.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub enabled: bool,
    pub configured: bool,
    pub connected: bool,
}

/// Outcome of an explicit credential validation for one platform.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ConnectionRegistry {
    config: Arc<Config>,
    connectors: HashMap<Platform, Arc<dyn Connector>>,
}

impl ConnectionRegistry {
    /// Build the registry with the real connector for every platform.
    pub fn new(config: Arc<Config>) -> Self {
        let public_url = config.server.public_url.clone();
        let connectors: Vec<Arc<dyn Connector>> = vec![
            Arc::new(FacebookConnector::new(public_url.clone())),
            Arc::new(InstagramConnector::new(public_url.clone())),
            Arc::new(TwitterConnector::new()),
            Arc::new(LinkedinConnector::new()),
            Arc::new(TiktokConnector::new(public_url.clone())),
            Arc::new(YoutubeConnector::new(public_url)),
        ];
        Self::with_connectors(config, connectors)
    }

    /// Build the registry from an explicit connector set.
    pub fn with_connectors(config: Arc<Config>, connectors: Vec<Arc<dyn Connector>>) -> Self {
        let connectors = connectors
            .into_iter()
            .map(|c| (c.platform(), c))
            .collect();
        Self { config, connectors }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Look up the connector registered for a platform.
    pub fn connector_for(&self, platform: Platform) -> Option<Arc<dyn Connector>> {
        self.connectors.get(&platform).cloned()
    }

    /// Whether the platform is enabled in configuration.
    pub fn is_enabled(&self, platform: Platform) -> bool {
        self.config.platform_enabled(platform)
    }

    /// Whether the credential the platform needs is present in
    /// configuration. Does not touch the network.
    pub fn is_configured(&self, platform: Platform) -> bool {
        self.credential_for(platform).is_ok()
    }

    /// Resolve the configured credential for a platform.
    ///
    /// Instagram publishes through the Graph API with the Facebook access
    /// token; its own section only contributes the IG business user id.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::NotConfigured` when the required credential
    /// fields are absent.
    pub fn credential_for(&self, platform: Platform) -> Result<PlatformCredential> {
        match platform {
            Platform::Facebook => {
                let section = self.config.facebook.as_ref();
                let token = section
                    .and_then(|c| c.access_token.clone())
                    .ok_or_else(|| not_configured(platform, "access token"))?;
                let mut credential = PlatformCredential::new(token);
                credential.target_id = section.and_then(|c| c.page_id.clone());
                Ok(credential)
            }
            Platform::Instagram => {
                let token = self
                    .config
                    .facebook
                    .as_ref()
                    .and_then(|c| c.access_token.clone())
                    .ok_or_else(|| not_configured(platform, "Facebook access token"))?;
                let mut credential = PlatformCredential::new(token);
                credential.target_id = self
                    .config
                    .instagram
                    .as_ref()
                    .and_then(|c| c.ig_user_id.clone());
                Ok(credential)
            }
            Platform::Twitter => {
                let token = self
                    .config
                    .twitter
                    .as_ref()
                    .and_then(|c| c.bearer_token.clone())
                    .ok_or_else(|| not_configured(platform, "bearer token"))?;
                Ok(PlatformCredential::new(token))
            }
            Platform::Linkedin => {
                let section = self.config.linkedin.as_ref();
                let token = section
                    .and_then(|c| c.access_token.clone())
                    .ok_or_else(|| not_configured(platform, "access token"))?;
                let mut credential = PlatformCredential::new(token);
                credential.target_id = section.and_then(|c| c.author_urn.clone());
                Ok(credential)
            }
            Platform::Tiktok => {
                let token = self
                    .config
                    .tiktok
                    .as_ref()
                    .and_then(|c| c.access_token.clone())
                    .ok_or_else(|| not_configured(platform, "access token"))?;
                Ok(PlatformCredential::new(token))
            }
            Platform::Youtube => {
                let token = self
                    .config
                    .youtube
                    .as_ref()
                    .and_then(|c| c.access_token.clone())
                    .ok_or_else(|| not_configured(platform, "access token"))?;
                Ok(PlatformCredential::new(token))
            }
        }
    }

    /// Validate one platform's credential with a live call.
    pub async fn validate_connection(&self, platform: Platform) -> Result<Identity> {
        let connector = self
            .connector_for(platform)
            .ok_or(PlatformError::Unsupported(platform))?;
        let credential = self.credential_for(platform)?;
        connector.validate_token(&credential).await
    }

    /// Validate every enabled platform's credential, collecting failures
    /// instead of short-circuiting.
    pub async fn validate_all(&self) -> BTreeMap<Platform, ConnectionCheck> {
        let mut results = BTreeMap::new();
        for platform in Platform::ALL {
            if !self.is_enabled(platform) {
                continue;
            }
            let check = match self.validate_connection(platform).await {
                Ok(identity) => {
                    debug!(%platform, account = %identity.id, "credential valid");
                    ConnectionCheck {
                        valid: true,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(%platform, error = %e, "credential validation failed");
                    ConnectionCheck {
                        valid: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.insert(platform, check);
        }
        results
    }

    /// Report the health of every platform connection.
    ///
    /// Platforms that are disabled or missing credentials are reported
    /// without a network call; live check failures surface as
    /// `connected: false` rather than an error.
    pub async fn status_for_all(&self) -> BTreeMap<Platform, ConnectionStatus> {
        let mut statuses = BTreeMap::new();
        for platform in Platform::ALL {
            let enabled = self.is_enabled(platform);
            let configured = self.is_configured(platform);
            let connected = if enabled && configured {
                match self.validate_connection(platform).await {
                    Ok(_) => true,
                    Err(e) => {
                        debug!(%platform, error = %e, "connection check failed");
                        false
                    }
                }
            } else {
                false
            };
            statuses.insert(
                platform,
                ConnectionStatus {
                    enabled,
                    configured,
                    connected,
                },
            );
        }
        statuses
    }
}

fn not_configured(platform: Platform, what: &str) -> PlatformError {
    PlatformError::NotConfigured(format!("{} {} not configured", platform, what))
}
