//! Configuration management for Crosspost
//!
//! Per-platform sections are optional; each carries an `enabled` flag and
//! the credential fields the platform needs. Tokens are provisioned
//! externally and read here as opaque strings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::types::Platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub facebook: Option<FacebookConfig>,
    #[serde(default)]
    pub instagram: Option<InstagramConfig>,
    #[serde(default)]
    pub twitter: Option<TwitterConfig>,
    #[serde(default)]
    pub linkedin: Option<LinkedinConfig>,
    #[serde(default)]
    pub tiktok: Option<TiktokConfig>,
    #[serde(default)]
    pub youtube: Option<YoutubeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Public base URL of this deployment, used to resolve relative media URLs
    pub public_url: String,
    /// Address the HTTP server binds to
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:8080".to_string(),
            listen: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Per-connector call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookConfig {
    pub enabled: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Destination page; when absent the first page owned by the token is used
    #[serde(default)]
    pub page_id: Option<String>,
}

/// Instagram publishes through the Facebook Graph API and reuses the
/// Facebook access token; only the IG business user id is its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    pub enabled: bool,
    #[serde(default)]
    pub ig_user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    pub enabled: bool,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedinConfig {
    pub enabled: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub author_urn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiktokConfig {
    pub enabled: bool,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    pub enabled: bool,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration with all platforms disabled
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: "~/.local/share/crosspost/posts.db".to_string(),
            },
            publish: PublishConfig::default(),
            facebook: Some(FacebookConfig {
                enabled: false,
                access_token: None,
                page_id: None,
            }),
            instagram: Some(InstagramConfig {
                enabled: false,
                ig_user_id: None,
            }),
            twitter: Some(TwitterConfig {
                enabled: false,
                bearer_token: None,
            }),
            linkedin: Some(LinkedinConfig {
                enabled: false,
                access_token: None,
                author_urn: None,
            }),
            tiktok: Some(TiktokConfig {
                enabled: false,
                access_token: None,
            }),
            youtube: Some(YoutubeConfig {
                enabled: false,
                access_token: None,
            }),
        }
    }

    /// Whether a platform is enabled in static configuration.
    pub fn platform_enabled(&self, platform: Platform) -> bool {
        match platform {
            Platform::Facebook => self.facebook.as_ref().is_some_and(|c| c.enabled),
            Platform::Instagram => self.instagram.as_ref().is_some_and(|c| c.enabled),
            Platform::Twitter => self.twitter.as_ref().is_some_and(|c| c.enabled),
            Platform::Linkedin => self.linkedin.as_ref().is_some_and(|c| c.enabled),
            Platform::Tiktok => self.tiktok.as_ref().is_some_and(|c| c.enabled),
            Platform::Youtube => self.youtube.as_ref().is_some_and(|c| c.enabled),
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CROSSPOST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("crosspost").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_disables_all_platforms() {
        let config = Config::default_config();
        for platform in Platform::ALL {
            assert!(!config.platform_enabled(platform));
        }
    }

    #[test]
    fn test_platform_enabled_missing_section() {
        let mut config = Config::default_config();
        config.twitter = None;
        assert!(!config.platform_enabled(Platform::Twitter));
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml_str = r#"
            [database]
            path = ":memory:"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.publish.timeout_secs, 30);
        assert!(config.facebook.is_none());
        assert_eq!(config.server.public_url, "http://localhost:8080");
    }

    #[test]
    fn test_parse_platform_sections() {
        let toml_str = r#"
            [database]
            path = ":memory:"

            [facebook]
            enabled = true
            access_token = "fb-token"
            page_id = "98765"

            [twitter]
            enabled = true
            bearer_token = "tw-token"

            [tiktok]
            enabled = false
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.platform_enabled(Platform::Facebook));
        assert!(config.platform_enabled(Platform::Twitter));
        assert!(!config.platform_enabled(Platform::Tiktok));
        assert!(!config.platform_enabled(Platform::Youtube));
        assert_eq!(
            config.facebook.unwrap().page_id.as_deref(),
            Some("98765")
        );
    }

    #[test]
    fn test_enabled_without_token_parses() {
        // A missing credential is a status-time condition, not a parse error
        let toml_str = r#"
            [database]
            path = ":memory:"

            [linkedin]
            enabled = true
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.platform_enabled(Platform::Linkedin));
        assert!(config.linkedin.unwrap().access_token.is_none());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = Config::load_from_path(&PathBuf::from("/nonexistent/crosspost.toml"));
        assert!(matches!(
            result,
            Err(crate::error::CrosspostError::Config(ConfigError::ReadError(_)))
        ));
    }
}
