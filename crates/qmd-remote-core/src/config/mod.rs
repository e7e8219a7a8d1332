//! Configuration management

pub mod store;

pub use store::ConfigStore;

use crate::error::{QmdError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A remote inference capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Embed,
    Rerank,
    Generate,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Embed, Capability::Rerank, Capability::Generate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Embed => "embed",
            Capability::Rerank => "rerank",
            Capability::Generate => "generate",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote endpoint configuration
///
/// Each URL is the base of an OpenAI-style server. A missing URL means the
/// capability is unavailable and its calls degrade to their fallback values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_url: Option<String>,

    /// Model name sent with completion requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_model: Option<String>,
}

impl EndpointConfig {
    /// Read endpoint overrides from `QMD_*` environment variables
    pub fn from_env() -> Self {
        Self {
            embed_url: env_value("QMD_EMBED_URL"),
            rerank_url: env_value("QMD_RERANK_URL"),
            generate_url: env_value("QMD_GENERATE_URL"),
            generate_model: env_value("QMD_GENERATE_MODEL"),
        }
        .normalized()
    }

    /// Fill gaps in `self` with values from `fallback`. Values already set win.
    pub fn overlay(self, fallback: &EndpointConfig) -> Self {
        Self {
            embed_url: self.embed_url.or_else(|| fallback.embed_url.clone()),
            rerank_url: self.rerank_url.or_else(|| fallback.rerank_url.clone()),
            generate_url: self.generate_url.or_else(|| fallback.generate_url.clone()),
            generate_model: self
                .generate_model
                .or_else(|| fallback.generate_model.clone()),
        }
    }

    /// Strip trailing slashes and drop blank values
    pub fn normalized(self) -> Self {
        Self {
            embed_url: normalize_url(self.embed_url),
            rerank_url: normalize_url(self.rerank_url),
            generate_url: normalize_url(self.generate_url),
            generate_model: self.generate_model.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Base URL configured for a capability
    pub fn url(&self, capability: Capability) -> Option<&str> {
        match capability {
            Capability::Embed => self.embed_url.as_deref(),
            Capability::Rerank => self.rerank_url.as_deref(),
            Capability::Generate => self.generate_url.as_deref(),
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.url(capability).is_some()
    }

    /// True when no endpoint URL is configured
    pub fn is_empty(&self) -> bool {
        Capability::ALL.iter().all(|c| !self.has(*c))
    }

    /// Reject endpoint URLs that are not absolute http(s) URLs
    pub fn validate(&self) -> Result<()> {
        for capability in Capability::ALL {
            if let Some(url) = self.url(capability) {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(QmdError::Config(format!(
                        "{} URL must start with http:// or https://: {}",
                        capability, url
                    )));
                }
            }
        }
        Ok(())
    }
}

/// HTTP client options
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs(env_value("QMD_REMOTE_TIMEOUT_SECS"))),
        }
    }
}

/// Parse a timeout override; zero or unparsable values use the default
fn timeout_secs(value: Option<String>) -> u64 {
    value
        .and_then(|s| s.trim().parse().ok())
        .filter(|secs: &u64| *secs > 0)
        .unwrap_or_else(default_timeout)
}

fn default_timeout() -> u64 {
    30
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn normalize_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_explicit_wins() {
        let explicit = EndpointConfig {
            embed_url: Some("http://explicit".to_string()),
            ..Default::default()
        };
        let persisted = EndpointConfig {
            embed_url: Some("http://persisted".to_string()),
            rerank_url: Some("http://rerank".to_string()),
            ..Default::default()
        };

        let merged = explicit.overlay(&persisted);
        assert_eq!(merged.embed_url.as_deref(), Some("http://explicit"));
        assert_eq!(merged.rerank_url.as_deref(), Some("http://rerank"));
        assert_eq!(merged.generate_url, None);
    }

    #[test]
    fn test_normalized_strips_slashes_and_blanks() {
        let config = EndpointConfig {
            embed_url: Some("http://host:8080/".to_string()),
            rerank_url: Some("   ".to_string()),
            generate_url: None,
            generate_model: Some(String::new()),
        }
        .normalized();

        assert_eq!(config.embed_url.as_deref(), Some("http://host:8080"));
        assert_eq!(config.rerank_url, None);
        assert_eq!(config.generate_model, None);
    }

    #[test]
    fn test_is_empty() {
        assert!(EndpointConfig::default().is_empty());

        let config = EndpointConfig {
            generate_model: Some("qwen".to_string()),
            ..Default::default()
        };
        assert!(config.is_empty());

        let config = EndpointConfig {
            rerank_url: Some("http://r".to_string()),
            ..Default::default()
        };
        assert!(!config.is_empty());
        assert!(config.has(Capability::Rerank));
        assert!(!config.has(Capability::Embed));
    }

    #[test]
    fn test_validate_urls() {
        let config = EndpointConfig {
            embed_url: Some("https://embed".to_string()),
            rerank_url: Some("http://rerank:8081".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(EndpointConfig::default().validate().is_ok());

        let config = EndpointConfig {
            generate_url: Some("ftp://gen".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(QmdError::Config(_))));
    }

    #[test]
    fn test_timeout_ignores_zero_and_garbage() {
        assert_eq!(timeout_secs(None), 30);
        assert_eq!(timeout_secs(Some("0".to_string())), 30);
        assert_eq!(timeout_secs(Some("-5".to_string())), 30);
        assert_eq!(timeout_secs(Some("soon".to_string())), 30);
        assert_eq!(timeout_secs(Some(" 90 ".to_string())), 90);
    }

    #[test]
    fn test_camel_case_keys() {
        let config = EndpointConfig {
            embed_url: Some("http://a".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, serde_json::json!({"embedUrl": "http://a"}));
    }
}
