use crate::content::Provider;
use crate::mix::{ContentMix, ContentMixSlot};
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_MAX_COUNT: u64 = 1000;
const DEFAULT_SAMPLE_TTL_SECS: u64 = 300;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Empty provider name")]
    EmptyProviderName,

    #[error("Timeout for provider {0} cannot be 0")]
    InvalidTimeout(Provider),

    #[error("max_count cannot be 0")]
    InvalidMaxCount,
}

/// Content router configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener serving content
    pub listener: Listener,
    /// Admin listener for health and readiness checks
    pub admin_listener: Listener,
    /// Largest `count` accepted per request; bounds the per-request fan-out
    #[serde(default = "default_max_count")]
    pub max_count: u64,
    /// Abort fetches whose results can no longer be returned after truncation
    #[serde(default = "default_true")]
    pub cancel_superseded_fetches: bool,
    /// Provider capabilities keyed by provider name
    #[serde(default)]
    pub providers: IndexMap<Provider, ProviderConfig>,
    /// Repeating provider pattern; may be empty
    #[serde(default)]
    pub content_mix: Vec<ContentMixSlot>,
}

fn default_max_count() -> u64 {
    DEFAULT_MAX_COUNT
}

fn default_true() -> bool {
    true
}

fn default_sample_ttl_secs() -> u64 {
    DEFAULT_SAMPLE_TTL_SECS
}

impl Config {
    /// Validates the content router configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.max_count == 0 {
            return Err(ValidationError::InvalidMaxCount);
        }

        for (name, provider) in &self.providers {
            if name.as_str().is_empty() {
                return Err(ValidationError::EmptyProviderName);
            }
            if let ProviderConfig::Http { timeout_secs: 0, .. } = provider {
                return Err(ValidationError::InvalidTimeout(name.clone()));
            }
        }

        for slot in &self.content_mix {
            for candidate in slot.candidates() {
                if !self.providers.contains_key(&candidate) {
                    // Not fatal: every fetch from this provider fails and falls through
                    tracing::warn!(provider = %candidate, "content mix references unconfigured provider");
                }
            }
        }

        Ok(())
    }

    pub fn content_mix(&self) -> ContentMix {
        ContentMix::new(self.content_mix.clone())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    /// Validates the listener configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Capability backing a provider name
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Generated placeholder content
    Sample {
        #[serde(default = "default_sample_ttl_secs")]
        ttl_secs: u64,
    },
    /// Always fails
    Failing,
    /// Upstream content API
    Http { url: Url, timeout_secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            listener: Listener {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            admin_listener: Listener {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            max_count: 100,
            cancel_superseded_fetches: true,
            providers: IndexMap::from([(
                Provider::from("1"),
                ProviderConfig::Sample { ttl_secs: 60 },
            )]),
            content_mix: vec![ContentMixSlot::new("1")],
        }
    }

    #[test]
    fn test_parse_valid_config() {
        let yaml = r#"
listener:
    host: "0.0.0.0"
    port: 3000
admin_listener:
    host: "127.0.0.1"
    port: 3001
providers:
    "1":
        type: sample
    "2":
        type: failing
    "3":
        type: http
        url: "http://content.internal/items"
        timeout_secs: 2
content_mix:
    - type: "1"
    - type: "2"
      fallback: "3"
    - type: "3"
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.max_count, DEFAULT_MAX_COUNT);
        assert!(config.cancel_superseded_fetches);
        assert_eq!(
            config.providers.get(&Provider::from("1")),
            Some(&ProviderConfig::Sample {
                ttl_secs: DEFAULT_SAMPLE_TTL_SECS
            })
        );
        assert_eq!(
            config.providers.get_index(2).map(|(name, _)| name.as_str()),
            Some("3")
        );
        assert_eq!(config.content_mix.len(), 3);
        assert_eq!(config.content_mix[1].fallback, Some(Provider::from("3")));
        assert_eq!(config.content_mix().len(), 3);
    }

    #[test]
    fn test_empty_mix_is_valid() {
        let yaml = r#"
listener: {host: "0.0.0.0", port: 3000}
admin_listener: {host: "127.0.0.1", port: 3001}
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.content_mix().is_empty());
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_unconfigured_mix_provider_is_not_an_error() {
        let mut config = base_config();
        config.content_mix.push(ContentMixSlot::new("missing").with_fallback("1"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = base_config();
        config.listener.port = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidPort
        ));

        let mut config = base_config();
        config.admin_listener.port = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidPort
        ));

        let mut config = base_config();
        config.max_count = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidMaxCount
        ));

        let mut config = base_config();
        config
            .providers
            .insert(Provider::from(""), ProviderConfig::Failing);
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::EmptyProviderName
        ));

        let mut config = base_config();
        config.providers.insert(
            Provider::from("3"),
            ProviderConfig::Http {
                url: Url::parse("http://127.0.0.1:8080").unwrap(),
                timeout_secs: 0,
            },
        );
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidTimeout(p) if p.as_str() == "3"
        ));
    }

    #[test]
    fn test_deserialization_errors() {
        // Invalid URL
        assert!(
            serde_yaml::from_str::<ProviderConfig>(
                r#"{type: http, url: "not-a-url", timeout_secs: 1}"#
            )
            .is_err()
        );

        // Unknown provider type
        assert!(serde_yaml::from_str::<ProviderConfig>("{type: carrier_pigeon}").is_err());

        // Slot without a primary provider
        assert!(serde_yaml::from_str::<ContentMixSlot>("{fallback: \"3\"}").is_err());

        // Missing listener port
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0"}
admin_listener: {host: "127.0.0.1", port: 3001}
"#
            )
            .is_err()
        );
    }
}
