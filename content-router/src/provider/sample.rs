use super::ContentProvider;
use crate::content::{ContentItem, Provider};
use crate::errors::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

const DEFAULT_TTL_SECS: u64 = 300;

/// Generates placeholder items attributed to itself.
#[derive(Clone, Debug)]
pub struct SampleProvider {
    source: Provider,
    ttl_secs: u64,
}

impl SampleProvider {
    pub fn new(source: Provider) -> Self {
        Self {
            source,
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

#[async_trait]
impl ContentProvider for SampleProvider {
    async fn fetch(&self, _identity: &str, count: usize) -> Result<Vec<ContentItem>, ProviderError> {
        let expiry = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let items = (0..count)
            .map(|_| {
                let id = uuid::Uuid::new_v4().to_string();
                ContentItem {
                    link: format!("https://content.example/{}/{id}", self.source),
                    id,
                    title: "title".to_string(),
                    source: self.source.to_string(),
                    summary: String::new(),
                    expiry,
                }
            })
            .collect();
        Ok(items)
    }
}

/// Always fails. Useful for exercising fallbacks.
#[derive(Clone, Debug)]
pub struct FailingProvider {
    source: Provider,
}

impl FailingProvider {
    pub fn new(source: Provider) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ContentProvider for FailingProvider {
    async fn fetch(&self, _identity: &str, _count: usize) -> Result<Vec<ContentItem>, ProviderError> {
        Err(ProviderError::Fetch {
            provider: self.source.clone(),
            reason: "something happened".to_string(),
        })
    }
}
