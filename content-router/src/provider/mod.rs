//! Provider capabilities and the registry that resolves them.

mod sample;
mod upstream;

pub use sample::{FailingProvider, SampleProvider};
pub use upstream::HttpProvider;

use crate::config::ProviderConfig;
use crate::content::{ContentItem, Provider};
use crate::errors::ProviderError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A third-party content source.
///
/// Fetches up to `count` items for the requester identified by `identity`.
/// Implementations hold no per-request state and may be called concurrently.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch(&self, identity: &str, count: usize) -> Result<Vec<ContentItem>, ProviderError>;
}

/// Immutable mapping from provider name to its capability.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Arc<HashMap<Provider, Arc<dyn ContentProvider>>>,
}

impl ProviderRegistry {
    pub fn new(providers: HashMap<Provider, Arc<dyn ContentProvider>>) -> Self {
        Self {
            providers: Arc::new(providers),
        }
    }

    /// Builds the registry from the configured providers.
    pub fn from_config<'a>(
        configs: impl IntoIterator<Item = (&'a Provider, &'a ProviderConfig)>,
    ) -> Result<Self, ProviderError> {
        let mut providers: HashMap<Provider, Arc<dyn ContentProvider>> = HashMap::new();
        for (name, config) in configs {
            let capability: Arc<dyn ContentProvider> = match config {
                ProviderConfig::Sample { ttl_secs } => {
                    Arc::new(SampleProvider::new(name.clone()).with_ttl_secs(*ttl_secs))
                }
                ProviderConfig::Failing => Arc::new(FailingProvider::new(name.clone())),
                ProviderConfig::Http { url, timeout_secs } => Arc::new(HttpProvider::new(
                    name.clone(),
                    url.clone(),
                    *timeout_secs,
                )?),
            };
            providers.insert(name.clone(), capability);
        }
        Ok(Self::new(providers))
    }

    pub fn get(&self, provider: &Provider) -> Option<&Arc<dyn ContentProvider>> {
        self.providers.get(provider)
    }

    /// Fetches from `provider`, treating a missing registration as a failed fetch.
    pub async fn fetch_from(
        &self,
        provider: &Provider,
        identity: &str,
        count: usize,
    ) -> Result<Vec<ContentItem>, ProviderError> {
        match self.get(provider) {
            Some(capability) => capability.fetch(identity, count).await,
            None => Err(ProviderError::Unavailable(provider.clone())),
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&Provider> = self.providers.keys().collect();
        names.sort();
        f.debug_struct("ProviderRegistry")
            .field("providers", &names)
            .finish()
    }
}
