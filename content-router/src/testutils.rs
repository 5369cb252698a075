use crate::content::{ContentItem, Provider};
use crate::errors::ProviderError;
use crate::mix::{ContentMix, ContentMixSlot};
use crate::provider::{ContentProvider, ProviderRegistry};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Succeeds without returning any item
    Empty,
    Panic,
}

/// Scriptable provider that records how often it was called and how many
/// calls ran to completion.
#[derive(Clone)]
pub struct TestProvider {
    source: Provider,
    behavior: Behavior,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
}

impl TestProvider {
    pub fn new(source: &str, behavior: Behavior) -> Self {
        Self {
            source: Provider::from(source),
            behavior,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn succeeding(source: &str) -> Self {
        Self::new(source, Behavior::Succeed)
    }

    pub fn failing(source: &str) -> Self {
        Self::new(source, Behavior::Fail)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentProvider for TestProvider {
    async fn fetch(&self, _identity: &str, count: usize) -> Result<Vec<ContentItem>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            Behavior::Succeed => Ok((0..count)
                .map(|i| ContentItem {
                    id: format!("{}-{call}-{i}", self.source),
                    title: "title".to_string(),
                    source: self.source.to_string(),
                    summary: String::new(),
                    link: String::new(),
                    expiry: Utc::now(),
                })
                .collect()),
            Behavior::Fail => Err(ProviderError::Fetch {
                provider: self.source.clone(),
                reason: "something happened".to_string(),
            }),
            Behavior::Empty => Ok(Vec::new()),
            Behavior::Panic => panic!("provider {} blew up", self.source),
        }
    }
}

pub fn registry_of(providers: &[&TestProvider]) -> ProviderRegistry {
    let providers: HashMap<Provider, Arc<dyn ContentProvider>> = providers
        .iter()
        .map(|p| {
            let capability: Arc<dyn ContentProvider> = Arc::new((*p).clone());
            (p.source.clone(), capability)
        })
        .collect();
    ProviderRegistry::new(providers)
}

/// `[ {1}, {2, fallback: 3}, {3} ]`
pub fn three_slot_mix() -> ContentMix {
    ContentMix::new(vec![
        ContentMixSlot::new("1"),
        ContentMixSlot::new("2").with_fallback("3"),
        ContentMixSlot::new("3"),
    ])
}

pub fn sources(items: &[ContentItem]) -> Vec<&str> {
    items.iter().map(|item| item.source.as_str()).collect()
}
