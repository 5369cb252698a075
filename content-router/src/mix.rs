//! Content mix: the repeating pattern of provider slots.
//!
//! Global position `i` is served by slot `i mod len`. An empty mix is legal
//! and maps no position to any slot.

use crate::content::Provider;
use serde::Deserialize;
use std::sync::Arc;

/// Provider policy for one position in the repeating pattern.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ContentMixSlot {
    /// Primary provider, always tried first
    pub r#type: Provider,
    /// Provider tried when the primary fails
    #[serde(default)]
    pub fallback: Option<Provider>,
}

impl ContentMixSlot {
    pub fn new(primary: impl Into<Provider>) -> Self {
        Self {
            r#type: primary.into(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<Provider>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Providers to try for this slot, in order.
    pub fn candidates(&self) -> Vec<Provider> {
        let mut candidates = Vec::with_capacity(2);
        candidates.push(self.r#type.clone());
        if let Some(fallback) = &self.fallback {
            candidates.push(fallback.clone());
        }
        candidates
    }
}

/// Ordered, read-only list of slots shared across requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentMix {
    slots: Arc<[ContentMixSlot]>,
}

impl ContentMix {
    pub fn new(slots: Vec<ContentMixSlot>) -> Self {
        Self {
            slots: slots.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot serving the given global position, or `None` for an empty mix.
    pub fn slot_for(&self, position: u64) -> Option<&ContentMixSlot> {
        if self.slots.is_empty() {
            return None;
        }
        let index = position % self.slots.len() as u64;
        self.slots.get(index as usize)
    }
}
