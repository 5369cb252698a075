//! Concurrent per-position fetching.
//!
//! Every requested position gets its own task and its own single-use
//! completion channel, so outcomes can be read back in position order no
//! matter which task finishes first.

use crate::assembler;
use crate::content::{ContentItem, Provider};
use crate::errors::{ContentRouterError, ProviderError, Result};
use crate::metrics_defs::{FALLBACK_USED, PROVIDER_FAILURES};
use crate::mix::ContentMix;
use crate::provider::ProviderRegistry;
use std::collections::VecDeque;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Upper bound on capacity reserved up front, independent of `count`.
const MAX_PREALLOCATED_POSITIONS: u64 = 1024;

/// The window of global positions `[offset, offset + count)` requested by one caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    pub identity: String,
    pub offset: u64,
    pub count: u64,
}

/// Result of trying every candidate provider for one position.
#[derive(Debug)]
pub struct PositionOutcome {
    pub position: u64,
    pub items: Vec<ContentItem>,
    /// Last error seen when every candidate failed
    pub error: Option<ProviderError>,
}

impl PositionOutcome {
    /// The item to emit for this position, or `None` if the position is unrecoverable.
    ///
    /// A successful fetch that returned nothing counts as unrecoverable.
    pub fn into_item(self) -> Option<ContentItem> {
        if self.error.is_some() {
            return None;
        }
        self.items.into_iter().next()
    }
}

struct PendingPosition {
    position: u64,
    receiver: oneshot::Receiver<PositionOutcome>,
    task: JoinHandle<()>,
}

/// In-flight fetches, read back strictly in position order.
///
/// Dropping this with positions still unread aborts their tasks when
/// cancellation of superseded fetches is enabled; otherwise they run to
/// completion and their results are discarded.
pub struct PendingOutcomes {
    positions: VecDeque<PendingPosition>,
    cancel_superseded: bool,
}

impl PendingOutcomes {
    fn empty() -> Self {
        Self {
            positions: VecDeque::new(),
            cancel_superseded: true,
        }
    }

    /// Number of positions not yet read.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Waits for the outcome of the next position in order.
    pub async fn next(&mut self) -> Option<Result<PositionOutcome>> {
        // Stays queued while awaited so that dropping this future mid-read
        // still lets `abandon` reach its task.
        let front = self.positions.front_mut()?;
        let received = (&mut front.receiver).await;
        let pending = self.positions.pop_front()?;
        Some(received.map_err(|_| ContentRouterError::PositionTaskFailed(pending.position)))
    }

    /// Gives up on every unread position, returning how many were dropped.
    pub fn abandon(&mut self) -> usize {
        let abandoned = self.positions.len();
        for pending in self.positions.drain(..) {
            if self.cancel_superseded {
                pending.task.abort();
            }
        }
        abandoned
    }
}

impl Drop for PendingOutcomes {
    fn drop(&mut self) {
        self.abandon();
    }
}

/// Resolves positions to providers and fetches them concurrently.
#[derive(Clone, Debug)]
pub struct FetchOrchestrator {
    registry: ProviderRegistry,
    mix: ContentMix,
    cancel_superseded: bool,
}

impl FetchOrchestrator {
    pub fn new(registry: ProviderRegistry, mix: ContentMix) -> Self {
        Self {
            registry,
            mix,
            cancel_superseded: true,
        }
    }

    /// Whether tasks for positions past a truncation point are aborted.
    pub fn with_cancel_superseded(mut self, cancel_superseded: bool) -> Self {
        self.cancel_superseded = cancel_superseded;
        self
    }

    /// Fetches the requested window and assembles it in position order,
    /// stopping at the first unrecoverable position.
    pub async fn get_content_items(&self, params: &Parameters) -> Result<Vec<ContentItem>> {
        assembler::assemble(self.fetch(params)).await
    }

    /// Spawns one fetch task per requested position.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch(&self, params: &Parameters) -> PendingOutcomes {
        if self.mix.is_empty() || params.count == 0 {
            return PendingOutcomes::empty();
        }

        let capacity = params.count.min(MAX_PREALLOCATED_POSITIONS) as usize;
        let mut positions = VecDeque::with_capacity(capacity);

        for k in 0..params.count {
            // Positions past u64::MAX do not exist
            let Some(position) = params.offset.checked_add(k) else {
                break;
            };
            let Some(slot) = self.mix.slot_for(position) else {
                break;
            };

            let candidates = slot.candidates();
            let registry = self.registry.clone();
            let identity = params.identity.clone();
            let (sender, receiver) = oneshot::channel();

            let task = tokio::spawn(async move {
                let outcome = fetch_position(&registry, position, &identity, &candidates).await;
                // The receiver is gone once assembly has stopped before this position
                let _ = sender.send(outcome);
            });

            positions.push_back(PendingPosition {
                position,
                receiver,
                task,
            });
        }

        PendingOutcomes {
            positions,
            cancel_superseded: self.cancel_superseded,
        }
    }
}

/// Tries each candidate in order, requesting a single item, until one succeeds.
async fn fetch_position(
    registry: &ProviderRegistry,
    position: u64,
    identity: &str,
    candidates: &[Provider],
) -> PositionOutcome {
    let mut last_error = None;

    for (attempt, provider) in candidates.iter().enumerate() {
        match registry.fetch_from(provider, identity, 1).await {
            Ok(items) => {
                if attempt > 0 {
                    tracing::debug!(position, provider = %provider, "served by fallback provider");
                    shared::counter!(FALLBACK_USED, "provider" => provider.to_string()).increment(1);
                }
                return PositionOutcome {
                    position,
                    items,
                    error: None,
                };
            }
            Err(e) => {
                tracing::warn!(position, provider = %provider, error = %e, "provider fetch failed");
                shared::counter!(PROVIDER_FAILURES, "provider" => provider.to_string()).increment(1);
                last_error = Some(e);
            }
        }
    }

    PositionOutcome {
        position,
        items: Vec::new(),
        error: last_error,
    }
}
