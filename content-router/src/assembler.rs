//! Fail-fast assembly of per-position outcomes.

use crate::content::ContentItem;
use crate::errors::Result;
use crate::metrics_defs::POSITIONS_TRUNCATED;
use crate::orchestrator::PendingOutcomes;

/// Reads outcomes in position order and collects one item per position.
///
/// Stops at the first position that failed or produced nothing; positions
/// after it are abandoned even if their fetches succeed. The returned list is
/// therefore always a gap-free prefix of the requested window.
pub async fn assemble(mut pending: PendingOutcomes) -> Result<Vec<ContentItem>> {
    let requested = pending.len();
    let mut items = Vec::with_capacity(requested);

    while let Some(outcome) = pending.next().await {
        let outcome = outcome?;
        let position = outcome.position;

        if let Some(error) = &outcome.error {
            tracing::debug!(
                position,
                provider = %error.provider(),
                error = %error,
                "truncating at failed position"
            );
            break;
        }
        match outcome.into_item() {
            Some(item) => items.push(item),
            None => {
                tracing::debug!(position, "truncating at position without content");
                break;
            }
        }
    }

    pending.abandon();

    let truncated = requested - items.len();
    if truncated > 0 {
        shared::counter!(POSITIONS_TRUNCATED).increment(truncated as u64);
    }

    Ok(items)
}
