//! Batch enrichment orchestration
//!
//! Drives the score client once per identifier, strictly sequentially and
//! in input order. Sequential fan-out is deliberate: it bounds outstanding
//! load on the Ethos API to one in-flight call, at the cost of total
//! latency scaling linearly with batch size.
//!
//! Guarantees:
//! - the output has exactly the input's length and order;
//! - one identifier's failure never disturbs any other record;
//! - after the i-th identifier the progress observer sees `(i, total)`.

use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::ethos::{ScoreLookup, ScoreOutcome};
use crate::models::EnrichmentRecord;

/// Result of one batch run
#[derive(Debug, Clone, PartialEq)]
pub enum BatchRun {
    /// Every input identifier has a record, in input order
    Completed(Vec<EnrichmentRecord>),
    /// Run was cancelled; partial results are dropped, not delivered
    Cancelled {
        /// Identifiers processed before cancellation took effect
        processed: usize,
    },
}

/// Sequential batch enrichment driver
pub struct EnrichmentOrchestrator<C: ScoreLookup> {
    client: Arc<C>,
}

impl<C: ScoreLookup> EnrichmentOrchestrator<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Enrich every identifier, in input order.
    ///
    /// Per-identifier failures are contained into failed records and never
    /// interrupt the batch; the remote reason is logged, not surfaced.
    /// The observer is invoked with `(done, total)` after each identifier.
    /// Cancellation is checked between remote calls; a cancelled run
    /// returns no records. An empty input completes immediately with an
    /// empty result set and no remote calls.
    pub async fn enrich_all<F, Fut>(
        &self,
        identifiers: &[String],
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> BatchRun
    where
        F: FnMut(usize, usize) -> Fut,
        Fut: Future<Output = ()>,
    {
        let total = identifiers.len();
        let mut records = Vec::with_capacity(total);

        for (index, address) in identifiers.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(processed = index, total, "Batch cancelled mid-run");
                return BatchRun::Cancelled { processed: index };
            }

            match self.client.lookup_score(address).await {
                ScoreOutcome::Success { score, level } => {
                    records.push(EnrichmentRecord::success(address.clone(), score, level));
                }
                ScoreOutcome::Failure { reason } => {
                    warn!(address = %address, reason = %reason, "Score lookup failed");
                    records.push(EnrichmentRecord::failure(address.clone()));
                }
            }

            on_progress(index + 1, total).await;
        }

        BatchRun::Completed(records)
    }
}
