// ABOUTME: Rental workflow guard.
// ABOUTME: Validates GPU capacity against a live candidate snapshot before creation.

use super::client::MarketClient;
use super::error::{Error, Result};
use super::types::{CandidateFilters, Rental};
use std::time::Duration;

/// Provisioning lag applied after creation before a rental is reported
/// connectable. Unconditional; no readiness probe.
const SETTLE_DELAY: Duration = Duration::from_secs(10);

/// Validates a rental request against live marketplace capacity, submits it,
/// and waits out the provisioning settle delay.
pub struct RentalGuard<C> {
    client: C,
    settle: Duration,
}

impl<C: MarketClient> RentalGuard<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            settle: SETTLE_DELAY,
        }
    }

    /// Override the settle delay.
    pub fn settle_delay(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Rent `gpu_count` GPUs on the given cluster node.
    ///
    /// Re-fetches the candidate list so the capacity check runs against the
    /// marketplace's current view, not a stale snapshot. The creation
    /// request is only submitted once the check passes.
    pub async fn rent(&self, cluster: &str, node: &str, gpu_count: u32) -> Result<Rental> {
        let filters = CandidateFilters {
            cluster: Some(cluster.to_string()),
            ..CandidateFilters::default()
        };
        let candidates = self.client.list_candidates(&filters).await?;

        let candidate = candidates
            .iter()
            .find(|c| c.cluster == cluster && c.node_id == node)
            .ok_or_else(|| Error::CandidateNotFound {
                cluster: cluster.to_string(),
                node: node.to_string(),
            })?;

        let available = candidate.gpu_available();
        if gpu_count > available {
            return Err(Error::InsufficientCapacity {
                requested: gpu_count,
                available,
            });
        }

        let rental = self.client.create_rental(cluster, node, gpu_count).await?;
        tracing::info!(id = %rental.id, "rental created, waiting for provisioning");

        // Models provisioning lag on the remote side; not a polling loop.
        tokio::time::sleep(self.settle).await;

        Ok(rental)
    }
}
