// ABOUTME: Marketplace data types.
// ABOUTME: Candidate snapshots, rental records, and listing filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A marketplace-advertised compute node snapshot.
///
/// Fetched fresh for each rental request; never persisted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RentalCandidate {
    pub cluster: String,
    pub node_id: String,
    pub gpu_total: u32,
    pub gpu_reserved: u32,
}

impl RentalCandidate {
    /// GPUs currently free on this node.
    pub fn gpu_available(&self) -> u32 {
        self.gpu_total.saturating_sub(self.gpu_reserved)
    }
}

/// Connection details advertised for a created rental.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionHint {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
}

/// A created rental as reported by the marketplace.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rental {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub connection: Option<ConnectionHint>,
}

/// Filters for listing candidates.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilters {
    pub cluster: Option<String>,
    pub min_gpus: Option<u32>,
}
