// ABOUTME: Marketplace client trait and reqwest-backed implementation.
// ABOUTME: Candidate listing and rental creation against the HTTP API.

use super::error::{Error, Result};
use super::types::{CandidateFilters, Rental, RentalCandidate};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Marketplace operations consumed by the rental workflow.
#[async_trait]
pub trait MarketClient: Send + Sync {
    /// Fetch the live candidate list.
    async fn list_candidates(&self, filters: &CandidateFilters) -> Result<Vec<RentalCandidate>>;

    /// Submit a rental creation request.
    async fn create_rental(&self, cluster: &str, node: &str, gpu_count: u32) -> Result<Rental>;
}

#[derive(Debug, Serialize)]
struct CreateRentalRequest<'a> {
    cluster: &'a str,
    node: &'a str,
    gpu_count: u32,
}

/// HTTP implementation over the marketplace REST API.
pub struct HttpMarketClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpMarketClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        // A wedged marketplace should fail the tool call, not hang it.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl MarketClient for HttpMarketClient {
    async fn list_candidates(&self, filters: &CandidateFilters) -> Result<Vec<RentalCandidate>> {
        let mut request = self
            .http
            .get(format!("{}/candidates", self.base_url))
            .bearer_auth(&self.api_key);

        if let Some(cluster) = &filters.cluster {
            request = request.query(&[("cluster", cluster.as_str())]);
        }
        if let Some(min_gpus) = filters.min_gpus {
            request = request.query(&[("min_gpus", min_gpus)]);
        }

        let response = request.send().await.map_err(|e| Error::Api(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "candidate listing returned {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| Error::Api(e.to_string()))
    }

    async fn create_rental(&self, cluster: &str, node: &str, gpu_count: u32) -> Result<Rental> {
        let response = self
            .http
            .post(format!("{}/rentals", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CreateRentalRequest {
                cluster,
                node,
                gpu_count,
            })
            .send()
            .await
            .map_err(|e| Error::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "rental creation returned {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| Error::Api(e.to_string()))
    }
}
