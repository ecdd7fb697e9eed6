//! Corridor and transfer-history persistence.
//!
//! Handlers receive these as injected `Arc<dyn ...>` dependencies, so
//! the engine and HTTP layer never know which backend is underneath.

pub mod disk;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::corridor::{Corridor, CountryMapping, Destination};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(#[from] fjall::Error),
    #[error("stored document could not be decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

/// One analyzed transfer, persisted after a successful comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub sending_country: String,
    pub receiving_country: String,
    pub amount: f64,
    pub best_provider_name: String,
    pub total_cost: f64,
    pub created_at: DateTime<Utc>,
}

/// Read/replace access to corridor reference data.
#[async_trait]
pub trait CorridorStore: Send + Sync {
    /// The corridor for a (sending, receiving) country pair, if one exists.
    async fn corridor(
        &self,
        sending_country: &str,
        receiving_country: &str,
    ) -> Result<Option<Corridor>, StoreError>;

    /// Country mappings for every country that appears as a sender.
    async fn sending_countries(&self) -> Result<Vec<CountryMapping>, StoreError>;

    /// Deduplicated destinations reachable from a sending country.
    async fn destinations(&self, sending_country: &str) -> Result<Vec<Destination>, StoreError>;

    /// Swap in a freshly ingested dataset, discarding what was there.
    async fn replace_all(
        &self,
        corridors: Vec<Corridor>,
        mappings: Vec<CountryMapping>,
    ) -> Result<(), StoreError>;
}

/// Append-only log of analyzed transfers.
#[async_trait]
pub trait TransferHistory: Send + Sync {
    async fn record(&self, entry: TransferRecord) -> Result<(), StoreError>;

    /// Most recent entries first, at most `limit` of them.
    async fn recent(&self, limit: usize) -> Result<Vec<TransferRecord>, StoreError>;
}
