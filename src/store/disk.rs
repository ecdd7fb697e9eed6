use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::core::corridor::{Corridor, CountryMapping, Destination};
use crate::store::{CorridorStore, StoreError, TransferHistory, TransferRecord};

/// Separator inside corridor keys. Country names never contain it, so
/// `"{sending}::{receiving}"` keys stay prefix-scannable per sender.
const KEY_SEP: &str = "::";

/// fjall-backed store with one partition per collection.
pub struct DiskStore {
    _keyspace: Keyspace,
    corridors: PartitionHandle,
    mappings: PartitionHandle,
    history: PartitionHandle,
    history_seq: AtomicU64,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path).open()?;
        let corridors = keyspace.open_partition("corridors", PartitionCreateOptions::default())?;
        let mappings =
            keyspace.open_partition("country_mappings", PartitionCreateOptions::default())?;
        let history = keyspace.open_partition("history", PartitionCreateOptions::default())?;

        Ok(Self {
            _keyspace: keyspace,
            corridors,
            mappings,
            history,
            history_seq: AtomicU64::new(0),
        })
    }

    fn corridor_key(sending_country: &str, receiving_country: &str) -> String {
        format!("{sending_country}{KEY_SEP}{receiving_country}")
    }

    fn clear(partition: &PartitionHandle) -> Result<(), StoreError> {
        let keys: Vec<_> = partition
            .keys()
            .collect::<Result<Vec<_>, fjall::Error>>()?;
        for key in keys {
            partition.remove(key)?;
        }
        Ok(())
    }
}

#[async_trait]
impl CorridorStore for DiskStore {
    async fn corridor(
        &self,
        sending_country: &str,
        receiving_country: &str,
    ) -> Result<Option<Corridor>, StoreError> {
        let key = Self::corridor_key(sending_country, receiving_country);
        match self.corridors.get(&key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn sending_countries(&self) -> Result<Vec<CountryMapping>, StoreError> {
        let mut senders = HashSet::new();
        for pair in self.corridors.iter() {
            let (_, value) = pair?;
            let corridor: Corridor = serde_json::from_slice(&value)?;
            senders.insert(corridor.sending_country);
        }

        let mut countries = Vec::new();
        for pair in self.mappings.iter() {
            let (_, value) = pair?;
            let mapping: CountryMapping = serde_json::from_slice(&value)?;
            if senders.contains(&mapping.country) {
                countries.push(mapping);
            }
        }
        countries.sort_by(|a, b| a.country.cmp(&b.country));
        Ok(countries)
    }

    async fn destinations(&self, sending_country: &str) -> Result<Vec<Destination>, StoreError> {
        let prefix = format!("{sending_country}{KEY_SEP}");
        let mut unique = HashSet::new();
        for pair in self.corridors.prefix(prefix) {
            let (_, value) = pair?;
            let corridor: Corridor = serde_json::from_slice(&value)?;
            unique.insert(Destination {
                country: corridor.receiving_country,
                currency_code: corridor.receiving_currency,
            });
        }

        let mut destinations: Vec<Destination> = unique.into_iter().collect();
        destinations.sort_by(|a, b| a.country.cmp(&b.country));
        Ok(destinations)
    }

    async fn replace_all(
        &self,
        corridors: Vec<Corridor>,
        mappings: Vec<CountryMapping>,
    ) -> Result<(), StoreError> {
        Self::clear(&self.corridors)?;
        Self::clear(&self.mappings)?;
        debug!("Cleared existing corridor and mapping collections");

        for corridor in &corridors {
            let key = Self::corridor_key(&corridor.sending_country, &corridor.receiving_country);
            self.corridors.insert(&key, serde_json::to_vec(corridor)?)?;
        }
        for mapping in &mappings {
            self.mappings
                .insert(&mapping.country, serde_json::to_vec(mapping)?)?;
        }
        debug!(
            corridors = corridors.len(),
            mappings = mappings.len(),
            "Stored ingested dataset"
        );
        Ok(())
    }
}

#[async_trait]
impl TransferHistory for DiskStore {
    async fn record(&self, entry: TransferRecord) -> Result<(), StoreError> {
        // Timestamp-prefixed keys keep the partition ordered by time;
        // the sequence counter breaks ties within one nanosecond.
        let seq = self.history_seq.fetch_add(1, Ordering::SeqCst);
        let nanos = entry
            .created_at
            .timestamp_nanos_opt()
            .unwrap_or(i64::MAX);
        let key = format!("{nanos:020}-{seq:010}");
        self.history.insert(&key, serde_json::to_vec(&entry)?)?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TransferRecord>, StoreError> {
        let mut records = Vec::new();
        for pair in self.history.iter().rev().take(limit) {
            let (_, value) = pair?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}
