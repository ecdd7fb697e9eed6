use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::core::corridor::{Corridor, CountryMapping, Destination};
use crate::store::{CorridorStore, StoreError, TransferHistory, TransferRecord};

/// In-memory store, the backend tests seed directly. The serve and
/// load paths always persist through [`crate::store::disk::DiskStore`].
#[derive(Default)]
pub struct MemoryStore {
    corridors: RwLock<HashMap<(String, String), Corridor>>,
    mappings: RwLock<Vec<CountryMapping>>,
    history: RwLock<Vec<TransferRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from already-built corridors and mappings.
    pub fn with_data(corridors: Vec<Corridor>, mappings: Vec<CountryMapping>) -> Self {
        let store = Self::new();
        {
            let mut map = store.corridors.write().unwrap();
            for corridor in corridors {
                map.insert(
                    (
                        corridor.sending_country.clone(),
                        corridor.receiving_country.clone(),
                    ),
                    corridor,
                );
            }
            *store.mappings.write().unwrap() = mappings;
        }
        store
    }
}

#[async_trait]
impl CorridorStore for MemoryStore {
    async fn corridor(
        &self,
        sending_country: &str,
        receiving_country: &str,
    ) -> Result<Option<Corridor>, StoreError> {
        let corridors = self.corridors.read().unwrap();
        Ok(corridors
            .get(&(sending_country.to_string(), receiving_country.to_string()))
            .cloned())
    }

    async fn sending_countries(&self) -> Result<Vec<CountryMapping>, StoreError> {
        let senders: HashSet<String> = {
            let corridors = self.corridors.read().unwrap();
            corridors.keys().map(|(s, _)| s.clone()).collect()
        };

        let mut countries: Vec<CountryMapping> = self
            .mappings
            .read()
            .unwrap()
            .iter()
            .filter(|m| senders.contains(&m.country))
            .cloned()
            .collect();
        countries.sort_by(|a, b| a.country.cmp(&b.country));
        Ok(countries)
    }

    async fn destinations(&self, sending_country: &str) -> Result<Vec<Destination>, StoreError> {
        let corridors = self.corridors.read().unwrap();
        let unique: HashSet<Destination> = corridors
            .values()
            .filter(|c| c.sending_country == sending_country)
            .map(|c| Destination {
                country: c.receiving_country.clone(),
                currency_code: c.receiving_currency.clone(),
            })
            .collect();

        let mut destinations: Vec<Destination> = unique.into_iter().collect();
        destinations.sort_by(|a, b| a.country.cmp(&b.country));
        Ok(destinations)
    }

    async fn replace_all(
        &self,
        corridors: Vec<Corridor>,
        mappings: Vec<CountryMapping>,
    ) -> Result<(), StoreError> {
        let mut map = self.corridors.write().unwrap();
        map.clear();
        for corridor in corridors {
            map.insert(
                (
                    corridor.sending_country.clone(),
                    corridor.receiving_country.clone(),
                ),
                corridor,
            );
        }
        *self.mappings.write().unwrap() = mappings;
        Ok(())
    }
}

#[async_trait]
impl TransferHistory for MemoryStore {
    async fn record(&self, entry: TransferRecord) -> Result<(), StoreError> {
        self.history.write().unwrap().push(entry);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TransferRecord>, StoreError> {
        let history = self.history.read().unwrap();
        Ok(history.iter().rev().take(limit).cloned().collect())
    }
}
