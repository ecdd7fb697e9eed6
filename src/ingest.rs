//! World Bank Remittance Prices Worldwide CSV ingestion.
//!
//! Turns the raw quarterly dataset export into corridor documents: one
//! corridor per (sending country, receiving country), with the firms
//! quoted on that corridor deduplicated and classified.

use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::corridor::{Corridor, CountryMapping, Provider, ProviderType};

/// The dataset quotes the FX margin and the total cost but never a flat
/// fee, so every provider gets the same fee floor.
const DEFAULT_MIN_FEE: f64 = 1.0;
const DEFAULT_SPEED_HOURS: f64 = 24.0;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing the '{0}' column")]
    MissingColumn(&'static str),
}

/// A fully processed dataset, ready for `CorridorStore::replace_all`.
#[derive(Debug)]
pub struct Dataset {
    pub corridors: Vec<Corridor>,
    pub mappings: Vec<CountryMapping>,
}

/// Column indices resolved from the normalized header row.
struct Columns {
    sending_country: usize,
    receiving_country: usize,
    sending_currency: usize,
    receiving_currency: usize,
    provider_name: usize,
    fx_margin_percent: usize,
    total_cost_percent: usize,
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

fn find_column(headers: &[String], name: &'static str) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h.as_str() == name)
        .ok_or(IngestError::MissingColumn(name))
}

impl Columns {
    fn resolve(header_record: &StringRecord) -> Result<Self, IngestError> {
        let headers: Vec<String> = header_record.iter().map(normalize_header).collect();
        Ok(Columns {
            sending_country: find_column(&headers, "source_name")?,
            receiving_country: find_column(&headers, "destination_name")?,
            sending_currency: find_column(&headers, "source_code")?,
            receiving_currency: find_column(&headers, "destination_code")?,
            provider_name: find_column(&headers, "firm")?,
            fx_margin_percent: find_column(&headers, "cc1_fx_margin")?,
            total_cost_percent: find_column(&headers, "cc1_total_cost_%")?,
        })
    }
}

/// Strip trailing legal suffixes (Inc, Ltd, LLC, Corp, N.A.) from a
/// firm name so the same operator quoted under slightly different
/// legal names collapses to one provider.
pub fn clean_provider_name(raw: &str) -> String {
    let mut name = raw.trim();

    let lower = name.to_ascii_lowercase();
    let lower = lower.strip_suffix('.').unwrap_or(&lower);
    for suffix in ["inc", "ltd", "llc", "corp", "n.a"] {
        if lower.ends_with(suffix) {
            let cut = lower.len() - suffix.len();
            // Only strip whole words, so "Zinc" keeps its name.
            if cut > 0 && matches!(lower.as_bytes()[cut - 1], b' ' | b',') {
                name = name[..cut].trim_end_matches([',', ' ']);
                break;
            }
        }
    }
    name.trim().to_string()
}

fn parse_percent(field: Option<&str>) -> f64 {
    field
        .and_then(|f| f.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parse and group a dataset from any reader. Rows missing a country or
/// the firm are dropped; unparseable numeric fields default to 0.
pub fn load_dataset<R: Read>(reader: R) -> Result<Dataset, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let columns = Columns::resolve(csv_reader.headers()?)?;

    let mut corridors: Vec<Corridor> = Vec::new();
    let mut corridor_index: HashMap<(String, String), usize> = HashMap::new();
    let mut seen_providers: HashMap<usize, HashSet<String>> = HashMap::new();

    let mut mappings: Vec<CountryMapping> = Vec::new();
    let mut mapped_countries: HashSet<String> = HashSet::new();

    let mut skipped = 0usize;
    for record in csv_reader.records() {
        let record = record?;

        let sending_country = record.get(columns.sending_country).unwrap_or("").trim();
        let receiving_country = record.get(columns.receiving_country).unwrap_or("").trim();
        let raw_name = record.get(columns.provider_name).unwrap_or("").trim();
        if sending_country.is_empty() || receiving_country.is_empty() || raw_name.is_empty() {
            skipped += 1;
            continue;
        }

        let provider_name = clean_provider_name(raw_name);
        if provider_name.is_empty() {
            skipped += 1;
            continue;
        }

        let sending_currency = record
            .get(columns.sending_currency)
            .unwrap_or("")
            .trim()
            .to_string();
        let receiving_currency = record
            .get(columns.receiving_currency)
            .unwrap_or("")
            .trim()
            .to_string();

        let fx_margin_percent = parse_percent(record.get(columns.fx_margin_percent));
        let total_cost_percent = parse_percent(record.get(columns.total_cost_percent));
        let base_fee_percent = (total_cost_percent - fx_margin_percent).max(0.0);

        if mapped_countries.insert(sending_country.to_string()) {
            mappings.push(CountryMapping {
                country: sending_country.to_string(),
                currency_code: sending_currency.clone(),
                currency_name: sending_currency.clone(),
            });
        }

        let key = (sending_country.to_string(), receiving_country.to_string());
        let index = match corridor_index.get(&key) {
            Some(&index) => index,
            None => {
                corridors.push(Corridor {
                    sending_country: sending_country.to_string(),
                    sending_currency,
                    receiving_country: receiving_country.to_string(),
                    receiving_currency,
                    providers: Vec::new(),
                });
                let index = corridors.len() - 1;
                corridor_index.insert(key, index);
                index
            }
        };

        // One entry per firm per corridor; repeated quarterly quotes
        // for the same firm are ignored after the first.
        let seen = seen_providers.entry(index).or_default();
        if !seen.insert(provider_name.clone()) {
            continue;
        }

        let provider_type = ProviderType::classify(&provider_name);
        corridors[index].providers.push(Provider {
            provider_name,
            provider_type,
            base_fee_percent,
            fx_margin_percent,
            min_fee: DEFAULT_MIN_FEE,
            speed_hours: DEFAULT_SPEED_HOURS,
        });
    }

    if skipped > 0 {
        debug!(skipped, "Dropped incomplete dataset rows");
    }
    info!(
        corridors = corridors.len(),
        mappings = mappings.len(),
        "Processed remittance dataset"
    );

    Ok(Dataset {
        corridors,
        mappings,
    })
}

/// Load a dataset from a CSV file on disk.
pub fn load_dataset_from_path(path: &Path) -> Result<Dataset, IngestError> {
    let file = std::fs::File::open(path)?;
    load_dataset(file)
}
