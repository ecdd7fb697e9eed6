//! Corridor reference data: providers, corridors, and country lookups.

use serde::{Deserialize, Serialize};

/// How a provider is classified for the savings recommendation.
///
/// Banks are the comparison baseline: the recommendation answers
/// "how much do you save by not using your bank for this transfer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Bank,
    Fintech,
}

impl ProviderType {
    /// Classify a provider by its cleaned name. Anything with "bank" in
    /// the name is a bank; everything else is treated as a money
    /// transfer operator.
    pub fn classify(name: &str) -> Self {
        if name.to_lowercase().contains("bank") {
            ProviderType::Bank
        } else {
            ProviderType::Fintech
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::Bank => write!(f, "bank"),
            ProviderType::Fintech => write!(f, "fintech"),
        }
    }
}

/// A remittance service offered on a corridor. Immutable reference data;
/// pricing is a percentage fee with a floor plus an FX margin off the
/// live rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub provider_name: String,
    pub provider_type: ProviderType,
    pub base_fee_percent: f64,
    pub fx_margin_percent: f64,
    pub min_fee: f64,
    pub speed_hours: f64,
}

/// A directed (sending country, receiving country) pair with its
/// currency codes and the providers serving it. At most one corridor
/// exists per country pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corridor {
    pub sending_country: String,
    pub sending_currency: String,
    pub receiving_country: String,
    pub receiving_currency: String,
    pub providers: Vec<Provider>,
}

/// A sending country and its currency, for the country picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryMapping {
    pub country: String,
    pub currency_code: String,
    pub currency_name: String,
}

/// A reachable destination from a given sending country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub country: String,
    pub currency_code: String,
}
