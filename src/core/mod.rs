//! Core business logic abstractions

pub mod corridor;
pub mod currency;
pub mod engine;
pub mod log;

// Re-export main types for cleaner imports
pub use corridor::{Corridor, CountryMapping, Destination, Provider, ProviderType};
pub use currency::{CurrencyRateProvider, RatePolicy};
pub use engine::{CostBreakdown, CostComparison, EngineError, Recommendation};
