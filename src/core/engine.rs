//! The cost engine: per-provider cost breakdowns, ranking, and the
//! savings recommendation.
//!
//! Pure and synchronous. The caller resolves the corridor and the live
//! rate; the engine only does arithmetic over data already in memory,
//! so it is trivially safe to call concurrently. A fallback rate is
//! indistinguishable from a live one here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::corridor::{Provider, ProviderType};

/// Minimum savings (in sending-currency units) before the
/// recommendation bothers naming a comparison provider.
const SAVINGS_THRESHOLD: f64 = 1.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The corridor exists but carries no providers. The only way the
    /// engine can fail.
    #[error("no provider data available for this corridor")]
    NoProviderData,
}

/// What one provider would charge for the transfer. All monetary fields
/// are rounded to 2 decimals at construction; intermediate math is not
/// rounded, so the fee/FX split does not compound rounding error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub provider_name: String,
    pub provider_type: ProviderType,
    /// Disclosed fee: `max(amount * base_fee_percent / 100, min_fee)`.
    pub fee_cost: f64,
    /// Hidden cost of the provider's exchange-rate markup, in
    /// sending-currency units.
    pub fx_cost: f64,
    pub total_cost: f64,
    pub amount_after_costs: f64,
    /// The rate the provider actually applies, i.e. the live rate after
    /// their margin. Serialized under the name the frontend expects.
    #[serde(rename = "live_exchange_rate")]
    pub effective_rate: f64,
}

/// The cheapest option, and what switching to it saves over a baseline
/// provider (a bank when one exists on the corridor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub best_provider_name: String,
    pub total_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_over_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_amount: Option<f64>,
}

/// Ranked breakdowns (ascending by total cost) plus the recommendation.
#[derive(Debug, Clone)]
pub struct CostComparison {
    pub costs: Vec<CostBreakdown>,
    pub recommendation: Recommendation,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn breakdown(amount: f64, provider: &Provider, live_rate: f64) -> CostBreakdown {
    let fee_cost = round2((amount * provider.base_fee_percent / 100.0).max(provider.min_fee));

    // The provider's offered rate is the live rate minus their margin;
    // the FX cost is that spread converted back to sending-currency
    // units, proportional to the amount. Requires live_rate > 0, which
    // the caller guarantees.
    let provider_rate = live_rate * (1.0 - provider.fx_margin_percent / 100.0);
    let fx_cost = round2((live_rate - provider_rate) * (amount / live_rate));

    let total_cost = round2(fee_cost + fx_cost);
    CostBreakdown {
        provider_name: provider.provider_name.clone(),
        provider_type: provider.provider_type,
        fee_cost,
        fx_cost,
        total_cost,
        amount_after_costs: round2(amount - total_cost),
        effective_rate: round2(provider_rate),
    }
}

/// Pick the comparison baseline from the pre-sort order: the last bank
/// that is not the best option, falling back to the most expensive
/// provider when the corridor has no other bank.
fn comparison_baseline<'a>(
    original_order: &'a [CostBreakdown],
    sorted: &'a [CostBreakdown],
    best: &CostBreakdown,
) -> Option<&'a CostBreakdown> {
    original_order
        .iter()
        .rev()
        .find(|c| c.provider_type == ProviderType::Bank && c.provider_name != best.provider_name)
        .or_else(|| {
            if sorted.len() > 1 {
                sorted.last()
            } else {
                None
            }
        })
}

/// Compute cost breakdowns for every provider, rank them cheapest
/// first, and derive the savings recommendation.
///
/// `amount` and `live_rate` must be positive; the HTTP layer validates
/// the amount and the rate resolver only ever hands over positive
/// rates.
pub fn compare_costs(
    amount: f64,
    providers: &[Provider],
    live_rate: f64,
) -> Result<CostComparison, EngineError> {
    if providers.is_empty() {
        return Err(EngineError::NoProviderData);
    }

    let original_order: Vec<CostBreakdown> = providers
        .iter()
        .map(|p| breakdown(amount, p, live_rate))
        .collect();

    // Vec::sort_by is stable, so ties keep the provider's input order.
    let mut costs = original_order.clone();
    costs.sort_by(|a, b| a.total_cost.total_cmp(&b.total_cost));

    let best = &costs[0];
    let mut recommendation = Recommendation {
        best_provider_name: best.provider_name.clone(),
        total_cost: best.total_cost,
        savings_over_provider: None,
        savings_amount: None,
    };

    if let Some(baseline) = comparison_baseline(&original_order, &costs, best) {
        let savings = baseline.total_cost - best.total_cost;
        if savings > SAVINGS_THRESHOLD {
            recommendation.savings_over_provider = Some(baseline.provider_name.clone());
            recommendation.savings_amount = Some(round2(savings));
        }
    }

    Ok(CostComparison {
        costs,
        recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(
        name: &str,
        kind: ProviderType,
        base_fee_percent: f64,
        fx_margin_percent: f64,
        min_fee: f64,
    ) -> Provider {
        Provider {
            provider_name: name.to_string(),
            provider_type: kind,
            base_fee_percent,
            fx_margin_percent,
            min_fee,
            speed_hours: 24.0,
        }
    }

    #[test]
    fn minimum_fee_floor_applies() {
        // amount=1000, 0% fee with a 5.00 floor and no margin
        let providers = vec![provider("ZeroFee", ProviderType::Fintech, 0.0, 0.0, 5.0)];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let cost = &result.costs[0];
        assert_eq!(cost.fee_cost, 5.00);
        assert_eq!(cost.fx_cost, 0.00);
        assert_eq!(cost.total_cost, 5.00);
        assert_eq!(cost.amount_after_costs, 995.00);
        assert_eq!(cost.effective_rate, 83.00);
    }

    #[test]
    fn percentage_fee_and_fx_margin() {
        // amount=1000 at 2% fee (floor 1.00) and 1% margin on 83.0:
        // fee = 20.00, provider rate = 82.17, fx = (83-82.17)*(1000/83) = 10.00
        let providers = vec![provider("PricedIn", ProviderType::Fintech, 2.0, 1.0, 1.0)];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let cost = &result.costs[0];
        assert_eq!(cost.fee_cost, 20.00);
        assert_eq!(cost.fx_cost, 10.00);
        assert_eq!(cost.total_cost, 30.00);
        assert_eq!(cost.amount_after_costs, 970.00);
        assert_eq!(cost.effective_rate, 82.17);
    }

    #[test]
    fn empty_provider_list_is_no_data() {
        let result = compare_costs(1000.0, &[], 83.0);
        assert_eq!(result.unwrap_err(), EngineError::NoProviderData);
    }

    #[test]
    fn costs_sorted_ascending_and_best_is_first() {
        let providers = vec![
            provider("Expensive Bank", ProviderType::Bank, 5.0, 3.0, 10.0),
            provider("Cheap App", ProviderType::Fintech, 0.5, 0.2, 1.0),
            provider("Middling", ProviderType::Fintech, 2.0, 1.0, 1.0),
        ];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let totals: Vec<f64> = result.costs.iter().map(|c| c.total_cost).collect();
        let mut sorted = totals.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(totals, sorted);

        assert_eq!(result.costs[0].provider_name, "Cheap App");
        assert_eq!(result.recommendation.best_provider_name, "Cheap App");
        assert_eq!(result.recommendation.total_cost, result.costs[0].total_cost);
    }

    #[test]
    fn ties_keep_provider_input_order() {
        let providers = vec![
            provider("First", ProviderType::Fintech, 1.0, 0.0, 1.0),
            provider("Second", ProviderType::Fintech, 1.0, 0.0, 1.0),
        ];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();
        assert_eq!(result.costs[0].provider_name, "First");
        assert_eq!(result.costs[1].provider_name, "Second");
    }

    #[test]
    fn arithmetic_invariants_hold_for_every_breakdown() {
        let providers = vec![
            provider("A Bank", ProviderType::Bank, 3.3, 2.7, 8.0),
            provider("B", ProviderType::Fintech, 0.77, 0.31, 2.5),
            provider("C", ProviderType::Fintech, 1.49, 1.01, 0.99),
        ];
        let amount = 1234.56;
        let result = compare_costs(amount, &providers, 74.37).unwrap();

        for cost in &result.costs {
            assert_eq!(cost.total_cost, round2(cost.fee_cost + cost.fx_cost));
            assert_eq!(cost.amount_after_costs, round2(amount - cost.total_cost));
        }
    }

    #[test]
    fn recommendation_compares_against_the_bank() {
        // Bank total: fee max(10, 5)=10, fx = 0.25% of 1000 = 2.50 -> 12.50
        // Fintech total: fee max(10, 1)=10, fx 0 -> 10.00
        // Savings 2.50 > 1, attributed to the bank.
        let providers = vec![
            provider("Legacy Bank", ProviderType::Bank, 1.0, 0.25, 5.0),
            provider("Neat App", ProviderType::Fintech, 1.0, 0.0, 1.0),
        ];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let rec = &result.recommendation;
        assert_eq!(rec.best_provider_name, "Neat App");
        assert_eq!(rec.savings_over_provider.as_deref(), Some("Legacy Bank"));
        assert_eq!(rec.savings_amount, Some(2.50));
    }

    #[test]
    fn single_provider_has_no_savings_baseline() {
        let providers = vec![provider("Only Option", ProviderType::Fintech, 1.0, 0.5, 1.0)];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let rec = &result.recommendation;
        assert_eq!(rec.best_provider_name, "Only Option");
        assert!(rec.savings_over_provider.is_none());
        assert!(rec.savings_amount.is_none());
    }

    #[test]
    fn savings_below_threshold_stay_unset() {
        // Difference of exactly 0.90 never triggers a recommendation.
        let providers = vec![
            provider("Close Bank", ProviderType::Bank, 0.0, 0.0, 5.90),
            provider("Slightly Cheaper", ProviderType::Fintech, 0.0, 0.0, 5.00),
        ];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let rec = &result.recommendation;
        assert_eq!(rec.best_provider_name, "Slightly Cheaper");
        assert!(rec.savings_over_provider.is_none());
        assert!(rec.savings_amount.is_none());
    }

    #[test]
    fn without_a_bank_the_most_expensive_provider_is_the_baseline() {
        let providers = vec![
            provider("Mid App", ProviderType::Fintech, 1.0, 0.0, 1.0),
            provider("Cheap App", ProviderType::Fintech, 0.2, 0.0, 1.0),
            provider("Pricey App", ProviderType::Fintech, 2.0, 0.0, 1.0),
        ];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let rec = &result.recommendation;
        assert_eq!(rec.best_provider_name, "Cheap App");
        assert_eq!(rec.savings_over_provider.as_deref(), Some("Pricey App"));
        // 20.00 - 2.00
        assert_eq!(rec.savings_amount, Some(18.00));
    }

    #[test]
    fn baseline_uses_last_bank_in_input_order() {
        // Two banks: the later one in input order is the baseline even
        // though the first is more expensive.
        let providers = vec![
            provider("Expensive Bank", ProviderType::Bank, 4.0, 0.0, 1.0),
            provider("Modest Bank", ProviderType::Bank, 2.0, 0.0, 1.0),
            provider("Best App", ProviderType::Fintech, 0.5, 0.0, 1.0),
        ];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let rec = &result.recommendation;
        assert_eq!(rec.best_provider_name, "Best App");
        assert_eq!(rec.savings_over_provider.as_deref(), Some("Modest Bank"));
        // 20.00 - 5.00
        assert_eq!(rec.savings_amount, Some(15.00));
    }

    #[test]
    fn best_bank_is_never_its_own_baseline() {
        // The cheapest provider is itself a bank; the other bank is the
        // comparison, not the best one.
        let providers = vec![
            provider("Cheap Bank", ProviderType::Bank, 0.0, 0.0, 2.0),
            provider("Dear Bank", ProviderType::Bank, 3.0, 0.0, 1.0),
        ];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let rec = &result.recommendation;
        assert_eq!(rec.best_provider_name, "Cheap Bank");
        assert_eq!(rec.savings_over_provider.as_deref(), Some("Dear Bank"));
        assert_eq!(rec.savings_amount, Some(28.00));
    }

    #[test]
    fn breakdown_serializes_the_fixed_field_names() {
        let providers = vec![provider("Wire Co", ProviderType::Fintech, 2.0, 1.0, 1.0)];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let json = serde_json::to_value(&result.costs[0]).unwrap();
        for field in [
            "provider_name",
            "provider_type",
            "fee_cost",
            "fx_cost",
            "total_cost",
            "amount_after_costs",
            "live_exchange_rate",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["live_exchange_rate"], 82.17);
    }

    #[test]
    fn unset_savings_fields_are_omitted_from_json() {
        let providers = vec![provider("Only Option", ProviderType::Fintech, 1.0, 0.0, 1.0)];
        let result = compare_costs(1000.0, &providers, 83.0).unwrap();

        let json = serde_json::to_value(&result.recommendation).unwrap();
        assert!(json.get("savings_over_provider").is_none());
        assert!(json.get("savings_amount").is_none());
    }
}
