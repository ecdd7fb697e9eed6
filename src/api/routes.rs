//! Route handlers for corridor lookups, transfer analysis, and history.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::core::corridor::{CountryMapping, Destination};
use crate::core::currency::resolve_rate;
use crate::core::engine::{self, CostBreakdown, Recommendation};
use crate::store::TransferRecord;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/countries", get(countries))
        .route("/api/destinations/:source_country", get(destinations))
        .route("/api/transfer/analyze", post(analyze_transfer))
        .route("/api/history", get(history))
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub amount: f64,
    pub source_country: String,
    pub destination_country: String,
}

/// Response shape of `/api/transfer/analyze`. Field names are part of
/// the frontend contract and must not change.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub costs: Vec<CostBreakdown>,
    pub recommendation: Recommendation,
    pub sending_currency: String,
    pub receiving_country: String,
    pub transfer_amount: f64,
}

async fn countries(State(state): State<AppState>) -> Result<Json<Vec<CountryMapping>>, ApiError> {
    let countries = state.corridors.sending_countries().await?;
    if countries.is_empty() {
        return Err(ApiError::NotFound("No sending countries found.".to_string()));
    }
    Ok(Json(countries))
}

async fn destinations(
    State(state): State<AppState>,
    Path(source_country): Path<String>,
) -> Result<Json<Vec<Destination>>, ApiError> {
    let destinations = state.corridors.destinations(&source_country).await?;
    if destinations.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No destination countries found for {source_country}"
        )));
    }
    Ok(Json(destinations))
}

async fn analyze_transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(ApiError::Validation(
            "transfer amount must be a positive number".to_string(),
        ));
    }

    let corridor = state
        .corridors
        .corridor(&request.source_country, &request.destination_country)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("No remittance providers found for the corridor.".to_string())
        })?;

    let live_rate = resolve_rate(
        state.rates.as_ref(),
        &corridor.sending_currency,
        &corridor.receiving_currency,
        state.rate_policy,
    )
    .await;
    debug!(
        sending = %corridor.sending_currency,
        receiving = %corridor.receiving_currency,
        live_rate,
        "Analyzing transfer"
    );

    let comparison = engine::compare_costs(request.amount, &corridor.providers, live_rate)?;

    // History is best-effort; a full comparison response beats a 500
    // over a bookkeeping write.
    let record = TransferRecord {
        sending_country: corridor.sending_country.clone(),
        receiving_country: corridor.receiving_country.clone(),
        amount: request.amount,
        best_provider_name: comparison.recommendation.best_provider_name.clone(),
        total_cost: comparison.recommendation.total_cost,
        created_at: Utc::now(),
    };
    if let Err(e) = state.history.record(record).await {
        warn!(error = %e, "Failed to record transfer history");
    }

    Ok(Json(AnalysisResponse {
        costs: comparison.costs,
        recommendation: comparison.recommendation,
        sending_currency: corridor.sending_currency,
        receiving_country: request.destination_country,
        transfer_amount: request.amount,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 100;

async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<TransferRecord>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    Ok(Json(state.history.recent(limit).await?))
}
