use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::alternatives::{Alternative, AlternativeFinder, OptionComparison};
use super::context::environmental_context;
use super::domain::{
    ensure_distance, DataOrigin, OrderInput, OrderRecord, OrderSubmission, UserId,
    ValidationError,
};
use super::emissions::EmissionsCalculator;
use super::factors::{factor_source_from_config, FactorSource};
use super::impact::{ImpactAggregator, UserImpact, DEFAULT_WINDOW_DAYS};
use super::ledger::{LedgerError, OrderLedger};
use super::projection::{
    projection_source_from_config, ProjectionEngine, ProjectionSource, YearlyProjection,
};
use super::round2;
use super::scoring::{eco_score, rating, Rating};
use crate::config::ProviderConfig;

static ORDER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_order_id() -> u64 {
    ORDER_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Origin of every externally sourced number in an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSources {
    pub transport_factor: DataOrigin,
    pub packaging_factor: DataOrigin,
    pub trees_needed: DataOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAnalysis {
    pub order_id: u64,
    pub user_id: UserId,
    pub carbon_emission_grams: f64,
    pub eco_score: u8,
    pub rating: Rating,
    pub better_alternatives: Vec<Alternative>,
    pub yearly_projection: YearlyProjection,
    pub environmental_context: String,
    pub data_sources: DataSources,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMatrix {
    pub distance_km: f64,
    pub total_options: usize,
    pub options: Vec<OptionComparison>,
}

/// Which providers are answering live rather than from fallback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub emission_factors_live: bool,
    pub projections_live: bool,
}

/// Service composing the estimation engine with the order ledger.
pub struct FootprintService<L> {
    ledger: Arc<L>,
    calculator: EmissionsCalculator,
    finder: AlternativeFinder,
    projection: ProjectionEngine,
    aggregator: ImpactAggregator,
}

impl<L> FootprintService<L>
where
    L: OrderLedger + 'static,
{
    pub fn new(
        ledger: Arc<L>,
        factors: Arc<dyn FactorSource>,
        projections: Arc<dyn ProjectionSource>,
    ) -> Self {
        let calculator = EmissionsCalculator::new(factors);
        let projection = ProjectionEngine::new(projections);

        Self {
            ledger,
            finder: AlternativeFinder::new(calculator.clone()),
            aggregator: ImpactAggregator::new(projection.clone()),
            calculator,
            projection,
        }
    }

    /// Builds live or fallback sources depending on which credentials are configured.
    pub fn from_config(ledger: Arc<L>, providers: &ProviderConfig) -> Self {
        Self::new(
            ledger,
            factor_source_from_config(providers),
            projection_source_from_config(providers),
        )
    }

    pub fn provider_status(&self) -> ProviderStatus {
        ProviderStatus {
            emission_factors_live: self.calculator.factors_live(),
            projections_live: self.projection.source_live(),
        }
    }

    /// Analyze one order, record it in the ledger, and return the full breakdown.
    pub async fn analyze(
        &self,
        submission: OrderSubmission,
    ) -> Result<OrderAnalysis, FootprintServiceError> {
        let input = OrderInput::try_from(&submission)?;
        let user_id = match submission.user_id {
            Some(raw) if raw.trim().is_empty() => return Err(ValidationError::BlankUserId.into()),
            Some(raw) => UserId(raw.trim().to_string()),
            None => UserId::demo(),
        };

        let breakdown = self
            .calculator
            .breakdown(
                input.distance_km(),
                input.transport_mode(),
                input.packaging_type(),
            )
            .await;
        let carbon_grams = round2(breakdown.total_grams);
        let score = eco_score(carbon_grams, input.distance_km());

        let better_alternatives = self
            .finder
            .find_alternatives(
                input.distance_km(),
                input.transport_mode(),
                input.packaging_type(),
                carbon_grams,
            )
            .await;

        let yearly_projection = self
            .projection
            .yearly_projection(
                carbon_grams,
                u32::from(input.frequency_per_week()),
                input.order_value(),
            )
            .await;
        let environmental_context = environmental_context(yearly_projection.total_carbon_kg);

        let record = self.ledger.append(OrderRecord {
            id: next_order_id(),
            user_id: user_id.clone(),
            distance_km: input.distance_km(),
            transport_mode: input.transport_mode(),
            packaging_type: input.packaging_type(),
            carbon_emission_grams: carbon_grams,
            eco_score: score,
            timestamp: Utc::now(),
        })?;
        debug!(order_id = record.id, user = %user_id.0, carbon_grams, score, "order analyzed");

        Ok(OrderAnalysis {
            order_id: record.id,
            user_id,
            carbon_emission_grams: carbon_grams,
            eco_score: score,
            rating: rating(score),
            better_alternatives,
            data_sources: DataSources {
                transport_factor: breakdown.transport_origin,
                packaging_factor: breakdown.packaging_origin,
                trees_needed: yearly_projection.trees_source,
            },
            yearly_projection,
            environmental_context,
        })
    }

    /// Every transport x packaging combination for the distance, best first.
    pub async fn compare(&self, distance_km: f64) -> Result<ComparisonMatrix, FootprintServiceError> {
        ensure_distance(distance_km)?;
        let options = self.finder.compare_options(distance_km).await;

        Ok(ComparisonMatrix {
            distance_km,
            total_options: options.len(),
            options,
        })
    }

    /// Cumulative impact for one user over a day window (365 when unspecified).
    pub async fn user_impact(
        &self,
        user_id: &UserId,
        days: Option<u32>,
    ) -> Result<UserImpact, FootprintServiceError> {
        if user_id.0.trim().is_empty() {
            return Err(ValidationError::BlankUserId.into());
        }
        let records = self.ledger.query(user_id)?;
        let days = days.unwrap_or(DEFAULT_WINDOW_DAYS);

        Ok(self.aggregator.aggregate(user_id, &records, days).await)
    }
}

/// Error raised by the footprint service.
#[derive(Debug, thiserror::Error)]
pub enum FootprintServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
