//! Delivery order carbon estimation, scoring, alternative ranking, and impact projection.
//!
//! Live emission-factor and projection providers are optional; every lookup has a
//! deterministic fallback so callers always receive a number.

pub mod alternatives;
pub mod context;
pub mod domain;
pub mod emissions;
pub mod factors;
pub mod impact;
pub mod ledger;
pub mod projection;
pub(crate) mod provider;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use alternatives::{Alternative, AlternativeFinder, OptionComparison, MAX_ALTERNATIVES};
pub use context::environmental_context;
pub use domain::{
    DataOrigin, FactorCategory, OrderInput, OrderRecord, OrderSubmission, PackagingType,
    TransportMode, UserId, ValidationError,
};
pub use emissions::{estimate_time_minutes, EmissionBreakdown, EmissionsCalculator};
pub use factors::{
    factor_source_from_config, fallback_factor, EmissionFactor, FactorSource,
    FallbackFactorSource, RemoteFactorSource,
};
pub use impact::{Achievement, ImpactAggregator, UserImpact, DEFAULT_WINDOW_DAYS};
pub use ledger::{LedgerError, OrderLedger};
pub use projection::{
    projection_source_from_config, trees_to_offset, FormulaProjectionSource, ProjectionEngine,
    ProjectionSource, RemoteProjectionSource, ScaleScenario, TreeEstimate, YearlyProjection,
};
pub use router::footprint_router;
pub use scoring::{eco_score, rating, Rating};
pub use service::{
    ComparisonMatrix, DataSources, FootprintService, FootprintServiceError, OrderAnalysis,
    ProviderStatus,
};

/// Rounds to two decimal places, the precision every reported quantity uses.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
