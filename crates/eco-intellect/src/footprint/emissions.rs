use std::sync::Arc;

use serde::Serialize;

use super::domain::{DataOrigin, FactorCategory, PackagingType, TransportMode};
use super::factors::FactorSource;

/// Fixed kitchen preparation time added to every delivery estimate.
pub const PREPARATION_MINUTES: f64 = 15.0;

/// Per-order emissions split into their two contributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionBreakdown {
    pub transport_grams: f64,
    pub packaging_grams: f64,
    pub total_grams: f64,
    pub transport_origin: DataOrigin,
    pub packaging_origin: DataOrigin,
}

/// Combines factor lookups into per-order totals.
#[derive(Clone)]
pub struct EmissionsCalculator {
    factors: Arc<dyn FactorSource>,
}

impl EmissionsCalculator {
    pub fn new(factors: Arc<dyn FactorSource>) -> Self {
        Self { factors }
    }

    pub fn factors_live(&self) -> bool {
        self.factors.is_live()
    }

    pub async fn breakdown(
        &self,
        distance_km: f64,
        transport: TransportMode,
        packaging: PackagingType,
    ) -> EmissionBreakdown {
        let transport_factor = self
            .factors
            .factor(FactorCategory::Transport, transport.as_str())
            .await;
        let packaging_factor = self
            .factors
            .factor(FactorCategory::Packaging, packaging.as_str())
            .await;

        let transport_grams = distance_km * transport_factor.grams;
        let packaging_grams = packaging_factor.grams;

        EmissionBreakdown {
            transport_grams,
            packaging_grams,
            total_grams: transport_grams + packaging_grams,
            transport_origin: transport_factor.origin,
            packaging_origin: packaging_factor.origin,
        }
    }

    pub async fn total_grams(
        &self,
        distance_km: f64,
        transport: TransportMode,
        packaging: PackagingType,
    ) -> f64 {
        self.breakdown(distance_km, transport, packaging)
            .await
            .total_grams
    }
}

/// Whole minutes from dispatch to doorstep, preparation included.
pub fn estimate_time_minutes(distance_km: f64, transport: TransportMode) -> u32 {
    (distance_km * transport.minutes_per_km() + PREPARATION_MINUTES) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::factors::FallbackFactorSource;

    fn calculator() -> EmissionsCalculator {
        EmissionsCalculator::new(Arc::new(FallbackFactorSource))
    }

    #[tokio::test]
    async fn car_with_plastic_over_five_km() {
        let breakdown = calculator()
            .breakdown(5.0, TransportMode::Car, PackagingType::Plastic)
            .await;

        assert_eq!(breakdown.transport_grams, 600.0);
        assert_eq!(breakdown.packaging_grams, 50.0);
        assert_eq!(breakdown.total_grams, 650.0);
        assert_eq!(breakdown.transport_origin, DataOrigin::Fallback);
        assert_eq!(breakdown.packaging_origin, DataOrigin::Fallback);
    }

    #[tokio::test]
    async fn zero_emission_transport_leaves_packaging_only() {
        let total = calculator()
            .total_grams(5.0, TransportMode::Bike, PackagingType::Biodegradable)
            .await;
        assert_eq!(total, 15.0);

        let walking = calculator()
            .total_grams(1.2, TransportMode::Walk, PackagingType::Reusable)
            .await;
        assert_eq!(walking, 5.0);
    }

    #[test]
    fn time_estimate_truncates_to_whole_minutes() {
        assert_eq!(estimate_time_minutes(5.0, TransportMode::Car), 27);
        assert_eq!(estimate_time_minutes(5.0, TransportMode::Bike), 35);
        assert_eq!(estimate_time_minutes(5.0, TransportMode::Motorcycle), 25);
        assert_eq!(estimate_time_minutes(1.0, TransportMode::Walk), 27);
        assert_eq!(estimate_time_minutes(0.3, TransportMode::Motorcycle), 15);
    }
}
