//! Ranked search over lower-impact (transport, packaging) pairs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{PackagingType, TransportMode};
use super::emissions::{estimate_time_minutes, EmissionsCalculator};
use super::round2;
use super::scoring::{eco_score, rating, Rating};

/// Car, walk, plastic and paper are never offered as an improvement.
const CANDIDATE_TRANSPORTS: [TransportMode; 3] = [
    TransportMode::Bike,
    TransportMode::ElectricVehicle,
    TransportMode::Motorcycle,
];
const CANDIDATE_PACKAGING: [PackagingType; 2] =
    [PackagingType::Biodegradable, PackagingType::Reusable];

pub const MAX_ALTERNATIVES: usize = 3;

/// Candidate that beats the submitted order on carbon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transport_mode: TransportMode,
    pub packaging_type: PackagingType,
    pub label: String,
    pub carbon_emission_grams: f64,
    pub estimated_time_minutes: u32,
    pub carbon_saved_grams: f64,
    pub time_difference_minutes: i64,
    pub eco_score: u8,
}

/// One cell of the full transport x packaging comparison matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionComparison {
    pub transport_mode: TransportMode,
    pub packaging_type: PackagingType,
    pub carbon_emission_grams: f64,
    pub estimated_time_minutes: u32,
    pub eco_score: u8,
    pub rating: Rating,
}

pub struct AlternativeFinder {
    calculator: EmissionsCalculator,
}

impl AlternativeFinder {
    pub fn new(calculator: EmissionsCalculator) -> Self {
        Self { calculator }
    }

    /// Up to three candidates with strictly positive savings against `current_grams`, the
    /// total already reported for the submitted pair, largest saving first.
    pub async fn find_alternatives(
        &self,
        distance_km: f64,
        current_transport: TransportMode,
        current_packaging: PackagingType,
        current_grams: f64,
    ) -> Vec<Alternative> {
        let current_minutes = estimate_time_minutes(distance_km, current_transport);

        let mut alternatives = Vec::new();
        for transport in CANDIDATE_TRANSPORTS {
            for packaging in CANDIDATE_PACKAGING {
                if transport == current_transport && packaging == current_packaging {
                    continue;
                }

                let grams = self
                    .calculator
                    .total_grams(distance_km, transport, packaging)
                    .await;
                let carbon_saved = current_grams - grams;
                if carbon_saved <= 0.0 {
                    continue;
                }

                let minutes = estimate_time_minutes(distance_km, transport);
                alternatives.push(Alternative {
                    transport_mode: transport,
                    packaging_type: packaging,
                    label: format!("{} + {}", transport.label(), packaging.label()),
                    carbon_emission_grams: round2(grams),
                    estimated_time_minutes: minutes,
                    carbon_saved_grams: round2(carbon_saved),
                    time_difference_minutes: i64::from(minutes) - i64::from(current_minutes),
                    eco_score: eco_score(grams, distance_km),
                });
            }
        }

        alternatives.sort_by(|a, b| b.carbon_saved_grams.total_cmp(&a.carbon_saved_grams));
        alternatives.truncate(MAX_ALTERNATIVES);
        alternatives
    }

    /// Every transport x packaging pair for the distance, best eco score first.
    pub async fn compare_options(&self, distance_km: f64) -> Vec<OptionComparison> {
        let mut options = Vec::new();
        for transport in TransportMode::ordered() {
            for packaging in PackagingType::ordered() {
                let grams = round2(
                    self.calculator
                        .total_grams(distance_km, transport, packaging)
                        .await,
                );
                let score = eco_score(grams, distance_km);
                options.push(OptionComparison {
                    transport_mode: transport,
                    packaging_type: packaging,
                    carbon_emission_grams: grams,
                    estimated_time_minutes: estimate_time_minutes(distance_km, transport),
                    eco_score: score,
                    rating: rating(score),
                });
            }
        }

        options.sort_by(|a, b| match b.eco_score.cmp(&a.eco_score) {
            Ordering::Equal => a.carbon_emission_grams.total_cmp(&b.carbon_emission_grams),
            other => other,
        });
        options
    }
}
