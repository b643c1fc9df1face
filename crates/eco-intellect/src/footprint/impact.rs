//! Cumulative per-user metrics folded from the order ledger.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::domain::{OrderRecord, UserId};
use super::projection::{ProjectionEngine, YearlyProjection};
use super::round2;

/// Grams an unchecked order is assumed to emit; savings are measured against it.
pub const LEDGER_BASELINE_GRAMS_PER_ORDER: f64 = 500.0;
pub const DEFAULT_WINDOW_DAYS: u32 = 365;
const REPRESENTATIVE_FREQUENCY_PER_WEEK: u32 = 3;
const REPRESENTATIVE_ORDER_VALUE: f64 = 350.0;

/// Placeholder ranking signal; carries no ordering semantics.
pub const RANK_PERCENTILE_RANGE: RangeInclusive<u8> = 75..=95;

const ECO_CHAMPION_MIN_SCORE: u8 = 80;
const ADVOCATE_MIN_ORDERS: u64 = 50;
const CARBON_SAVER_MIN_KG: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    #[serde(rename = "Eco Champion")]
    EcoChampion,
    #[serde(rename = "Sustainability Advocate")]
    SustainabilityAdvocate,
    #[serde(rename = "Carbon Saver")]
    CarbonSaver,
}

/// Each trigger is evaluated on its own; a user can hold any combination.
pub fn achievements(eco_score: u8, total_orders: u64, carbon_saved_kg: f64) -> Vec<Achievement> {
    let triggers = [
        (eco_score > ECO_CHAMPION_MIN_SCORE, Achievement::EcoChampion),
        (
            total_orders > ADVOCATE_MIN_ORDERS,
            Achievement::SustainabilityAdvocate,
        ),
        (carbon_saved_kg > CARBON_SAVER_MIN_KG, Achievement::CarbonSaver),
    ];

    triggers
        .into_iter()
        .filter(|(earned, _)| *earned)
        .map(|(_, achievement)| achievement)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserImpact {
    pub user_id: UserId,
    pub time_period_days: u32,
    pub total_orders: u64,
    pub eco_score: u8,
    pub average_carbon_per_order_grams: f64,
    pub total_carbon_kg: f64,
    pub total_carbon_saved_kg: f64,
    pub rank_percentile: u8,
    pub achievements: Vec<Achievement>,
    pub yearly_projection: YearlyProjection,
}

pub struct ImpactAggregator {
    projection: ProjectionEngine,
}

impl ImpactAggregator {
    pub fn new(projection: ProjectionEngine) -> Self {
        Self { projection }
    }

    pub async fn aggregate(
        &self,
        user_id: &UserId,
        records: &[OrderRecord],
        days: u32,
    ) -> UserImpact {
        let total_orders = records.len() as u64;
        let (average_grams, total_carbon_kg, carbon_saved_kg, eco_score) = if records.is_empty()
        {
            (0.0, 0.0, 0.0, 0)
        } else {
            let total_grams: f64 = records
                .iter()
                .map(|record| record.carbon_emission_grams)
                .sum();
            let score_sum: u64 = records.iter().map(|record| u64::from(record.eco_score)).sum();
            let potential_grams = total_orders as f64 * LEDGER_BASELINE_GRAMS_PER_ORDER;

            (
                total_grams / total_orders as f64,
                round2(total_grams / 1000.0),
                round2((potential_grams - total_grams) / 1000.0),
                (score_sum / total_orders) as u8,
            )
        };

        let window = f64::from(DEFAULT_WINDOW_DAYS) / f64::from(days.max(1));
        let yearly_projection = self
            .projection
            .yearly_projection(
                average_grams,
                REPRESENTATIVE_FREQUENCY_PER_WEEK,
                REPRESENTATIVE_ORDER_VALUE,
            )
            .await
            .rescaled(window);

        UserImpact {
            user_id: user_id.clone(),
            time_period_days: days,
            total_orders,
            eco_score,
            average_carbon_per_order_grams: round2(average_grams),
            total_carbon_kg,
            total_carbon_saved_kg: carbon_saved_kg,
            rank_percentile: rand::thread_rng().gen_range(RANK_PERCENTILE_RANGE),
            achievements: achievements(eco_score, total_orders, carbon_saved_kg),
            yearly_projection,
        }
    }
}
