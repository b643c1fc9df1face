//! Yearly and fleet-scale extrapolation of a single order's footprint.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::DataOrigin;
use super::provider::{bounded, ProviderError};
use super::round2;
use crate::config::ProviderConfig;

/// Kilograms of CO2 one tree absorbs per year.
pub const TREE_ABSORPTION_KG_PER_YEAR: f64 = 21.77;
/// Reference car emissions used for the driving equivalent; same value as the car factor.
pub const CAR_REFERENCE_GRAMS_PER_KM: f64 = 120.0;
pub const WEEKS_PER_YEAR: u32 = 52;
pub const SCALE_USER_COUNTS: [u64; 4] = [1_000, 10_000, 100_000, 1_000_000];

/// Offset requirement tagged with the source that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEstimate {
    pub trees: u64,
    pub origin: DataOrigin,
}

/// `ceil(kg / 21.77)`, never below one tree.
pub fn trees_to_offset(carbon_kg: f64) -> u64 {
    let trees = (carbon_kg / TREE_ABSORPTION_KG_PER_YEAR).ceil();
    if trees.is_finite() && trees >= 1.0 {
        trees as u64
    } else {
        1
    }
}

/// Supplies a trees-needed estimate for a yearly CO2 mass. Implementations never fail.
#[async_trait::async_trait]
pub trait ProjectionSource: Send + Sync {
    async fn trees_needed(&self, carbon_kg: f64) -> TreeEstimate;

    fn is_live(&self) -> bool {
        false
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FormulaProjectionSource;

#[async_trait::async_trait]
impl ProjectionSource for FormulaProjectionSource {
    async fn trees_needed(&self, carbon_kg: f64) -> TreeEstimate {
        TreeEstimate {
            trees: trees_to_offset(carbon_kg),
            origin: DataOrigin::Fallback,
        }
    }
}

#[derive(Deserialize)]
struct QueryEnvelope {
    queryresult: QueryResult,
}

#[derive(Deserialize)]
struct QueryResult {
    #[serde(default)]
    pods: Vec<Pod>,
}

#[derive(Deserialize)]
struct Pod {
    #[serde(default)]
    subpods: Vec<Subpod>,
}

#[derive(Deserialize)]
struct Subpod {
    #[serde(default)]
    plaintext: Option<String>,
}

/// Wolfram-style natural language endpoint answering in plaintext pods.
pub struct RemoteProjectionSource {
    client: reqwest::Client,
    app_id: String,
    endpoint: String,
    timeout: Duration,
}

impl RemoteProjectionSource {
    pub fn new(app_id: String, endpoint: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            app_id,
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    async fn fetch(&self, carbon_kg: f64) -> Result<u64, ProviderError> {
        let question = format!("how many trees needed to absorb {carbon_kg} kg CO2 per year");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("appid", self.app_id.as_str()),
                ("input", question.as_str()),
                ("output", "json"),
                ("format", "plaintext"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let envelope: QueryEnvelope = serde_json::from_str(&body)
            .map_err(|err| ProviderError::MalformedPayload(err.to_string()))?;

        envelope
            .queryresult
            .pods
            .iter()
            .flat_map(|pod| pod.subpods.iter())
            .filter_map(|subpod| subpod.plaintext.as_deref())
            .find_map(first_number)
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| (value as u64).max(1))
            .ok_or_else(|| ProviderError::MalformedPayload("no numeric answer".to_string()))
    }
}

#[async_trait::async_trait]
impl ProjectionSource for RemoteProjectionSource {
    async fn trees_needed(&self, carbon_kg: f64) -> TreeEstimate {
        match bounded(self.timeout, self.fetch(carbon_kg)).await {
            Ok(trees) => {
                debug!(carbon_kg, trees, "live tree estimate");
                TreeEstimate {
                    trees,
                    origin: DataOrigin::Live,
                }
            }
            Err(err) => {
                warn!(carbon_kg, error = %err, "projection provider degraded, using formula");
                FormulaProjectionSource.trees_needed(carbon_kg).await
            }
        }
    }

    fn is_live(&self) -> bool {
        true
    }
}

/// First decimal number in free text, ignoring thousands separators.
pub(crate) fn first_number(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    let start = cleaned.find(|c: char| c.is_ascii_digit())?;
    let tail = &cleaned[start..];

    let mut end = tail
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(tail.len());
    if tail[end..].starts_with('.') {
        let fraction = &tail[end + 1..];
        let digits = fraction
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(fraction.len());
        end += 1 + digits;
    }

    tail[..end].trim_end_matches('.').parse().ok()
}

pub fn projection_source_from_config(config: &ProviderConfig) -> Arc<dyn ProjectionSource> {
    match &config.projection_app_id {
        Some(app_id) => Arc::new(RemoteProjectionSource::new(
            app_id.clone(),
            &config.projection_base_url,
            config.timeout,
        )),
        None => Arc::new(FormulaProjectionSource),
    }
}

/// What-if extrapolation of one user's footprint to a larger population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleScenario {
    pub users: u64,
    pub total_co2_saved_tonnes: f64,
    pub equivalent_trees: u64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub total_orders_per_year: u32,
    pub total_carbon_kg: f64,
    pub trees_needed_to_offset: u64,
    pub equivalent_car_km: f64,
    pub money_spent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_scenarios: Option<Vec<ScaleScenario>>,
    pub trees_source: DataOrigin,
}

impl YearlyProjection {
    /// Scales every projected quantity by `factor`; scenarios describe a full year per
    /// user and are carried unchanged.
    pub fn rescaled(&self, factor: f64) -> Self {
        let trees = (self.trees_needed_to_offset as f64 * factor) as u64;
        Self {
            total_orders_per_year: (f64::from(self.total_orders_per_year) * factor) as u32,
            total_carbon_kg: round2(self.total_carbon_kg * factor),
            trees_needed_to_offset: trees.max(1),
            equivalent_car_km: round2(self.equivalent_car_km * factor),
            money_spent: round2(self.money_spent * factor),
            scale_scenarios: self.scale_scenarios.clone(),
            trees_source: self.trees_source,
        }
    }
}

#[derive(Clone)]
pub struct ProjectionEngine {
    source: Arc<dyn ProjectionSource>,
}

impl ProjectionEngine {
    pub fn new(source: Arc<dyn ProjectionSource>) -> Self {
        Self { source }
    }

    pub fn source_live(&self) -> bool {
        self.source.is_live()
    }

    pub async fn yearly_projection(
        &self,
        carbon_grams_per_order: f64,
        frequency_per_week: u32,
        order_value: f64,
    ) -> YearlyProjection {
        let orders_per_year = frequency_per_week * WEEKS_PER_YEAR;
        let total_carbon_kg = round2(carbon_grams_per_order * f64::from(orders_per_year) / 1000.0);
        let trees = self.source.trees_needed(total_carbon_kg).await;

        YearlyProjection {
            total_orders_per_year: orders_per_year,
            total_carbon_kg,
            trees_needed_to_offset: trees.trees.max(1),
            equivalent_car_km: round2(total_carbon_kg * 1000.0 / CAR_REFERENCE_GRAMS_PER_KM),
            money_spent: round2(order_value * f64::from(orders_per_year)),
            scale_scenarios: Some(scale_scenarios(total_carbon_kg)),
            trees_source: trees.origin,
        }
    }
}

/// Linear extrapolation of a per-user yearly footprint to each population size.
pub fn scale_scenarios(carbon_kg_per_user: f64) -> Vec<ScaleScenario> {
    SCALE_USER_COUNTS
        .iter()
        .map(|&users| {
            let tonnes = round2(carbon_kg_per_user * users as f64 / 1000.0);
            ScaleScenario {
                users,
                total_co2_saved_tonnes: tonnes,
                equivalent_trees: trees_to_offset(tonnes * 1000.0),
                label: format!("{} users", group_thousands(users)),
            }
        })
        .collect()
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
