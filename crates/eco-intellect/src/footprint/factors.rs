//! Emission factor lookup with a live provider and a fixed fallback table.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::domain::{DataOrigin, FactorCategory};
use super::provider::{bounded, ProviderError};
use crate::config::ProviderConfig;

/// Grams CO2-equivalent per km of transport.
const TRANSPORT_FACTORS: [(&str, f64); 5] = [
    ("car", 120.0),
    ("motorcycle", 80.0),
    ("electric_vehicle", 40.0),
    ("bike", 0.0),
    ("walk", 0.0),
];
const UNKNOWN_TRANSPORT_FACTOR: f64 = 100.0;

/// Grams CO2-equivalent per package.
const PACKAGING_FACTORS: [(&str, f64); 4] = [
    ("plastic", 50.0),
    ("paper", 30.0),
    ("biodegradable", 15.0),
    ("reusable", 5.0),
];
const UNKNOWN_PACKAGING_FACTOR: f64 = 50.0;

/// Factor reading tagged with the source that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub grams: f64,
    pub origin: DataOrigin,
}

impl EmissionFactor {
    fn fallback(category: FactorCategory, item: &str) -> Self {
        Self {
            grams: fallback_factor(category, item),
            origin: DataOrigin::Fallback,
        }
    }
}

/// Looks up the fixed table value for a factor key; unknown items get the category default.
pub fn fallback_factor(category: FactorCategory, item: &str) -> f64 {
    let (table, unknown): (&[(&str, f64)], f64) = match category {
        FactorCategory::Transport => (&TRANSPORT_FACTORS[..], UNKNOWN_TRANSPORT_FACTOR),
        FactorCategory::Packaging => (&PACKAGING_FACTORS[..], UNKNOWN_PACKAGING_FACTOR),
    };

    table
        .iter()
        .find(|(key, _)| *key == item)
        .map(|(_, grams)| *grams)
        .unwrap_or(unknown)
}

/// Supplies grams CO2e for a (category, item) pair. Implementations never fail.
#[async_trait::async_trait]
pub trait FactorSource: Send + Sync {
    async fn factor(&self, category: FactorCategory, item: &str) -> EmissionFactor;

    fn is_live(&self) -> bool {
        false
    }
}

/// Table-only source used when no provider credential is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackFactorSource;

#[async_trait::async_trait]
impl FactorSource for FallbackFactorSource {
    async fn factor(&self, category: FactorCategory, item: &str) -> EmissionFactor {
        EmissionFactor::fallback(category, item)
    }
}

#[derive(Serialize)]
struct FactorRequest<'a> {
    category: &'a str,
    item: &'a str,
}

#[derive(Deserialize)]
struct FactorResponse {
    co2_grams: Option<f64>,
}

/// Factor table resolved once per process: every known key live, or every key fallback.
#[derive(Debug, Clone, PartialEq)]
struct ResolvedFactors {
    entries: Vec<(FactorCategory, &'static str, f64)>,
    origin: DataOrigin,
}

impl ResolvedFactors {
    fn fallback() -> Self {
        Self {
            entries: known_keys()
                .into_iter()
                .map(|(category, item)| (category, item, fallback_factor(category, item)))
                .collect(),
            origin: DataOrigin::Fallback,
        }
    }

    fn lookup(&self, category: FactorCategory, item: &str) -> EmissionFactor {
        self.entries
            .iter()
            .find(|(key_category, key_item, _)| *key_category == category && *key_item == item)
            .map(|(_, _, grams)| EmissionFactor {
                grams: *grams,
                origin: self.origin,
            })
            .unwrap_or_else(|| EmissionFactor::fallback(category, item))
    }
}

fn known_keys() -> Vec<(FactorCategory, &'static str)> {
    let transport = TRANSPORT_FACTORS
        .iter()
        .map(|(item, _)| (FactorCategory::Transport, *item));
    let packaging = PACKAGING_FACTORS
        .iter()
        .map(|(item, _)| (FactorCategory::Packaging, *item));
    transport.chain(packaging).collect()
}

/// GreenPT-style provider answering `POST {base}/emissions/factor`.
///
/// The whole table is fetched on first use and kept for the life of the source. The first
/// failed or slow call abandons the provider and the fixed table is used instead.
pub struct RemoteFactorSource {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
    resolved: OnceCell<ResolvedFactors>,
}

impl RemoteFactorSource {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: format!("{}/emissions/factor", base_url.trim_end_matches('/')),
            timeout,
            resolved: OnceCell::new(),
        }
    }

    async fn resolve(&self) -> ResolvedFactors {
        match self.fetch_all().await {
            Ok(entries) => {
                debug!(count = entries.len(), "live emission factors resolved");
                ResolvedFactors {
                    entries,
                    origin: DataOrigin::Live,
                }
            }
            Err(err) => {
                warn!(error = %err, "factor provider degraded, using fallback table");
                ResolvedFactors::fallback()
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<(FactorCategory, &'static str, f64)>, ProviderError> {
        let keys = known_keys();
        let mut entries = Vec::with_capacity(keys.len());
        for (category, item) in keys {
            let grams = bounded(self.timeout, self.fetch(category, item)).await?;
            debug!(category = category.as_str(), item, grams, "live emission factor");
            entries.push((category, item, grams));
        }
        Ok(entries)
    }

    async fn fetch(&self, category: FactorCategory, item: &str) -> Result<f64, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&FactorRequest {
                category: category.as_str(),
                item,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let payload: FactorResponse = serde_json::from_str(&body)
            .map_err(|err| ProviderError::MalformedPayload(err.to_string()))?;

        match payload.co2_grams {
            Some(grams) if grams.is_finite() && grams >= 0.0 => Ok(grams),
            Some(grams) => Err(ProviderError::MalformedPayload(format!(
                "co2_grams out of range: {grams}"
            ))),
            None => Err(ProviderError::MalformedPayload(
                "missing co2_grams".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl FactorSource for RemoteFactorSource {
    async fn factor(&self, category: FactorCategory, item: &str) -> EmissionFactor {
        self.resolved
            .get_or_init(|| self.resolve())
            .await
            .lookup(category, item)
    }

    fn is_live(&self) -> bool {
        true
    }
}

/// Picks the live source when a credential is configured, the table otherwise.
pub fn factor_source_from_config(config: &ProviderConfig) -> Arc<dyn FactorSource> {
    match &config.factor_api_key {
        Some(api_key) => Arc::new(RemoteFactorSource::new(
            api_key.clone(),
            &config.factor_base_url,
            config.timeout,
        )),
        None => Arc::new(FallbackFactorSource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    #[test]
    fn table_covers_known_items_and_defaults_unknown_ones() {
        assert_eq!(fallback_factor(FactorCategory::Transport, "car"), 120.0);
        assert_eq!(fallback_factor(FactorCategory::Transport, "walk"), 0.0);
        assert_eq!(fallback_factor(FactorCategory::Packaging, "reusable"), 5.0);
        assert_eq!(fallback_factor(FactorCategory::Transport, "hovercraft"), 100.0);
        assert_eq!(fallback_factor(FactorCategory::Packaging, "crate"), 50.0);
    }

    #[test]
    fn source_selection_follows_credentials() {
        let offline = ProviderConfig::offline();
        assert!(!factor_source_from_config(&offline).is_live());

        let configured = ProviderConfig {
            factor_api_key: Some("key".to_string()),
            ..ProviderConfig::offline()
        };
        assert!(factor_source_from_config(&configured).is_live());
    }
}
