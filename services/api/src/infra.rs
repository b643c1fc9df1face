use eco_intellect::footprint::{
    LedgerError, OrderLedger, OrderRecord, PackagingType, ProviderStatus, TransportMode, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) providers: ProviderStatus,
}

/// Process-local ledger; records live as long as the server does.
#[derive(Default, Clone)]
pub(crate) struct InMemoryOrderLedger {
    records: Arc<Mutex<HashMap<UserId, Vec<OrderRecord>>>>,
}

impl OrderLedger for InMemoryOrderLedger {
    fn append(&self, record: OrderRecord) -> Result<OrderRecord, LedgerError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger mutex poisoned".to_string()))?;
        guard
            .entry(record.user_id.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn query(&self, user_id: &UserId) -> Result<Vec<OrderRecord>, LedgerError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger mutex poisoned".to_string()))?;
        Ok(guard.get(user_id).cloned().unwrap_or_default())
    }
}

fn parse_snake_case<T: DeserializeOwned>(raw: &str, kind: &str) -> Result<T, String> {
    let value = serde_json::Value::String(raw.trim().to_ascii_lowercase().replace('-', "_"));
    serde_json::from_value(value).map_err(|_| format!("'{raw}' is not a known {kind}"))
}

pub(crate) fn parse_transport(raw: &str) -> Result<TransportMode, String> {
    parse_snake_case(raw, "transport mode")
}

pub(crate) fn parse_packaging(raw: &str) -> Result<PackagingType, String> {
    parse_snake_case(raw, "packaging type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(user: &str, id: u64) -> OrderRecord {
        OrderRecord {
            id,
            user_id: UserId(user.to_string()),
            distance_km: 3.0,
            transport_mode: TransportMode::Motorcycle,
            packaging_type: PackagingType::Paper,
            carbon_emission_grams: 270.0,
            eco_score: 20,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn ledger_partitions_records_by_user() {
        let ledger = InMemoryOrderLedger::default();
        ledger.append(record("a", 1)).expect("append succeeds");
        ledger.append(record("b", 2)).expect("append succeeds");
        ledger.append(record("a", 3)).expect("append succeeds");

        let ids: Vec<u64> = ledger
            .query(&UserId("a".to_string()))
            .expect("query succeeds")
            .iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(ledger
            .query(&UserId("c".to_string()))
            .expect("query succeeds")
            .is_empty());
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!(
            parse_transport("electric-vehicle"),
            Ok(TransportMode::ElectricVehicle)
        );
        assert_eq!(parse_packaging("Reusable"), Ok(PackagingType::Reusable));
        assert!(parse_transport("rocket").is_err());
    }
}
