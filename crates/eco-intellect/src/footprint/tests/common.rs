use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::footprint::domain::{
    OrderRecord, OrderSubmission, PackagingType, TransportMode, UserId,
};
use crate::footprint::factors::FallbackFactorSource;
use crate::footprint::ledger::{LedgerError, OrderLedger};
use crate::footprint::projection::FormulaProjectionSource;
use crate::footprint::{footprint_router, FootprintService};

#[derive(Default, Clone)]
pub(super) struct MemoryLedger {
    records: Arc<Mutex<Vec<OrderRecord>>>,
}

impl MemoryLedger {
    pub(super) fn records(&self) -> Vec<OrderRecord> {
        self.records.lock().expect("ledger mutex poisoned").clone()
    }
}

impl OrderLedger for MemoryLedger {
    fn append(&self, record: OrderRecord) -> Result<OrderRecord, LedgerError> {
        self.records
            .lock()
            .expect("ledger mutex poisoned")
            .push(record.clone());
        Ok(record)
    }

    fn query(&self, user_id: &UserId) -> Result<Vec<OrderRecord>, LedgerError> {
        Ok(self
            .records
            .lock()
            .expect("ledger mutex poisoned")
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableLedger;

impl OrderLedger for UnavailableLedger {
    fn append(&self, _record: OrderRecord) -> Result<OrderRecord, LedgerError> {
        Err(LedgerError::Unavailable("database offline".to_string()))
    }

    fn query(&self, _user_id: &UserId) -> Result<Vec<OrderRecord>, LedgerError> {
        Err(LedgerError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn submission() -> OrderSubmission {
    OrderSubmission {
        distance_km: 5.0,
        transport_mode: TransportMode::Car,
        packaging_type: PackagingType::Plastic,
        estimated_time_minutes: Some(30),
        order_value: 350.0,
        frequency_per_week: 1,
        user_id: None,
    }
}

pub(super) fn green_submission(user: &str) -> OrderSubmission {
    OrderSubmission {
        distance_km: 5.0,
        transport_mode: TransportMode::Bike,
        packaging_type: PackagingType::Biodegradable,
        estimated_time_minutes: None,
        order_value: 220.0,
        frequency_per_week: 4,
        user_id: Some(user.to_string()),
    }
}

pub(super) fn offline_service<L>(ledger: Arc<L>) -> FootprintService<L>
where
    L: OrderLedger + 'static,
{
    FootprintService::new(
        ledger,
        Arc::new(FallbackFactorSource),
        Arc::new(FormulaProjectionSource),
    )
}

pub(super) fn build_service() -> (Arc<FootprintService<MemoryLedger>>, MemoryLedger) {
    let ledger = MemoryLedger::default();
    let service = offline_service(Arc::new(ledger.clone()));
    (Arc::new(service), ledger)
}

pub(super) fn router_with_service(service: Arc<FootprintService<MemoryLedger>>) -> axum::Router {
    footprint_router(service)
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(super) async fn spawn_provider(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing is listening on.
pub(super) async fn closed_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
