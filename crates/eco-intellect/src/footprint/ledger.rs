use super::domain::{OrderRecord, UserId};

/// Append-only store of analyzed orders, keyed by user. Implementations serialize their
/// own access; the engine never mutates a record after appending it.
pub trait OrderLedger: Send + Sync {
    fn append(&self, record: OrderRecord) -> Result<OrderRecord, LedgerError>;
    fn query(&self, user_id: &UserId) -> Result<Vec<OrderRecord>, LedgerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}
