pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::delivery::{Delivery, DeliveryStatus};

/// Mutator applied inside a transaction. It receives the just-read snapshot
/// and must return the full document to write back; returning an error
/// aborts the transaction without writing.
pub type Mutator = Box<dyn FnOnce(Delivery) -> Result<Delivery, AppError> + Send>;

/// Query shape the store can answer natively: single equality filters,
/// descending createdAt order, limit, start-after-id cursor. Everything
/// richer (geo radius, visibility policy) is layered on by the caller.
#[derive(Debug, Clone, Default)]
pub struct DeliveryQuery {
    pub status: Option<DeliveryStatus>,
    pub business_name: Option<String>,
    pub page_size: usize,
    /// Id of the last delivery of the previous page; empty for the first page.
    pub start_after: Option<String>,
}

/// Document persistence for the delivery aggregate.
///
/// Any backing store offering per-document atomic read-validate-write
/// satisfies this contract; coordination between racing writers is entirely
/// the store's job, the services never hold locks across calls.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Persist a new document. A single call; no partial state on failure.
    async fn create(&self, delivery: &Delivery) -> Result<(), AppError>;

    async fn get(&self, id: &str) -> Result<Delivery, AppError>;

    /// Atomic read-modify-write of one document. Of N concurrent calls on
    /// the same id, each mutator observes the latest committed snapshot;
    /// a mutator error aborts with nothing written. Returns the committed
    /// document.
    async fn transact(&self, id: &str, mutate: Mutator) -> Result<Delivery, AppError>;

    /// Ordered query, newest first, with id as the tie-break on equal
    /// timestamps so pagination stays deterministic.
    async fn query(&self, query: &DeliveryQuery) -> Result<Vec<Delivery>, AppError>;
}
