use async_trait::async_trait;
use uuid::Uuid;
use kitchen_shared::Order;
use crate::StoreResult;

/// Repository trait for order data access.
///
/// `put` is the only write: it stores the full record keyed by `order.id`
/// and overwrites whatever was there. Concurrent puts on the same id are
/// last-writer-wins.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn put(&self, order: Order) -> StoreResult<Order>;

    /// Returns `None` when no order is stored under `id`.
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Order>>;

    /// Full scan of every stored order, in no particular order.
    ///
    /// The result is materialized in memory, so cost grows linearly with
    /// the table size.
    async fn get_all(&self) -> StoreResult<Vec<Order>>;
}
