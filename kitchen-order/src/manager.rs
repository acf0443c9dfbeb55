use std::sync::Arc;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use kitchen_core::{OrderRepository, StoreError};
use kitchen_shared::{Order, OrderStatus};

/// Manages order lifecycle and state transitions on top of a repository.
///
/// Transitions are unconstrained: any status may move to any other, ordering
/// policy belongs to whoever drives the kitchen display. Entering `Completed`
/// stamps `delivered_at` with the current time, every time. Leaving
/// `Completed` keeps whatever `delivered_at` was last stored.
#[derive(Clone)]
pub struct OrderManager {
    repo: Arc<dyn OrderRepository>,
}

impl OrderManager {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }

    /// Store a new order under a fresh id and the current creation time.
    /// Any id or creation time supplied by the caller is discarded.
    pub async fn create_order(&self, mut order: Order) -> Result<Order, OrderError> {
        order.id = Uuid::new_v4();
        order.generated_at = Utc::now();

        let order = self.repo.put(order).await?;
        info!(order_id = %order.id, items = order.items.len(), "Order received");
        Ok(order)
    }

    /// Move an order to `status`. Returns `None` without writing when the id is unknown.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderError> {
        let Some(mut order) = self.repo.get_by_id(order_id).await? else {
            return Ok(None);
        };

        let previous = order.status;
        order.status = status;
        if status == OrderStatus::Completed {
            order.delivered_at = Some(Utc::now());
        }

        let order = self.repo.put(order).await?;
        info!(order_id = %order.id, from = ?previous, to = ?status, "Order status updated");
        Ok(Some(order))
    }

    /// Every stored order, unordered.
    pub async fn list_queue(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.repo.get_all().await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use kitchen_core::{StoreResult, TableError};
    use kitchen_shared::OrderItem;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct FakeRepository {
        orders: RwLock<HashMap<Uuid, Order>>,
        puts: AtomicUsize,
    }

    impl FakeRepository {
        fn puts(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OrderRepository for FakeRepository {
        async fn put(&self, order: Order) -> StoreResult<Order> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.orders.write().await.insert(order.id, order.clone());
            Ok(order)
        }

        async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Order>> {
            Ok(self.orders.read().await.get(&id).cloned())
        }

        async fn get_all(&self) -> StoreResult<Vec<Order>> {
            Ok(self.orders.read().await.values().cloned().collect())
        }
    }

    struct BrokenRepository;

    #[async_trait]
    impl OrderRepository for BrokenRepository {
        async fn put(&self, _order: Order) -> StoreResult<Order> {
            Err(TableError::Service("throttled".into()).into())
        }

        async fn get_by_id(&self, _id: Uuid) -> StoreResult<Option<Order>> {
            Err(TableError::Service("throttled".into()).into())
        }

        async fn get_all(&self) -> StoreResult<Vec<Order>> {
            Err(TableError::Service("throttled".into()).into())
        }
    }

    fn setup() -> (Arc<FakeRepository>, OrderManager) {
        let repo = Arc::new(FakeRepository::default());
        let manager = OrderManager::new(repo.clone());
        (repo, manager)
    }

    fn burger() -> Order {
        Order::new(vec![OrderItem::new("Classic Burger", "Beef patty, cheese")])
    }

    fn assert_recent(ts: chrono::DateTime<Utc>) {
        let age = Utc::now() - ts;
        assert!(
            age >= Duration::zero() && age < Duration::seconds(5),
            "timestamp {} is not recent",
            ts
        );
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_id_and_creation_time() {
        let (repo, manager) = setup();
        let mut order = burger();
        let supplied_id = order.id;
        order.generated_at = Utc::now() - Duration::days(3);

        let created = manager.create_order(order).await.unwrap();

        assert_ne!(created.id, supplied_id);
        assert_recent(created.generated_at);
        assert_eq!(created.status, OrderStatus::Received);
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_completing_sets_delivered_at() {
        let (_, manager) = setup();
        let created = manager.create_order(burger()).await.unwrap();

        let done = manager
            .update_status(created.id, OrderStatus::Completed)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(done.status, OrderStatus::Completed);
        assert_recent(done.delivered_at.unwrap());
    }

    #[tokio::test]
    async fn test_in_progress_leaves_delivered_at_untouched() {
        let (_, manager) = setup();
        let created = manager.create_order(burger()).await.unwrap();

        let updated = manager
            .update_status(created.id, OrderStatus::InProgress)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, OrderStatus::InProgress);
        assert!(updated.delivered_at.is_none());
    }

    #[tokio::test]
    async fn test_any_transition_is_allowed() {
        let (_, manager) = setup();
        let created = manager.create_order(burger()).await.unwrap();

        // Received straight to Completed, then back to Received
        for status in [OrderStatus::Completed, OrderStatus::Received, OrderStatus::Ready] {
            let updated = manager.update_status(created.id, status).await.unwrap().unwrap();
            assert_eq!(updated.status, status);
        }
    }

    #[tokio::test]
    async fn test_leaving_completed_keeps_delivered_at() {
        let (repo, manager) = setup();
        let created = manager.create_order(burger()).await.unwrap();
        let done = manager
            .update_status(created.id, OrderStatus::Completed)
            .await
            .unwrap()
            .unwrap();

        let reverted = manager
            .update_status(created.id, OrderStatus::InProgress)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reverted.delivered_at, done.delivered_at);
        let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.delivered_at, done.delivered_at);
    }

    #[tokio::test]
    async fn test_completing_again_overwrites_delivered_at() {
        let (repo, manager) = setup();
        let mut order = burger();
        order.status = OrderStatus::Completed;
        order.delivered_at = Some(Utc::now() - Duration::hours(2));
        let stale = order.delivered_at;
        repo.put(order.clone()).await.unwrap();

        let done = manager
            .update_status(order.id, OrderStatus::Completed)
            .await
            .unwrap()
            .unwrap();

        assert_ne!(done.delivered_at, stale);
        assert_recent(done.delivered_at.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found_and_not_written() {
        let (repo, manager) = setup();

        let result = manager
            .update_status(Uuid::new_v4(), OrderStatus::Ready)
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(repo.puts(), 0);
    }

    #[tokio::test]
    async fn test_queue_contains_every_stored_order() {
        let (repo, manager) = setup();
        let mut ids = HashSet::new();
        for _ in 0..3 {
            let order = burger();
            ids.insert(order.id);
            repo.put(order).await.unwrap();
        }

        let queue: HashSet<Uuid> = manager
            .list_queue()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(queue, ids);
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let manager = OrderManager::new(Arc::new(BrokenRepository));

        assert!(matches!(
            manager.create_order(burger()).await,
            Err(OrderError::Store(StoreError::Table(TableError::Service(_))))
        ));
        assert!(manager.update_status(Uuid::new_v4(), OrderStatus::Ready).await.is_err());
        assert!(manager.list_queue().await.is_err());
    }
}
