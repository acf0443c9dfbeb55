pub mod app_config;
pub mod dynamo_table;
pub mod memory_table;
pub mod order_repo;

use std::sync::Arc;
use tracing::info;
use kitchen_core::KeyValueTable;
use app_config::{StoreBackend, StoreConfig};

pub use dynamo_table::DynamoTable;
pub use memory_table::InMemoryTable;
pub use order_repo::StoreOrderRepository;

/// Build the table client selected by `store.backend`.
pub async fn connect_table(config: &StoreConfig) -> Arc<dyn KeyValueTable> {
    match config.backend {
        StoreBackend::Dynamodb => Arc::new(DynamoTable::from_config(config).await),
        StoreBackend::Memory => {
            info!("Using in-memory order table; data is lost on restart");
            Arc::new(InMemoryTable::new())
        }
    }
}
