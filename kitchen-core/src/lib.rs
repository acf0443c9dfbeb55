pub mod repository;
pub mod table;

pub use repository::OrderRepository;
pub use table::{AttributeValue, Item, KeyValueTable, TableDescription, TableStatus};

/// Failures raised by the store boundary.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Table {table} not found")]
    ResourceNotFound { table: String },
    #[error("Store call failed: {0}")]
    Service(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Unsupported attribute type for {name}")]
    UnsupportedAttribute { name: String },
}

/// Failures raised by the order persistence adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("Table {table} did not become active within {attempts} attempts")]
    ProvisioningTimeout { table: String, attempts: u32 },
    #[error("Malformed attribute {attribute}: {reason}")]
    Malformed { attribute: String, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;
