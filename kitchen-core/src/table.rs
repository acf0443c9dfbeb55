use async_trait::async_trait;
use std::collections::HashMap;
use crate::TableError;

/// A single attribute value in a schemaless table record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    S(String),
    N(String),
    Null,
}

impl AttributeValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(n) => Some(n.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// A full table record: attribute name to value
pub type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    Other(String),
}

#[derive(Debug, Clone)]
pub struct TableDescription {
    pub name: String,
    pub status: TableStatus,
}

/// Store boundary: the operations the persistence adapter needs from a
/// key-value table service.
///
/// `describe_table` must return `TableError::ResourceNotFound` when the
/// table does not exist so callers can tell it apart from other failures.
#[async_trait]
pub trait KeyValueTable: Send + Sync {
    async fn describe_table(&self, table: &str) -> Result<TableDescription, TableError>;

    /// Create a table with a single string partition key and on-demand capacity.
    async fn create_table(&self, table: &str, partition_key: &str) -> Result<(), TableError>;

    async fn put_item(&self, table: &str, item: Item) -> Result<(), TableError>;

    async fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key: AttributeValue,
    ) -> Result<Option<Item>, TableError>;

    async fn scan(&self, table: &str) -> Result<Vec<Item>, TableError>;
}
