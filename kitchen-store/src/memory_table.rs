use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;
use kitchen_core::{AttributeValue, Item, KeyValueTable, TableDescription, TableError, TableStatus};

struct TableState {
    partition_key: String,
    status: TableStatus,
    // Describe calls that still report the table as missing after creation
    hidden_polls: u32,
    // Describe calls that report CREATING before the table turns ACTIVE
    creating_polls: Option<u32>,
    items: HashMap<String, Item>,
}

/// Process-local key-value table.
///
/// Used for local runs without DynamoDB and as the store in tests. Newly
/// created tables go through the same CREATING -> ACTIVE transition a real
/// service reports, with configurable delays.
pub struct InMemoryTable {
    tables: RwLock<HashMap<String, TableState>>,
    hidden_polls: u32,
    activation_polls: Option<u32>,
    describe_calls: AtomicU32,
    create_calls: AtomicU32,
    put_calls: AtomicU32,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            hidden_polls: 0,
            activation_polls: Some(0),
            describe_calls: AtomicU32::new(0),
            create_calls: AtomicU32::new(0),
            put_calls: AtomicU32::new(0),
        }
    }

    /// Seed an existing, active table keyed by `id`.
    pub fn with_active_table(mut self, name: &str) -> Self {
        let state = TableState {
            partition_key: "id".to_string(),
            status: TableStatus::Active,
            hidden_polls: 0,
            creating_polls: None,
            items: HashMap::new(),
        };
        self.tables.get_mut().insert(name.to_string(), state);
        self
    }

    /// New tables report CREATING for `polls` describe calls before turning ACTIVE.
    pub fn with_activation_after(mut self, polls: u32) -> Self {
        self.activation_polls = Some(polls);
        self
    }

    /// New tables stay CREATING forever.
    pub fn never_activates(mut self) -> Self {
        self.activation_polls = None;
        self
    }

    /// New tables are reported missing for `polls` describe calls after creation.
    pub fn with_hidden_polls(mut self, polls: u32) -> Self {
        self.hidden_polls = polls;
        self
    }

    pub fn describe_calls(&self) -> u32 {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> u32 {
        self.put_calls.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(table: &str) -> TableError {
    TableError::ResourceNotFound {
        table: table.to_string(),
    }
}

fn key_string(value: &AttributeValue) -> Option<&str> {
    match value {
        AttributeValue::S(s) | AttributeValue::N(s) => Some(s.as_str()),
        AttributeValue::Null => None,
    }
}

#[async_trait]
impl KeyValueTable for InMemoryTable {
    async fn describe_table(&self, table: &str) -> Result<TableDescription, TableError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);

        let mut tables = self.tables.write().await;
        let state = tables.get_mut(table).ok_or_else(|| not_found(table))?;

        if state.hidden_polls > 0 {
            state.hidden_polls -= 1;
            return Err(not_found(table));
        }

        if state.status == TableStatus::Creating {
            if let Some(remaining) = state.creating_polls.as_mut() {
                if *remaining == 0 {
                    state.status = TableStatus::Active;
                } else {
                    *remaining -= 1;
                }
            }
        }

        Ok(TableDescription {
            name: table.to_string(),
            status: state.status.clone(),
        })
    }

    async fn create_table(&self, table: &str, partition_key: &str) -> Result<(), TableError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let mut tables = self.tables.write().await;
        if tables.contains_key(table) {
            return Err(TableError::Service(
                format!("Table already exists: {}", table).into(),
            ));
        }

        tables.insert(
            table.to_string(),
            TableState {
                partition_key: partition_key.to_string(),
                status: TableStatus::Creating,
                hidden_polls: self.hidden_polls,
                creating_polls: self.activation_polls,
                items: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), TableError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        let mut tables = self.tables.write().await;
        let state = tables.get_mut(table).ok_or_else(|| not_found(table))?;

        let key = item
            .get(&state.partition_key)
            .and_then(key_string)
            .ok_or_else(|| {
                TableError::Service(
                    format!("Item is missing partition key {}", state.partition_key).into(),
                )
            })?
            .to_string();

        state.items.insert(key, item);
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key: AttributeValue,
    ) -> Result<Option<Item>, TableError> {
        let tables = self.tables.read().await;
        let state = tables.get(table).ok_or_else(|| not_found(table))?;

        if key_name != state.partition_key {
            return Err(TableError::Service(
                format!("{} is not the partition key of {}", key_name, table).into(),
            ));
        }

        Ok(key_string(&key).and_then(|k| state.items.get(k).cloned()))
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>, TableError> {
        let tables = self.tables.read().await;
        let state = tables.get(table).ok_or_else(|| not_found(table))?;
        Ok(state.items.values().cloned().collect())
    }
}
