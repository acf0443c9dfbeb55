use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;
use kitchen_core::{
    AttributeValue, Item, KeyValueTable, OrderRepository, StoreError, StoreResult, TableError,
    TableStatus,
};
use kitchen_shared::{Order, OrderItem, OrderStatus};

/// Partition key of the orders table
pub const PARTITION_KEY: &str = "id";
/// Delay between readiness polls while a new table is being created
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Number of readiness polls before provisioning gives up
pub const MAX_POLL_ATTEMPTS: u32 = 30;

// Attribute names of a stored order record
const ATTR_ID: &str = PARTITION_KEY;
const ATTR_STATUS: &str = "status";
const ATTR_GENERATED_AT: &str = "generated_at";
const ATTR_DELIVERED_AT: &str = "delivered_at";
const ATTR_CUSTOMER_ID: &str = "customer_id";
const ATTR_ANONYMOUS_TAG: &str = "anonymous_tag";
const ATTR_ITEMS: &str = "items";

/// Order persistence on top of a schemaless key-value table.
///
/// Construction provisions the table: if it does not exist it is created and
/// polled until active. Once built, the repository never re-checks the table.
pub struct StoreOrderRepository {
    table: Arc<dyn KeyValueTable>,
    table_name: String,
}

impl StoreOrderRepository {
    pub async fn connect(
        table: Arc<dyn KeyValueTable>,
        table_name: impl Into<String>,
    ) -> StoreResult<Self> {
        let repo = Self {
            table,
            table_name: table_name.into(),
        };
        repo.ensure_table().await?;
        Ok(repo)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn ensure_table(&self) -> StoreResult<()> {
        match self.table.describe_table(&self.table_name).await {
            Ok(description) => {
                info!(
                    table = %description.name,
                    status = ?description.status,
                    "Orders table found"
                );
                Ok(())
            }
            Err(TableError::ResourceNotFound { .. }) => {
                info!(table = %self.table_name, "Orders table missing, creating it");
                self.table
                    .create_table(&self.table_name, PARTITION_KEY)
                    .await?;
                self.wait_until_active().await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn wait_until_active(&self) -> StoreResult<()> {
        for attempt in 1..=MAX_POLL_ATTEMPTS {
            match self.table.describe_table(&self.table_name).await {
                Ok(description) if description.status == TableStatus::Active => {
                    info!(table = %description.name, attempt, "Orders table is active");
                    return Ok(());
                }
                Ok(description) => {
                    debug!(
                        table = %description.name,
                        attempt,
                        status = ?description.status,
                        "Orders table not active yet"
                    );
                }
                // Freshly created tables can take a moment to become visible
                Err(TableError::ResourceNotFound { .. }) => {
                    debug!(table = %self.table_name, attempt, "Orders table not visible yet");
                }
                Err(e) => return Err(e.into()),
            }

            if attempt < MAX_POLL_ATTEMPTS {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }

        error!(
            table = %self.table_name,
            attempts = MAX_POLL_ATTEMPTS,
            "Orders table did not become active"
        );
        Err(StoreError::ProvisioningTimeout {
            table: self.table_name.clone(),
            attempts: MAX_POLL_ATTEMPTS,
        })
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn put(&self, order: Order) -> StoreResult<Order> {
        let item = to_item(&order)?;
        self.table.put_item(&self.table_name, item).await?;
        debug!(order_id = %order.id, status = ?order.status, "Order stored");
        Ok(order)
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let item = self
            .table
            .get_item(&self.table_name, PARTITION_KEY, AttributeValue::S(id.to_string()))
            .await?;

        item.as_ref().map(from_item).transpose()
    }

    async fn get_all(&self) -> StoreResult<Vec<Order>> {
        let items = self.table.scan(&self.table_name).await?;
        items.iter().map(from_item).collect()
    }
}

/// Marshal an order into a table record.
///
/// `customer_id` and `anonymous_tag` are always written, as `Null` when
/// absent. `delivered_at` is only written when set.
pub fn to_item(order: &Order) -> StoreResult<Item> {
    let items = serde_json::to_string(&order.items).map_err(|e| StoreError::Malformed {
        attribute: ATTR_ITEMS.to_string(),
        reason: e.to_string(),
    })?;

    let mut item = Item::new();
    item.insert(ATTR_ID.to_string(), AttributeValue::S(order.id.to_string()));
    item.insert(
        ATTR_STATUS.to_string(),
        AttributeValue::N(status_code(order.status).to_string()),
    );
    item.insert(
        ATTR_GENERATED_AT.to_string(),
        AttributeValue::S(format_timestamp(&order.generated_at)),
    );
    item.insert(
        ATTR_CUSTOMER_ID.to_string(),
        order
            .customer_id
            .map(|id| AttributeValue::S(id.to_string()))
            .unwrap_or(AttributeValue::Null),
    );
    item.insert(
        ATTR_ANONYMOUS_TAG.to_string(),
        order
            .anonymous_tag
            .clone()
            .map(AttributeValue::S)
            .unwrap_or(AttributeValue::Null),
    );
    item.insert(ATTR_ITEMS.to_string(), AttributeValue::S(items));

    if let Some(delivered_at) = &order.delivered_at {
        item.insert(
            ATTR_DELIVERED_AT.to_string(),
            AttributeValue::S(format_timestamp(delivered_at)),
        );
    }

    Ok(item)
}

/// Unmarshal a table record. Optional attributes may be `Null` or missing.
pub fn from_item(item: &Item) -> StoreResult<Order> {
    let id = parse_uuid(ATTR_ID, required_s(item, ATTR_ID)?)?;

    let code = required(item, ATTR_STATUS)?
        .as_n()
        .ok_or_else(|| malformed(ATTR_STATUS, "expected a number"))?;
    let status = status_from_code(code)?;

    let generated_at = parse_timestamp(ATTR_GENERATED_AT, required_s(item, ATTR_GENERATED_AT)?)?;

    let delivered_at = optional_s(item, ATTR_DELIVERED_AT)?
        .map(|s| parse_timestamp(ATTR_DELIVERED_AT, s))
        .transpose()?;

    let customer_id = optional_s(item, ATTR_CUSTOMER_ID)?
        .map(|s| parse_uuid(ATTR_CUSTOMER_ID, s))
        .transpose()?;

    let anonymous_tag = optional_s(item, ATTR_ANONYMOUS_TAG)?.map(str::to_string);

    let items: Vec<OrderItem> = serde_json::from_str(required_s(item, ATTR_ITEMS)?)
        .map_err(|e| malformed(ATTR_ITEMS, e))?;

    Ok(Order {
        id,
        status,
        generated_at,
        delivered_at,
        customer_id,
        anonymous_tag,
        items,
    })
}

fn status_code(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Received => 0,
        OrderStatus::InProgress => 1,
        OrderStatus::Ready => 2,
        OrderStatus::Completed => 3,
    }
}

fn status_from_code(code: &str) -> StoreResult<OrderStatus> {
    match code.trim() {
        "0" => Ok(OrderStatus::Received),
        "1" => Ok(OrderStatus::InProgress),
        "2" => Ok(OrderStatus::Ready),
        "3" => Ok(OrderStatus::Completed),
        other => Err(malformed(ATTR_STATUS, format!("unknown status code {}", other))),
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(attribute: &str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| malformed(attribute, e))
}

fn parse_uuid(attribute: &str, value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| malformed(attribute, e))
}

fn required<'a>(item: &'a Item, name: &str) -> StoreResult<&'a AttributeValue> {
    item.get(name)
        .ok_or_else(|| malformed(name, "missing attribute"))
}

fn required_s<'a>(item: &'a Item, name: &str) -> StoreResult<&'a str> {
    required(item, name)?
        .as_s()
        .ok_or_else(|| malformed(name, "expected a string"))
}

fn optional_s<'a>(item: &'a Item, name: &str) -> StoreResult<Option<&'a str>> {
    match item.get(name) {
        None | Some(AttributeValue::Null) => Ok(None),
        Some(AttributeValue::S(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(malformed(name, "expected a string or null")),
    }
}

fn malformed(attribute: &str, reason: impl ToString) -> StoreError {
    StoreError::Malformed {
        attribute: attribute.to_string(),
        reason: reason.to_string(),
    }
}
