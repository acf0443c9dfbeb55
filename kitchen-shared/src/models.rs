use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Production status of an order in the kitchen queue
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Received,
    InProgress,
    Ready,
    Completed,
}

/// An order placed at the kiosk and tracked through production.
///
/// `id`, `status` and `generated_at` default when absent from an incoming
/// payload; the lifecycle service assigns `id` and `generated_at` on creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    /// Free-text identification for customers who did not sign in
    #[serde(default)]
    pub anonymous_tag: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn new(items: Vec<OrderItem>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: OrderStatus::Received,
            generated_at: Utc::now(),
            delivered_at: None,
            customer_id: None,
            anonymous_tag: None,
            items,
        }
    }
}

/// A product line embedded in an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
        }
    }
}
