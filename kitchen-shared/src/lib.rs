pub mod models;

pub use models::{Order, OrderItem, OrderStatus};
