pub mod manager;
pub mod validation;

pub use manager::{OrderError, OrderManager};
pub use validation::{validate_new_order, FieldError, ValidationErrors};
