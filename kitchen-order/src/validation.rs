use serde::Serialize;
use kitchen_shared::Order;

/// A single rule violation, addressed by field path (e.g. `items[0].name`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Order validation failed with {} error(s)", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

/// Check an incoming order before it is created.
///
/// Every violation is reported, not just the first.
pub fn validate_new_order(order: &Order) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if order.items.is_empty() {
        errors.push(FieldError {
            field: "items".to_string(),
            message: "Order must contain at least one item.".to_string(),
        });
    }

    for (index, item) in order.items.iter().enumerate() {
        if item.name.trim().is_empty() {
            errors.push(FieldError {
                field: format!("items[{}].name", index),
                message: "Item name cannot be empty.".to_string(),
            });
        }
        if item.description.trim().is_empty() {
            errors.push(FieldError {
                field: format!("items[{}].description", index),
                message: "Item description cannot be empty.".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitchen_shared::OrderItem;

    #[test]
    fn test_empty_items_are_rejected() {
        let err = validate_new_order(&Order::new(vec![])).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "items");
        assert_eq!(err.errors[0].message, "Order must contain at least one item.");
    }

    #[test]
    fn test_blank_item_fields_are_rejected() {
        let order = Order::new(vec![
            OrderItem::new("Classic Burger", "Beef patty"),
            OrderItem::new("", "  "),
        ]);

        let err = validate_new_order(&order).unwrap_err();
        let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["items[1].name", "items[1].description"]);
    }

    #[test]
    fn test_valid_order_passes() {
        let order = Order::new(vec![OrderItem::new("French Fries", "Salted potatoes")]);
        assert!(validate_new_order(&order).is_ok());
    }
}
