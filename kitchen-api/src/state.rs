use kitchen_order::OrderManager;

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderManager,
}

impl AppState {
    pub fn new(orders: OrderManager) -> Self {
        Self { orders }
    }
}
