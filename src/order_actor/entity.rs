use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderFilter, DEFAULT_STATUS};
use super::actions::{OrderAction, OrderActionResult};

impl Entity for Order {
    const KIND: &'static str = "Order";

    type Id = i64;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Filter = OrderFilter;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;

    fn id(&self) -> &i64 { &self.id }

    /// Creates a new Order dated now.
    ///
    /// # Notes
    /// The order is initialized with status "pending".
    fn from_create_params(id: i64, params: OrderCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            customer_email: params.customer_email,
            customer_address: params.customer_address,
            products: params.products,
            total_amount: params.total_amount,
            order_date: Utc::now(),
            status: DEFAULT_STATUS.to_string(),
            notes: params.notes,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("orders are immutable; only the status can change".to_string())
    }

    fn on_delete(&self) -> Result<(), String> {
        Err("orders are never deleted".to_string())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, String> {
        match action {
            OrderAction::SetStatus(status) => {
                let previous = std::mem::replace(&mut self.status, status);
                Ok(OrderActionResult::SetStatus {
                    previous,
                    current: self.status.clone(),
                })
            }
        }
    }
}
