use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Checkout, Order};
use crate::notify::{format_order_message, Notifier};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};

/// Client for interacting with the Order actor.
///
/// Placing an order is a small orchestration: validate the checkout, persist
/// the snapshot, then hand the summary to the notifier.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    notifier: Arc<dyn Notifier>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, notifier: Arc<dyn Notifier>) -> Self {
        Self { inner, notifier }
    }

    #[instrument(skip(self, checkout), fields(items = checkout.items.len()))]
    pub async fn place_order(&self, checkout: Checkout) -> Result<i64, OrderError> {
        info!("Processing checkout");

        // Step 1: Presence checks and line-item summary
        let order = checkout.into_order_create().map_err(|e| {
            error!(error = %e, "Checkout rejected");
            OrderError::ValidationError(e)
        })?;
        let message = format_order_message(&order);

        // Step 2: Persist the snapshot
        let order_id = self.inner.create(order).await?;
        info!(order_id, "Order stored");

        // Step 3: Notify; the order stands whatever happens here
        self.notifier.notify(&message);

        Ok(order_id)
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: i64, status: String) -> Result<(), OrderError> {
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::SetStatus(status)).await? {
            OrderActionResult::SetStatus { previous, current } => {
                info!(%previous, %current, "Order status changed");
            }
        }
        Ok(())
    }
}

impl_client_methods!(OrderClient, Order, OrderError, order, orders);
