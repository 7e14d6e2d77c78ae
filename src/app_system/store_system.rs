use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use crate::actor_framework::ResourceActor;
use crate::clients::{OrderClient, ProductClient};
use crate::db::{DatabaseLocation, StoreError};
use crate::notify::Notifier;
use crate::order_actor::OrderRepository;
use crate::product_actor::ProductRepository;

const ACTOR_BUFFER: usize = 32;

/// The storefront's actor system.
///
/// Responsible for starting the product and order actors, wiring the
/// clients, and joining the actors on shutdown.
pub struct StoreSystem {
    pub product_client: ProductClient,
    pub order_client: OrderClient,
    handles: Vec<JoinHandle<()>>,
}

impl StoreSystem {
    pub fn start(database: &DatabaseLocation, notifier: Arc<dyn Notifier>) -> Result<Self, StoreError> {
        info!(?database, "Starting store system");

        // 1. Product actor owns the products table
        let (product_actor, product_resource_client) =
            ResourceActor::new(ACTOR_BUFFER, ProductRepository::open(database)?);
        let product_client = ProductClient::new(product_resource_client);
        let product_handle = product_actor.spawn();

        // 2. Order actor owns the orders table
        let (order_actor, order_resource_client) =
            ResourceActor::new(ACTOR_BUFFER, OrderRepository::open(database)?);
        let order_client = OrderClient::new(order_resource_client, notifier);
        let order_handle = order_actor.spawn();

        Ok(Self {
            product_client,
            order_client,
            handles: vec![product_handle, order_handle],
        })
    }

    /// Actors stop once every client clone is gone, so callers must drop the
    /// clones they handed out (e.g. the router) before awaiting this.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down system...");

        drop(self.product_client);
        drop(self.order_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e);
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
