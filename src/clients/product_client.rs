use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::ProductError;

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product, products);

impl ProductClient {
    #[instrument(skip(self, product), fields(product_name = %product.name, category = %product.category))]
    pub async fn create_product(&self, product: ProductCreate) -> Result<i64, ProductError> {
        debug!("Sending request");
        let id = self.inner.create(product).await?;
        info!(product_id = id, "Product created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: i64, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> Result<(), ProductError> {
        debug!("Sending request");
        self.inner.delete(id).await?;
        info!("Product deleted");
        Ok(())
    }
}
