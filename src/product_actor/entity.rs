use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{validate_price, Product, ProductCreate, ProductFilter, ProductPatch};

/// Products have no custom actions, so this type has no values.
#[derive(Debug)]
pub enum ProductAction {}

impl Entity for Product {
    const KIND: &'static str = "Product";

    type Id = i64;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Filter = ProductFilter;
    type Action = ProductAction;
    type ActionResult = ();

    fn id(&self) -> &i64 { &self.id }

    /// Creates a new Product stamped with the current time.
    ///
    /// # Errors
    /// Rejects an empty name or a negative price.
    fn from_create_params(id: i64, params: ProductCreate) -> Result<Self, String> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err("name is required".to_string());
        }

        Ok(Self {
            id,
            name,
            category: params.category,
            description: params.description,
            price: validate_price(params.price)?,
            image_url: params.image_url,
            stock: params.stock,
            created_at: Utc::now(),
        })
    }

    /// Overwrites every field present in the patch.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err("name cannot be empty".to_string());
            }
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = validate_price(price)?;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        Ok(())
    }

    fn handle_action(&mut self, action: ProductAction) -> Result<(), String> {
        match action {}
    }
}
