use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status given to every freshly placed order.
pub const DEFAULT_STATUS: &str = "pending";

/// Represents a placed order. Line items are a text snapshot taken at
/// checkout; nothing links back to the product table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub products: String,
    pub total_amount: f64,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub products: String,
    pub total_amount: f64,
    pub notes: Option<String>,
}

/// Orders are always listed newest first.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub limit: Option<usize>,
}

impl OrderFilter {
    pub fn recent(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}

/// One cart line as submitted by the checkout page.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

/// Checkout form submitted as JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Checkout {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub total: Option<f64>,
    pub notes: Option<String>,
}

impl Checkout {
    /// Presence checks only; the submitted total is trusted as-is.
    pub fn into_order_create(self) -> Result<OrderCreate, String> {
        let customer_name = non_empty(self.name).ok_or("name is required")?;
        let customer_phone = non_empty(self.phone).ok_or("phone is required")?;
        let total_amount = self.total.ok_or("total is required")?;

        Ok(OrderCreate {
            customer_name,
            customer_phone,
            customer_email: non_empty(self.email),
            customer_address: non_empty(self.address),
            products: summarize_items(&self.items),
            total_amount,
            notes: non_empty(self.notes),
        })
    }
}

/// Render cart lines as `- name xQTY @ ₹PRICE`, one per line.
pub fn summarize_items(items: &[LineItem]) -> String {
    items
        .iter()
        .map(|item| format!("- {} x{} @ ₹{}", item.name, item.quantity, item.price))
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
