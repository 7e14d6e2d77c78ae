use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the two fixed product groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cement,
    Kirana,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl Category {
    pub const ALL: [Category; 2] = [Category::Cement, Category::Kirana];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cement => "cement",
            Category::Kirana => "kirana",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Cement => "Cement",
            Category::Kirana => "Kirana",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cement" => Ok(Category::Cement),
            "kirana" => Ok(Category::Kirana),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub stock: u32,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub stock: u32,
}

/// Partial overwrite of a product. `None` leaves the field untouched.
///
/// `description` is doubly optional so it can be cleared.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub stock: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<Category>,
}

impl ProductFilter {
    pub fn category(category: Category) -> Self {
        Self { category: Some(category) }
    }
}

/// Prices are plain decimals; negative or non-finite values are rejected.
pub fn validate_price(price: f64) -> Result<f64, String> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(format!("invalid price: {price}"))
    }
}
