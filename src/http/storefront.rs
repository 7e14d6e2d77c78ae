use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::{pages, AppState};
use crate::domain::{Category, Checkout, Product, ProductFilter};
use crate::error::AppError;

const ORDER_PLACED_MESSAGE: &str = "Order placed successfully! We will contact you on WhatsApp shortly.";

pub async fn home() -> Html<String> {
    pages::home()
}

pub async fn products_page(State(state): State<AppState>, Path(category): Path<String>) -> Result<Response, AppError> {
    let Ok(category) = category.parse::<Category>() else {
        debug!(%category, "Unknown category, redirecting home");
        return Ok(Redirect::to("/").into_response());
    };
    let products = state.products.list_products(ProductFilter::category(category)).await?;
    Ok(pages::catalog(category, &products).into_response())
}

pub async fn cart_page() -> Html<String> {
    pages::cart()
}

pub async fn checkout_page() -> Html<String> {
    pages::checkout()
}

#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    payload: Result<Json<Checkout>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(checkout) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let order_id = state.orders.place_order(checkout).await?;

    Ok(Json(json!({
        "success": true,
        "order_id": order_id,
        "message": ORDER_PLACED_MESSAGE,
    })))
}

/// Unknown categories list nothing.
pub async fn api_products(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    match category.parse::<Category>() {
        Ok(category) => Ok(Json(state.products.list_products(ProductFilter::category(category)).await?)),
        Err(_) => Ok(Json(Vec::new())),
    }
}
