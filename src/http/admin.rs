use axum::{
    extract::{Multipart, Path, Query, State},
    http::header::SET_COOKIE,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{
    pages::{self, DashboardStats},
    session::expired_cookie,
    upload::{discard_image, ProductForm},
    AppState,
};
use crate::domain::{Category, Order, OrderFilter, Product, ProductCreate, ProductFilter, ProductPatch};
use crate::error::AppError;

const RECENT_ORDERS: usize = 10;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct CategoryQuery {
    category: Option<String>,
}

#[derive(Deserialize)]
pub struct IdQuery {
    id: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    status: Option<String>,
}

pub async fn login_page() -> Html<String> {
    pages::login(None)
}

#[instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Response, AppError> {
    if form.username != state.config.admin_username || form.password != state.config.admin_password {
        warn!(username = %form.username, "Admin login failed");
        return Ok(pages::login(Some("Invalid credentials")).into_response());
    }

    let cookie = state
        .sessions
        .session_cookie()
        .ok_or_else(|| AppError::Internal("cannot sign session".to_string()))?;
    info!("Admin logged in");
    Ok(([(SET_COOKIE, cookie)], Redirect::to("/admin/dashboard")).into_response())
}

pub async fn logout() -> Response {
    ([(SET_COOKIE, expired_cookie())], Redirect::to("/")).into_response()
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let orders = state.orders.list_orders(OrderFilter::default()).await?;
    let stats = DashboardStats {
        total_products: state.products.count_products(ProductFilter::default()).await?,
        total_orders: state.orders.count_orders(OrderFilter::default()).await?,
        total_revenue: orders.iter().map(|o| o.total_amount).sum(),
    };
    let recent = state.orders.list_orders(OrderFilter::recent(RECENT_ORDERS)).await?;
    Ok(pages::dashboard(&stats, &recent))
}

pub async fn products_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let cement = state.products.list_products(ProductFilter::category(Category::Cement)).await?;
    let kirana = state.products.list_products(ProductFilter::category(Category::Kirana)).await?;
    Ok(pages::admin_products(&cement, &kirana))
}

/// Unknown categories list nothing.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = match query.category.as_deref().filter(|c| !c.is_empty()) {
        None => ProductFilter::default(),
        Some(category) => match category.parse::<Category>() {
            Ok(category) => ProductFilter::category(category),
            Err(_) => return Ok(Json(Vec::new())),
        },
    };
    Ok(Json(state.products.list_products(filter).await?))
}

fn parse_category(form: &ProductForm) -> Result<Option<Category>, AppError> {
    form.text("category")
        .map(|c| c.parse::<Category>().map_err(|e| AppError::bad_request(e.to_string())))
        .transpose()
}

#[instrument(skip_all)]
pub async fn create_product(State(state): State<AppState>, multipart: Multipart) -> Result<Json<Value>, AppError> {
    let form = ProductForm::read(multipart).await?;
    let upload_dir = &state.config.upload_dir;

    let name = form.text("name").ok_or_else(|| AppError::bad_request("name is required"))?.to_string();
    let category = parse_category(&form)?.ok_or_else(|| AppError::bad_request("category is required"))?;
    let price = form.parse("price")?.ok_or_else(|| AppError::bad_request("price is required"))?;
    let stock = form.parse("stock")?.unwrap_or(0);

    let stored = form.store_image(upload_dir).await?;
    let product = ProductCreate {
        name,
        category,
        description: form.text("description").map(str::to_string),
        price,
        image_url: form.image_url(stored.as_deref()),
        stock,
    };

    match state.products.create_product(product).await {
        Ok(id) => Ok(Json(json!({ "success": true, "id": id }))),
        Err(e) => {
            if let Some(url) = stored {
                discard_image(upload_dir, &url).await;
            }
            Err(e.into())
        }
    }
}

#[instrument(skip_all)]
pub async fn update_product(State(state): State<AppState>, multipart: Multipart) -> Result<Json<Value>, AppError> {
    let form = ProductForm::read(multipart).await?;
    let upload_dir = &state.config.upload_dir;
    let id: i64 = form.parse("id")?.ok_or_else(|| AppError::bad_request("id is required"))?;

    let category = parse_category(&form)?;
    let price = form.parse("price")?;
    let stock = form.parse("stock")?;
    if state.products.get_product(id).await?.is_none() {
        return Err(AppError::missing("Product not found"));
    }

    let stored = form.store_image(upload_dir).await?;
    let patch = ProductPatch {
        name: form.text("name").map(str::to_string),
        category,
        description: form.submitted("description").then(|| form.text("description").map(str::to_string)),
        price,
        image_url: form.image_url(stored.as_deref()),
        stock,
    };

    match state.products.update_product(id, patch).await {
        Ok(_) => Ok(Json(json!({ "success": true }))),
        Err(e) => {
            if let Some(url) = stored {
                discard_image(upload_dir, &url).await;
            }
            Err(e.into())
        }
    }
}

pub async fn delete_product(State(state): State<AppState>, Query(query): Query<IdQuery>) -> Result<Json<Value>, AppError> {
    let id = query
        .id
        .as_deref()
        .and_then(|id| id.trim().parse::<i64>().ok())
        .ok_or_else(|| AppError::bad_request("id is required"))?;

    state.products.delete_product(id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn orders_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let orders = state.orders.list_orders(OrderFilter::default()).await?;
    Ok(pages::admin_orders(&orders))
}

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list_orders(OrderFilter::default()).await?))
}

/// A missing `status` keeps the current one.
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Value>, AppError> {
    match update.status {
        Some(status) => state.orders.update_status(id, status).await?,
        None => {
            if state.orders.get_order(id).await?.is_none() {
                return Err(AppError::missing("Order not found"));
            }
        }
    }
    Ok(Json(json!({ "success": true })))
}
