//! HTTP surface: routing, shared state and the admin guard.

mod admin;
pub mod pages;
pub mod session;
mod storefront;
pub mod upload;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::clients::{OrderClient, ProductClient};
use crate::config::Config;
use crate::error::AppError;

pub use session::SessionSigner;

#[derive(Clone)]
pub struct AppState {
    pub products: ProductClient,
    pub orders: OrderClient,
    pub sessions: SessionSigner,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(products: ProductClient, orders: OrderClient, config: Config) -> Self {
        Self {
            products,
            orders,
            sessions: SessionSigner::new(&config.secret_key),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/products", get(admin::products_page))
        .route(
            "/admin/api/products",
            get(admin::list_products)
                .post(admin::create_product)
                .put(admin::update_product)
                .delete(admin::delete_product),
        )
        .route("/admin/orders", get(admin::orders_page))
        .route("/admin/api/orders", get(admin::list_orders))
        .route("/admin/api/orders/:id", put(admin::update_order))
        .route_layer(from_fn_with_state(state.clone(), session::require_admin));

    Router::new()
        .route("/", get(storefront::home))
        .route("/products/:category", get(storefront::products_page))
        .route("/cart", get(storefront::cart_page))
        .route("/checkout", get(storefront::checkout_page).post(storefront::checkout))
        .route("/api/products/:category", get(storefront::api_products))
        .route("/admin/login", get(admin::login_page).post(admin::login))
        .route("/admin/logout", get(admin::logout))
        .merge(admin)
        .nest_service(upload::UPLOAD_URL_PREFIX, ServeDir::new(&state.config.upload_dir))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
