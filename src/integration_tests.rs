use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::app_system::StoreSystem;
use crate::clients::OrderClient;
use crate::config::Config;
use crate::domain::{Checkout, LineItem, Order};
use crate::http::{build_router, upload::MAX_UPLOAD_BYTES, AppState};
use crate::mock_framework::{create_mock_client, expect_action, expect_create};
use crate::notify::RecordingNotifier;
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};

const BOUNDARY: &str = "storefront-test-boundary";

struct TestApp {
    router: Router,
    notifier: Arc<RecordingNotifier>,
    uploads: TempDir,
}

fn test_app() -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let upload_dir = uploads.path().to_string_lossy().to_string();
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "UPLOAD_FOLDER" => Some(upload_dir.clone()),
        "SECRET_KEY" => Some("test-secret".to_string()),
        "ADMIN_PASSWORD" => Some("hunter2".to_string()),
        _ => None,
    })
    .unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let system = StoreSystem::start(&config.database, notifier.clone()).unwrap();
    let state = AppState::new(system.product_client.clone(), system.order_client.clone(), config);

    TestApp { router: build_router(state), notifier, uploads }
}

async fn send(app: &TestApp, request: Request<Body>) -> Response {
    app.router.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn multipart_request(
    method: Method,
    cookie: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri("/admin/api/products")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

async fn login(app: &TestApp) -> String {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/admin/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=admin&password=hunter2"))
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/dashboard");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn create_product(app: &TestApp, cookie: &str, name: &str, category: &str) -> i64 {
    let request = multipart_request(
        Method::POST,
        cookie,
        &[("name", name), ("category", category), ("price", "120.5"), ("stock", "40")],
        None,
    );
    let json = body_json(send(app, request).await).await;
    assert_eq!(json["success"], true);
    json["id"].as_i64().unwrap()
}

async fn place_order(app: &TestApp, total: f64) -> i64 {
    let payload = json!({
        "name": "Ravi Kumar",
        "phone": "9876543210",
        "email": "",
        "address": "Shop 7, Main Bazaar",
        "items": [
            {"name": "OPC Cement 50kg", "quantity": 3, "price": 400.0},
            {"name": "Sugar 1kg", "quantity": 1, "price": 50.0}
        ],
        "total": total,
    });
    let response = send(app, json_request(Method::POST, "/checkout", None, payload)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    json["order_id"].as_i64().unwrap()
}

async fn admin_orders(app: &TestApp, cookie: &str) -> Vec<Value> {
    let json = body_json(send(app, get("/admin/api/orders", Some(cookie))).await).await;
    json.as_array().unwrap().clone()
}

async fn listed_ids(app: &TestApp, category: &str) -> Vec<i64> {
    let json = body_json(send(app, get(&format!("/api/products/{category}"), None)).await).await;
    json.as_array().unwrap().iter().map(|p| p["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn created_product_is_listed_once_in_its_category() {
    let app = test_app();
    let cookie = login(&app).await;

    let id = create_product(&app, &cookie, "Toor Dal 1kg", "kirana").await;

    let kirana = listed_ids(&app, "kirana").await;
    assert_eq!(kirana.iter().filter(|&&listed| listed == id).count(), 1);
    assert!(!listed_ids(&app, "cement").await.contains(&id));
    assert!(listed_ids(&app, "paint").await.is_empty());
}

#[tokio::test]
async fn deleted_product_leaves_listings() {
    let app = test_app();
    let cookie = login(&app).await;
    let id = create_product(&app, &cookie, "PPC Cement 50kg", "cement").await;

    let delete = |cookie: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/admin/api/products?id={id}"))
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    };

    let json = body_json(send(&app, delete(&cookie)).await).await;
    assert_eq!(json, json!({ "success": true }));
    assert!(!listed_ids(&app, "cement").await.contains(&id));

    let json = body_json(send(&app, delete(&cookie)).await).await;
    assert_eq!(json, json!({ "success": false, "error": "Product not found" }));
}

#[tokio::test]
async fn product_updates_overwrite_given_fields() {
    let app = test_app();
    let cookie = login(&app).await;
    let id = create_product(&app, &cookie, "Rice 5kg", "kirana").await;
    let id_text = id.to_string();

    let request = multipart_request(Method::PUT, &cookie, &[("id", id_text.as_str()), ("price", "99.0")], None);
    assert_eq!(body_json(send(&app, request).await).await["success"], true);

    let json = body_json(send(&app, get("/admin/api/products?category=kirana", Some(&cookie))).await).await;
    let product = &json.as_array().unwrap()[0];
    assert_eq!(product["name"], "Rice 5kg");
    assert_eq!(product["price"], 99.0);
    assert_eq!(product["stock"], 40);

    let request = multipart_request(Method::PUT, &cookie, &[("id", "4242"), ("name", "Ghost")], None);
    let json = body_json(send(&app, request).await).await;
    assert_eq!(json, json!({ "success": false, "error": "Product not found" }));

    let request = multipart_request(Method::PUT, &cookie, &[("id", id_text.as_str()), ("price", "cheap")], None);
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn checkout_creates_one_pending_order() {
    let app = test_app();
    let order_id = place_order(&app, 1250.0).await;

    let cookie = login(&app).await;
    let orders = admin_orders(&app, &cookie).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], order_id);
    assert_eq!(orders[0]["status"], "pending");
    assert_eq!(orders[0]["total_amount"], 1250.0);
    assert_eq!(orders[0]["customer_email"], Value::Null);
    assert_eq!(orders[0]["products"], "- OPC Cement 50kg x3 @ ₹400\n- Sugar 1kg x1 @ ₹50");

    let messages = app.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Name: Ravi Kumar"));
}

#[tokio::test]
async fn checkout_without_phone_is_rejected() {
    let app = test_app();
    let payload = json!({ "name": "Ravi", "total": 10.0 });

    let response = send(&app, json_request(Method::POST, "/checkout", None, payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "success": false, "error": "phone is required" }));

    let cookie = login(&app).await;
    assert!(admin_orders(&app, &cookie).await.is_empty());
    assert!(app.notifier.messages().is_empty());
}

#[tokio::test]
async fn unauthenticated_admin_access_looks_like_unknown_route() {
    let app = test_app();
    let unknown = send(&app, get("/no-such-page", None)).await;
    let expected_status = unknown.status();
    let expected_type = unknown.headers()[header::CONTENT_TYPE].clone();
    let expected_body = body_bytes(unknown).await;
    assert_eq!(expected_status, StatusCode::NOT_FOUND);

    let forged = "storefront_session=1700000000.deadbeef";
    let requests = vec![
        get("/admin/dashboard", None),
        get("/admin/products", None),
        get("/admin/orders", None),
        get("/admin/api/products", None),
        get("/admin/api/orders", None),
        get("/admin/dashboard", Some(forged)),
        json_request(Method::PUT, "/admin/api/orders/1", None, json!({ "status": "shipped" })),
        multipart_request(Method::POST, forged, &[("name", "Sneaky"), ("category", "cement"), ("price", "1")], None),
        Request::builder()
            .method(Method::DELETE)
            .uri("/admin/api/products?id=1")
            .body(Body::empty())
            .unwrap(),
    ];

    for request in requests {
        let uri = request.uri().clone();
        let response = send(&app, request).await;
        assert_eq!(response.status(), expected_status, "{uri}");
        assert_eq!(response.headers()[header::CONTENT_TYPE], expected_type, "{uri}");
        assert_eq!(body_bytes(response).await, expected_body, "{uri}");
    }

    assert!(listed_ids(&app, "cement").await.is_empty());
}

#[tokio::test]
async fn wrong_credentials_rerender_login() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/admin/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=admin&password=nope"))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Invalid credentials"));
}

#[tokio::test]
async fn logout_clears_session_cookie() {
    let app = test_app();
    let response = send(&app, get("/admin/logout", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("storefront_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn disallowed_upload_sets_no_image() {
    let app = test_app();
    let cookie = login(&app).await;

    let request = multipart_request(
        Method::POST,
        &cookie,
        &[("name", "Cement Bag"), ("category", "cement"), ("price", "380")],
        Some(("payload.exe", &b"MZ"[..])),
    );
    assert_eq!(body_json(send(&app, request).await).await["success"], true);

    let json = body_json(send(&app, get("/api/products/cement", None)).await).await;
    assert_eq!(json[0]["image_url"], Value::Null);
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn allowed_upload_is_stored_and_served() {
    let app = test_app();
    let cookie = login(&app).await;

    let request = multipart_request(
        Method::POST,
        &cookie,
        &[("name", "Cement Bag"), ("category", "cement"), ("price", "380"), ("image_url", "https://cdn/x.png")],
        Some(("bag.PNG", &b"\x89PNG data"[..])),
    );
    assert_eq!(body_json(send(&app, request).await).await["success"], true);

    let json = body_json(send(&app, get("/api/products/cement", None)).await).await;
    let image_url = json[0]["image_url"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/static/uploads/"));
    assert!(image_url.ends_with("_bag.PNG"));

    let served = send(&app, get(&image_url, None)).await;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(body_bytes(served).await, b"\x89PNG data");
}

fn upload_count(app: &TestApp) -> usize {
    std::fs::read_dir(app.uploads.path()).unwrap().count()
}

#[tokio::test]
async fn failed_product_writes_leave_no_image_behind() {
    let app = test_app();
    let cookie = login(&app).await;

    let request = multipart_request(Method::PUT, &cookie, &[("id", "4242")], Some(("bag.png", &b"\x89PNG"[..])));
    let json = body_json(send(&app, request).await).await;
    assert_eq!(json, json!({ "success": false, "error": "Product not found" }));

    let request = multipart_request(
        Method::POST,
        &cookie,
        &[("category", "cement"), ("price", "380")],
        Some(("bag2.png", &b"\x89PNG"[..])),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "success": false, "error": "name is required" }));

    let request = multipart_request(
        Method::POST,
        &cookie,
        &[("name", "Cement Bag"), ("category", "cement"), ("price", "-5")],
        Some(("bag3.png", &b"\x89PNG"[..])),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);

    assert_eq!(upload_count(&app), 0);
    assert!(listed_ids(&app, "cement").await.is_empty());
}

#[tokio::test]
async fn upload_replaces_image_on_existing_product() {
    let app = test_app();
    let cookie = login(&app).await;
    let id = create_product(&app, &cookie, "White Cement 5kg", "cement").await;
    let id_text = id.to_string();

    let request = multipart_request(Method::PUT, &cookie, &[("id", id_text.as_str())], Some(("white.webp", &b"RIFF"[..])));
    assert_eq!(body_json(send(&app, request).await).await, json!({ "success": true }));

    let json = body_json(send(&app, get("/api/products/cement", None)).await).await;
    assert!(json[0]["image_url"].as_str().unwrap().ends_with("_white.webp"));
    assert_eq!(upload_count(&app), 1);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = test_app();
    let cookie = login(&app).await;

    let image = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let request = multipart_request(
        Method::POST,
        &cookie,
        &[("name", "Heavy Bag"), ("category", "cement"), ("price", "10")],
        Some(("heavy.png", image.as_slice())),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert_eq!(upload_count(&app), 0);
    assert!(listed_ids(&app, "cement").await.is_empty());
}

#[tokio::test]
async fn order_status_update_shows_in_admin_listing() {
    let app = test_app();
    let order_id = place_order(&app, 300.0).await;
    let cookie = login(&app).await;
    let uri = format!("/admin/api/orders/{order_id}");

    let response = send(&app, json_request(Method::PUT, &uri, Some(&cookie), json!({ "status": "shipped" }))).await;
    assert_eq!(body_json(response).await, json!({ "success": true }));
    assert_eq!(admin_orders(&app, &cookie).await[0]["status"], "shipped");

    let response = send(&app, json_request(Method::PUT, &uri, Some(&cookie), json!({}))).await;
    assert_eq!(body_json(response).await, json!({ "success": true }));
    assert_eq!(admin_orders(&app, &cookie).await[0]["status"], "shipped");

    let response = send(&app, json_request(Method::PUT, &uri, Some(&cookie), json!({ "status": "" }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true }));
    assert_eq!(admin_orders(&app, &cookie).await[0]["status"], "");

    let response = send(&app, json_request(Method::PUT, "/admin/api/orders/999", Some(&cookie), json!({ "status": "x" }))).await;
    assert_eq!(body_json(response).await, json!({ "success": false, "error": "Order not found" }));
}

#[tokio::test]
async fn pages_render_and_bad_categories_redirect_home() {
    let app = test_app();
    for uri in ["/", "/cart", "/checkout", "/products/kirana"] {
        assert_eq!(send(&app, get(uri, None)).await.status(), StatusCode::OK, "{uri}");
    }

    let response = send(&app, get("/products/paint", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let cookie = login(&app).await;
    place_order(&app, 75.0).await;
    let response = send(&app, get("/admin/dashboard", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Total orders: 1"));
    assert!(html.contains("Total revenue: ₹75.00"));
}

#[tokio::test]
async fn order_client_checkout_flow_with_mocked_actor() {
    let (inner, mut receiver) = create_mock_client::<Order>(10);
    let notifier = Arc::new(RecordingNotifier::default());
    let client = OrderClient::new(inner, notifier.clone());

    let task = tokio::spawn(async move {
        client
            .place_order(Checkout {
                name: Some("Lakshmi".into()),
                phone: Some("9000000001".into()),
                items: vec![LineItem { name: "Jaggery 1kg".into(), quantity: 2, price: 70.0 }],
                total: Some(140.0),
                notes: Some("Deliver after 5pm".into()),
                ..Default::default()
            })
            .await
    });

    let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Order Create");
    assert_eq!(payload.customer_name, "Lakshmi");
    assert_eq!(payload.products, "- Jaggery 1kg x2 @ ₹70");
    assert_eq!(payload.total_amount, 140.0);
    responder.send(Ok(17)).unwrap();

    assert_eq!(task.await.unwrap(), Ok(17));
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("*Notes:* Deliver after 5pm"));
}

#[tokio::test]
async fn order_client_rejects_before_reaching_actor() {
    let (inner, mut receiver) = create_mock_client::<Order>(10);
    let notifier = Arc::new(RecordingNotifier::default());
    let client = OrderClient::new(inner, notifier.clone());

    let result = client.place_order(Checkout { name: Some("Lakshmi".into()), ..Default::default() }).await;
    assert_eq!(result, Err(OrderError::ValidationError("phone is required".into())));

    drop(client);
    assert!(receiver.recv().await.is_none());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn order_client_status_update_uses_action() {
    let (inner, mut receiver) = create_mock_client::<Order>(10);
    let client = OrderClient::new(inner, Arc::new(RecordingNotifier::default()));

    let task = tokio::spawn(async move { client.update_status(3, "delivered".into()).await });

    let (id, action, responder) = expect_action(&mut receiver).await.expect("Expected Order Action");
    assert_eq!(id, 3);
    assert_eq!(action, OrderAction::SetStatus("delivered".into()));
    responder
        .send(Ok(OrderActionResult::SetStatus { previous: "pending".into(), current: "delivered".into() }))
        .unwrap();

    assert_eq!(task.await.unwrap(), Ok(()));
}
