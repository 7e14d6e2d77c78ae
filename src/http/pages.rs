//! Minimal server-rendered HTML.

use std::fmt::Write;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::domain::{Category, Order, Product};

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(layout(title, body))
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, page("Not Found", "<h1>404 Not Found</h1>")).into_response()
}

pub fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, page("Server Error", "<h1>500 Internal Server Error</h1>")).into_response()
}

pub fn home() -> Html<String> {
    let mut body = String::from("<h1>Storefront</h1>\n<ul>\n");
    for category in Category::ALL {
        let _ = writeln!(body, "<li><a href=\"/products/{}\">{}</a></li>", category, category.title());
    }
    body.push_str("</ul>\n<p><a href=\"/cart\">Cart</a></p>");
    page("Storefront", &body)
}

pub fn catalog(category: Category, products: &[Product]) -> Html<String> {
    let mut body = format!("<h1>{}</h1>\n", category.title());
    body.push_str(&product_table(products, true));
    body.push_str("\n<p><a href=\"/cart\">Cart</a></p>\n");
    body.push_str(CART_SCRIPT);
    page(category.title(), &body)
}

/// Cart lines live in `localStorage` under `cart` as `{name, quantity, price}`.
const CART_SCRIPT: &str = r#"<script>
function readCart() { return JSON.parse(localStorage.getItem("cart") || "[]"); }
function writeCart(items) { localStorage.setItem("cart", JSON.stringify(items)); }
function addToCart(button) {
  const items = readCart();
  const name = button.dataset.name;
  const line = items.find((item) => item.name === name);
  if (line) { line.quantity += 1; } else { items.push({ name, quantity: 1, price: Number(button.dataset.price) }); }
  writeCart(items);
}
function cartTotal(items) { return items.reduce((sum, item) => sum + item.quantity * item.price, 0); }
</script>"#;

const CART_PAGE: &str = r#"<h1>Cart</h1>
<ul id="cart"></ul>
<p>Total: ₹<span id="total">0.00</span></p>
<p><button onclick="writeCart([]); location.reload()">Clear</button> <a href="/checkout">Checkout</a></p>
<script>
const items = readCart();
for (const item of items) {
  const li = document.createElement("li");
  li.textContent = `${item.name} x${item.quantity} @ ₹${item.price}`;
  document.getElementById("cart").appendChild(li);
}
document.getElementById("total").textContent = cartTotal(items).toFixed(2);
</script>"#;

const CHECKOUT_PAGE: &str = r#"<h1>Checkout</h1>
<form id="checkout">
<input name="name" placeholder="Name" required>
<input name="phone" placeholder="Phone" required>
<input name="email" type="email" placeholder="Email">
<textarea name="address" placeholder="Address"></textarea>
<textarea name="notes" placeholder="Notes"></textarea>
<button type="submit">Place order</button>
</form>
<p id="result"></p>
<script>
document.getElementById("checkout").addEventListener("submit", async (event) => {
  event.preventDefault();
  const form = new FormData(event.target);
  const items = readCart();
  const payload = Object.fromEntries(form.entries());
  payload.items = items;
  payload.total = cartTotal(items);
  const response = await fetch("/checkout", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(payload),
  });
  const result = await response.json();
  document.getElementById("result").textContent = result.success ? result.message : result.error;
  if (result.success) { writeCart([]); }
});
</script>"#;

pub fn cart() -> Html<String> {
    page("Cart", &format!("{CART_SCRIPT}\n{CART_PAGE}"))
}

pub fn checkout() -> Html<String> {
    page("Checkout", &format!("{CART_SCRIPT}\n{CHECKOUT_PAGE}"))
}

pub fn login(error: Option<&str>) -> Html<String> {
    let mut body = String::from("<h1>Admin Login</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(error));
    }
    body.push_str(
        "<form method=\"post\" action=\"/admin/login\">\n\
         <input name=\"username\">\n\
         <input name=\"password\" type=\"password\">\n\
         <button type=\"submit\">Login</button>\n\
         </form>",
    );
    page("Admin Login", &body)
}

pub struct DashboardStats {
    pub total_products: u64,
    pub total_orders: u64,
    pub total_revenue: f64,
}

pub fn dashboard(stats: &DashboardStats, recent: &[Order]) -> Html<String> {
    let mut body = String::from("<h1>Dashboard</h1>\n");
    let _ = writeln!(
        body,
        "<ul>\n<li>Total products: {}</li>\n<li>Total orders: {}</li>\n<li>Total revenue: ₹{:.2}</li>\n</ul>",
        stats.total_products, stats.total_orders, stats.total_revenue
    );
    body.push_str("<h2>Recent orders</h2>\n");
    body.push_str(&order_table(recent));
    body.push_str(&admin_nav());
    page("Dashboard", &body)
}

pub fn admin_products(cement: &[Product], kirana: &[Product]) -> Html<String> {
    let mut body = String::from("<h1>Products</h1>\n");
    for (category, products) in [(Category::Cement, cement), (Category::Kirana, kirana)] {
        let _ = writeln!(body, "<h2>{}</h2>", category.title());
        body.push_str(&product_table(products, false));
    }
    body.push_str(&admin_nav());
    page("Products", &body)
}

pub fn admin_orders(orders: &[Order]) -> Html<String> {
    let mut body = String::from("<h1>Orders</h1>\n");
    body.push_str(&order_table(orders));
    body.push_str(&admin_nav());
    page("Orders", &body)
}

fn admin_nav() -> String {
    "\n<nav><a href=\"/admin/dashboard\">Dashboard</a> <a href=\"/admin/products\">Products</a> \
     <a href=\"/admin/orders\">Orders</a> <a href=\"/admin/logout\">Logout</a></nav>"
        .to_string()
}

fn product_table(products: &[Product], with_cart: bool) -> String {
    let mut table = String::from("<table>\n<tr><th>ID</th><th>Name</th><th>Price</th><th>Stock</th><th>Image</th></tr>\n");
    for product in products {
        let action = if with_cart {
            format!(
                "<td><button data-name=\"{}\" data-price=\"{}\" onclick=\"addToCart(this)\">Add to cart</button></td>",
                escape(&product.name),
                product.price
            )
        } else {
            String::new()
        };
        let image = product
            .image_url
            .as_deref()
            .map(|url| format!("<img src=\"{}\" alt=\"\">", escape(url)))
            .unwrap_or_default();
        let _ = writeln!(
            table,
            "<tr><td>{}</td><td>{}</td><td>₹{:.2}</td><td>{}</td><td>{}</td>{}</tr>",
            product.id,
            escape(&product.name),
            product.price,
            product.stock,
            image,
            action
        );
    }
    table.push_str("</table>");
    table
}

fn order_table(orders: &[Order]) -> String {
    let mut table = String::from(
        "<table>\n<tr><th>ID</th><th>Date</th><th>Customer</th><th>Phone</th><th>Products</th><th>Total</th><th>Status</th></tr>\n",
    );
    for order in orders {
        let _ = writeln!(
            table,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><pre>{}</pre></td><td>₹{:.2}</td><td>{}</td></tr>",
            order.id,
            order.order_date.format("%Y-%m-%d %H:%M"),
            escape(&order.customer_name),
            escape(&order.customer_phone),
            escape(&order.products),
            order.total_amount,
            escape(&order.status)
        );
    }
    table.push_str("</table>");
    table
}
