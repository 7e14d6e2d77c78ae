//! Order notifications.
//!
//! There is no messaging integration: [`LogNotifier`] writes the message to
//! the log for the configured recipient.

use tracing::info;

use crate::domain::OrderCreate;

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

pub struct LogNotifier {
    recipient: String,
}

impl LogNotifier {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self { recipient: recipient.into() }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!(recipient = %self.recipient, message = %message, "Order notification");
    }
}

/// Human-readable summary of a new order for the shop owner.
pub fn format_order_message(order: &OrderCreate) -> String {
    let missing = || "N/A".to_string();
    format!(
        "*New Order Received*\n\
         \n\
         *Customer Details:*\n\
         Name: {name}\n\
         Phone: {phone}\n\
         Email: {email}\n\
         Address: {address}\n\
         \n\
         *Products:*\n\
         {products}\n\
         \n\
         *Total Amount:* ₹{total:.2}\n\
         \n\
         *Notes:* {notes}\n",
        name = order.customer_name,
        phone = order.customer_phone,
        email = order.customer_email.clone().unwrap_or_else(missing),
        address = order.customer_address.clone().unwrap_or_else(missing),
        products = order.products,
        total = order.total_amount,
        notes = order.notes.clone().unwrap_or_else(missing),
    )
}

#[cfg(test)]
pub use recording::RecordingNotifier;
