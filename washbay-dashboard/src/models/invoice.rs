use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{api_datetime, money, not_blank};

/// Line item of an invoice as returned by the API.
///
/// `subtotal == quantity * unit_price` is maintained upstream and not
/// re-checked here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub product_service_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Invoice record. Report endpoints return the same shape without items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub customer_name: String,
    #[serde(deserialize_with = "api_datetime::deserialize")]
    pub date: DateTime<Utc>,
    pub total_amount: f64,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    pub fn date_display(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn amount_display(&self) -> String {
        money(self.total_amount)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInvoiceItem {
    pub product_service_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Payload for `POST /invoices/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewInvoice {
    pub customer_name: String,
    pub location_id: i64,
    pub items: Vec<NewInvoiceItem>,
}

/// Invoice creation form as submitted by the browser.
#[derive(Debug, Deserialize, Validate)]
pub struct InvoiceForm {
    #[validate(custom(function = "not_blank", message = "Customer name is required"))]
    pub customer_name: String,
    pub location_id: i64,
    pub product_service_id: i64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl InvoiceForm {
    /// Builds the API payload, pricing the line at the catalog's unit price.
    pub fn into_payload(self, unit_price: f64) -> NewInvoice {
        NewInvoice {
            customer_name: self.customer_name.trim().to_string(),
            location_id: self.location_id,
            items: vec![NewInvoiceItem {
                product_service_id: self.product_service_id,
                quantity: self.quantity,
                unit_price,
            }],
        }
    }
}
