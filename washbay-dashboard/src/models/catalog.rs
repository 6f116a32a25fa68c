use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use super::{money, not_blank};

/// Catalog category. Only products carry stock quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Product,
    Service,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Product => "product",
            CatalogKind::Service => "service",
        }
    }

    /// Plural used in page titles and routes.
    pub fn plural(&self) -> &'static str {
        match self {
            CatalogKind::Product => "products",
            CatalogKind::Service => "services",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CatalogKind::Product => "Products",
            CatalogKind::Service => "Services",
        }
    }
}

/// A product or service offered by the business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CatalogKind,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub quantity_unit: Option<String>,
}

impl CatalogItem {
    pub fn price_display(&self) -> String {
        money(self.price)
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn quantity_unit_text(&self) -> &str {
        self.quantity_unit.as_deref().unwrap_or("")
    }

    pub fn quantity_text(&self) -> String {
        self.quantity.map(|q| q.to_string()).unwrap_or_default()
    }

    /// Stock line shown on product cards, empty for services.
    pub fn stock_display(&self) -> String {
        match (self.kind, self.quantity) {
            (CatalogKind::Product, Some(qty)) => {
                format!("{} {}", qty, self.quantity_unit_text()).trim().to_string()
            }
            _ => String::new(),
        }
    }

    /// Label used in the per-product revenue breakdown: the name, suffixed
    /// with the quantity unit when one is set.
    pub fn breakdown_label(&self) -> Option<String> {
        if self.kind != CatalogKind::Product {
            return None;
        }
        self.quantity_unit
            .as_deref()
            .filter(|unit| !unit.is_empty())
            .map(|unit| format!("{} ({})", self.name, unit))
    }
}

/// Catalog indexed by identifier for line item resolution.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    by_id: HashMap<i64, usize>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let by_id = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id, idx))
            .collect();
        Self { items, by_id }
    }

    pub fn get(&self, id: i64) -> Option<&CatalogItem> {
        self.by_id.get(&id).map(|&idx| &self.items[idx])
    }

    pub fn of_kind(&self, kind: CatalogKind) -> Vec<&CatalogItem> {
        self.items.iter().filter(|item| item.kind == kind).collect()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Display name of a line item's catalog entry, falling back to the id.
    pub fn item_name(&self, id: i64) -> String {
        self.get(id)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| format!("Item #{}", id))
    }
}

/// Payload for creating or updating a catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPayload {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CatalogKind,
    pub quantity: Option<f64>,
    pub quantity_unit: Option<String>,
}

/// Catalog form as submitted by the browser. Numeric fields arrive as text
/// so that empty inputs can be told apart from invalid ones.
#[derive(Debug, Deserialize, Validate)]
pub struct CatalogForm {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub quantity_unit: String,
}

impl CatalogForm {
    pub fn into_payload(self, kind: CatalogKind) -> Result<CatalogPayload, String> {
        let price = parse_number("Price", &self.price)?
            .ok_or_else(|| "Price is required".to_string())?;
        if price < 0.0 {
            return Err("Price cannot be negative".to_string());
        }

        // Services never carry stock.
        let (quantity, quantity_unit) = match kind {
            CatalogKind::Product => (
                parse_number("Quantity", &self.quantity)?,
                non_empty(self.quantity_unit),
            ),
            CatalogKind::Service => (None, None),
        };

        Ok(CatalogPayload {
            name: self.name.trim().to_string(),
            price,
            description: non_empty(self.description),
            kind,
            quantity,
            quantity_unit,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_number(field: &str, raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| format!("{} must be a number", field))
}
