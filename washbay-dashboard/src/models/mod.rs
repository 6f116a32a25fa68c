pub mod catalog;
pub mod invoice;
pub mod location;
pub mod report;
pub mod session;
pub mod settings;
pub mod theme;
pub mod user;

pub use catalog::{Catalog, CatalogItem, CatalogKind};
pub use invoice::{Invoice, InvoiceItem};
pub use location::Location;
pub use report::{ChartSeries, DashboardStats, SalesReport};
pub use session::SessionContext;
pub use theme::ThemePalette;

/// Field validator for text inputs that are trimmed before they go upstream.
pub(crate) fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Formats an amount the way every dashboard view shows money.
pub fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Deserialization of upstream timestamps.
///
/// The API emits ISO-8601 datetimes, sometimes with an offset and sometimes
/// naive (implicitly UTC). Both are accepted and normalized to UTC.
pub(crate) mod api_datetime {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {}", raw)))
    }

}
