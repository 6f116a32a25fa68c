//! Period aggregation over invoice lists.
//!
//! One function serves the dashboard cards, the quick report view and the
//! chart series: resolve the period to a window ending now, keep the
//! invoices inside it, and reduce them to totals, per-entity tallies and a
//! time-bucketed revenue series.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::Serialize;

use crate::models::{money, Catalog, CatalogKind, ChartSeries, Invoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Semiannually,
    Annually,
    All,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown period '{0}'")]
pub struct UnknownPeriod(pub String);

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Period::Weekly),
            "biweekly" => Ok(Period::Biweekly),
            "monthly" => Ok(Period::Monthly),
            "quarterly" => Ok(Period::Quarterly),
            "semiannually" => Ok(Period::Semiannually),
            "annually" => Ok(Period::Annually),
            "all" => Ok(Period::All),
            other => Err(UnknownPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::Weekly,
        Period::Biweekly,
        Period::Monthly,
        Period::Quarterly,
        Period::Semiannually,
        Period::Annually,
        Period::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Biweekly => "biweekly",
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Semiannually => "semiannually",
            Period::Annually => "annually",
            Period::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Weekly => "Last 7 days",
            Period::Biweekly => "Last 14 days",
            Period::Monthly => "Last month",
            Period::Quarterly => "Last 3 months",
            Period::Semiannually => "Last 6 months",
            Period::Annually => "Last year",
            Period::All => "All time",
        }
    }

    /// Resolves the period to its window ending at `now`.
    pub fn window(&self, now: DateTime<Utc>) -> PeriodWindow {
        let start = match self {
            Period::Weekly => now.checked_sub_signed(TimeDelta::days(7)),
            Period::Biweekly => now.checked_sub_signed(TimeDelta::days(14)),
            Period::Monthly => now.checked_sub_months(Months::new(1)),
            Period::Quarterly => now.checked_sub_months(Months::new(3)),
            Period::Semiannually => now.checked_sub_months(Months::new(6)),
            Period::Annually => now.checked_sub_months(Months::new(12)),
            Period::All => return PeriodWindow::Unbounded,
        };
        match start {
            Some(start) => PeriodWindow::Between { start, end: now },
            None => PeriodWindow::Unbounded,
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            Period::Weekly | Period::Biweekly => Granularity::Day,
            Period::Monthly | Period::Quarterly => Granularity::Month,
            Period::Semiannually | Period::Annually | Period::All => Granularity::Year,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodWindow {
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Unbounded,
}

impl PeriodWindow {
    /// Both ends inclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        match self {
            PeriodWindow::Between { start, end } => *start <= at && at <= *end,
            PeriodWindow::Unbounded => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    /// ISO-style bucket key; lexical order is chronological order.
    pub fn bucket(&self, at: DateTime<Utc>) -> String {
        match self {
            Granularity::Day => at.format("%Y-%m-%d").to_string(),
            Granularity::Month => at.format("%Y-%m").to_string(),
            Granularity::Year => at.format("%Y").to_string(),
        }
    }
}

/// Units sold and revenue of one catalog entry within the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTally {
    pub id: i64,
    pub name: String,
    pub units: i64,
    pub revenue: f64,
}

impl EntityTally {
    pub fn revenue_display(&self) -> String {
        money(self.revenue)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PeriodSummary {
    pub total_revenue: f64,
    pub total_invoices: usize,
    pub avg_per_invoice: f64,
    pub revenue_series: ChartSeries,
    pub top_product: Option<EntityTally>,
    pub top_service: Option<EntityTally>,
    pub products: Vec<EntityTally>,
    pub services: Vec<EntityTally>,
    pub category_series: ChartSeries,
    pub product_series: ChartSeries,
}

impl PeriodSummary {
    pub fn revenue_display(&self) -> String {
        money(self.total_revenue)
    }

    pub fn average_display(&self) -> String {
        money(self.avg_per_invoice)
    }

    pub fn top_product_name(&self) -> String {
        top_name(&self.top_product)
    }

    pub fn top_service_name(&self) -> String {
        top_name(&self.top_service)
    }

    pub fn top_product_units(&self) -> i64 {
        self.top_product.as_ref().map(|t| t.units).unwrap_or(0)
    }

    pub fn top_service_units(&self) -> i64 {
        self.top_service.as_ref().map(|t| t.units).unwrap_or(0)
    }
}

fn top_name(tally: &Option<EntityTally>) -> String {
    tally
        .as_ref()
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Insertion-ordered tallies keyed by catalog id.
#[derive(Default)]
struct Tallies {
    order: Vec<EntityTally>,
    index: HashMap<i64, usize>,
}

impl Tallies {
    fn add(&mut self, id: i64, name: &str, units: i64, revenue: f64) {
        let idx = match self.index.get(&id) {
            Some(&idx) => idx,
            None => {
                self.order.push(EntityTally {
                    id,
                    name: name.to_string(),
                    units: 0,
                    revenue: 0.0,
                });
                self.index.insert(id, self.order.len() - 1);
                self.order.len() - 1
            }
        };
        let tally = &mut self.order[idx];
        tally.units += units;
        tally.revenue += revenue;
    }

    /// Highest unit count; on ties the entity seen first wins.
    fn top(&self) -> Option<EntityTally> {
        let mut best: Option<&EntityTally> = None;
        let mut max_units = 0;
        for tally in &self.order {
            if tally.units > max_units {
                max_units = tally.units;
                best = Some(tally);
            }
        }
        best.cloned()
    }
}

/// Insertion-ordered label/value accumulator.
#[derive(Default)]
struct OrderedSeries {
    series: ChartSeries,
    index: HashMap<String, usize>,
}

impl OrderedSeries {
    fn add(&mut self, label: &str, value: f64) {
        match self.index.get(label) {
            Some(&idx) => self.series.values[idx] += value,
            None => {
                self.index.insert(label.to_string(), self.series.labels.len());
                self.series.push(label, value);
            }
        }
    }
}

/// Filters `invoices` to the period window ending at `now` and reduces them.
///
/// Line items are only resolved when a catalog is given; items whose id is
/// not in the catalog are left out of every per-entity figure.
pub fn aggregate(
    invoices: &[Invoice],
    period: Period,
    catalog: Option<&Catalog>,
    now: DateTime<Utc>,
) -> PeriodSummary {
    let window = period.window(now);
    let granularity = period.granularity();

    let mut summary = PeriodSummary::default();
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
    let mut products = Tallies::default();
    let mut services = Tallies::default();
    let mut categories = OrderedSeries::default();
    let mut product_breakdown = OrderedSeries::default();

    for invoice in invoices.iter().filter(|inv| window.contains(inv.date)) {
        summary.total_invoices += 1;
        *buckets.entry(granularity.bucket(invoice.date)).or_insert(0.0) += invoice.total_amount;

        let Some(catalog) = catalog else {
            continue;
        };
        for line in &invoice.items {
            let Some(entry) = catalog.get(line.product_service_id) else {
                continue;
            };
            let tallies = match entry.kind {
                CatalogKind::Product => &mut products,
                CatalogKind::Service => &mut services,
            };
            tallies.add(entry.id, &entry.name, line.quantity, line.subtotal);
            categories.add(entry.kind.as_str(), line.subtotal);
            if let Some(label) = entry.breakdown_label() {
                product_breakdown.add(&label, line.subtotal);
            }
        }
    }

    for (label, value) in buckets {
        summary.revenue_series.push(label, value);
    }
    // Summed from the buckets so the series always adds up to the total.
    summary.total_revenue = summary.revenue_series.total();
    if summary.total_invoices > 0 {
        summary.avg_per_invoice = summary.total_revenue / summary.total_invoices as f64;
    }
    summary.top_product = products.top();
    summary.top_service = services.top();
    summary.products = products.order;
    summary.services = services.order;
    summary.category_series = categories.series;
    summary.product_series = product_breakdown.series;

    tracing::debug!(
        period = %period,
        invoices = summary.total_invoices,
        revenue = summary.total_revenue,
        "Aggregated invoices"
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogItem, InvoiceItem};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn invoice(id: i64, date: DateTime<Utc>, total: f64, items: Vec<InvoiceItem>) -> Invoice {
        Invoice {
            id,
            invoice_number: format!("INV-{:04}", id),
            customer_name: "Customer".to_string(),
            date,
            total_amount: total,
            location_id: Some(1),
            items,
        }
    }

    fn line(product_service_id: i64, quantity: i64, unit_price: f64) -> InvoiceItem {
        InvoiceItem {
            id: None,
            product_service_id,
            quantity,
            unit_price,
            subtotal: unit_price * quantity as f64,
        }
    }

    fn item(id: i64, name: &str, kind: CatalogKind, unit: Option<&str>) -> CatalogItem {
        CatalogItem {
            id,
            name: name.to_string(),
            price: 10.0,
            description: None,
            kind,
            quantity: None,
            quantity_unit: unit.map(str::to_string),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            item(7, "Wax", CatalogKind::Product, Some("bottle")),
            item(8, "Shampoo", CatalogKind::Product, None),
            item(1, "Basic Wash", CatalogKind::Service, None),
            item(2, "Detailing", CatalogKind::Service, None),
        ])
    }

    #[test]
    fn parses_every_period_token() {
        for period in Period::ALL {
            assert_eq!(period.as_str().parse::<Period>(), Ok(period));
        }
        assert_eq!(
            "fortnightly".parse::<Period>(),
            Err(UnknownPeriod("fortnightly".to_string()))
        );
    }

    #[test]
    fn monthly_excludes_invoices_older_than_a_month() {
        let invoices = vec![
            invoice(1, now(), 100.0, vec![]),
            invoice(2, now() - TimeDelta::days(40), 50.0, vec![]),
        ];

        let summary = aggregate(&invoices, Period::Monthly, None, now());

        assert_eq!(summary.total_revenue, 100.0);
        assert_eq!(summary.total_invoices, 1);
        assert_eq!(summary.avg_per_invoice, 100.0);
    }

    #[test]
    fn empty_input_yields_zeroes() {
        for period in Period::ALL {
            let summary = aggregate(&[], period, Some(&catalog()), now());
            assert_eq!(summary.total_revenue, 0.0);
            assert_eq!(summary.total_invoices, 0);
            assert_eq!(summary.avg_per_invoice, 0.0);
            assert!(summary.revenue_series.is_empty());
            assert!(summary.top_product.is_none());
            assert!(summary.top_service.is_none());
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let start = now() - TimeDelta::days(7);
        let invoices = vec![
            invoice(1, start, 10.0, vec![]),
            invoice(2, now(), 20.0, vec![]),
            invoice(3, start - TimeDelta::seconds(1), 40.0, vec![]),
            invoice(4, now() + TimeDelta::seconds(1), 80.0, vec![]),
        ];

        let summary = aggregate(&invoices, Period::Weekly, None, now());

        assert_eq!(summary.total_invoices, 2);
        assert_eq!(summary.total_revenue, 30.0);
    }

    #[test]
    fn calendar_months_clamp_to_month_end() {
        let may_31 = Utc.with_ymd_and_hms(2026, 5, 31, 9, 0, 0).unwrap();
        match Period::Quarterly.window(may_31) {
            PeriodWindow::Between { start, .. } => {
                assert_eq!(start, Utc.with_ymd_and_hms(2026, 2, 28, 9, 0, 0).unwrap())
            }
            PeriodWindow::Unbounded => panic!("quarterly window must be bounded"),
        }
    }

    #[test]
    fn all_time_has_no_bounds() {
        let invoices = vec![
            invoice(1, Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(), 5.0, vec![]),
            invoice(2, now(), 7.0, vec![]),
        ];
        let summary = aggregate(&invoices, Period::All, None, now());
        assert_eq!(summary.total_invoices, 2);
        assert_eq!(summary.revenue_series.labels, vec!["2019", "2026"]);
    }

    #[test]
    fn series_buckets_partition_the_revenue() {
        let invoices = vec![
            invoice(1, now(), 12.5, vec![]),
            invoice(2, now() - TimeDelta::days(1), 25.0, vec![]),
            invoice(3, now(), 7.5, vec![]),
            invoice(4, now() - TimeDelta::days(3), 5.0, vec![]),
        ];

        let summary = aggregate(&invoices, Period::Weekly, None, now());

        assert_eq!(
            summary.revenue_series.labels,
            vec!["2026-10-13", "2026-10-15", "2026-10-16"]
        );
        assert_eq!(summary.revenue_series.values, vec![5.0, 25.0, 20.0]);
        assert_eq!(summary.revenue_series.total(), summary.total_revenue);
    }

    #[test]
    fn cent_amounts_keep_series_and_total_equal() {
        let invoices = vec![
            invoice(1, now() - TimeDelta::days(1), 57.35, vec![]),
            invoice(2, now() - TimeDelta::days(1), 26.25, vec![]),
            invoice(3, now(), 76.34, vec![]),
            invoice(4, now(), 65.51, vec![]),
        ];

        let summary = aggregate(&invoices, Period::Weekly, None, now());

        assert_eq!(summary.revenue_series.values.len(), 2);
        assert_eq!(summary.revenue_series.total(), summary.total_revenue);
        assert!((summary.total_revenue - 225.45).abs() < 1e-9);
        assert!((summary.avg_per_invoice - 56.3625).abs() < 1e-9);
    }

    #[test]
    fn granularity_follows_the_period() {
        assert_eq!(Period::Biweekly.granularity(), Granularity::Day);
        assert_eq!(Period::Quarterly.granularity(), Granularity::Month);
        assert_eq!(Period::Semiannually.granularity(), Granularity::Year);

        let invoices = vec![
            invoice(1, now(), 10.0, vec![]),
            invoice(2, now() - TimeDelta::days(35), 20.0, vec![]),
        ];
        let summary = aggregate(&invoices, Period::Quarterly, None, now());
        assert_eq!(summary.revenue_series.labels, vec!["2026-09", "2026-10"]);
    }

    #[test]
    fn top_product_accumulates_units_across_invoices() {
        let invoices = vec![
            invoice(1, now(), 20.0, vec![line(7, 2, 10.0)]),
            invoice(2, now(), 30.0, vec![line(7, 3, 10.0)]),
        ];

        let summary = aggregate(&invoices, Period::Weekly, Some(&catalog()), now());

        let top = summary.top_product.expect("top product");
        assert_eq!(top.id, 7);
        assert_eq!(top.units, 5);
        assert_eq!(top.revenue, 50.0);
        assert!(summary.top_service.is_none());
    }

    #[test]
    fn unknown_catalog_ids_are_skipped() {
        let invoices = vec![invoice(
            1,
            now(),
            60.0,
            vec![line(999, 4, 10.0), line(1, 2, 10.0)],
        )];

        let summary = aggregate(&invoices, Period::Weekly, Some(&catalog()), now());

        assert_eq!(summary.total_revenue, 60.0);
        assert!(summary.top_product.is_none());
        assert_eq!(summary.top_service.map(|t| t.id), Some(1));
        assert_eq!(summary.category_series.total(), 20.0);
    }

    #[test]
    fn ties_go_to_the_entity_seen_first() {
        let invoices = vec![
            invoice(1, now(), 40.0, vec![line(2, 2, 10.0)]),
            invoice(2, now(), 40.0, vec![line(1, 2, 10.0)]),
        ];

        let summary = aggregate(&invoices, Period::Weekly, Some(&catalog()), now());

        let top = summary.top_service.expect("top service");
        assert_eq!(top.id, 2);
        assert_eq!(summary.services.len(), 2);
        assert!(summary.services.iter().all(|s| s.units <= top.units));
    }

    #[test]
    fn zero_quantity_never_becomes_top() {
        let invoices = vec![invoice(1, now(), 0.0, vec![line(7, 0, 10.0)])];
        let summary = aggregate(&invoices, Period::Weekly, Some(&catalog()), now());
        assert!(summary.top_product.is_none());
        assert_eq!(summary.products.len(), 1);
    }

    #[test]
    fn breakdowns_follow_first_seen_order() {
        let invoices = vec![invoice(
            1,
            now(),
            70.0,
            vec![line(1, 1, 20.0), line(7, 2, 10.0), line(8, 1, 10.0), line(7, 1, 10.0)],
        )];

        let summary = aggregate(&invoices, Period::Weekly, Some(&catalog()), now());

        assert_eq!(summary.category_series.labels, vec!["service", "product"]);
        assert_eq!(summary.category_series.values, vec![20.0, 40.0]);
        // Products without a unit are left out of the per-product breakdown.
        assert_eq!(summary.product_series.labels, vec!["Wax (bottle)"]);
        assert_eq!(summary.product_series.values, vec![30.0]);
    }

    #[test]
    fn catalog_join_is_optional() {
        let invoices = vec![invoice(1, now(), 20.0, vec![line(7, 2, 10.0)])];
        let summary = aggregate(&invoices, Period::Weekly, None, now());
        assert!(summary.products.is_empty());
        assert!(summary.category_series.is_empty());
        assert_eq!(summary.total_revenue, 20.0);
    }
}
