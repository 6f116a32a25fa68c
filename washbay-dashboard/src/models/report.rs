use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{money, Invoice};

/// Labeled series consumed by the chart renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.labels.push(label.into());
        self.values.push(value);
    }
}

/// Response of `/invoices/dashboard/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub monthly_wash_count: i64,
    #[serde(default)]
    pub total_invoices: i64,
    #[serde(default)]
    pub active_locations: i64,
}

impl DashboardStats {
    pub fn revenue_display(&self) -> String {
        money(self.total_revenue)
    }
}

/// Response of `/reports/sales`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesReport {
    #[serde(default)]
    pub total_sales: f64,
    #[serde(default)]
    pub total_invoices: i64,
    #[serde(default)]
    pub chart_data: ChartSeries,
    #[serde(default)]
    pub category_data: ChartSeries,
    #[serde(default)]
    pub product_category_data: ChartSeries,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

impl SalesReport {
    pub fn total_display(&self) -> String {
        money(self.total_sales)
    }
}

/// Export formats offered by the report download endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Csv,
}

impl ReportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pdf" => Some(ReportFormat::Pdf),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
        }
    }
}

/// Raw report filter form. Every field is optional text; which ones are
/// required depends on `period_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportForm {
    /// Download links carry the API's `period` name.
    #[serde(default, alias = "period")]
    pub period_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub start_month: Option<String>,
    #[serde(default)]
    pub end_month: Option<String>,
    #[serde(default)]
    pub start_year: Option<String>,
    #[serde(default)]
    pub end_year: Option<String>,
}

impl ReportForm {
    pub fn value(&self, field: &str) -> &str {
        let value = match field {
            "period_type" => &self.period_type,
            "date" => &self.date,
            "start_date" => &self.start_date,
            "end_date" => &self.end_date,
            "month" => &self.month,
            "year" => &self.year,
            "start_month" => &self.start_month,
            "end_month" => &self.end_month,
            "start_year" => &self.start_year,
            "end_year" => &self.end_year,
            _ => return "",
        };
        value.as_deref().unwrap_or("")
    }
}

/// A validated sales report filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SalesReportQuery {
    Day(NaiveDate),
    DayRange { start: NaiveDate, end: NaiveDate },
    Month { month: u32, year: i32 },
    MonthRange { start_month: u32, end_month: u32, year: i32 },
    Year(i32),
    YearRange { start: i32, end: i32 },
    All,
}

impl SalesReportQuery {
    /// Validates the form for its period type.
    pub fn from_form(form: &ReportForm) -> Result<Self, String> {
        let period = form.period_type.as_deref().unwrap_or("all");
        match period {
            "day" => Ok(Self::Day(
                date(form.date.as_deref()).ok_or("Please select a date")?,
            )),
            "day_range" => {
                let start = date(form.start_date.as_deref());
                let end = date(form.end_date.as_deref());
                match (start, end) {
                    (Some(start), Some(end)) if start <= end => Ok(Self::DayRange { start, end }),
                    (Some(_), Some(_)) => Err("Start date must not be after end date".to_string()),
                    _ => Err("Please select start and end dates".to_string()),
                }
            }
            "month" => Ok(Self::Month {
                month: month(form.month.as_deref()).ok_or("Please select a month")?,
                year: year(form.year.as_deref()).ok_or("Please enter a year")?,
            }),
            "month_range" => {
                let start_month =
                    month(form.start_month.as_deref()).ok_or("Please select a start month")?;
                let end_month =
                    month(form.end_month.as_deref()).ok_or("Please select an end month")?;
                let year = year(form.year.as_deref()).ok_or("Please enter a year")?;
                if start_month > end_month {
                    return Err("Start month must not be after end month".to_string());
                }
                Ok(Self::MonthRange {
                    start_month,
                    end_month,
                    year,
                })
            }
            "year" => Ok(Self::Year(
                year(form.year.as_deref()).ok_or("Please enter a year")?,
            )),
            "year_range" => {
                let start = year(form.start_year.as_deref()).ok_or("Please enter a start year")?;
                let end = year(form.end_year.as_deref()).ok_or("Please enter an end year")?;
                if start > end {
                    return Err("Start year must not be after end year".to_string());
                }
                Ok(Self::YearRange { start, end })
            }
            "all" => Ok(Self::All),
            other => Err(format!("Unknown report period '{}'", other)),
        }
    }

    pub fn period_type(&self) -> &'static str {
        match self {
            Self::Day(_) => "day",
            Self::DayRange { .. } => "day_range",
            Self::Month { .. } => "month",
            Self::MonthRange { .. } => "month_range",
            Self::Year(_) => "year",
            Self::YearRange { .. } => "year_range",
            Self::All => "all",
        }
    }

    /// Query parameters understood by `/reports/sales` and its downloads.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("period", self.period_type().to_string())];
        match self {
            Self::Day(date) => pairs.push(("date", date.to_string())),
            Self::DayRange { start, end } => {
                pairs.push(("start_date", start.to_string()));
                pairs.push(("end_date", end.to_string()));
            }
            Self::Month { month, year } => {
                pairs.push(("month", month.to_string()));
                pairs.push(("year", year.to_string()));
            }
            Self::MonthRange {
                start_month,
                end_month,
                year,
            } => {
                pairs.push(("start_month", start_month.to_string()));
                pairs.push(("end_month", end_month.to_string()));
                pairs.push(("year", year.to_string()));
            }
            Self::Year(year) => pairs.push(("year", year.to_string())),
            Self::YearRange { start, end } => {
                pairs.push(("start_year", start.to_string()));
                pairs.push(("end_year", end.to_string()));
            }
            Self::All => {}
        }
        pairs
    }

    /// URL-encoded query string for the report endpoints.
    pub fn query_string(&self) -> String {
        serde_urlencoded::to_string(self.query_pairs()).unwrap_or_default()
    }

    /// Human readable description used as the report heading.
    pub fn label(&self) -> String {
        match self {
            Self::Day(date) => format!("Day: {}", date),
            Self::DayRange { start, end } => format!("Date Range: {} to {}", start, end),
            Self::Month { month, year } => format!("Month: {}/{}", month, year),
            Self::MonthRange {
                start_month,
                end_month,
                year,
            } => format!("Month Range: {} to {} ({})", start_month, end_month, year),
            Self::Year(year) => format!("Year: {}", year),
            Self::YearRange { start, end } => format!("Year Range: {} to {}", start, end),
            Self::All => "All Time".to_string(),
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

fn date(raw: Option<&str>) -> Option<NaiveDate> {
    non_blank(raw).and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

fn month(raw: Option<&str>) -> Option<u32> {
    non_blank(raw)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
}

fn year(raw: Option<&str>) -> Option<i32> {
    non_blank(raw)
        .and_then(|v| v.parse::<i32>().ok())
        .filter(|y| (1970..=9999).contains(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(period: &str) -> ReportForm {
        ReportForm {
            period_type: Some(period.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn day_requires_a_date() {
        assert_eq!(
            SalesReportQuery::from_form(&form("day")).unwrap_err(),
            "Please select a date"
        );

        let mut f = form("day");
        f.date = Some("2026-10-16".to_string());
        let query = SalesReportQuery::from_form(&f).unwrap();
        assert_eq!(query.query_string(), "period=day&date=2026-10-16");
    }

    #[test]
    fn day_range_requires_both_ends_in_order() {
        let mut f = form("day_range");
        f.start_date = Some("2026-10-01".to_string());
        assert_eq!(
            SalesReportQuery::from_form(&f).unwrap_err(),
            "Please select start and end dates"
        );

        f.end_date = Some("2026-09-01".to_string());
        assert!(SalesReportQuery::from_form(&f).is_err());

        f.end_date = Some("2026-10-31".to_string());
        assert_eq!(
            SalesReportQuery::from_form(&f).unwrap(),
            SalesReportQuery::DayRange {
                start: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 10, 31).unwrap(),
            }
        );
    }

    #[test]
    fn month_range_query_pairs() {
        let mut f = form("month_range");
        f.start_month = Some("1".to_string());
        f.end_month = Some("3".to_string());
        f.year = Some("2026".to_string());
        let query = SalesReportQuery::from_form(&f).unwrap();
        assert_eq!(
            query.query_string(),
            "period=month_range&start_month=1&end_month=3&year=2026"
        );
        assert_eq!(query.label(), "Month Range: 1 to 3 (2026)");
    }

    #[test]
    fn invalid_month_is_rejected() {
        let mut f = form("month");
        f.month = Some("13".to_string());
        f.year = Some("2026".to_string());
        assert_eq!(
            SalesReportQuery::from_form(&f).unwrap_err(),
            "Please select a month"
        );
    }

    #[test]
    fn missing_period_means_all_time() {
        let query = SalesReportQuery::from_form(&ReportForm::default()).unwrap();
        assert_eq!(query, SalesReportQuery::All);
        assert_eq!(query.query_string(), "period=all");
        assert_eq!(query.label(), "All Time");
    }

    #[test]
    fn unknown_period_is_a_validation_failure() {
        assert!(SalesReportQuery::from_form(&form("fortnight")).is_err());
    }

    #[test]
    fn api_query_string_parses_back_into_the_form() {
        let mut f = form("year_range");
        f.start_year = Some("2024".to_string());
        f.end_year = Some("2026".to_string());
        let query = SalesReportQuery::from_form(&f).unwrap();

        let parsed: ReportForm = serde_urlencoded::from_str(&query.query_string()).unwrap();
        assert_eq!(SalesReportQuery::from_form(&parsed).unwrap(), query);
    }

    #[test]
    fn chart_series_total() {
        let mut series = ChartSeries::default();
        series.push("2026-10-01", 10.0);
        series.push("2026-10-02", 5.5);
        assert_eq!(series.total(), 15.5);
        assert!(!series.is_empty());
    }
}
