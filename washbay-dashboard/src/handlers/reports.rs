use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;

use super::dashboard::period_options;
use super::{attachment, render, require, PageContext, SelectOption, ViewError};
use crate::models::report::{ReportForm, ReportFormat, SalesReport, SalesReportQuery};
use crate::models::user::permissions;
use crate::models::SessionContext;
use crate::services::aggregator::{aggregate, Period, PeriodSummary};
use crate::services::charts;
use crate::AppState;

const REPORT_PERIODS: [(&str, &str); 7] = [
    ("day", "Single day"),
    ("day_range", "Date range"),
    ("month", "Month"),
    ("month_range", "Month range"),
    ("year", "Year"),
    ("year_range", "Year range"),
    ("all", "All time"),
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Default, Deserialize)]
pub struct ReportsQuery {
    /// Period of the quick summary computed from the invoice list.
    #[serde(default)]
    pub quick: Option<String>,
    #[serde(flatten)]
    pub form: ReportForm,
}

/// Server-side sales report with its chart configurations.
#[derive(Default)]
pub struct ReportView {
    pub label: String,
    pub report: SalesReport,
    pub download_query: String,
    pub line_chart: String,
    pub category_chart: String,
    pub product_chart: String,
}

#[derive(Template)]
#[template(path = "pages/reports.html")]
pub struct ReportsTemplate {
    pub ctx: PageContext,
    pub quick_period: Period,
    pub quick_options: Vec<SelectOption>,
    pub summary: PeriodSummary,
    pub quick_line_chart: String,
    pub quick_category_chart: String,
    pub quick_product_chart: String,
    pub form: ReportForm,
    pub period_types: Vec<SelectOption>,
    pub month_options: Vec<SelectOption>,
    pub start_month_options: Vec<SelectOption>,
    pub end_month_options: Vec<SelectOption>,
    pub has_report: bool,
    pub report: ReportView,
    pub report_error: String,
}

impl ReportsTemplate {
    pub fn has_report_error(&self) -> bool {
        !self.report_error.is_empty()
    }
}

fn month_options(selected: &str) -> Vec<SelectOption> {
    MONTHS
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let value = (idx + 1).to_string();
            let is_selected = value == selected;
            SelectOption::new(value, *name, is_selected)
        })
        .collect()
}

fn period_type_options(selected: &str) -> Vec<SelectOption> {
    let selected = if selected.is_empty() { "all" } else { selected };
    REPORT_PERIODS
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label, *value == selected))
        .collect()
}

fn report_view(query: &SalesReportQuery, report: SalesReport) -> ReportView {
    ReportView {
        label: query.label(),
        download_query: query.query_string(),
        line_chart: charts::to_script_json(&charts::line_chart(&report.chart_data, "Sales")),
        category_chart: charts::to_script_json(&charts::pie_chart(&report.category_data)),
        product_chart: charts::to_script_json(&charts::pie_chart(&report.product_category_data)),
        report,
    }
}

pub async fn reports_page(
    State(state): State<AppState>,
    session: Session,
    mut context: SessionContext,
    Query(query): Query<ReportsQuery>,
) -> Result<Response, ViewError> {
    require(&context, permissions::VIEW_REPORTS, "view reports")?;

    let hint = context.take_nav_hint();
    if hint.is_some() {
        context.save(&session).await?;
    }
    let quick_raw = query.quick.clone().or(hint);
    let quick_period = match quick_raw.as_deref().map(str::trim) {
        None | Some("") => Period::Monthly,
        Some(raw) => raw
            .parse::<Period>()
            .map_err(|e| ViewError::Validation(e.to_string()))?,
    };

    let token = context.token.clone();
    let (invoices, catalog) = tokio::try_join!(
        state.api.list_invoices(&token),
        state.api.list_catalog(&token),
    )?;
    let summary = aggregate(&invoices, quick_period, Some(&catalog), Utc::now());

    let mut report = ReportView::default();
    let mut has_report = false;
    let mut report_error = String::new();
    if query.form.period_type.is_some() {
        match SalesReportQuery::from_form(&query.form) {
            Ok(sales_query) => {
                let sales = state.api.sales_report(&token, &sales_query).await?;
                tracing::info!(
                    user = %context.email,
                    period = sales_query.period_type(),
                    invoices = sales.total_invoices,
                    "Sales report generated"
                );
                report = report_view(&sales_query, sales);
                has_report = true;
            }
            Err(message) => report_error = message,
        }
    }

    let form = query.form;
    render(&ReportsTemplate {
        quick_period,
        quick_options: period_options(quick_period),
        quick_line_chart: charts::to_script_json(&charts::line_chart(&summary.revenue_series, "Revenue")),
        quick_category_chart: charts::to_script_json(&charts::pie_chart(&summary.category_series)),
        quick_product_chart: charts::to_script_json(&charts::pie_chart(&summary.product_series)),
        summary,
        period_types: period_type_options(form.value("period_type")),
        month_options: month_options(form.value("month")),
        start_month_options: month_options(form.value("start_month")),
        end_month_options: month_options(form.value("end_month")),
        form,
        has_report,
        report,
        report_error,
        ctx: PageContext::new(&session, context, "reports").await?,
    })
}

pub async fn download_report(
    State(state): State<AppState>,
    context: SessionContext,
    Path(format): Path<String>,
    Query(form): Query<ReportForm>,
) -> Result<Response, ViewError> {
    require(&context, permissions::VIEW_REPORTS, "view reports")?;

    let format = ReportFormat::parse(&format)
        .ok_or_else(|| ViewError::Validation(format!("Unsupported report format '{}'", format)))?;
    let query = SalesReportQuery::from_form(&form).map_err(ViewError::Validation)?;

    let download = state
        .api
        .download_sales_report(&context.token, &query, format)
        .await?;
    tracing::info!(user = %context.email, period = query.period_type(), format = format.as_str(), "Sales report downloaded");

    Ok(attachment(
        download,
        &format!("sales_report_{}.{}", query.period_type(), format.as_str()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_options_mark_the_selection() {
        let options = month_options("3");
        assert_eq!(options.len(), 12);
        assert!(options[2].selected);
        assert_eq!(options[2].label, "March");
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn period_type_defaults_to_all_time() {
        let options = period_type_options("");
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value, "all");
    }

    #[test]
    fn reports_query_reads_flattened_form_fields() {
        let query: ReportsQuery =
            serde_urlencoded::from_str("quick=weekly&period_type=month&month=2&year=2026").unwrap();
        assert_eq!(query.quick.as_deref(), Some("weekly"));
        assert_eq!(
            SalesReportQuery::from_form(&query.form).unwrap(),
            SalesReportQuery::Month { month: 2, year: 2026 }
        );
    }
}
