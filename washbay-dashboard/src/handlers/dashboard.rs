use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;

use super::{render, PageContext, SelectOption, ViewError};
use crate::models::report::DashboardStats;
use crate::models::{Invoice, SessionContext};
use crate::services::aggregator::{aggregate, Period, PeriodSummary};
use crate::services::charts;
use crate::AppState;

const RECENT_INVOICES: usize = 5;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

impl PeriodQuery {
    /// Missing or blank means `default`; anything else must be a known token.
    pub fn resolve(&self, default: Period) -> Result<Period, ViewError> {
        match self.period.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw
                .parse::<Period>()
                .map_err(|e| ViewError::Validation(e.to_string())),
        }
    }
}

pub(crate) fn period_options(selected: Period) -> Vec<SelectOption> {
    Period::ALL
        .iter()
        .map(|p| SelectOption::new(p.as_str(), p.label(), *p == selected))
        .collect()
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub stats: DashboardStats,
    pub period: Period,
    pub periods: Vec<SelectOption>,
    pub summary: PeriodSummary,
    pub recent: Vec<Invoice>,
    pub revenue_chart: String,
    pub category_chart: String,
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, ViewError> {
    if context.is_client() {
        return Ok(Redirect::to("/shop").into_response());
    }
    let period = query.resolve(Period::Monthly)?;

    let token = context.token.as_str();
    let (stats, invoices, catalog) = tokio::try_join!(
        state.api.dashboard_stats(token),
        state.api.list_invoices(token),
        state.api.list_catalog(token),
    )?;

    let summary = aggregate(&invoices, period, Some(&catalog), Utc::now());
    let revenue_chart = charts::to_script_json(&charts::line_chart(&summary.revenue_series, "Revenue"));
    let category_chart = charts::to_script_json(&charts::pie_chart(&summary.category_series));

    let mut recent = invoices;
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(RECENT_INVOICES);

    render(&DashboardTemplate {
        ctx: PageContext::new(&session, context, "dashboard").await?,
        stats,
        period,
        periods: period_options(period),
        summary,
        recent,
        revenue_chart,
        category_chart,
    })
}

/// Hands the dashboard's period over to the reports page.
pub async fn open_report(
    session: Session,
    mut context: SessionContext,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, ViewError> {
    let period = query.resolve(Period::Monthly)?;
    context.nav_hint = Some(period.as_str().to_string());
    context.save(&session).await?;
    Ok(Redirect::to("/reports").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_period_uses_the_default() {
        let query = PeriodQuery { period: Some(" ".to_string()) };
        assert_eq!(query.resolve(Period::Monthly).unwrap(), Period::Monthly);
        let query = PeriodQuery { period: None };
        assert_eq!(query.resolve(Period::Weekly).unwrap(), Period::Weekly);
    }

    #[test]
    fn unknown_period_is_rejected() {
        let query = PeriodQuery { period: Some("hourly".to_string()) };
        assert!(matches!(
            query.resolve(Period::Monthly),
            Err(ViewError::Validation(_))
        ));
    }
}
