use super::{ApiClient, ApiError, Download};
use crate::models::report::{ReportFormat, SalesReport, SalesReportQuery};

impl ApiClient {
    pub async fn sales_report(
        &self,
        token: &str,
        query: &SalesReportQuery,
    ) -> Result<SalesReport, ApiError> {
        self.get_json(
            &format!("/reports/sales?{}", query.query_string()),
            Some(token),
        )
        .await
    }

    pub async fn download_sales_report(
        &self,
        token: &str,
        query: &SalesReportQuery,
        format: ReportFormat,
    ) -> Result<Download, ApiError> {
        let endpoint = format!(
            "/reports/sales/download/{}?{}",
            format.as_str(),
            query.query_string()
        );
        self.download(&endpoint, token).await
    }
}
