use reqwest::Method;

use super::{ApiClient, ApiError, Download};
use crate::models::invoice::{Invoice, NewInvoice};
use crate::models::DashboardStats;

impl ApiClient {
    pub async fn list_invoices(&self, token: &str) -> Result<Vec<Invoice>, ApiError> {
        self.get_json("/invoices/", Some(token)).await
    }

    pub async fn get_invoice(&self, token: &str, id: i64) -> Result<Invoice, ApiError> {
        self.get_json(&format!("/invoices/{}", id), Some(token))
            .await
    }

    pub async fn create_invoice(
        &self,
        token: &str,
        invoice: &NewInvoice,
    ) -> Result<Invoice, ApiError> {
        self.send_json(Method::POST, "/invoices/", invoice, Some(token))
            .await
    }

    pub async fn dashboard_stats(&self, token: &str) -> Result<DashboardStats, ApiError> {
        self.get_json("/invoices/dashboard/stats", Some(token))
            .await
    }

    /// Direct API address of an invoice export.
    pub fn invoice_export_url(&self, id: i64, format: InvoiceExport) -> String {
        self.url(&invoice_export_endpoint(id, format))
    }

    pub async fn download_invoice(
        &self,
        token: &str,
        id: i64,
        format: InvoiceExport,
    ) -> Result<Download, ApiError> {
        self.download(&invoice_export_endpoint(id, format), token)
            .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceExport {
    Pdf,
    Jpg,
}

impl InvoiceExport {
    pub fn extension(&self) -> &'static str {
        match self {
            InvoiceExport::Pdf => "pdf",
            InvoiceExport::Jpg => "jpg",
        }
    }
}

fn invoice_export_endpoint(id: i64, format: InvoiceExport) -> String {
    format!("/invoices/{}/{}", id, format.extension())
}
