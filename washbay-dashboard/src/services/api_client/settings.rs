use reqwest::Method;
use serde_json::Value;

use super::{ApiClient, ApiError};
use crate::models::settings::{
    BusinessInfo, CustomTheme, InvoiceCustomization, PaymentMethod, PaymentMethodPayload,
    ThemeForm,
};

impl ApiClient {
    /// The active custom theme; `None` when the API has none (null body).
    pub async fn active_theme(&self, token: &str) -> Result<Option<CustomTheme>, ApiError> {
        self.get_json("/settings/theme/active", Some(token)).await
    }

    pub async fn list_themes(&self, token: &str) -> Result<Vec<CustomTheme>, ApiError> {
        self.get_json("/settings/theme/all", Some(token)).await
    }

    pub async fn save_theme(&self, token: &str, theme: &ThemeForm) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/settings/theme", theme, Some(token))
            .await
    }

    pub async fn activate_theme(&self, token: &str, id: i64) -> Result<(), ApiError> {
        self.execute(
            Method::PUT,
            &format!("/settings/theme/{}/activate", id),
            Some(token),
        )
        .await
    }

    pub async fn delete_theme(&self, token: &str, id: i64) -> Result<(), ApiError> {
        self.execute(
            Method::DELETE,
            &format!("/settings/theme/{}", id),
            Some(token),
        )
        .await
    }

    pub async fn business_info(&self, token: &str) -> Result<Option<BusinessInfo>, ApiError> {
        self.get_json("/settings/business", Some(token)).await
    }

    pub async fn save_business_info(
        &self,
        token: &str,
        info: &BusinessInfo,
    ) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/settings/business", info, Some(token))
            .await
    }

    pub async fn invoice_customization(
        &self,
        token: &str,
    ) -> Result<Option<InvoiceCustomization>, ApiError> {
        self.get_json("/settings/invoice-custom", Some(token)).await
    }

    pub async fn save_invoice_customization(
        &self,
        token: &str,
        custom: &InvoiceCustomization,
    ) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/settings/invoice-custom", custom, Some(token))
            .await
    }

    pub async fn list_payment_methods(&self, token: &str) -> Result<Vec<PaymentMethod>, ApiError> {
        self.get_json("/settings/payment-methods", Some(token)).await
    }

    pub async fn create_payment_method(
        &self,
        token: &str,
        method: &PaymentMethodPayload,
    ) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/settings/payment-methods", method, Some(token))
            .await
    }

    pub async fn update_payment_method(
        &self,
        token: &str,
        id: i64,
        method: &PaymentMethodPayload,
    ) -> Result<Value, ApiError> {
        self.send_json(
            Method::PUT,
            &format!("/settings/payment-methods/{}", id),
            method,
            Some(token),
        )
        .await
    }

    pub async fn delete_payment_method(&self, token: &str, id: i64) -> Result<(), ApiError> {
        self.execute(
            Method::DELETE,
            &format!("/settings/payment-methods/{}", id),
            Some(token),
        )
        .await
    }
}
