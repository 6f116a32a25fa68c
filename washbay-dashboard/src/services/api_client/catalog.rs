use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::catalog::{Catalog, CatalogItem, CatalogPayload};

impl ApiClient {
    /// Products and services share one endpoint, told apart by `type`.
    pub async fn list_catalog(&self, token: &str) -> Result<Catalog, ApiError> {
        let items: Vec<CatalogItem> = self.get_json("/settings/products", Some(token)).await?;
        Ok(Catalog::new(items))
    }

    pub async fn create_catalog_item(
        &self,
        token: &str,
        item: &CatalogPayload,
    ) -> Result<CatalogItem, ApiError> {
        self.send_json(Method::POST, "/settings/products", item, Some(token))
            .await
    }

    pub async fn update_catalog_item(
        &self,
        token: &str,
        id: i64,
        item: &CatalogPayload,
    ) -> Result<CatalogItem, ApiError> {
        self.send_json(
            Method::PUT,
            &format!("/settings/products/{}", id),
            item,
            Some(token),
        )
        .await
    }

    pub async fn delete_catalog_item(&self, token: &str, id: i64) -> Result<(), ApiError> {
        self.execute(
            Method::DELETE,
            &format!("/settings/products/{}", id),
            Some(token),
        )
        .await
    }
}
