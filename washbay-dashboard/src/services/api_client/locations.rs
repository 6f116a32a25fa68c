use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::location::{Location, LocationForm};

impl ApiClient {
    pub async fn list_locations(&self, token: &str) -> Result<Vec<Location>, ApiError> {
        self.get_json("/settings/locations", Some(token)).await
    }

    pub async fn create_location(
        &self,
        token: &str,
        location: &LocationForm,
    ) -> Result<Location, ApiError> {
        self.send_json(Method::POST, "/settings/locations", location, Some(token))
            .await
    }

    pub async fn update_location(
        &self,
        token: &str,
        id: i64,
        location: &LocationForm,
    ) -> Result<Location, ApiError> {
        self.send_json(
            Method::PUT,
            &format!("/settings/locations/{}", id),
            location,
            Some(token),
        )
        .await
    }

    pub async fn delete_location(&self, token: &str, id: i64) -> Result<(), ApiError> {
        self.execute(
            Method::DELETE,
            &format!("/settings/locations/{}", id),
            Some(token),
        )
        .await
    }
}
