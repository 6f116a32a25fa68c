use reqwest::Method;
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};

use super::{ApiClient, ApiError};
use crate::models::user::{
    LoginResponse, ManagedUser, MyPermissions, NewUserForm, PermissionUpdate, RoleUpdate,
};

impl ApiClient {
    /// `POST /auth/login`. Wrong credentials come back as
    /// [`ApiError::AuthExpired`] because the API answers them with a 401.
    pub async fn login(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<LoginResponse, ApiError> {
        let body = json!({ "email": email, "password": password.expose_secret() });
        self.request(Method::POST, "/auth/login", Some(&body), None)
            .await?
            .into_typed()
    }

    pub async fn demo_login(&self) -> Result<LoginResponse, ApiError> {
        self.request(Method::POST, "/auth/demo-login", None, None)
            .await?
            .into_typed()
    }

    pub async fn my_permissions(&self, token: &str) -> Result<MyPermissions, ApiError> {
        self.get_json("/auth/me/permissions", Some(token)).await
    }

    pub async fn list_users(&self, token: &str) -> Result<Vec<ManagedUser>, ApiError> {
        self.get_json("/auth/users", Some(token)).await
    }

    pub async fn get_user(&self, token: &str, user_id: i64) -> Result<ManagedUser, ApiError> {
        self.get_json(&format!("/auth/users/{}", user_id), Some(token))
            .await
    }

    pub async fn create_user(&self, token: &str, user: &NewUserForm) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/auth/users", user, Some(token))
            .await
    }

    pub async fn update_user_roles(
        &self,
        token: &str,
        update: &RoleUpdate,
    ) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, "/auth/users/roles", update, Some(token))
            .await
    }

    pub async fn update_user_permissions(
        &self,
        token: &str,
        update: &PermissionUpdate,
    ) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, "/auth/users/permissions", update, Some(token))
            .await
    }
}
