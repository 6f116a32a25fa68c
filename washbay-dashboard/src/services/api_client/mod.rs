//! Authenticated client for the remote car-wash REST API.
//!
//! Every call goes through [`ApiClient::request`]: JSON in, JSON out, bearer
//! token when the caller has one. A 401 from the API always surfaces as
//! [`ApiError::AuthExpired`] so the view layer can drop the session. Any
//! other status is handed back untouched in an [`ApiResponse`]; the typed
//! helpers in the submodules turn non-2xx answers into
//! [`ApiError::Upstream`].

mod auth;
mod catalog;
mod invoices;
mod locations;
mod reports;
mod settings;

pub use invoices::InvoiceExport;

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use washbay_core::observability::TracedClientExt;

use crate::config::ApiSettings;
use crate::services::metrics;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Session expired")]
    AuthExpired,

    #[error("API unreachable: {0}")]
    Network(String),

    #[error("API returned {status}: {detail}")]
    Upstream { status: StatusCode, detail: String },

    #[error("Unexpected API payload: {0}")]
    Decode(String),
}

/// Status and JSON body of a non-401 answer.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// FastAPI error detail, or the canonical status text.
    pub fn detail(&self) -> String {
        match self.body.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(Value::Array(errors)) => errors
                .iter()
                .filter_map(|e| e.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; "),
            _ => self
                .status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        }
    }

    /// Fails with [`ApiError::Upstream`] unless the status is 2xx.
    pub fn ensure_success(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Upstream {
                status: self.status,
                detail: self.detail(),
            })
        }
    }

    /// Deserializes a 2xx body.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let response = self.ensure_success()?;
        serde_json::from_value(response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// A binary export proxied to the browser.
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: Option<String>,
}

pub struct ApiClient {
    client: Client,
    settings: ApiSettings,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), endpoint)
    }

    /// Sends one JSON request.
    ///
    /// An empty body (204) comes back as JSON `null`. Transport failures and
    /// bodies that are not JSON are reported as [`ApiError::Network`].
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(endpoint);
        let group = endpoint_group(endpoint);

        let mut request = self
            .client
            .traced(method.clone(), &url)
            .header(header::CONTENT_TYPE.as_str(), "application/json")
            .maybe_bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(method = %method, endpoint = %endpoint, error = %e, "API request failed");
            metrics::record_upstream(method.as_str(), &group, "error");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        metrics::record_upstream(method.as_str(), &group, status.as_str());
        tracing::debug!(method = %method, endpoint = %endpoint, status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthExpired);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| {
                tracing::warn!(endpoint = %endpoint, status = status.as_u16(), "API returned a non-JSON body");
                ApiError::Network(format!("invalid JSON response: {}", e))
            })?
        };

        Ok(ApiResponse { status, body })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, None, token)
            .await?
            .into_typed()
    }

    pub(crate) async fn send_json<P, T>(
        &self,
        method: Method,
        endpoint: &str,
        payload: &P,
        token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.request(method, endpoint, Some(&body), token)
            .await?
            .into_typed()
    }

    /// For calls whose answer body is irrelevant (deletes, activations).
    pub(crate) async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        self.request(method, endpoint, None, token)
            .await?
            .ensure_success()
            .map(|_| ())
    }

    /// Fetches a binary export (PDF, JPG, CSV).
    pub async fn download(&self, endpoint: &str, token: &str) -> Result<Download, ApiError> {
        let url = self.url(endpoint);
        let group = endpoint_group(endpoint);

        let response = self
            .client
            .traced_get(&url)
            .maybe_bearer_auth(Some(token))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(endpoint = %endpoint, error = %e, "Download request failed");
                metrics::record_upstream("GET", &group, "error");
                ApiError::Network(e.to_string())
            })?;

        let status = response.status();
        metrics::record_upstream("GET", &group, status.as_str());

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthExpired);
        }
        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            let detail = ApiResponse { status, body }.detail();
            return Err(ApiError::Upstream { status, detail });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?
            .to_vec();

        Ok(Download {
            bytes,
            content_type,
            filename,
        })
    }
}

/// Metric label for an endpoint: its non-numeric path segments, at most two.
pub fn endpoint_group(endpoint: &str) -> String {
    let path = endpoint.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && !s.chars().all(|c| c.is_ascii_digit()))
        .take(2)
        .collect();
    if segments.is_empty() {
        "root".to_string()
    } else {
        segments.join("/")
    }
}

fn disposition_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
