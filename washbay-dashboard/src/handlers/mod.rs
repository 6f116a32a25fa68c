pub mod app;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod invoices;
pub mod locations;
pub mod metrics;
pub mod reports;
pub mod settings;
pub mod users;

use askama::Template;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::{session, Session};

use crate::middleware::auth::SessionExpired;
use crate::models::session::{set_flash, take_flash, Flash};
use crate::models::SessionContext;
use crate::services::api_client::{ApiError, Download};

/// Failure of a page handler.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("session store failure: {0}")]
    Session(#[from] session::Error),

    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),

    /// A form or query the user can correct.
    #[error("{0}")]
    Validation(String),

    #[error("You do not have permission to {0}")]
    Forbidden(&'static str),
}

impl From<validator::ValidationErrors> for ViewError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ViewError::Validation(washbay_core::error::validation_summary(&errors))
    }
}

impl ViewError {
    fn status(&self) -> StatusCode {
        match self {
            ViewError::Api(ApiError::AuthExpired) => StatusCode::UNAUTHORIZED,
            ViewError::Api(ApiError::Upstream { status, .. }) => match status.as_u16() {
                403 => StatusCode::FORBIDDEN,
                404 => StatusCode::NOT_FOUND,
                400..=499 => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            ViewError::Api(ApiError::Network(_)) | ViewError::Api(ApiError::Decode(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ViewError::Session(_) | ViewError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ViewError::Validation(_) => StatusCode::BAD_REQUEST,
            ViewError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ViewError::Api(ApiError::Upstream { detail, .. }) => detail.clone(),
            ViewError::Api(ApiError::Network(_)) => {
                "The car wash server could not be reached. Please try again.".to_string()
            }
            ViewError::Api(ApiError::Decode(_)) => {
                "The car wash server sent an unexpected answer.".to_string()
            }
            ViewError::Session(_) | ViewError::Render(_) => {
                "Something went wrong on our side.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: String,
    pub message: String,
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        if let ViewError::Api(ApiError::AuthExpired) = self {
            // The auth middleware sees the marker and drops the session.
            let mut response = Redirect::to("/login").into_response();
            response.extensions_mut().insert(SessionExpired);
            return response;
        }

        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Page request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Page request rejected");
        }

        let template = ErrorTemplate {
            status: status.as_u16(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.public_message(),
        };
        (status, template).into_response()
    }
}

/// Per-page data shared by the base layout.
pub struct PageContext {
    pub session: SessionContext,
    pub flash: Option<Flash>,
    pub page: &'static str,
}

impl PageContext {
    /// Consumes any pending flash message.
    pub async fn new(
        session: &Session,
        context: SessionContext,
        page: &'static str,
    ) -> Result<Self, ViewError> {
        let flash = take_flash(session).await?;
        Ok(Self {
            session: context,
            flash,
            page,
        })
    }

    pub fn can(&self, permission: &str) -> bool {
        self.session.has_permission(permission)
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn is_demo(&self) -> bool {
        self.session.is_demo
    }

    pub fn nav_class(&self, page: &str) -> &'static str {
        if self.page == page {
            "nav-link active"
        } else {
            "nav-link"
        }
    }

    pub fn has_flash(&self) -> bool {
        self.flash.is_some()
    }

    pub fn flash_message(&self) -> &str {
        self.flash.as_ref().map(|f| f.message.as_str()).unwrap_or("")
    }

    pub fn flash_kind(&self) -> &'static str {
        self.flash.as_ref().map(|f| f.kind.as_str()).unwrap_or("info")
    }

    pub fn display_name(&self) -> String {
        self.session.display_name()
    }

    pub fn initials(&self) -> String {
        self.session.initials()
    }

    pub fn role_label(&self) -> String {
        self.session.role_label()
    }

    pub fn photo(&self) -> &str {
        self.session.profile.photo.as_deref().unwrap_or("")
    }

    pub fn theme_style(&self) -> String {
        self.session.theme.css_variables()
    }

    pub fn business_name(&self) -> &str {
        &self.session.branding.business_name
    }

    pub fn logo(&self) -> &str {
        &self.session.branding.logo
    }

    pub fn logo_is_image(&self) -> bool {
        self.session.branding.logo_is_image()
    }
}

/// One `<option>` of a select box.
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

pub(crate) fn render<T: Template>(template: &T) -> Result<Response, ViewError> {
    Ok(Html(template.render()?).into_response())
}

/// Returns 403 unless the session carries `permission`.
pub(crate) fn require(
    context: &SessionContext,
    permission: &str,
    action: &'static str,
) -> Result<(), ViewError> {
    if context.has_permission(permission) {
        Ok(())
    } else {
        tracing::warn!(user = %context.email, permission = %permission, "Permission denied");
        Err(ViewError::Forbidden(action))
    }
}

pub(crate) async fn flash_redirect(
    session: &Session,
    to: &str,
    flash: Flash,
) -> Result<Response, ViewError> {
    set_flash(session, flash).await?;
    Ok(Redirect::to(to).into_response())
}

/// Turns the outcome of a form submission into a redirect with a notice.
///
/// Rejections the user can act on (upstream 4xx, validation) become error
/// notices; an expired session still propagates.
pub(crate) async fn finish_mutation<T>(
    session: &Session,
    outcome: Result<T, ViewError>,
    back: &str,
    success: &str,
) -> Result<Response, ViewError> {
    match outcome {
        Ok(_) => flash_redirect(session, back, Flash::success(success)).await,
        Err(ViewError::Api(ApiError::AuthExpired)) => Err(ApiError::AuthExpired.into()),
        Err(err @ ViewError::Session(_)) => Err(err),
        Err(err) => {
            tracing::warn!(error = %err, "Form submission rejected");
            flash_redirect(session, back, Flash::error(err.public_message())).await
        }
    }
}

/// Streams an API export back to the browser as an attachment.
pub(crate) fn attachment(download: Download, fallback_name: &str) -> Response {
    let filename = download
        .filename
        .unwrap_or_else(|| fallback_name.to_string());
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_session_redirects_with_marker() {
        let response = ViewError::Api(ApiError::AuthExpired).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }

    #[test]
    fn upstream_errors_keep_client_statuses() {
        let err = ViewError::Api(ApiError::Upstream {
            status: StatusCode::NOT_FOUND,
            detail: "Invoice not found".to_string(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Invoice not found");

        let err = ViewError::Api(ApiError::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "boom".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn forbidden_renders_403() {
        let response = ViewError::Forbidden("manage users").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_failure_is_a_bad_request() {
        let err = ViewError::Validation("Please select a date".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Please select a date");
    }
}
