use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to show to an end user.
    ///
    /// Internal failures are collapsed into a generic message; their details
    /// only go to the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InternalError(_) => "Internal server error".to_string(),
        }
    }
}

/// Flattens validator errors into a single line, one message per field.
///
/// Field order follows the field name so the output is stable.
pub fn validation_summary(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .map(|(field, field_errors)| {
            field_errors
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is invalid", field))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let AppError::InternalError(err) = &self;
        tracing::error!(error = ?err, "Request failed");

        (
            self.status(),
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Bay {
        #[validate(length(min = 1, message = "Bay name is required"))]
        name: String,
        #[validate(length(min = 1, message = "Address is required"))]
        address: String,
    }

    #[test]
    fn validation_summary_joins_fields_in_name_order() {
        let err = Bay {
            name: String::new(),
            address: String::new(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            validation_summary(&err),
            "Address is required; Bay name is required"
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::InternalError(anyhow::anyhow!("connection pool exhausted"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn into_response_hides_internal_details() {
        let response = AppError::from(anyhow::anyhow!("registry poisoned")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
