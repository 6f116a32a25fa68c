use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use super::ViewError;
use crate::models::SessionContext;

/// Signed-in users go to their landing page, everyone else to the login.
pub async fn index(session: Session) -> Result<Response, ViewError> {
    let target = match SessionContext::load(&session).await? {
        Some(context) => context.landing_path(),
        None => "/login",
    };
    Ok(Redirect::to(target).into_response())
}

pub async fn health_check() -> &'static str {
    "OK"
}
