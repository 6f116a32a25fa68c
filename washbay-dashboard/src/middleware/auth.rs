use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::models::session::{set_flash, Flash};
use crate::models::SessionContext;

/// Response extension set when the API rejected the session's token.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

/// Guards the dashboard pages.
///
/// Without a session context the browser is sent to `/login`. A token whose
/// `exp` has passed ends the session up front. When a handler reports that
/// the API no longer accepts the token, the whole session is dropped before
/// its redirect goes out.
pub async fn auth_middleware(session: Session, request: Request<Body>, next: Next) -> Response {
    match SessionContext::load(&session).await {
        Ok(Some(context)) if context.token_expired(Utc::now().timestamp()) => {
            tracing::info!(user = %context.email, "Session token past its expiry");
            end_session(&session).await;
            return Redirect::to("/login").into_response();
        }
        Ok(Some(_)) => {}
        Ok(None) => return Redirect::to("/login").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load session");
            return Redirect::to("/login").into_response();
        }
    }

    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some() {
        tracing::info!("API rejected the session token, clearing session");
        end_session(&session).await;
    }

    response
}

async fn end_session(session: &Session) {
    if let Err(e) = SessionContext::clear(session).await {
        tracing::error!(error = %e, "Failed to clear expired session");
    }
    if let Err(e) = set_flash(session, Flash::info("Your session has expired. Please sign in again.")).await {
        tracing::warn!(error = %e, "Failed to store session expiry notice");
    }
}
