use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tower_sessions::Session;
use validator::Validate;

use super::{flash_redirect, render, ViewError};
use crate::models::session::{take_flash, Branding, Flash};
use crate::models::user::{LoginForm, LoginResponse};
use crate::models::{SessionContext, ThemePalette};
use crate::services::api_client::ApiError;
use crate::utils::jwt::decode_token_claims;
use crate::AppState;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub flash: Option<Flash>,
    pub demo_enabled: bool,
}

impl LoginTemplate {
    pub fn has_flash(&self) -> bool {
        self.flash.is_some()
    }

    pub fn flash_message(&self) -> &str {
        self.flash.as_ref().map(|f| f.message.as_str()).unwrap_or("")
    }

    pub fn flash_kind(&self) -> &'static str {
        self.flash.as_ref().map(|f| f.kind.as_str()).unwrap_or("info")
    }
}

pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, ViewError> {
    if let Some(context) = SessionContext::load(&session).await? {
        return Ok(Redirect::to(context.landing_path()).into_response());
    }

    render(&LoginTemplate {
        flash: take_flash(&session).await?,
        demo_enabled: state.demo_enabled,
    })
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, ViewError> {
    if let Err(errors) = form.validate() {
        let message = washbay_core::error::validation_summary(&errors);
        return flash_redirect(&session, "/login", Flash::error(message)).await;
    }

    let email = form.email.trim().to_string();
    match state.api.login(&email, &form.password).await {
        Ok(response) => {
            let context = establish_session(&state, &session, response, Some(email)).await?;
            tracing::info!(user = %context.email, "User logged in");
            Ok(Redirect::to(context.landing_path()).into_response())
        }
        Err(err) => {
            tracing::warn!(user = %email, error = %err, "Login failed");
            flash_redirect(&session, "/login", Flash::error(login_failure_message(&err))).await
        }
    }
}

pub async fn demo_login_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, ViewError> {
    if !state.demo_enabled {
        return flash_redirect(
            &session,
            "/login",
            Flash::error("Demo access is not available."),
        )
        .await;
    }

    match state.api.demo_login().await {
        Ok(response) => {
            let context = establish_session(&state, &session, response, None).await?;
            tracing::info!(user = %context.email, "Demo session started");
            Ok(Redirect::to(context.landing_path()).into_response())
        }
        Err(err) => {
            tracing::warn!(error = %err, "Demo login failed");
            flash_redirect(&session, "/login", Flash::error(login_failure_message(&err))).await
        }
    }
}

pub async fn logout_handler(session: Session) -> Result<Response, ViewError> {
    if let Some(context) = SessionContext::load(&session).await? {
        tracing::info!(user = %context.email, "User logged out");
    }
    SessionContext::clear(&session).await?;
    Ok(Redirect::to("/login").into_response())
}

fn login_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::AuthExpired => "Invalid email or password".to_string(),
        ApiError::Upstream { detail, .. } => detail.clone(),
        ApiError::Network(_) | ApiError::Decode(_) => {
            "Unable to reach the server. Please try again.".to_string()
        }
    }
}

/// Builds and stores the session context for a fresh token.
///
/// Permissions, theme and branding are looked up on a best-effort basis: a
/// failing lookup leaves the defaults in place instead of failing the login.
async fn establish_session(
    state: &AppState,
    session: &Session,
    response: LoginResponse,
    email: Option<String>,
) -> Result<SessionContext, ViewError> {
    let claims = decode_token_claims(&response.access_token)
        .map_err(|e| tracing::warn!(error = %e, "Access token claims unreadable"))
        .ok();

    let email = email
        .or_else(|| claims.as_ref().map(|c| c.sub.clone()))
        .unwrap_or_default();

    let mut context = SessionContext::new(response.access_token, email);
    context.is_demo = response.is_demo || claims.as_ref().map(|c| c.is_demo).unwrap_or(false);
    context.token_expires_at = claims.as_ref().and_then(|c| c.exp);
    context.permissions = response.permissions;
    context.roles = response.roles;

    let token = context.token.clone();
    let (permissions, theme, business) = tokio::join!(
        state.api.my_permissions(&token),
        state.api.active_theme(&token),
        state.api.business_info(&token),
    );

    match permissions {
        Ok(mine) => {
            if context.permissions.is_empty() {
                context.permissions = mine.permissions;
            }
            if context.roles.is_empty() {
                context.roles = mine.roles;
            }
        }
        Err(e) => tracing::warn!(error = %e, "Could not load permissions"),
    }
    match theme {
        Ok(Some(theme)) => context.theme = ThemePalette::from_custom(&theme),
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "No active theme"),
    }
    match business {
        Ok(Some(info)) => {
            let defaults = Branding::default();
            context.branding = Branding {
                business_name: info.business_name,
                logo: info.logo.unwrap_or(defaults.logo),
                logo_type: info.logo_type.unwrap_or(defaults.logo_type),
            };
        }
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "No business info"),
    }

    // New identity, new session id.
    session.cycle_id().await?;
    context.save(session).await?;
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn unauthorized_login_reads_as_bad_credentials() {
        assert_eq!(
            login_failure_message(&ApiError::AuthExpired),
            "Invalid email or password"
        );
        assert_eq!(
            login_failure_message(&ApiError::Upstream {
                status: StatusCode::FORBIDDEN,
                detail: "Account disabled".to_string(),
            }),
            "Account disabled"
        );
    }
}
