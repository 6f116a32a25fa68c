use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::{session, Session};

use super::user::permissions;
use super::ThemePalette;

const CONTEXT_KEY: &str = "washbay.context";
const FLASH_KEY: &str = "washbay.flash";

/// Profile display fields edited on the settings page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub role: Option<String>,
    pub photo: Option<String>,
}

/// Business branding shown in the sidebar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branding {
    pub business_name: String,
    pub logo: String,
    pub logo_type: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            business_name: "Car Wash".to_string(),
            logo: "🚗".to_string(),
            logo_type: "emoji".to_string(),
        }
    }
}

impl Branding {
    pub fn logo_is_image(&self) -> bool {
        self.logo_type == "image"
    }
}

/// Everything the dashboard remembers about the signed-in user.
///
/// Stored as one JSON object in the server-side session. Established at
/// login, dropped at logout or when the API rejects the token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub token: String,
    pub email: String,
    #[serde(default)]
    pub is_demo: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub token_expires_at: Option<i64>,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub theme: ThemePalette,
    #[serde(default)]
    pub branding: Branding,
    /// Period token handed from one view to the next, consumed once.
    #[serde(default)]
    pub nav_hint: Option<String>,
}

impl SessionContext {
    pub fn new(token: String, email: String) -> Self {
        Self {
            token,
            email,
            ..Default::default()
        }
    }

    pub async fn load(session: &Session) -> Result<Option<Self>, session::Error> {
        session.get::<Self>(CONTEXT_KEY).await
    }

    pub async fn save(&self, session: &Session) -> Result<(), session::Error> {
        session.insert(CONTEXT_KEY, self).await
    }

    /// Drops the token and every cached value.
    pub async fn clear(session: &Session) -> Result<(), session::Error> {
        session.flush().await
    }

    /// True once the token's `exp` claim lies at or before `now` (unix seconds).
    /// Tokens without a readable expiry are left for the API to judge.
    pub fn token_expired(&self, now: i64) -> bool {
        self.token_expires_at.is_some_and(|exp| exp <= now)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn is_admin(&self) -> bool {
        self.roles
            .iter()
            .any(|r| super::user::ADMIN_ROLES.contains(&r.as_str()))
    }

    /// Customers can shop but not administer anything.
    pub fn is_client(&self) -> bool {
        self.has_permission(permissions::MANAGE_CART)
            && !self.has_permission(permissions::MANAGE_USERS)
    }

    pub fn landing_path(&self) -> &'static str {
        if self.is_client() {
            "/shop"
        } else {
            "/dashboard"
        }
    }

    pub fn display_name(&self) -> String {
        match self.profile.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("User")
                .to_string(),
        }
    }

    pub fn role_label(&self) -> String {
        match self.profile.role.as_deref() {
            Some(role) if !role.trim().is_empty() => role.to_string(),
            _ => self
                .roles
                .first()
                .cloned()
                .unwrap_or_else(|| "Administrator".to_string()),
        }
    }

    pub fn initials(&self) -> String {
        let initials: String = self
            .display_name()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }

    /// Consumes the navigation hint.
    pub fn take_nav_hint(&mut self) -> Option<String> {
        self.nav_hint.take()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        match SessionContext::load(&session).await {
            Ok(Some(context)) => Ok(context),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read session context");
                Err(Redirect::to("/login").into_response())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
            FlashKind::Info => "info",
        }
    }
}

/// One-shot notice shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }
}

pub async fn set_flash(session: &Session, flash: Flash) -> Result<(), session::Error> {
    session.insert(FLASH_KEY, flash).await
}

pub async fn take_flash(session: &Session) -> Result<Option<Flash>, session::Error> {
    session.remove::<Flash>(FLASH_KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(permissions: &[&str]) -> SessionContext {
        SessionContext {
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            ..SessionContext::new("t".to_string(), "jane.doe@example.com".to_string())
        }
    }

    #[test]
    fn clients_land_on_the_shop() {
        assert_eq!(context(&["manage_cart"]).landing_path(), "/shop");
        assert_eq!(
            context(&["manage_cart", "manage_users"]).landing_path(),
            "/dashboard"
        );
        assert_eq!(context(&["view_reports"]).landing_path(), "/dashboard");
    }

    #[test]
    fn token_expiry_is_inclusive() {
        let mut ctx = context(&[]);
        assert!(!ctx.token_expired(1_000));

        ctx.token_expires_at = Some(1_000);
        assert!(!ctx.token_expired(999));
        assert!(ctx.token_expired(1_000));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut ctx = context(&[]);
        assert_eq!(ctx.display_name(), "jane.doe");
        assert_eq!(ctx.initials(), "J");

        ctx.profile.name = Some("Jane Doe".to_string());
        assert_eq!(ctx.initials(), "JD");
    }

    #[test]
    fn nav_hint_is_consumed_once() {
        let mut ctx = context(&[]);
        ctx.nav_hint = Some("quarterly".to_string());
        assert_eq!(ctx.take_nav_hint().as_deref(), Some("quarterly"));
        assert_eq!(ctx.take_nav_hint(), None);
    }

    #[test]
    fn context_survives_json_roundtrip_with_missing_fields() {
        let ctx: SessionContext = serde_json::from_value(serde_json::json!({
            "token": "abc", "email": "a@b.c"
        }))
        .unwrap();
        assert_eq!(ctx.theme, ThemePalette::default());
        assert_eq!(ctx.branding.business_name, "Car Wash");
    }
}
