use askama::Template;
use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use validator::Validate;

use super::{finish_mutation, flash_redirect, render, require, PageContext, SelectOption, ViewError};
use crate::models::session::{Branding, Flash};
use crate::models::settings::{
    BusinessInfo, CustomTheme, InvoiceCustomization, PaymentMethod, PaymentMethodForm,
    ProfileForm, ThemeForm,
};
use crate::models::user::permissions;
use crate::models::{SessionContext, ThemePalette};
use crate::AppState;

const BACK: &str = "/settings";

#[derive(Template)]
#[template(path = "pages/settings.html")]
pub struct SettingsTemplate {
    pub ctx: PageContext,
    pub presets: Vec<PresetView>,
    pub themes: Vec<CustomTheme>,
    pub business: BusinessInfo,
    pub invoice_custom: InvoiceCustomization,
    pub payment_methods: Vec<PaymentMethod>,
    pub logo_types: Vec<SelectOption>,
}

pub struct PresetView {
    pub name: String,
    pub style: String,
    pub active: bool,
}

pub async fn settings_page(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
) -> Result<Response, ViewError> {
    let token = context.token.as_str();
    let (themes, business, invoice_custom, payment_methods) = tokio::try_join!(
        state.api.list_themes(token),
        state.api.business_info(token),
        state.api.invoice_customization(token),
        state.api.list_payment_methods(token),
    )?;

    let business = business.unwrap_or_else(|| BusinessInfo {
        business_name: context.branding.business_name.clone(),
        ..Default::default()
    });
    let presets = ThemePalette::preset_names()
        .into_iter()
        .filter_map(ThemePalette::preset)
        .map(|palette| PresetView {
            active: palette.name == context.theme.name,
            style: palette.css_variables(),
            name: palette.name,
        })
        .collect();
    let logo_type = business.logo_type.clone().unwrap_or_else(|| "emoji".to_string());
    let logo_types = vec![
        SelectOption::new("emoji", "Emoji", logo_type == "emoji"),
        SelectOption::new("image", "Image URL", logo_type == "image"),
    ];

    render(&SettingsTemplate {
        ctx: PageContext::new(&session, context, "settings").await?,
        presets,
        themes,
        business,
        invoice_custom: invoice_custom.unwrap_or_default(),
        payment_methods,
        logo_types,
    })
}

#[derive(Debug, Deserialize)]
pub struct PresetForm {
    pub preset: String,
}

/// Picks a built-in preset for this session.
pub async fn select_preset(
    session: Session,
    mut context: SessionContext,
    Form(form): Form<PresetForm>,
) -> Result<Response, ViewError> {
    let Some(palette) = ThemePalette::preset(&form.preset) else {
        return flash_redirect(&session, BACK, Flash::error("Unknown theme preset")).await;
    };
    context.theme = palette;
    context.save(&session).await?;
    flash_redirect(&session, BACK, Flash::success("Theme applied")).await
}

pub async fn save_theme(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Form(form): Form<ThemeForm>,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_SETTINGS, "change settings")?;

    let outcome = async move {
        form.validate()?;
        state.api.save_theme(&context.token, &form).await?;
        tracing::info!(user = %context.email, theme = %form.preset_name, "Custom theme saved");
        Ok::<_, ViewError>(())
    }
    .await;
    finish_mutation(&session, outcome, BACK, "Theme saved").await
}

pub async fn activate_theme(
    State(state): State<AppState>,
    session: Session,
    mut context: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_SETTINGS, "change settings")?;

    let outcome = async {
        state.api.activate_theme(&context.token, id).await?;
        Ok::<_, ViewError>(state.api.active_theme(&context.token).await?)
    }
    .await;

    if let Ok(Some(theme)) = &outcome {
        context.theme = ThemePalette::from_custom(theme);
        context.save(&session).await?;
        tracing::info!(user = %context.email, theme_id = id, "Theme activated");
    }
    finish_mutation(&session, outcome, BACK, "Theme activated").await
}

pub async fn delete_theme(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_SETTINGS, "change settings")?;

    let outcome = state
        .api
        .delete_theme(&context.token, id)
        .await
        .map_err(ViewError::from);
    finish_mutation(&session, outcome, BACK, "Theme deleted").await
}

pub async fn save_business(
    State(state): State<AppState>,
    session: Session,
    mut context: SessionContext,
    Form(form): Form<BusinessInfo>,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_SETTINGS, "change settings")?;

    let info = form.normalized();
    let outcome = async {
        info.validate()?;
        state.api.save_business_info(&context.token, &info).await?;
        Ok::<_, ViewError>(())
    }
    .await;

    if outcome.is_ok() {
        let defaults = Branding::default();
        context.branding = Branding {
            business_name: info.business_name.clone(),
            logo: info.logo.clone().unwrap_or(defaults.logo),
            logo_type: info.logo_type.clone().unwrap_or(defaults.logo_type),
        };
        context.save(&session).await?;
        tracing::info!(user = %context.email, "Business info saved");
    }
    finish_mutation(&session, outcome, BACK, "Business information saved").await
}

pub async fn save_invoice_custom(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Form(form): Form<InvoiceCustomization>,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_SETTINGS, "change settings")?;

    let outcome = async move {
        let custom = form.normalized();
        custom.validate()?;
        state
            .api
            .save_invoice_customization(&context.token, &custom)
            .await?;
        Ok::<_, ViewError>(())
    }
    .await;
    finish_mutation(&session, outcome, BACK, "Invoice details saved").await
}

pub async fn create_payment_method(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Form(form): Form<PaymentMethodForm>,
) -> Result<Response, ViewError> {
    save_payment_method(state, session, context, None, form).await
}

pub async fn update_payment_method(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
    Form(form): Form<PaymentMethodForm>,
) -> Result<Response, ViewError> {
    save_payment_method(state, session, context, Some(id), form).await
}

async fn save_payment_method(
    state: AppState,
    session: Session,
    context: SessionContext,
    id: Option<i64>,
    form: PaymentMethodForm,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_SETTINGS, "change settings")?;

    let outcome = async move {
        form.validate()?;
        let payload = form.into_payload();
        match id {
            Some(id) => {
                state
                    .api
                    .update_payment_method(&context.token, id, &payload)
                    .await?
            }
            None => state.api.create_payment_method(&context.token, &payload).await?,
        };
        Ok::<_, ViewError>(())
    }
    .await;

    let message = if id.is_some() {
        "Payment method updated"
    } else {
        "Payment method added"
    };
    finish_mutation(&session, outcome, BACK, message).await
}

pub async fn delete_payment_method(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_SETTINGS, "change settings")?;

    let outcome = state
        .api
        .delete_payment_method(&context.token, id)
        .await
        .map_err(ViewError::from);
    finish_mutation(&session, outcome, BACK, "Payment method deleted").await
}

/// Display name, role and photo live in the session only.
pub async fn save_profile(
    session: Session,
    mut context: SessionContext,
    Form(form): Form<ProfileForm>,
) -> Result<Response, ViewError> {
    if let Err(errors) = form.validate() {
        let message = washbay_core::error::validation_summary(&errors);
        return flash_redirect(&session, BACK, Flash::error(message)).await;
    }

    context.profile.name = Some(form.name.trim().to_string());
    context.profile.role = Some(form.role.trim().to_string()).filter(|r| !r.is_empty());
    context.profile.photo = Some(form.photo.trim().to_string()).filter(|p| !p.is_empty());
    context.save(&session).await?;
    flash_redirect(&session, BACK, Flash::success("Profile updated")).await
}
