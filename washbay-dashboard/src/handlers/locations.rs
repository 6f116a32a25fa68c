use askama::Template;
use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use tower_sessions::Session;
use validator::Validate;

use super::{finish_mutation, render, require, PageContext, ViewError};
use crate::models::location::LocationForm;
use crate::models::user::permissions;
use crate::models::{Location, SessionContext};
use crate::AppState;

#[derive(Template)]
#[template(path = "pages/locations.html")]
pub struct LocationsTemplate {
    pub ctx: PageContext,
    pub locations: Vec<Location>,
}

pub async fn list_locations(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
) -> Result<Response, ViewError> {
    let locations = state.api.list_locations(&context.token).await?;

    render(&LocationsTemplate {
        ctx: PageContext::new(&session, context, "locations").await?,
        locations,
    })
}

pub async fn create_location(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Form(form): Form<LocationForm>,
) -> Result<Response, ViewError> {
    save(state, session, context, None, form).await
}

pub async fn update_location(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
    Form(form): Form<LocationForm>,
) -> Result<Response, ViewError> {
    save(state, session, context, Some(id), form).await
}

async fn save(
    state: AppState,
    session: Session,
    context: SessionContext,
    id: Option<i64>,
    form: LocationForm,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_LOCATIONS, "manage bays")?;

    let outcome = async move {
        let form = form.normalized();
        form.validate()?;
        let saved = match id {
            Some(id) => state.api.update_location(&context.token, id, &form).await?,
            None => state.api.create_location(&context.token, &form).await?,
        };
        tracing::info!(user = %context.email, location_id = saved.id, "Bay saved");
        Ok::<_, ViewError>(saved)
    }
    .await;

    let message = if id.is_some() { "Bay updated" } else { "Bay added" };
    finish_mutation(&session, outcome, "/locations", message).await
}

pub async fn delete_location(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_LOCATIONS, "manage bays")?;

    let outcome = state
        .api
        .delete_location(&context.token, id)
        .await
        .map_err(ViewError::from);
    if outcome.is_ok() {
        tracing::info!(user = %context.email, location_id = id, "Bay deleted");
    }
    finish_mutation(&session, outcome, "/locations", "Bay deleted").await
}
