use askama::Template;
use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use tower_sessions::Session;
use validator::Validate;

use super::{finish_mutation, render, require, PageContext, ViewError};
use crate::models::catalog::CatalogForm;
use crate::models::user::permissions;
use crate::models::{CatalogItem, CatalogKind, SessionContext};
use crate::AppState;

#[derive(Template)]
#[template(path = "pages/catalog.html")]
pub struct CatalogTemplate {
    pub ctx: PageContext,
    pub kind: CatalogKind,
    pub items: Vec<CatalogItem>,
}

impl CatalogTemplate {
    pub fn is_product(&self) -> bool {
        self.kind == CatalogKind::Product
    }
}

#[derive(Template)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub ctx: PageContext,
    pub services: Vec<CatalogItem>,
}

async fn list(
    state: AppState,
    session: Session,
    context: SessionContext,
    kind: CatalogKind,
) -> Result<Response, ViewError> {
    let catalog = state.api.list_catalog(&context.token).await?;
    let items = catalog.of_kind(kind).into_iter().cloned().collect();

    render(&CatalogTemplate {
        ctx: PageContext::new(&session, context, kind.plural()).await?,
        kind,
        items,
    })
}

async fn save(
    state: AppState,
    session: Session,
    context: SessionContext,
    kind: CatalogKind,
    id: Option<i64>,
    form: CatalogForm,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_PRODUCTS, "manage the catalog")?;

    let back = format!("/{}", kind.plural());
    let outcome = async move {
        form.validate()?;
        let payload = form.into_payload(kind).map_err(ViewError::Validation)?;
        let saved = match id {
            Some(id) => state.api.update_catalog_item(&context.token, id, &payload).await?,
            None => state.api.create_catalog_item(&context.token, &payload).await?,
        };
        tracing::info!(user = %context.email, kind = kind.as_str(), id = saved.id, "Catalog item saved");
        Ok::<_, ViewError>(saved)
    }
    .await;

    let message = match id {
        Some(_) => format!("{} updated", kind_label(kind)),
        None => format!("{} created", kind_label(kind)),
    };
    finish_mutation(&session, outcome, &back, &message).await
}

async fn delete(
    state: AppState,
    session: Session,
    context: SessionContext,
    kind: CatalogKind,
    id: i64,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_PRODUCTS, "manage the catalog")?;

    let outcome = state
        .api
        .delete_catalog_item(&context.token, id)
        .await
        .map_err(ViewError::from);
    if outcome.is_ok() {
        tracing::info!(user = %context.email, kind = kind.as_str(), id, "Catalog item deleted");
    }
    let back = format!("/{}", kind.plural());
    finish_mutation(
        &session,
        outcome,
        &back,
        &format!("{} deleted", kind_label(kind)),
    )
    .await
}

fn kind_label(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Product => "Product",
        CatalogKind::Service => "Service",
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
) -> Result<Response, ViewError> {
    list(state, session, context, CatalogKind::Product).await
}

pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Form(form): Form<CatalogForm>,
) -> Result<Response, ViewError> {
    save(state, session, context, CatalogKind::Product, None, form).await
}

pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
    Form(form): Form<CatalogForm>,
) -> Result<Response, ViewError> {
    save(state, session, context, CatalogKind::Product, Some(id), form).await
}

pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, ViewError> {
    delete(state, session, context, CatalogKind::Product, id).await
}

pub async fn list_services(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
) -> Result<Response, ViewError> {
    list(state, session, context, CatalogKind::Service).await
}

pub async fn create_service(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Form(form): Form<CatalogForm>,
) -> Result<Response, ViewError> {
    save(state, session, context, CatalogKind::Service, None, form).await
}

pub async fn update_service(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
    Form(form): Form<CatalogForm>,
) -> Result<Response, ViewError> {
    save(state, session, context, CatalogKind::Service, Some(id), form).await
}

pub async fn delete_service(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, ViewError> {
    delete(state, session, context, CatalogKind::Service, id).await
}

/// Service catalogue for client accounts.
pub async fn shop(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
) -> Result<Response, ViewError> {
    let catalog = state.api.list_catalog(&context.token).await?;
    let services = catalog
        .of_kind(CatalogKind::Service)
        .into_iter()
        .cloned()
        .collect();

    render(&ShopTemplate {
        ctx: PageContext::new(&session, context, "shop").await?,
        services,
    })
}
