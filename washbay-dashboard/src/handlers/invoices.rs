use askama::Template;
use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use std::collections::HashMap;
use tower_sessions::Session;
use validator::Validate;

use super::{attachment, finish_mutation, render, require, PageContext, ViewError};
use crate::models::invoice::InvoiceForm;
use crate::models::user::permissions;
use crate::models::{money, Catalog, CatalogItem, Invoice, Location, SessionContext};
use crate::services::api_client::InvoiceExport;
use crate::AppState;

/// One invoice row with its bay name resolved.
pub struct InvoiceRow {
    pub invoice: Invoice,
    pub location_name: String,
}

#[derive(Template)]
#[template(path = "pages/invoices.html")]
pub struct InvoicesTemplate {
    pub ctx: PageContext,
    pub rows: Vec<InvoiceRow>,
    pub locations: Vec<Location>,
    pub catalog_items: Vec<CatalogItem>,
}

/// Line item as shown on the invoice detail page.
pub struct LineView {
    pub name: String,
    pub quantity: i64,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Template)]
#[template(path = "pages/invoice_detail.html")]
pub struct InvoiceDetailTemplate {
    pub ctx: PageContext,
    pub invoice: Invoice,
    pub location_name: String,
    pub lines: Vec<LineView>,
}

fn location_names(locations: &[Location]) -> HashMap<i64, String> {
    locations.iter().map(|l| (l.id, l.name.clone())).collect()
}

fn location_name(names: &HashMap<i64, String>, id: Option<i64>) -> String {
    id.and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| "N/A".to_string())
}

pub async fn list_invoices(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
) -> Result<Response, ViewError> {
    let token = context.token.as_str();
    let (mut invoices, locations, catalog) = tokio::try_join!(
        state.api.list_invoices(token),
        state.api.list_locations(token),
        state.api.list_catalog(token),
    )?;

    invoices.sort_by(|a, b| b.date.cmp(&a.date));
    let names = location_names(&locations);
    let rows = invoices
        .into_iter()
        .map(|invoice| InvoiceRow {
            location_name: location_name(&names, invoice.location_id),
            invoice,
        })
        .collect();

    render(&InvoicesTemplate {
        ctx: PageContext::new(&session, context, "invoices").await?,
        rows,
        locations,
        catalog_items: catalog.items().to_vec(),
    })
}

pub async fn create_invoice(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Form(form): Form<InvoiceForm>,
) -> Result<Response, ViewError> {
    require(&context, permissions::MANAGE_INVOICES, "create invoices")?;

    let outcome = async move {
        form.validate()?;
        let catalog = state.api.list_catalog(&context.token).await?;
        let unit_price = catalog
            .get(form.product_service_id)
            .map(|item| item.price)
            .ok_or_else(|| ViewError::Validation("Please select a product or service".to_string()))?;
        let payload = form.into_payload(unit_price);
        let created = state.api.create_invoice(&context.token, &payload).await?;
        tracing::info!(
            user = %context.email,
            invoice = %created.invoice_number,
            total = created.total_amount,
            "Invoice created"
        );
        Ok::<_, ViewError>(created)
    }
    .await;

    finish_mutation(&session, outcome, "/invoices", "Invoice created successfully").await
}

pub async fn invoice_detail(
    State(state): State<AppState>,
    session: Session,
    context: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, ViewError> {
    let token = context.token.as_str();
    let (invoice, locations, catalog) = tokio::try_join!(
        state.api.get_invoice(token, id),
        state.api.list_locations(token),
        state.api.list_catalog(token),
    )?;

    let location_name = location_name(&location_names(&locations), invoice.location_id);
    let lines = line_views(&invoice, &catalog);

    render(&InvoiceDetailTemplate {
        ctx: PageContext::new(&session, context, "invoices").await?,
        invoice,
        location_name,
        lines,
    })
}

fn line_views(invoice: &Invoice, catalog: &Catalog) -> Vec<LineView> {
    invoice
        .items
        .iter()
        .map(|item| LineView {
            name: catalog.item_name(item.product_service_id),
            quantity: item.quantity,
            unit_price: money(item.unit_price),
            subtotal: money(item.subtotal),
        })
        .collect()
}

pub async fn invoice_pdf(
    State(state): State<AppState>,
    context: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, ViewError> {
    export(&state, &context, id, InvoiceExport::Pdf).await
}

pub async fn invoice_jpg(
    State(state): State<AppState>,
    context: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, ViewError> {
    export(&state, &context, id, InvoiceExport::Jpg).await
}

async fn export(
    state: &AppState,
    context: &SessionContext,
    id: i64,
    format: InvoiceExport,
) -> Result<Response, ViewError> {
    let download = state
        .api
        .download_invoice(&context.token, id, format)
        .await?;
    tracing::info!(user = %context.email, invoice_id = id, format = format.extension(), "Invoice exported");
    Ok(attachment(
        download,
        &format!("invoice_{}.{}", id, format.extension()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogKind, InvoiceItem};
    use chrono::Utc;

    #[test]
    fn lines_fall_back_to_item_ids() {
        let catalog = Catalog::new(vec![CatalogItem {
            id: 1,
            name: "Basic Wash".to_string(),
            price: 15.0,
            description: None,
            kind: CatalogKind::Service,
            quantity: None,
            quantity_unit: None,
        }]);
        let invoice = Invoice {
            id: 1,
            invoice_number: "INV-0001".to_string(),
            customer_name: "Ana".to_string(),
            date: Utc::now(),
            total_amount: 45.0,
            location_id: Some(4),
            items: vec![
                InvoiceItem {
                    id: Some(1),
                    product_service_id: 1,
                    quantity: 2,
                    unit_price: 15.0,
                    subtotal: 30.0,
                },
                InvoiceItem {
                    id: Some(2),
                    product_service_id: 42,
                    quantity: 1,
                    unit_price: 15.0,
                    subtotal: 15.0,
                },
            ],
        };

        let lines = line_views(&invoice, &catalog);
        assert_eq!(lines[0].name, "Basic Wash");
        assert_eq!(lines[0].subtotal, "$30.00");
        assert_eq!(lines[1].name, "Item #42");
    }

    #[test]
    fn unknown_bay_shows_na() {
        let names = location_names(&[Location {
            id: 1,
            name: "Bay 1".to_string(),
            address: String::new(),
        }]);
        assert_eq!(location_name(&names, Some(1)), "Bay 1");
        assert_eq!(location_name(&names, Some(9)), "N/A");
        assert_eq!(location_name(&names, None), "N/A");
    }
}
