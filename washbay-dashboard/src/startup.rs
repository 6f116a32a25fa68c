use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use washbay_core::middleware::{request_id_middleware, security_headers_middleware};

use crate::config::ServerSettings;
use crate::handlers::{
    app::{health_check, index},
    auth::{demo_login_handler, login_handler, login_page, logout_handler},
    catalog::{
        create_product, create_service, delete_product, delete_service, list_products,
        list_services, shop, update_product, update_service,
    },
    dashboard::{dashboard_handler, open_report},
    invoices::{create_invoice, invoice_detail, invoice_jpg, invoice_pdf, list_invoices},
    locations::{create_location, delete_location, list_locations, update_location},
    metrics::metrics,
    reports::{download_report, reports_page},
    settings::{
        activate_theme, create_payment_method, delete_payment_method, delete_theme,
        save_business, save_invoice_custom, save_profile, save_theme, select_preset,
        settings_page, update_payment_method,
    },
    users::{create_user, list_users, update_permissions, update_role},
};
use crate::middleware::auth::auth_middleware;
use crate::services::metrics::metrics_middleware;
use crate::AppState;

/// Pages that need a signed-in session.
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/dashboard/report", get(open_report))
        .route("/shop", get(shop))
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/:id", get(invoice_detail))
        .route("/invoices/:id/pdf", get(invoice_pdf))
        .route("/invoices/:id/jpg", get(invoice_jpg))
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", post(update_product))
        .route("/products/:id/delete", post(delete_product))
        .route("/services", get(list_services).post(create_service))
        .route("/services/:id", post(update_service))
        .route("/services/:id/delete", post(delete_service))
        .route("/locations", get(list_locations).post(create_location))
        .route("/locations/:id", post(update_location))
        .route("/locations/:id/delete", post(delete_location))
        .route("/settings", get(settings_page))
        .route("/settings/theme/preset", post(select_preset))
        .route("/settings/theme", post(save_theme))
        .route("/settings/theme/:id/activate", post(activate_theme))
        .route("/settings/theme/:id/delete", post(delete_theme))
        .route("/settings/business", post(save_business))
        .route("/settings/invoice-custom", post(save_invoice_custom))
        .route("/settings/payment-methods", post(create_payment_method))
        .route("/settings/payment-methods/:id", post(update_payment_method))
        .route(
            "/settings/payment-methods/:id/delete",
            post(delete_payment_method),
        )
        .route("/settings/profile", post(save_profile))
        .route("/reports", get(reports_page))
        .route("/reports/download/:format", get(download_report))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id/role", post(update_role))
        .route("/users/:id/permissions", post(update_permissions))
        .route_layer(from_fn(auth_middleware))
}

pub fn build_router(state: AppState, server: &ServerSettings) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            server.session_inactivity_hours,
        )));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/demo-login", post(demo_login_handler))
        .route("/logout", get(logout_handler).post(logout_handler))
        .merge(protected_routes())
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .with_state(state)
}
